// Veterinarians, service requests and the messages on each request

use serde_json::json;

use crate::client::api_client::ApiClient;
use crate::client::error::ClientResult;
use crate::client::models::{Message, ServiceRequest, Veterinarian};

use super::{decode_record, fetch_list, reraise};

#[derive(Debug, Clone)]
pub struct VetService {
    client: ApiClient,
}

impl VetService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn list_veterinarians(&self) -> Vec<Veterinarian> {
        fetch_list(&self.client, "veterinarians", Some("veterinarians"), "list_veterinarians").await
    }

    pub async fn list_service_requests(&self) -> Vec<ServiceRequest> {
        fetch_list(&self.client, "service-requests", Some("requests"), "list_service_requests").await
    }

    pub async fn create_service_request(&self, request: &ServiceRequest) -> ClientResult<ServiceRequest> {
        let result = self.client.post("service-requests", request).await;
        reraise("create_service_request", result.and_then(decode_record))
    }

    pub async fn update_service_request_status(
        &self,
        id: &str,
        status: &str,
    ) -> ClientResult<ServiceRequest> {
        let path = format!("service-requests/{}", id);
        let result = self.client.put(&path, &json!({ "status": status })).await;
        reraise("update_service_request_status", result.and_then(decode_record))
    }

    pub async fn list_request_messages(&self, request_id: &str) -> Vec<Message> {
        let path = format!("service-requests/{}/messages", request_id);
        fetch_list(&self.client, &path, Some("messages"), "list_request_messages").await
    }

    pub async fn send_request_message(&self, request_id: &str, content: &str) -> ClientResult<Message> {
        let path = format!("service-requests/{}/messages", request_id);
        let result = self.client.post(&path, &json!({ "content": content })).await;
        reraise("send_request_message", result.and_then(decode_record))
    }
}

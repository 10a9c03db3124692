// Administration: dashboard, user roles and moderation

use serde_json::json;

use crate::client::api_client::ApiClient;
use crate::client::error::ClientResult;
use crate::client::models::{DashboardStats, Report, UserAccount};
use crate::client::payload::extract_object;

use super::{decode_record, fetch_list, log_failure, reraise};

#[derive(Debug, Clone)]
pub struct AdminService {
    client: ApiClient,
}

impl AdminService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Dashboard counters; empty on any failure
    pub async fn dashboard_stats(&self) -> DashboardStats {
        match self.client.get("dashboard").await {
            Ok(payload) => extract_object(payload),
            Err(e) => {
                log_failure("dashboard_stats", &e);
                DashboardStats::new()
            }
        }
    }

    pub async fn list_users(&self) -> Vec<UserAccount> {
        fetch_list(&self.client, "users", Some("users"), "list_users").await
    }

    pub async fn update_user_role(&self, user_id: &str, role: &str) -> ClientResult<UserAccount> {
        let path = format!("users/{}", user_id);
        let result = self.client.put(&path, &json!({ "role": role })).await;
        reraise("update_user_role", result.and_then(decode_record))
    }

    pub async fn list_reports(&self) -> Vec<Report> {
        fetch_list(&self.client, "reports", Some("reports"), "list_reports").await
    }

    pub async fn delete_post(&self, post_id: &str) -> ClientResult<()> {
        let result = self.client.delete(&format!("posts/{}", post_id)).await;
        reraise("delete_post", result.map(|_| ()))
    }
}

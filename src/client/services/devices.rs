// Monitoring devices and the telemetry they report

use crate::client::api_client::ApiClient;
use crate::client::error::ClientResult;
use crate::client::models::{Device, TelemetryReading};

use super::{decode_record, fetch_list, reraise};

#[derive(Debug, Clone)]
pub struct DeviceService {
    client: ApiClient,
}

impl DeviceService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn list_devices(&self) -> Vec<Device> {
        fetch_list(&self.client, "devices", Some("devices"), "list_devices").await
    }

    pub async fn get_device(&self, id: &str) -> ClientResult<Device> {
        let result = self.client.get(&format!("devices/{}", id)).await;
        reraise("get_device", result.and_then(decode_record))
    }

    pub async fn create_device(&self, device: &Device) -> ClientResult<Device> {
        let result = self.client.post("devices", device).await;
        reraise("create_device", result.and_then(decode_record))
    }

    pub async fn update_device(&self, id: &str, device: &Device) -> ClientResult<Device> {
        let result = self.client.put(&format!("devices/{}", id), device).await;
        reraise("update_device", result.and_then(decode_record))
    }

    pub async fn delete_device(&self, id: &str) -> ClientResult<()> {
        let result = self.client.delete(&format!("devices/{}", id)).await;
        reraise("delete_device", result.map(|_| ()))
    }

    pub async fn list_telemetry(&self, device_id: &str) -> Vec<TelemetryReading> {
        let path = format!("devices/{}/telemetry", device_id);
        fetch_list(&self.client, &path, Some("telemetry"), "list_telemetry").await
    }
}

// Pig records and their vaccination history

use crate::client::api_client::ApiClient;
use crate::client::error::ClientResult;
use crate::client::models::{Pig, Vaccination};

use super::{decode_record, fetch_list, reraise};

#[derive(Debug, Clone)]
pub struct PigService {
    client: ApiClient,
}

impl PigService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn list_pigs(&self) -> Vec<Pig> {
        fetch_list(&self.client, "pigs", Some("pigs"), "list_pigs").await
    }

    pub async fn get_pig(&self, id: &str) -> ClientResult<Pig> {
        let result = self.client.get(&format!("pigs/{}", id)).await;
        reraise("get_pig", result.and_then(decode_record))
    }

    pub async fn create_pig(&self, pig: &Pig) -> ClientResult<Pig> {
        let result = self.client.post("pigs", pig).await;
        reraise("create_pig", result.and_then(decode_record))
    }

    pub async fn update_pig(&self, id: &str, pig: &Pig) -> ClientResult<Pig> {
        let result = self.client.put(&format!("pigs/{}", id), pig).await;
        reraise("update_pig", result.and_then(decode_record))
    }

    pub async fn delete_pig(&self, id: &str) -> ClientResult<()> {
        let result = self.client.delete(&format!("pigs/{}", id)).await;
        reraise("delete_pig", result.map(|_| ()))
    }

    pub async fn list_vaccinations(&self, pig_id: &str) -> Vec<Vaccination> {
        let path = format!("pigs/{}/vaccinations", pig_id);
        fetch_list(&self.client, &path, Some("vaccinations"), "list_vaccinations").await
    }

    pub async fn add_vaccination(
        &self,
        pig_id: &str,
        vaccination: &Vaccination,
    ) -> ClientResult<Vaccination> {
        let path = format!("pigs/{}/vaccinations", pig_id);
        let result = self.client.post(&path, vaccination).await;
        reraise("add_vaccination", result.and_then(decode_record))
    }
}

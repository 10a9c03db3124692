// Community board posts

use serde_json::json;

use crate::client::api_client::ApiClient;
use crate::client::error::ClientResult;
use crate::client::models::{Post, Report};

use super::{decode_record, fetch_list, reraise};

#[derive(Debug, Clone)]
pub struct CommunityService {
    client: ApiClient,
}

impl CommunityService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn list_posts(&self) -> Vec<Post> {
        fetch_list(&self.client, "posts", Some("posts"), "list_posts").await
    }

    pub async fn create_post(&self, post: &Post) -> ClientResult<Post> {
        let result = self.client.post("posts", post).await;
        reraise("create_post", result.and_then(decode_record))
    }

    /// File a moderation report; admins read these from the `reports` collection
    pub async fn report_post(&self, post_id: &str, reason: &str) -> ClientResult<Report> {
        let report = json!({ "post_id": post_id, "reason": reason, "status": "open" });
        let result = self.client.post("reports", &report).await;
        reraise("report_post", result.and_then(decode_record))
    }
}

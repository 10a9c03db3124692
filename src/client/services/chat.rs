// Direct conversations between users

use serde_json::json;

use crate::client::api_client::ApiClient;
use crate::client::error::ClientResult;
use crate::client::models::{Conversation, Message};

use super::{decode_record, fetch_list, reraise};

#[derive(Debug, Clone)]
pub struct ChatService {
    client: ApiClient,
}

impl ChatService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn list_conversations(&self) -> Vec<Conversation> {
        fetch_list(&self.client, "conversations", Some("conversations"), "list_conversations").await
    }

    pub async fn list_messages(&self, conversation_id: &str) -> Vec<Message> {
        let path = format!("conversations/{}/messages", conversation_id);
        fetch_list(&self.client, &path, Some("messages"), "list_messages").await
    }

    pub async fn send_message(&self, conversation_id: &str, content: &str) -> ClientResult<Message> {
        let path = format!("conversations/{}/messages", conversation_id);
        let result = self.client.post(&path, &json!({ "content": content })).await;
        reraise("send_message", result.and_then(decode_record))
    }
}

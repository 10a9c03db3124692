// In-memory store for uploaded file bodies

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::api::{BlobStore, StoredBlob};
use crate::core::errors::ServiceError;

/// File bodies keyed by the id of their metadata document
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, StoredBlob>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, id: &str, blob: StoredBlob) -> Result<(), ServiceError> {
        self.blobs.write().await.insert(id.to_string(), blob);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredBlob>, ServiceError> {
        Ok(self.blobs.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        Ok(self.blobs.write().await.remove(id).is_some())
    }
}

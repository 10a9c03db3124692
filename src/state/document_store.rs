// In-memory document store backing the pass-through resource routes

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::DocumentStore;
use crate::core::errors::ServiceError;

/// Fields the store owns; callers cannot overwrite them
const RESERVED_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Collections of JSON objects keyed by collection name, in insertion order
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Map<String, Value>>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn strip_reserved(fields: &mut Map<String, Value>) {
        for key in RESERVED_FIELDS {
            fields.remove(key);
        }
    }

    fn has_id(doc: &Map<String, Value>, id: &str) -> bool {
        doc.get("id").and_then(Value::as_str) == Some(id)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, ServiceError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, ServiceError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| Self::has_id(d, id)))
            .cloned()
            .map(Value::Object))
    }

    async fn insert(&self, collection: &str, mut fields: Map<String, Value>) -> Result<Value, ServiceError> {
        Self::strip_reserved(&mut fields);
        let now = Value::String(Utc::now().to_rfc3339());
        fields.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        fields.insert("created_at".to_string(), now.clone());
        fields.insert("updated_at".to_string(), now);

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(fields.clone());

        Ok(Value::Object(fields))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        mut fields: Map<String, Value>,
    ) -> Result<Option<Value>, ServiceError> {
        Self::strip_reserved(&mut fields);

        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| Self::has_id(d, id)))
        else {
            return Ok(None);
        };

        doc.extend(fields);
        doc.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));
        Ok(Some(Value::Object(doc.clone())))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, ServiceError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };

        let before = docs.len();
        docs.retain(|d| !Self::has_id(d, id));
        Ok(docs.len() != before)
    }

    async fn collections(&self) -> Result<Vec<String>, ServiceError> {
        let collections = self.collections.read().await;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::filter::ListQuery;

/// Fields owned by the store; never accepted from request bodies
pub const SYSTEM_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

/// Errors from a DocumentStore
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A stored JSON document with store-assigned metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub body: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Wire format: body fields plus `id`, `createdAt`, `updatedAt`
    pub fn to_json(&self) -> Value {
        let mut obj = self.body.clone();
        obj.insert("id".into(), Value::String(self.id.to_string()));
        obj.insert(
            "createdAt".into(),
            Value::String(self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        obj.insert(
            "updatedAt".into(),
            Value::String(self.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        Value::Object(obj)
    }
}

/// One page of a list query
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Document>,
    /// Matching documents across all pages
    pub total: u64,
}

/// Drop store-owned keys from a client supplied body
pub fn strip_system_fields(body: &mut Map<String, Value>) {
    for field in SYSTEM_FIELDS {
        body.remove(*field);
    }
}

/// Document database collaborator. Collections are created on first write.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Cheap connectivity check used by /health
    async fn ping(&self) -> Result<(), StoreError>;

    /// Newest first, filtered by `query.predicates`
    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Page, StoreError>;

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError>;

    async fn insert(&self, collection: &str, body: Map<String, Value>) -> Result<Document, StoreError>;

    /// Shallow merge of `patch` into the stored body
    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<Option<Document>, StoreError>;

    /// `true` if a document was removed
    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError>;
}

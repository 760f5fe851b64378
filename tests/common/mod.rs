#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use bizops_api::config::AppConfig;
use bizops_api::database::{Document, DocumentStore, MemoryStore, Page, PgDocumentStore, StoreError};
use bizops_api::filter::ListQuery;
use bizops_api::{app, AppState};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub config: AppConfig,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serve the router in-process on a free port, backed by `store`
pub async fn spawn_with(store: Arc<dyn DocumentStore>) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);
    let config = AppConfig::development();

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind {}", port))?;
    let router = app(AppState::new(config.clone(), store));
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    Ok(TestServer { port, base_url, client, config })
}

pub async fn spawn() -> Result<TestServer> {
    spawn_with(Arc::new(MemoryStore::new())).await
}

/// Serve against the Postgres store at `DATABASE_URL`. `None` when the
/// variable is unset so the suite still runs without a database.
pub async fn spawn_postgres() -> Result<Option<TestServer>> {
    let _ = dotenvy::dotenv();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres tests");
        return Ok(None);
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&url)
        .await
        .context("failed to connect to DATABASE_URL")?;
    let store = PgDocumentStore::new(pool);
    store.ensure_schema().await?;

    spawn_with(Arc::new(store)).await.map(Some)
}

/// Store whose every call fails, standing in for an unreachable database
pub struct FailingStore;

fn down() -> StoreError {
    StoreError::ConfigMissing("DATABASE_URL")
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Err(down())
    }

    async fn list(&self, _collection: &str, _query: &ListQuery) -> Result<Page, StoreError> {
        Err(down())
    }

    async fn get(&self, _collection: &str, _id: Uuid) -> Result<Option<Document>, StoreError> {
        Err(down())
    }

    async fn insert(&self, _collection: &str, _body: Map<String, Value>) -> Result<Document, StoreError> {
        Err(down())
    }

    async fn update(
        &self,
        _collection: &str,
        _id: Uuid,
        _patch: Map<String, Value>,
    ) -> Result<Option<Document>, StoreError> {
        Err(down())
    }

    async fn delete(&self, _collection: &str, _id: Uuid) -> Result<bool, StoreError> {
        Err(down())
    }
}

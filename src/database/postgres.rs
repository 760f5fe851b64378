use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::filter::{ListQuery, Predicate};

use super::store::{Document, DocumentStore, Page, StoreError};

const CREATE_DOCUMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id UUID NOT NULL,
    body JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (collection, id)
)"#;

const CREATE_DOCUMENTS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS documents_collection_created ON documents (collection, created_at DESC)";

const COLUMNS: &str = "id, body, created_at, updated_at";

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    body: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            body: row.body.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Documents held as JSONB rows in a single `documents` table
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the backing table if it does not exist
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_DOCUMENTS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_DOCUMENTS_INDEX).execute(&self.pool).await?;
        info!("Document table ready");
        Ok(())
    }
}

/// `<select> FROM documents WHERE collection = $1 AND <predicates>`
fn filtered<'a>(select: &str, collection: &'a str, predicates: &'a [Predicate]) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(select);
    qb.push(" FROM documents WHERE collection = ");
    qb.push_bind(collection);
    for predicate in predicates {
        qb.push(" AND ");
        push_predicate(&mut qb, predicate);
    }
    qb
}

fn push_predicate<'a>(qb: &mut QueryBuilder<'a, Postgres>, predicate: &'a Predicate) {
    match predicate {
        Predicate::Equals { field, value } => {
            qb.push("body ->> ");
            qb.push_bind(field.as_str());
            qb.push(" = ");
            qb.push_bind(value.as_str());
        }
        Predicate::Contains { fields, needle } => {
            if fields.is_empty() {
                qb.push("FALSE");
                return;
            }
            let pattern = format!("%{}%", escape_like(needle));
            qb.push("(");
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push("COALESCE(body ->> ");
                qb.push_bind(field.as_str());
                qb.push(", '') ILIKE ");
                qb.push_bind(pattern.clone());
            }
            qb.push(")");
        }
        Predicate::AtMostField { field, bound } => {
            // Casts only run once both values are known to be JSON numbers
            qb.push("CASE WHEN jsonb_typeof(body -> ");
            qb.push_bind(field.as_str());
            qb.push(") = 'number' AND jsonb_typeof(body -> ");
            qb.push_bind(bound.as_str());
            qb.push(") = 'number' THEN (body ->> ");
            qb.push_bind(field.as_str());
            qb.push(")::numeric <= (body ->> ");
            qb.push_bind(bound.as_str());
            qb.push(")::numeric ELSE FALSE END");
        }
    }
}

/// Escape ILIKE wildcards so the needle matches literally
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Page, StoreError> {
        let total: i64 = filtered("SELECT COUNT(*)", collection, &query.predicates)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = filtered(&format!("SELECT {}", COLUMNS), collection, &query.predicates);
        qb.push(" ORDER BY created_at DESC, id LIMIT ");
        qb.push_bind(i64::from(query.limit));
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(query.offset).unwrap_or(i64::MAX));

        let rows = qb.build_query_as::<DocumentRow>().fetch_all(&self.pool).await?;

        Ok(Page {
            items: rows.into_iter().map(Document::from).collect(),
            total: total.max(0) as u64,
        })
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let sql = format!("SELECT {} FROM documents WHERE collection = $1 AND id = $2", COLUMNS);
        let row: Option<DocumentRow> = sqlx::query_as(&sql)
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Document::from))
    }

    async fn insert(&self, collection: &str, body: Map<String, Value>) -> Result<Document, StoreError> {
        let sql = format!(
            "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3) RETURNING {}",
            COLUMNS
        );
        let row: DocumentRow = sqlx::query_as(&sql)
            .bind(collection)
            .bind(Uuid::new_v4())
            .bind(Json(body))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<Option<Document>, StoreError> {
        let sql = format!(
            "UPDATE documents SET body = body || $3, updated_at = now() \
             WHERE collection = $1 AND id = $2 RETURNING {}",
            COLUMNS
        );
        let row: Option<DocumentRow> = sqlx::query_as(&sql)
            .bind(collection)
            .bind(id)
            .bind(Json(patch))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Document::from))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use std::time::Duration;

use crate::db::models::Identity;
use crate::db::IdentityStore;
use crate::error::DatabaseError;

/// Postgres-backed identity store. Expects a table of the form
///
/// ```sql
/// CREATE TABLE identities (
///     id            TEXT PRIMARY KEY,
///     email         TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     revision      BIGINT NOT NULL DEFAULT 0,
///     attributes    JSONB NOT NULL DEFAULT '{}'
/// );
/// ```
pub struct PgIdentityStore {
    pool: Arc<PgPool>,
}

#[derive(Debug, FromRow)]
struct IdentityRow {
    id: String,
    email: String,
    password_hash: String,
    revision: i64,
    attributes: Json<Map<String, Value>>,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Identity {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            revision: row.revision,
            attributes: row.attributes.0,
        }
    }
}

const SELECT_IDENTITY: &str =
    "SELECT id, email, password_hash, revision, attributes FROM identities";

impl PgIdentityStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        Ok(Self::new(Arc::new(pool)))
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DatabaseError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!("{} WHERE email = $1", SELECT_IDENTITY))
            .bind(email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Identity::from))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, DatabaseError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!("{} WHERE id = $1", SELECT_IDENTITY))
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Identity::from))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::resume::StoredResume;

/// Generic document storage. The pipeline only talks to this contract.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Saves the user's resume, replacing any previous one.
    async fn persist(&self, user_id: Uuid, document: &Value) -> Result<StoredResume>;

    /// Loads by id, optionally scoped to an owner.
    async fn load(&self, id: Uuid, user_id: Option<Uuid>) -> Result<Option<StoredResume>>;

    async fn update(&self, id: Uuid, document: &Value) -> Result<StoredResume>;
}

pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn persist(&self, user_id: Uuid, document: &Value) -> Result<StoredResume> {
        // One resume per user: a re-import overwrites the previous document.
        let row = sqlx::query_as::<_, StoredResume>(
            r#"
            INSERT INTO resumes (id, user_id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
                SET data = EXCLUDED.data, updated_at = NOW()
            RETURNING id, user_id, data, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(document)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn load(&self, id: Uuid, user_id: Option<Uuid>) -> Result<Option<StoredResume>> {
        let row = sqlx::query_as::<_, StoredResume>(
            r#"
            SELECT id, user_id, data, created_at, updated_at
            FROM resumes
            WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, document: &Value) -> Result<StoredResume> {
        let row = sqlx::query_as::<_, StoredResume>(
            r#"
            UPDATE resumes SET data = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, data, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(document)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

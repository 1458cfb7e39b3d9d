use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use super::{ModelError, SnippetModel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

/// Maximum number of snippets on the home page
pub const LATEST_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct PgSnippetModel {
    pool: PgPool,
}

impl PgSnippetModel {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnippetModel for PgSnippetModel {
    async fn insert(&self, title: &str, content: &str, expires_days: i32) -> Result<i64, ModelError> {
        let created = Utc::now();
        let expires = created + Duration::days(i64::from(expires_days));

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO snippets (title, content, created, expires)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(created)
        .bind(expires)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Snippet, ModelError> {
        sqlx::query_as::<_, Snippet>(
            r#"
            SELECT id, title, content, created, expires
            FROM snippets
            WHERE expires > now() AND id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ModelError::NotFound)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, ModelError> {
        let snippets = sqlx::query_as::<_, Snippet>(
            r#"
            SELECT id, title, content, created, expires
            FROM snippets
            WHERE expires > now()
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(LATEST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(snippets)
    }
}

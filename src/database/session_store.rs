// database/session_store.rs - PostgreSQL backing store for tower-sessions
//
// Records are stored whole as JSON in `sessions.data`; `expiry` mirrors the
// record's expiry date so expired rows are never loaded.

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tower_sessions::{
    session::{Id, Record},
    session_store, SessionStore,
};

#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Remove rows past their expiry; returns how many were deleted
    pub async fn delete_expired(&self) -> session_store::Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expiry < $1")
            .bind(OffsetDateTime::now_utc())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected())
    }
}

fn backend(err: sqlx::Error) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let data = serde_json::to_vec(record)
            .map_err(|e| session_store::Error::Encode(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, data, expiry)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET data = excluded.data, expiry = excluded.expiry
            "#,
        )
        .bind(record.id.to_string())
        .bind(data)
        .bind(record.expiry_date)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let data: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT data FROM sessions WHERE id = $1 AND expiry > $2")
                .bind(session_id.to_string())
                .bind(OffsetDateTime::now_utc())
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;

        data.map(|bytes| {
            serde_json::from_slice(&bytes)
                .map_err(|e| session_store::Error::Decode(e.to_string()))
        })
        .transpose()
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

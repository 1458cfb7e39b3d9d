use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::{password, ModelError, UserModel};

/// Name of the unique constraint on users.email
const EMAIL_CONSTRAINT: &str = "users_uc_email";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PgUserModel {
    pool: PgPool,
    cost: u32,
    /// Verified against when the email is unknown, so both failure paths cost
    /// one bcrypt comparison.
    dummy_hash: String,
}

impl PgUserModel {
    pub async fn new(pool: PgPool, cost: u32) -> Result<Self, ModelError> {
        let dummy_hash = password::hash("snippetbox-timing-equaliser", cost).await?;
        Ok(Self {
            pool,
            cost,
            dummy_hash,
        })
    }
}

fn is_duplicate_email(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(EMAIL_CONSTRAINT)
        }
        _ => false,
    }
}

#[async_trait]
impl UserModel for PgUserModel {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), ModelError> {
        let hashed = password::hash(password, self.cost).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, hashed_password, created)
            VALUES ($1, $2, $3, now())
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(&hashed)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_email(&e) => Err(ModelError::DuplicateEmail),
            Err(e) => Err(e.into()),
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, ModelError> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, hashed_password FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((id, hashed)) => {
                if password::verify(password, &hashed).await? {
                    Ok(id)
                } else {
                    Err(ModelError::InvalidCredentials)
                }
            }
            None => {
                password::verify(password, &self.dummy_hash).await?;
                Err(ModelError::InvalidCredentials)
            }
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, ModelError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT true FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn get(&self, id: i64) -> Result<User, ModelError> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, hashed_password, created FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ModelError::NotFound)
    }

    async fn compare_and_update_password(
        &self,
        id: i64,
        current: &str,
        new: &str,
    ) -> Result<(), ModelError> {
        let stored: String = sqlx::query_scalar("SELECT hashed_password FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ModelError::NotFound)?;

        if !password::verify(current, &stored).await? {
            return Err(ModelError::InvalidCredentials);
        }

        let hashed = password::hash(new, self.cost).await?;
        sqlx::query("UPDATE users SET hashed_password = $1 WHERE id = $2")
            .bind(&hashed)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

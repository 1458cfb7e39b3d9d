pub mod password;
pub mod snippet;
pub mod user;

use async_trait::async_trait;
use thiserror::Error;

pub use snippet::{PgSnippetModel, Snippet};
pub use user::{PgUserModel, User};

/// Errors surfaced by the data models. Handlers match on the first three
/// and treat everything else as a server error.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("models: no matching record found")]
    NotFound,

    #[error("models: invalid credentials")]
    InvalidCredentials,

    #[error("models: duplicate email")]
    DuplicateEmail,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Snippet persistence
#[async_trait]
pub trait SnippetModel: Send + Sync {
    /// Store a new snippet expiring `expires_days` days from now; returns its id
    async fn insert(&self, title: &str, content: &str, expires_days: i32) -> Result<i64, ModelError>;

    /// Fetch an unexpired snippet, `NotFound` otherwise
    async fn get(&self, id: i64) -> Result<Snippet, ModelError>;

    /// Ten most recent unexpired snippets, newest first
    async fn latest(&self) -> Result<Vec<Snippet>, ModelError>;
}

/// User persistence and credential checks
#[async_trait]
pub trait UserModel: Send + Sync {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), ModelError>;

    /// Returns the user id when `email` and `password` match a stored user.
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, ModelError>;

    async fn exists(&self, id: i64) -> Result<bool, ModelError>;

    async fn get(&self, id: i64) -> Result<User, ModelError>;

    /// Replace the password hash after verifying `current`
    async fn compare_and_update_password(
        &self,
        id: i64,
        current: &str,
        new: &str,
    ) -> Result<(), ModelError>;
}

pub mod manager;
pub mod models;
pub mod session_store;

pub use manager::DatabaseError;
pub use models::{ModelError, Snippet, SnippetModel, User, UserModel};
pub use session_store::PgSessionStore;

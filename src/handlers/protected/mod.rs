// handlers/protected/mod.rs - Protected handlers (login required)
//
// Security Level: authenticated session required
// Middleware: session → csrf_protect → authenticate → require_authentication
//
// The gate guarantees `page.auth.user_id` is set by the time these run.

pub mod account; // account page and password change
pub mod snippet; // snippet creation
pub mod user;    // logout

pub use account::{account_password_update, account_password_update_post, account_view};
pub use snippet::{snippet_create, snippet_create_post};
pub use user::user_logout_post;

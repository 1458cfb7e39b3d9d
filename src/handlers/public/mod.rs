// handlers/public/mod.rs - Public handlers (no login required)
//
// Security Level: session-backed, CSRF-checked, auth flag available
// Middleware: session → csrf_protect → authenticate

pub mod home;    // GET / and GET /about
pub mod snippet; // GET /snippet/view/:id
pub mod user;    // signup and login

pub use home::{about, home};
pub use snippet::snippet_view;
pub use user::{user_login, user_login_post, user_signup, user_signup_post};

pub mod auth;
pub mod csrf;
pub mod headers;
pub mod logging;
pub mod recover;

pub use auth::{authenticate, require_authentication, AuthContext};
pub use csrf::{csrf_protect, CsrfToken};
pub use headers::secure_headers;
pub use logging::make_request_span;
pub use recover::{handle_panic, surface_error_detail};

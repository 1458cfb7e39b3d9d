// session.rs - Session keys and the session manager layer

use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer, SessionStore};

use crate::config::SessionConfig;

/// Id of the logged-in user
pub const AUTHENTICATED_USER_ID: &str = "authenticatedUserID";
/// One-shot message shown on the next rendered page
pub const FLASH: &str = "flash";
/// Path to return to once login succeeds
pub const REDIRECT_PATH_AFTER_LOGIN: &str = "redirectPathAfterLogin";
pub const CSRF_TOKEN: &str = "csrfToken";

pub const COOKIE_NAME: &str = "session";

/// Cookie-token session layer over `store`
pub fn session_layer<S>(store: S, config: &SessionConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(COOKIE_NAME)
        .with_secure(config.cookie_secure)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(config.lifetime_hours)))
}

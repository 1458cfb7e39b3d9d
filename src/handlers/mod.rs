// handlers/mod.rs - Route handlers in two security tiers
//
// Public (session, CSRF and auth flag available) → Protected (login required).
// Handlers decode and validate input, call one model operation, then render
// a page or redirect.

pub mod protected;
pub mod public;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Form,
};
use serde::de::DeserializeOwned;
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::{AuthContext, CsrfToken};
use crate::session::FLASH;
use crate::templates::TemplateData;

/// GET /ping - liveness probe
pub async fn ping() -> &'static str {
    "OK"
}

/// Fallback for unmatched routes
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Per-request values every page needs: the session, the auth flag and the
/// CSRF token for forms.
pub struct PageContext {
    pub session: Session,
    pub auth: AuthContext,
    pub csrf: CsrfToken,
}

#[async_trait]
impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::internal_server_error("session layer is not installed"))?;
        let auth = AuthContext::from_request_parts(parts, state)
            .await
            .unwrap_or_default();
        let csrf = CsrfToken::from_request_parts(parts, state).await?;

        Ok(Self { session, auth, csrf })
    }
}

impl PageContext {
    /// Base template data; consumes any pending flash message
    pub async fn template_data(&self) -> Result<TemplateData, AppError> {
        let mut data = TemplateData::new();
        data.flash = self.session.remove::<String>(FLASH).await?;
        data.is_authenticated = self.auth.is_authenticated();
        data.csrf_token = self.csrf.0.clone();
        Ok(data)
    }

    pub async fn flash(&self, message: &str) -> Result<(), AppError> {
        self.session.insert(FLASH, message).await?;
        Ok(())
    }
}

/// URL-encoded form body. A body that does not decode into `T` is a client
/// error (400), not a validation failure.
pub struct PostForm<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for PostForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}

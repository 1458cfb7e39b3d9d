// middleware/csrf.rs - Anti-forgery tokens for state-changing requests
//
// Every session carries one random token. Forms embed it in a hidden `csrf`
// field; mutating requests must echo it back (field or X-CSRF-Token header)
// or they are rejected before reaching the handler.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use tower_sessions::Session;

use crate::error::AppError;
use crate::session::CSRF_TOKEN;
use crate::state::AppState;

pub const FORM_FIELD: &str = "csrf";
pub const HEADER_NAME: &str = "x-csrf-token";

const TOKEN_BYTES: usize = 32;

/// The current session's anti-forgery token, for embedding in forms
#[derive(Clone, Debug)]
pub struct CsrfToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CsrfToken>()
            .cloned()
            .ok_or_else(|| AppError::internal_server_error("csrf_protect middleware is not installed"))
    }
}

pub async fn csrf_protect(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match session.get::<String>(CSRF_TOKEN).await? {
        Some(token) => token,
        None => {
            let token = generate_token();
            session.insert(CSRF_TOKEN, &token).await?;
            token
        }
    };

    let mut request = if is_state_changing(request.method()) {
        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, state.config.server.max_request_size_bytes)
            .await
            .map_err(|e| AppError::bad_request(format!("unreadable request body: {e}")))?;

        let submitted = submitted_token(&parts.headers, &bytes);
        if !submitted.is_some_and(|s| tokens_match(&s, &token)) {
            tracing::warn!(method = %parts.method, uri = %parts.uri, "CSRF token missing or incorrect");
            return Err(AppError::bad_request("CSRF token missing or incorrect"));
        }

        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    request.extensions_mut().insert(CsrfToken(token));
    Ok(next.run(request).await)
}

fn is_state_changing(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Header wins over the form field when both are present
fn submitted_token(headers: &HeaderMap, body: &[u8]) -> Option<String> {
    if let Some(value) = headers.get(HEADER_NAME).and_then(|v| v.to_str().ok()) {
        return Some(value.to_string());
    }
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == FORM_FIELD)
        .map(|(_, value)| value.into_owned())
}

/// Constant-time comparison
fn tokens_match(submitted: &str, expected: &str) -> bool {
    submitted.len() == expected.len()
        && submitted
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

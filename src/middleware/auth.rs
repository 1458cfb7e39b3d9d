use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::session::{AUTHENTICATED_USER_ID, REDIRECT_PATH_AFTER_LOGIN};
use crate::state::AppState;

/// Authentication state of the current request, set by [`authenticate`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Option<i64>,
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Reads the value inserted by [`authenticate`]; a request that never went
/// through it is unauthenticated.
#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<AuthContext>().copied().unwrap_or_default())
    }
}

/// Middleware that resolves the session's user id against the user store.
/// Ids of users that no longer exist are dropped from the session.
pub async fn authenticate(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let mut auth = AuthContext::default();

    if let Some(id) = session.get::<i64>(AUTHENTICATED_USER_ID).await? {
        if state.users.exists(id).await? {
            auth.user_id = Some(id);
        } else {
            tracing::warn!(user_id = id, "session refers to a user that no longer exists");
            session.remove::<i64>(AUTHENTICATED_USER_ID).await?;
        }
    }

    request.extensions_mut().insert(auth);
    let mut response = next.run(request).await;

    // Pages behind a login must not be served from shared caches
    if auth.is_authenticated() {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    Ok(response)
}

/// Middleware gate for protected routes: anonymous users go to the login page,
/// remembering where they were headed.
pub async fn require_authentication(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth = request
        .extensions()
        .get::<AuthContext>()
        .copied()
        .unwrap_or_default();

    if !auth.is_authenticated() {
        if request.method() == Method::GET {
            let path = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            session.insert(REDIRECT_PATH_AFTER_LOGIN, path).await?;
        }
        return Ok(Redirect::to("/user/login").into_response());
    }

    Ok(next.run(request).await)
}

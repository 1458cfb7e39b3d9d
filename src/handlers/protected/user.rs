use axum::response::{IntoResponse, Redirect, Response};

use crate::error::AppError;
use crate::handlers::PageContext;
use crate::session::AUTHENTICATED_USER_ID;

/// POST /user/logout - rotate the session id and forget the user
pub async fn user_logout_post(page: PageContext) -> Result<Response, AppError> {
    page.session.cycle_id().await?;
    page.session.remove::<i64>(AUTHENTICATED_USER_ID).await?;
    page.flash("You've been logged out successfully!").await?;

    tracing::info!(user_id = ?page.auth.user_id, "user logged out");
    Ok(Redirect::to("/").into_response())
}

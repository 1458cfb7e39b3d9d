use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::error::AppError;
use crate::handlers::PageContext;
use crate::state::AppState;

/// GET /snippet/view/:id - a single snippet, 404 for missing, expired or
/// malformed ids
pub async fn snippet_view(
    State(state): State<AppState>,
    page: PageContext,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id).ok_or(AppError::NotFound)?;
    let snippet = state.snippets.get(id).await?;

    let mut data = page.template_data().await?;
    data.snippet = Some(snippet);
    state.render(StatusCode::OK, "view.html", &data)
}

/// Positive integer ids only
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id >= 1)
}

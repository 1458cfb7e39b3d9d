use axum::{extract::State, http::StatusCode, response::Response};

use crate::error::AppError;
use crate::handlers::PageContext;
use crate::state::AppState;

/// GET / - latest unexpired snippets
pub async fn home(State(state): State<AppState>, page: PageContext) -> Result<Response, AppError> {
    let snippets = state.snippets.latest().await?;

    let mut data = page.template_data().await?;
    data.snippets = snippets;
    state.render(StatusCode::OK, "home.html", &data)
}

/// GET /about
pub async fn about(State(state): State<AppState>, page: PageContext) -> Result<Response, AppError> {
    let data = page.template_data().await?;
    state.render(StatusCode::OK, "about.html", &data)
}

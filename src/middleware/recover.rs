use std::any::Any;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ServerErrorDetail;
use crate::state::AppState;

/// Response for a handler panic caught by `CatchPanicLayer`
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "handler panicked");

    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Internal Server Error\n",
    )
        .into_response();
    // the connection may be in an unknown state
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

/// In debug mode, replace generic 500 bodies with the recorded error and trace
pub async fn surface_error_detail(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.config.server.debug {
        return response;
    }

    match response.extensions().get::<ServerErrorDetail>().cloned() {
        Some(ServerErrorDetail(detail)) => (
            response.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            detail,
        )
            .into_response(),
        None => response,
    }
}

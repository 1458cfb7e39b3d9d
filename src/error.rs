// HTTP error types for the web layer
use std::backtrace::Backtrace;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::database::{DatabaseError, ModelError};
use crate::templates::TemplateError;

/// Error detail attached to 500 responses. The debug middleware swaps it into
/// the body; otherwise it never leaves the server.
#[derive(Clone, Debug)]
pub struct ServerErrorDetail(pub String);

/// Errors a handler can bail out with
#[derive(Debug)]
pub enum AppError {
    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound,

    // 500 Internal Server Error
    InternalServerError { message: String, trace: String },
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe message: only the status text, never internal detail
    pub fn message(&self) -> &'static str {
        self.status_code().canonical_reason().unwrap_or("Error")
    }
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    /// Wrap an unexpected failure, capturing where it was raised
    pub fn internal_server_error(message: impl std::fmt::Display) -> Self {
        AppError::InternalServerError {
            message: message.to_string(),
            trace: Backtrace::force_capture().to_string(),
        }
    }
}

// Convert other error types to AppError
impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NotFound => AppError::NotFound,
            other => AppError::internal_server_error(other),
        }
    }
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        AppError::internal_server_error(err)
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        AppError::internal_server_error(format!("session: {err}"))
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::internal_server_error(err)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest(detail) => write!(f, "bad request: {detail}"),
            AppError::NotFound => write!(f, "not found"),
            AppError::InternalServerError { message, .. } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.message();

        match self {
            AppError::InternalServerError { message, trace } => {
                tracing::error!(error = %message, "server error\n{trace}");
                let mut response = plain(status, body);
                response
                    .extensions_mut()
                    .insert(ServerErrorDetail(format!("{message}\n{trace}")));
                response
            }
            AppError::BadRequest(detail) => {
                tracing::debug!("client error: {detail}");
                plain(status, body)
            }
            AppError::NotFound => plain(status, body),
        }
    }
}

fn plain(status: StatusCode, body: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("{body}\n"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_map_to_statuses() {
        assert_eq!(AppError::from(ModelError::NotFound).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(ModelError::InvalidCredentials).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_error_body_hides_detail() {
        let response = AppError::internal_server_error("connection refused").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<ServerErrorDetail>().unwrap();
        assert!(detail.0.starts_with("connection refused"));
    }

    #[test]
    fn client_message_is_status_text() {
        assert_eq!(AppError::bad_request("csrf").message(), "Bad Request");
        assert_eq!(AppError::NotFound.message(), "Not Found");
    }
}

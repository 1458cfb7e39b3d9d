use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::config::AppConfig;
use crate::database::{SnippetModel, UserModel};
use crate::error::AppError;
use crate::templates::{TemplateCache, TemplateData};

/// Application context shared by every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub snippets: Arc<dyn SnippetModel>,
    pub users: Arc<dyn UserModel>,
    pub templates: Arc<TemplateCache>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        snippets: Arc<dyn SnippetModel>,
        users: Arc<dyn UserModel>,
        templates: TemplateCache,
        config: AppConfig,
    ) -> Self {
        Self {
            snippets,
            users,
            templates: Arc::new(templates),
            config: Arc::new(config),
        }
    }

    /// Render a cached page with the given status
    pub fn render(
        &self,
        status: StatusCode,
        page: &str,
        data: &TemplateData,
    ) -> Result<Response, AppError> {
        let body = self.templates.render(page, data)?;
        Ok((status, Html(body)).into_response())
    }
}

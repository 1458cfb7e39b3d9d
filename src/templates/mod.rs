// templates/mod.rs - Page templates compiled once at startup
//
// Every page extends ui/html/base.html and includes the nav partial. Sources
// are embedded in the binary so the cache never touches the filesystem.

use chrono::{DateTime, Datelike, Utc};
use minijinja::{Environment, ErrorKind, UndefinedBehavior, Value};
use serde::Serialize;
use thiserror::Error;

use crate::database::{Snippet, User};

const LAYOUTS: &[(&str, &str)] = &[
    ("base.html", include_str!("../../ui/html/base.html")),
    ("partials/nav.html", include_str!("../../ui/html/partials/nav.html")),
];

const PAGES: &[(&str, &str)] = &[
    ("home.html", include_str!("../../ui/html/pages/home.html")),
    ("about.html", include_str!("../../ui/html/pages/about.html")),
    ("view.html", include_str!("../../ui/html/pages/view.html")),
    ("create.html", include_str!("../../ui/html/pages/create.html")),
    ("signup.html", include_str!("../../ui/html/pages/signup.html")),
    ("login.html", include_str!("../../ui/html/pages/login.html")),
    ("account.html", include_str!("../../ui/html/pages/account.html")),
    ("password.html", include_str!("../../ui/html/pages/password.html")),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("the template {0} does not exist")]
    UnknownPage(String),

    #[error(transparent)]
    Render(#[from] minijinja::Error),
}

/// Dynamic data handed to every page
#[derive(Debug, Default, Serialize)]
pub struct TemplateData {
    pub current_year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub csrf_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<Snippet>,
    pub snippets: Vec<Snippet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<Value>,
}

impl TemplateData {
    pub fn new() -> Self {
        Self {
            current_year: Utc::now().year(),
            ..Self::default()
        }
    }

    pub fn with_form<F: Serialize>(mut self, form: &F) -> Self {
        self.form = Some(Value::from_serialize(form));
        self
    }
}

/// Compiled templates keyed by page name
pub struct TemplateCache {
    env: Environment<'static>,
}

impl TemplateCache {
    pub fn new() -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        // pages probe optional data such as form.validator.field_errors.title
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.add_filter("human_date", human_date);

        for &(name, source) in LAYOUTS.iter().chain(PAGES) {
            env.add_template(name, source)?;
        }

        Ok(Self { env })
    }

    pub fn pages(&self) -> impl Iterator<Item = &'static str> {
        PAGES.iter().map(|(name, _)| *name)
    }

    /// Render `page` fully into memory so a failure never produces a partial body
    pub fn render(&self, page: &str, data: &TemplateData) -> Result<String, TemplateError> {
        if !PAGES.iter().any(|(name, _)| *name == page) {
            return Err(TemplateError::UnknownPage(page.to_string()));
        }
        let template = self.env.get_template(page)?;
        Ok(template.render(data)?)
    }
}

/// Template filter: RFC 3339 timestamp to "02 Jan 2006 at 15:04" in UTC.
/// Empty input renders as an empty string.
fn human_date(value: String) -> Result<String, minijinja::Error> {
    if value.is_empty() {
        return Ok(String::new());
    }
    let parsed = DateTime::parse_from_rfc3339(&value).map_err(|e| {
        minijinja::Error::new(ErrorKind::InvalidOperation, format!("not a timestamp: {e}"))
    })?;
    Ok(parsed.with_timezone(&Utc).format("%d %b %Y at %H:%M").to_string())
}

// testing/mod.rs - In-memory models and an HTTP client for handler tests
//
// The app is driven through `tower::ServiceExt::oneshot` with a
// `MemoryStore` session store, so no database or socket is needed.


use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use crate::config::AppConfig;
use crate::database::{ModelError, Snippet, SnippetModel, User, UserModel};
use crate::routes::routes;
use crate::state::AppState;
use crate::templates::TemplateCache;

pub const MOCK_SNIPPET_TITLE: &str = "An old silent pond";
pub const MOCK_USER_EMAIL: &str = "bob@example.com";
pub const MOCK_USER_PASSWORD: &str = "password";
pub const TAKEN_EMAIL: &str = "dupe@example.com";

fn mock_snippet() -> Snippet {
    let created = Utc.with_ymd_and_hms(2022, 1, 1, 10, 0, 0).unwrap();
    Snippet {
        id: 1,
        title: MOCK_SNIPPET_TITLE.to_string(),
        content: "An old silent pond...".to_string(),
        created,
        expires: created + Duration::days(365 * 100),
    }
}

pub struct MockSnippetModel {
    snippets: Mutex<Vec<Snippet>>,
}

impl MockSnippetModel {
    pub fn new() -> Self {
        Self {
            snippets: Mutex::new(vec![mock_snippet()]),
        }
    }

    pub fn count(&self) -> usize {
        self.snippets.lock().unwrap().len()
    }
}

#[async_trait]
impl SnippetModel for MockSnippetModel {
    async fn insert(&self, title: &str, content: &str, expires_days: i32) -> Result<i64, ModelError> {
        let mut snippets = self.snippets.lock().unwrap();
        let id = snippets.len() as i64 + 1;
        let created = Utc::now();
        snippets.push(Snippet {
            id,
            title: title.to_string(),
            content: content.to_string(),
            created,
            expires: created + Duration::days(i64::from(expires_days)),
        });
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Snippet, ModelError> {
        self.snippets
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(ModelError::NotFound)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, ModelError> {
        let mut snippets = self.snippets.lock().unwrap().clone();
        snippets.reverse();
        snippets.truncate(10);
        Ok(snippets)
    }
}

#[derive(Clone)]
struct MockUser {
    id: i64,
    name: String,
    email: String,
    // stored in the clear; the mock never hashes
    password: String,
}

pub struct MockUserModel {
    users: Mutex<Vec<MockUser>>,
}

impl MockUserModel {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(vec![MockUser {
                id: 1,
                name: "Bob".to_string(),
                email: MOCK_USER_EMAIL.to_string(),
                password: MOCK_USER_PASSWORD.to_string(),
            }]),
        }
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn password_of(&self, id: i64) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.password.clone())
    }

    pub fn remove(&self, id: i64) {
        self.users.lock().unwrap().retain(|u| u.id != id);
    }
}

#[async_trait]
impl UserModel for MockUserModel {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), ModelError> {
        let mut users = self.users.lock().unwrap();
        if email == TAKEN_EMAIL || users.iter().any(|u| u.email == email) {
            return Err(ModelError::DuplicateEmail);
        }
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        users.push(MockUser {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, ModelError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email && u.password == password)
            .map(|u| u.id)
            .ok_or(ModelError::InvalidCredentials)
    }

    async fn exists(&self, id: i64) -> Result<bool, ModelError> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.id == id))
    }

    async fn get(&self, id: i64) -> Result<User, ModelError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .map(|u| User {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                hashed_password: u.password.clone(),
                created: Utc.with_ymd_and_hms(2022, 1, 1, 10, 0, 0).unwrap(),
            })
            .ok_or(ModelError::NotFound)
    }

    async fn compare_and_update_password(
        &self,
        id: i64,
        current: &str,
        new: &str,
    ) -> Result<(), ModelError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(ModelError::NotFound)?;
        if user.password != current {
            return Err(ModelError::InvalidCredentials);
        }
        user.password = new.to_string();
        Ok(())
    }
}

/// Router wired to fresh mocks, plus handles on the mocks for assertions
pub struct TestApp {
    pub router: Router,
    pub snippets: Arc<MockSnippetModel>,
    pub users: Arc<MockUserModel>,
}

pub fn test_app() -> TestApp {
    test_app_with(AppConfig::for_tests())
}

pub fn test_app_with(config: AppConfig) -> TestApp {
    let snippets = Arc::new(MockSnippetModel::new());
    let users = Arc::new(MockUserModel::new());
    let state = AppState::new(
        snippets.clone(),
        users.clone(),
        TemplateCache::new().unwrap(),
        config,
    );

    TestApp {
        router: routes(state, MemoryStore::default()),
        snippets,
        users,
    }
}

/// State over fresh mocks, for routers assembled inside a test
pub fn test_state(config: AppConfig) -> AppState {
    AppState::new(
        Arc::new(MockSnippetModel::new()),
        Arc::new(MockUserModel::new()),
        TemplateCache::new().unwrap(),
        config,
    )
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }
}

/// Sends requests through the router, keeping cookies between calls like a
/// browser would.
pub struct TestClient {
    router: Router,
    cookies: HashMap<String, String>,
}

impl TestClient {
    pub fn new(app: &TestApp) -> Self {
        Self::from_router(app.router.clone())
    }

    pub fn from_router(router: Router) -> Self {
        Self {
            router,
            cookies: HashMap::new(),
        }
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, Body::empty(), None).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.request_form(Method::POST, path, fields).await
    }

    pub async fn request_form(
        &mut self,
        method: Method,
        path: &str,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.send(
            method,
            path,
            Body::from(body),
            Some("application/x-www-form-urlencoded"),
        )
        .await
    }

    /// Fetch `path` and pull the anti-forgery token out of its forms
    pub async fn csrf_token(&mut self, path: &str) -> String {
        let response = self.get(path).await;
        extract_csrf_token(&response.body)
            .unwrap_or_else(|| panic!("no csrf token in {path}: {}", response.body))
    }

    /// Log in as the fixture user
    pub async fn login(&mut self) {
        let token = self.csrf_token("/user/login").await;
        let response = self
            .post_form(
                "/user/login",
                &[
                    ("email", MOCK_USER_EMAIL),
                    ("password", MOCK_USER_PASSWORD),
                    ("csrf", &token),
                ],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "login failed: {}", response.body);
    }

    async fn send(
        &mut self,
        method: Method,
        path: &str,
        body: Body,
        content_type: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or_default();
            if let Some((name, value)) = pair.split_once('=') {
                let removed = value.is_empty() || raw.contains("Max-Age=0");
                if removed {
                    self.cookies.remove(name.trim());
                } else {
                    self.cookies.insert(name.trim().to_string(), value.to_string());
                }
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

pub fn extract_csrf_token(html: &str) -> Option<String> {
    const MARKER: &str = "name='csrf' value='";
    let start = html.find(MARKER)? + MARKER.len();
    let end = html[start..].find('\'')? + start;
    Some(html[start..end].to_string())
}

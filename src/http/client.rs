use async_trait::async_trait;
use http::{Method, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{AuthenticatedUser, paths};
use crate::domain::api::{AuthApi, TodoApi};
use crate::domain::query::TodoQuery;
use crate::domain::session::{Credentials, ProfileUpdate, Registration};
use crate::domain::todo::{CreateTodo, Todo, TodoCounts, TodoId, UpdateTodo};
use crate::error::{ApiError, format_api_error};

/// Thin JSON-over-HTTP client for the todo backend.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Self {
        Self { inner: reqwest::Client::new(), base_url: base_url.trim_end_matches('/').to_string() }
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') { format!("{}{}", self.base_url, path) } else { format!("{}/{}", self.base_url, path) }
    }

    async fn send<B, T>(&self, method: Method, path: &str, query: &[(&str, &str)], body: Option<&B>, token: Option<&str>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(%method, %url, "api request");

        let mut req = self.inner.request(method, &url);
        if !query.is_empty() { req = req.query(query); }
        if let Some(body) = body { req = req.json(body); }
        if let Some(token) = token { req = req.bearer_auth(token); }

        let res = req.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = res.status();
        let body = read_body(res).await;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), %url, "api request failed");
            return Err(status_error(status, body));
        }
        serde_json::from_value(body.unwrap_or(Value::Null)).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn is_json(res: &reqwest::Response) -> bool {
    res.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json") || ct.contains("application/problem+json"))
}

/// JSON bodies become values, anything else a string value. Unreadable
/// bodies are treated as absent.
async fn read_body(res: reqwest::Response) -> Option<Value> {
    if is_json(&res) {
        let bytes = res.bytes().await.ok()?;
        serde_json::from_slice(&bytes).ok()
    } else {
        res.text().await.ok().map(Value::String)
    }
}

fn status_error(status: StatusCode, body: Option<Value>) -> ApiError {
    let fallback = format!("Request failed ({})", status.as_u16());
    let message = format_api_error(body.as_ref(), &fallback);
    ApiError::Status { status: status.as_u16(), message, body }
}

#[async_trait]
impl AuthApi for HttpClient {
    async fn login(&self, input: &Credentials) -> Result<AuthenticatedUser, ApiError> {
        self.send(Method::POST, paths::LOGIN, &[], Some(input), None).await
    }

    async fn register(&self, input: &Registration) -> Result<AuthenticatedUser, ApiError> {
        self.send(Method::POST, paths::REGISTER, &[], Some(input), None).await
    }

    async fn update_profile(&self, input: &ProfileUpdate, token: &str) -> Result<bool, ApiError> {
        self.send(Method::PUT, paths::PROFILE, &[], Some(input), Some(token)).await
    }
}

#[async_trait]
impl TodoApi for HttpClient {
    async fn list(&self, query: &TodoQuery, token: &str) -> Result<Vec<Todo>, ApiError> {
        self.send::<(), _>(Method::GET, paths::TODOS, &query.to_pairs(), None, Some(token)).await
    }

    async fn get(&self, id: &TodoId, token: &str) -> Result<Todo, ApiError> {
        self.send::<(), _>(Method::GET, &paths::todo(&id.0), &[], None, Some(token)).await
    }

    async fn create(&self, input: &CreateTodo, token: &str) -> Result<Todo, ApiError> {
        self.send(Method::POST, paths::TODOS, &[], Some(input), Some(token)).await
    }

    async fn update(&self, id: &TodoId, input: &UpdateTodo, token: &str) -> Result<bool, ApiError> {
        self.send(Method::PUT, &paths::todo(&id.0), &[], Some(input), Some(token)).await
    }

    async fn delete(&self, id: &TodoId, token: &str) -> Result<bool, ApiError> {
        self.send::<(), _>(Method::DELETE, &paths::todo(&id.0), &[], None, Some(token)).await
    }

    async fn complete(&self, id: &TodoId, token: &str) -> Result<bool, ApiError> {
        self.send::<(), _>(Method::PATCH, &paths::todo(&id.0), &[], None, Some(token)).await
    }

    async fn counts(&self, token: &str) -> Result<TodoCounts, ApiError> {
        self.send::<(), _>(Method::GET, paths::TODO_COUNT, &[], None, Some(token)).await
    }
}

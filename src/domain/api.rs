use async_trait::async_trait;

use super::query::TodoQuery;
use super::session::{Credentials, ProfileUpdate, Registration};
use super::todo::{CreateTodo, Todo, TodoCounts, TodoId, UpdateTodo};
use crate::error::ApiError;
use crate::http::types::AuthenticatedUser;

/// `/api/Authentication` endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync + 'static {
    async fn login(&self, input: &Credentials) -> Result<AuthenticatedUser, ApiError>;
    async fn register(&self, input: &Registration) -> Result<AuthenticatedUser, ApiError>;
    async fn update_profile(&self, input: &ProfileUpdate, token: &str) -> Result<bool, ApiError>;
}

/// `/api/Todo` endpoints. Every call carries the bearer token.
#[async_trait]
pub trait TodoApi: Send + Sync + 'static {
    async fn list(&self, query: &TodoQuery, token: &str) -> Result<Vec<Todo>, ApiError>;
    async fn get(&self, id: &TodoId, token: &str) -> Result<Todo, ApiError>;
    async fn create(&self, input: &CreateTodo, token: &str) -> Result<Todo, ApiError>;
    async fn update(&self, id: &TodoId, input: &UpdateTodo, token: &str) -> Result<bool, ApiError>;
    async fn delete(&self, id: &TodoId, token: &str) -> Result<bool, ApiError>;
    async fn complete(&self, id: &TodoId, token: &str) -> Result<bool, ApiError>;
    async fn counts(&self, token: &str) -> Result<TodoCounts, ApiError>;
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{TimeZone, Utc};

use crate::domain::api::{AuthApi, TodoApi};
use crate::domain::query::TodoQuery;
use crate::domain::session::{Credentials, ProfileUpdate, Registration};
use crate::domain::store::SessionStore;
use crate::domain::todo::{CreateTodo, Todo, TodoCounts, TodoId, TodoStatus, UpdateTodo};
use crate::error::ApiError;
use crate::http::types::AuthenticatedUser;

pub fn token_for(user_id: &str) -> String {
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"nameid":"{user_id}"}}"#));
    format!("eyJhbGciOiJIUzI1NiJ9.{payload}.signature")
}

#[derive(Default)]
pub struct BackendState {
    pub todos: Vec<Todo>,
    pub calls: Vec<String>,
    pub queries: Vec<TodoQuery>,
    pub profile_updates: Vec<ProfileUpdate>,
    pub fail_list: bool,
    pub fail_counts: bool,
    pub reject_writes: bool,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryBackend {
    pub state: Arc<Mutex<BackendState>>,
}

impl InMemoryBackend {
    pub fn calls(&self) -> Vec<String> { self.state.lock().unwrap().calls.clone() }

    pub fn clear_calls(&self) { self.state.lock().unwrap().calls.clear(); }

    fn record(&self, call: &str) { self.state.lock().unwrap().calls.push(call.to_string()); }

    fn server_error(message: &str) -> ApiError {
        ApiError::Status { status: 500, message: message.to_string(), body: None }
    }
}

#[async_trait]
impl TodoApi for InMemoryBackend {
    async fn list(&self, query: &TodoQuery, _token: &str) -> Result<Vec<Todo>, ApiError> {
        self.record("list");
        let mut state = self.state.lock().unwrap();
        state.queries.push(*query);
        if state.fail_list { return Err(Self::server_error("list unavailable")); }
        Ok(state
            .todos
            .iter()
            .filter(|t| query.status.is_none_or(|s| t.status == s))
            .filter(|t| query.priority.is_none_or(|p| t.priority == p))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &TodoId, _token: &str) -> Result<Todo, ApiError> {
        self.record("get");
        let state = self.state.lock().unwrap();
        state
            .todos
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or(ApiError::Status { status: 404, message: "Request failed (404)".into(), body: None })
    }

    async fn create(&self, input: &CreateTodo, _token: &str) -> Result<Todo, ApiError> {
        self.record("create");
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created_date = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(state.next_id as i64);
        let todo = Todo {
            id: TodoId(format!("todo-{}", state.next_id)),
            title: input.title.clone(),
            description: input.description.clone(),
            status: TodoStatus::Pending,
            priority: input.priority,
            due_date: input.due_date.fixed_offset(),
            created_date,
            last_modified_date: created_date,
            is_due_soon: false,
        };
        state.todos.push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: &TodoId, input: &UpdateTodo, _token: &str) -> Result<bool, ApiError> {
        self.record("update");
        let mut state = self.state.lock().unwrap();
        if state.reject_writes { return Ok(false); }
        let Some(todo) = state.todos.iter_mut().find(|t| &t.id == id) else { return Ok(false) };
        if let Some(title) = &input.title { todo.title = title.clone(); }
        if let Some(description) = &input.description { todo.description = Some(description.clone()); }
        if let Some(status) = input.status { todo.status = status; }
        if let Some(priority) = input.priority { todo.priority = priority; }
        if let Some(due_date) = input.due_date { todo.due_date = due_date.fixed_offset(); }
        Ok(true)
    }

    async fn delete(&self, id: &TodoId, _token: &str) -> Result<bool, ApiError> {
        self.record("delete");
        let mut state = self.state.lock().unwrap();
        if state.reject_writes { return Ok(false); }
        let before = state.todos.len();
        state.todos.retain(|t| &t.id != id);
        Ok(state.todos.len() != before)
    }

    async fn complete(&self, id: &TodoId, _token: &str) -> Result<bool, ApiError> {
        self.record("complete");
        let mut state = self.state.lock().unwrap();
        if state.reject_writes { return Ok(false); }
        let Some(todo) = state.todos.iter_mut().find(|t| &t.id == id) else { return Ok(false) };
        todo.status = TodoStatus::Completed;
        Ok(true)
    }

    async fn counts(&self, _token: &str) -> Result<TodoCounts, ApiError> {
        self.record("counts");
        let state = self.state.lock().unwrap();
        if state.fail_counts { return Err(Self::server_error("counts unavailable")); }
        Ok(TodoCounts::from_todos(&state.todos))
    }
}

#[async_trait]
impl AuthApi for InMemoryBackend {
    async fn login(&self, input: &Credentials) -> Result<AuthenticatedUser, ApiError> {
        self.record("login");
        if input.password != "secret" {
            return Err(ApiError::Status { status: 401, message: "Invalid email or password".into(), body: None });
        }
        Ok(AuthenticatedUser {
            email: input.email.clone(),
            display_name: "Ada Lovelace".into(),
            full_name: "Ada King Lovelace".into(),
            token: token_for("user-1"),
        })
    }

    async fn register(&self, input: &Registration) -> Result<AuthenticatedUser, ApiError> {
        self.record("register");
        if input.password != input.confirm_password {
            return Err(ApiError::Status { status: 400, message: "ConfirmPassword: Passwords do not match".into(), body: None });
        }
        Ok(AuthenticatedUser {
            email: input.email.clone(),
            display_name: input.user_name.clone(),
            full_name: input.full_name.clone(),
            token: token_for("user-2"),
        })
    }

    async fn update_profile(&self, input: &ProfileUpdate, _token: &str) -> Result<bool, ApiError> {
        self.record("update_profile");
        let mut state = self.state.lock().unwrap();
        state.profile_updates.push(input.clone());
        Ok(!state.reject_writes)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    pub items: Arc<Mutex<HashMap<String, String>>>,
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn init(&self) -> Result<()> { Ok(()) }
    async fn get(&self, key: &str) -> Result<Option<String>> { Ok(self.items.lock().unwrap().get(key).cloned()) }
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.items.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }
    async fn remove(&self, key: &str) -> Result<()> {
        self.items.lock().unwrap().remove(key);
        Ok(())
    }
}

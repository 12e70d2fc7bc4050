//! An in-process stand-in for the todo backend, served over real HTTP on an
//! ephemeral port so the client is exercised end to end.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use todo_manager::domain::query::SortOption;
use todo_manager::domain::session::{Credentials, ProfileUpdate, Registration};
use todo_manager::domain::todo::{CreateTodo, Todo, TodoCounts, TodoId, TodoPriority, TodoStatus, UpdateTodo};
use todo_manager::http::types::AuthenticatedUser;

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "secret";

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub user_name: String,
    pub full_name: String,
    pub password: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct Owned {
    pub owner: String,
    pub todo: Todo,
}

#[derive(Debug, Default)]
pub struct ServerState {
    pub users: Vec<User>,
    pub todos: Vec<Owned>,
    /// `METHOD /path?query` for every request received, in order.
    pub requests: Vec<String>,
}

type Shared = Arc<Mutex<ServerState>>;

pub struct FakeBackend {
    pub base_url: String,
    pub state: Shared,
}

impl FakeBackend {
    /// Starts the server with one known user (`EMAIL` / `PASSWORD`).
    pub async fn spawn() -> Self {
        let state: Shared = Arc::default();
        state.lock().unwrap().users.push(new_user("user-ada", EMAIL, "ada", "Ada King Lovelace", PASSWORD));

        let app = Router::new()
            .route("/api/Authentication/Login", post(login))
            .route("/api/Authentication/Register", post(register))
            .route("/api/Authentication", axum::routing::put(update_profile))
            .route("/api/Todo", get(list_todos).post(create_todo))
            .route("/api/Todo/Count", get(count_todos))
            .route("/api/Todo/:id", get(get_todo).put(update_todo).delete(delete_todo).patch(complete_todo))
            .layer(middleware::from_fn_with_state(state.clone(), log_request))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { base_url: format!("http://{addr}"), state }
    }

    pub fn requests(&self) -> Vec<String> { self.state.lock().unwrap().requests.clone() }

    pub fn clear_requests(&self) { self.state.lock().unwrap().requests.clear(); }

    pub fn todos(&self) -> Vec<Todo> { self.state.lock().unwrap().todos.iter().map(|o| o.todo.clone()).collect() }
}

fn new_user(id: &str, email: &str, user_name: &str, full_name: &str, password: &str) -> User {
    let payload = URL_SAFE_NO_PAD.encode(json!({ "nameid": id, "email": email }).to_string());
    User {
        id: id.to_string(),
        email: email.to_string(),
        user_name: user_name.to_string(),
        full_name: full_name.to_string(),
        password: password.to_string(),
        token: format!("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{payload}.c2lnbmF0dXJl"),
    }
}

fn display_name(full_name: &str) -> String { full_name.split_whitespace().take(2).collect::<Vec<_>>().join(" ") }

fn authenticated(user: &User) -> AuthenticatedUser {
    AuthenticatedUser {
        email: user.email.clone(),
        display_name: display_name(&user.full_name),
        full_name: user.full_name.clone(),
        token: user.token.clone(),
    }
}

async fn log_request(State(state): State<Shared>, req: Request, next: Next) -> Response {
    state.lock().unwrap().requests.push(format!("{} {}", req.method(), req.uri()));
    next.run(req).await
}

fn caller(state: &ServerState, headers: &HeaderMap) -> Result<String, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    state
        .users
        .iter()
        .find(|u| Some(u.token.as_str()) == token)
        .map(|u| u.id.clone())
        .ok_or_else(|| StatusCode::UNAUTHORIZED.into_response())
}

fn validation_problem(field: &str, message: &str) -> Response {
    let body = json!({
        "type": "https://tools.ietf.org/html/rfc9110#section-15.5.1",
        "title": "One or more validation errors occurred.",
        "status": 400,
        "errors": { field: [message] },
    });
    (StatusCode::BAD_REQUEST, [(header::CONTENT_TYPE, "application/problem+json")], body.to_string()).into_response()
}

async fn login(State(state): State<Shared>, Json(input): Json<Credentials>) -> Response {
    let state = state.lock().unwrap();
    match state.users.iter().find(|u| u.email == input.email && u.password == input.password) {
        Some(user) => Json(authenticated(user)).into_response(),
        None => (StatusCode::UNAUTHORIZED, Json(json!({ "title": "Unauthorized", "detail": "Invalid email or password" }))).into_response(),
    }
}

async fn register(State(state): State<Shared>, Json(input): Json<Registration>) -> Response {
    if input.password != input.confirm_password {
        return validation_problem("ConfirmPassword", "Passwords do not match");
    }
    let mut state = state.lock().unwrap();
    if state.users.iter().any(|u| u.email == input.email) {
        return (StatusCode::BAD_REQUEST, "Email is already registered").into_response();
    }
    let id = format!("user-{}", uuid::Uuid::new_v4());
    let user = new_user(&id, &input.email, &input.user_name, &input.full_name, &input.password);
    let body = authenticated(&user);
    state.users.push(user);
    Json(body).into_response()
}

async fn update_profile(State(state): State<Shared>, headers: HeaderMap, Json(input): Json<ProfileUpdate>) -> Response {
    let mut state = state.lock().unwrap();
    let owner = match caller(&state, &headers) {
        Ok(owner) => owner,
        Err(res) => return res,
    };
    let Some(user) = state.users.iter_mut().find(|u| u.id == owner) else { return StatusCode::UNAUTHORIZED.into_response() };
    if let Some(password) = &input.password {
        if input.old_password.as_deref() != Some(user.password.as_str()) {
            return Json(false).into_response();
        }
        user.password = password.clone();
    }
    if let Some(full_name) = &input.full_name { user.full_name = full_name.clone(); }
    if let Some(email) = &input.email { user.email = email.clone(); }
    Json(true).into_response()
}

#[derive(Debug, Deserialize)]
struct ListParams {
    status: Option<TodoStatus>,
    priority: Option<TodoPriority>,
    sort: Option<SortOption>,
}

fn with_due_soon(mut todo: Todo) -> Todo {
    todo.is_due_soon = todo.is_due_soon_at(Utc::now());
    todo
}

async fn list_todos(State(state): State<Shared>, headers: HeaderMap, Query(params): Query<ListParams>) -> Response {
    let state = state.lock().unwrap();
    let owner = match caller(&state, &headers) {
        Ok(owner) => owner,
        Err(res) => return res,
    };
    let mut todos: Vec<Todo> = state
        .todos
        .iter()
        .filter(|o| o.owner == owner)
        .map(|o| o.todo.clone())
        .filter(|t| params.status.is_none_or(|s| t.status == s))
        .filter(|t| params.priority.is_none_or(|p| t.priority == p))
        .map(with_due_soon)
        .collect();
    match params.sort.unwrap_or(SortOption::DueDateAsc) {
        SortOption::CreatedDateAsc => todos.sort_by_key(|t| t.created_date),
        SortOption::CreatedDateDesc => todos.sort_by_key(|t| std::cmp::Reverse(t.created_date)),
        SortOption::DueDateAsc => todos.sort_by_key(|t| t.due_date),
        SortOption::DueDateDesc => todos.sort_by_key(|t| std::cmp::Reverse(t.due_date)),
        SortOption::PriorityAsc => todos.sort_by_key(|t| t.priority),
        SortOption::PriorityDesc => todos.sort_by_key(|t| std::cmp::Reverse(t.priority)),
    }
    Json(todos).into_response()
}

async fn create_todo(State(state): State<Shared>, headers: HeaderMap, Json(input): Json<CreateTodo>) -> Response {
    let mut state = state.lock().unwrap();
    let owner = match caller(&state, &headers) {
        Ok(owner) => owner,
        Err(res) => return res,
    };
    if input.title.trim().is_empty() {
        return validation_problem("Title", "The Title field is required.");
    }
    let now = Utc::now();
    let todo = with_due_soon(Todo {
        id: TodoId(uuid::Uuid::new_v4().to_string()),
        title: input.title,
        description: input.description,
        status: TodoStatus::Pending,
        priority: input.priority,
        due_date: input.due_date.fixed_offset(),
        created_date: now,
        last_modified_date: now,
        is_due_soon: false,
    });
    state.todos.push(Owned { owner, todo: todo.clone() });
    (StatusCode::CREATED, Json(todo)).into_response()
}

async fn count_todos(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    let owner = match caller(&state, &headers) {
        Ok(owner) => owner,
        Err(res) => return res,
    };
    let mine: Vec<Todo> = state.todos.iter().filter(|o| o.owner == owner).map(|o| o.todo.clone()).collect();
    Json(TodoCounts::from_todos(&mine)).into_response()
}

fn find_mut<'a>(state: &'a mut ServerState, owner: &str, id: &str) -> Option<&'a mut Todo> {
    state.todos.iter_mut().find(|o| o.owner == owner && o.todo.id.0 == id).map(|o| &mut o.todo)
}

async fn get_todo(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    let owner = match caller(&state, &headers) {
        Ok(owner) => owner,
        Err(res) => return res,
    };
    match find_mut(&mut state, &owner, &id) {
        Some(todo) => Json(with_due_soon(todo.clone())).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn update_todo(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>, Json(input): Json<UpdateTodo>) -> Response {
    let mut state = state.lock().unwrap();
    let owner = match caller(&state, &headers) {
        Ok(owner) => owner,
        Err(res) => return res,
    };
    if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return validation_problem("Title", "The Title field is required.");
    }
    let Some(todo) = find_mut(&mut state, &owner, &id) else { return Json(false).into_response() };
    if let Some(title) = input.title { todo.title = title; }
    if let Some(description) = input.description { todo.description = Some(description); }
    if let Some(status) = input.status { todo.status = status; }
    if let Some(priority) = input.priority { todo.priority = priority; }
    if let Some(due_date) = input.due_date { todo.due_date = due_date.fixed_offset(); }
    todo.last_modified_date = Utc::now();
    Json(true).into_response()
}

async fn delete_todo(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    let owner = match caller(&state, &headers) {
        Ok(owner) => owner,
        Err(res) => return res,
    };
    let before = state.todos.len();
    state.todos.retain(|o| !(o.owner == owner && o.todo.id.0 == id));
    Json(state.todos.len() != before).into_response()
}

async fn complete_todo(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    let owner = match caller(&state, &headers) {
        Ok(owner) => owner,
        Err(res) => return res,
    };
    let Some(todo) = find_mut(&mut state, &owner, &id) else { return Json(false).into_response() };
    todo.status = TodoStatus::Completed;
    todo.last_modified_date = Utc::now();
    Json(true).into_response()
}

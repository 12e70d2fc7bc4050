use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_LEN: usize = 100;

/// Window, in days, for the list view's "due soon" marker.
pub const DUE_SOON_DAYS: i64 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TodoId(pub String);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub const ALL: [TodoStatus; 3] = [TodoStatus::Pending, TodoStatus::InProgress, TodoStatus::Completed];

    pub fn as_str(self) -> &'static str {
        match self { TodoStatus::Pending => "Pending", TodoStatus::InProgress => "InProgress", TodoStatus::Completed => "Completed" }
    }

    pub fn label(self) -> &'static str {
        match self { TodoStatus::InProgress => "In Progress", other => other.as_str() }
    }
}

/// Declaration order is the sort order: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum TodoPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TodoPriority {
    pub const ALL: [TodoPriority; 3] = [TodoPriority::Low, TodoPriority::Medium, TodoPriority::High];

    pub fn as_str(self) -> &'static str {
        match self { TodoPriority::Low => "Low", TodoPriority::Medium => "Medium", TodoPriority::High => "High" }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TodoStatus,
    pub priority: TodoPriority,
    /// Kept in the offset the backend sent so the calendar date shown in
    /// forms matches the wire value.
    pub due_date: DateTime<FixedOffset>,
    pub created_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
    #[serde(default)]
    pub is_due_soon: bool,
}

impl Todo {
    pub fn due_utc(&self) -> DateTime<Utc> { self.due_date.with_timezone(&Utc) }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TodoStatus::Completed && self.due_utc() < now
    }

    /// Client-side marker used by the list view: due within the next
    /// `DUE_SOON_DAYS` days, counting partial days as whole ones.
    pub fn is_due_soon_at(&self, now: DateTime<Utc>) -> bool {
        let millis = (self.due_utc() - now).num_milliseconds();
        let day = 24 * 60 * 60 * 1000;
        let days = millis.div_euclid(day) + i64::from(millis.rem_euclid(day) != 0);
        (0..=DUE_SOON_DAYS).contains(&days)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TodoCounts {
    pub total_todos: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
}

impl TodoCounts {
    pub fn from_todos(todos: &[Todo]) -> Self {
        let count = |status| todos.iter().filter(|t| t.status == status).count() as u64;
        Self {
            total_todos: todos.len() as u64,
            pending: count(TodoStatus::Pending),
            in_progress: count(TodoStatus::InProgress),
            completed: count(TodoStatus::Completed),
        }
    }
}

/// Body of `POST /api/Todo`. The backend always creates with `Pending`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    pub description: Option<String>,
    pub priority: TodoPriority,
    pub due_date: DateTime<Utc>,
}

/// Body of `PUT /api/Todo/{id}`; absent fields are left untouched server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TodoStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TodoPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// What the todo form submits when creating. `due_date` is a `YYYY-MM-DD`
/// calendar date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: TodoPriority,
    pub due_date: String,
}

/// Partial edit of an existing todo. `due_date` may be a calendar date or a
/// full RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<String>,
}

impl TodoPatch {
    pub fn status(status: TodoStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date: {0}")]
pub struct InvalidDate(pub String);

/// Midnight UTC of a `YYYY-MM-DD` date.
pub fn parse_calendar_date(input: &str) -> Result<DateTime<Utc>, InvalidDate> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| InvalidDate(input.to_string()))?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| InvalidDate(input.to_string()))
}

/// Accepts either a calendar date or a full timestamp; anything containing a
/// `T` is treated as a timestamp.
pub fn parse_due_date(input: &str) -> Result<DateTime<Utc>, InvalidDate> {
    let input = input.trim();
    if input.contains('T') {
        DateTime::parse_from_rfc3339(input)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| InvalidDate(input.to_string()))
    } else {
        parse_calendar_date(input)
    }
}

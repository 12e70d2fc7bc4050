use serde_json::Value;
use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response at all.
    #[error("{0}")]
    Network(String),

    /// Non-2xx response. `message` is already formatted for display.
    #[error("{message}")]
    Status { status: u16, message: String, body: Option<Value> },

    /// 2xx response whose body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self { ApiError::Status { status, .. } => Some(*status), _ => None }
    }

    /// Display string for the user. Only backend-formatted messages are
    /// shown; transport and decode failures give `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Failure of a user-level action (login, save, delete...), ready to show.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self { Self { message: message.into() } }

    pub fn not_authenticated() -> Self { Self::new("Not authenticated") }

    pub fn from_api(err: &ApiError, fallback: &str) -> Self { Self::new(err.user_message(fallback)) }
}

pub type ActionResult<T = ()> = Result<T, ActionError>;

fn push_messages(out: &mut Vec<String>, field: &str, messages: &Value) {
    let Some(messages) = messages.as_array() else { return };
    for msg in messages.iter().filter_map(Value::as_str) {
        if field.is_empty() { out.push(msg.to_string()) } else { out.push(format!("{field}: {msg}")) }
    }
}

fn validation_messages(problem: &serde_json::Map<String, Value>) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(Value::Object(errors)) = problem.get("errors") {
        for (field, messages) in errors {
            push_messages(&mut out, field, messages);
        }
    }

    let pairs = problem.get("Errors").filter(|v| !v.is_null()).or_else(|| problem.get("errors"));
    if let Some(Value::Array(entries)) = pairs {
        for entry in entries {
            if let Some([Value::String(field), messages @ Value::Array(_)]) = entry.as_array().map(Vec::as_slice) {
                push_messages(&mut out, field, messages);
            }
        }
    }

    out
}

fn non_blank<'a>(problem: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    problem.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

/// Reduces an error body to a single display string. `None`, `null`, empty
/// strings and unrecognized shapes give `fallback`.
pub fn format_api_error(body: Option<&Value>, fallback: &str) -> String {
    let problem = match body {
        Some(Value::String(s)) if !s.is_empty() => return s.clone(),
        Some(Value::Object(map)) => map,
        _ => return fallback.to_string(),
    };

    let messages = validation_messages(problem);
    if !messages.is_empty() {
        return messages.join("\n");
    }

    non_blank(problem, "detail")
        .or_else(|| non_blank(problem, "title"))
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

use std::env;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_STORAGE_URL: &str = "sqlite://todo-manager.db";
pub const DEFAULT_LOG_FILE: &str = "todo-manager.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub storage_url: String,
    pub log_file: String,
}

impl Config {
    /// Reads `TODO_API_BASE_URL`, `TODO_STORAGE_URL` and `TODO_LOG_FILE`.
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let load = |key: &str, default: &str| {
            lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
        };
        Self {
            api_base_url: load("TODO_API_BASE_URL", DEFAULT_API_BASE_URL).trim_end_matches('/').to_string(),
            storage_url: load("TODO_STORAGE_URL", DEFAULT_STORAGE_URL),
            log_file: load("TODO_LOG_FILE", DEFAULT_LOG_FILE),
        }
    }
}

use serde::{Deserialize, Serialize};

/// Body returned by login and register.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub email: String,
    pub display_name: String,
    pub full_name: String,
    pub token: String,
}

pub mod paths {
    pub const LOGIN: &str = "/api/Authentication/Login";
    pub const REGISTER: &str = "/api/Authentication/Register";
    pub const PROFILE: &str = "/api/Authentication";
    pub const TODOS: &str = "/api/Todo";
    pub const TODO_COUNT: &str = "/api/Todo/Count";

    pub fn todo(id: &str) -> String { format!("{TODOS}/{id}") }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in user as the client remembers them. Stored verbatim under
/// [`SESSION_STORAGE_KEY`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub full_name: String,
    pub email: String,
    pub token: String,
    /// Client-local; the backend does not report it.
    pub session_started_at: DateTime<Utc>,
}

pub const SESSION_STORAGE_KEY: &str = "auth.currentUser";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub full_name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Body of `PUT /api/Authentication`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
}

/// Raw contents of the profile form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileForm {
    pub full_name: String,
    pub email: String,
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ProfileForm {
    pub fn wants_password_change(&self) -> bool {
        !(self.old_password.is_empty() && self.new_password.is_empty() && self.confirm_password.is_empty())
    }

    /// Password fields travel all together or not at all.
    pub fn validate(&self) -> Result<ProfileUpdate, &'static str> {
        if self.full_name.is_empty() || self.email.is_empty() {
            return Err("Please fill in all fields");
        }
        let mut update = ProfileUpdate {
            full_name: Some(self.full_name.clone()),
            email: Some(self.email.clone()),
            ..Default::default()
        };
        if self.wants_password_change() {
            if self.old_password.is_empty() || self.new_password.is_empty() || self.confirm_password.is_empty() {
                return Err("Please fill in all password fields");
            }
            if self.new_password != self.confirm_password {
                return Err("New password and confirmation do not match");
            }
            update.old_password = Some(self.old_password.clone());
            update.password = Some(self.new_password.clone());
            update.confirm_password = Some(self.confirm_password.clone());
        }
        Ok(update)
    }
}

/// First two words of a full name, or `None` when it has no words.
pub fn display_name_from(full_name: &str) -> Option<String> {
    let words: Vec<&str> = full_name.split_whitespace().take(2).collect();
    if words.is_empty() { None } else { Some(words.join(" ")) }
}

impl Session {
    /// Folds a successfully submitted profile update into the cached record.
    /// The backend only answers with a boolean, so this mirrors what was sent.
    pub fn merge_profile(&mut self, update: &ProfileUpdate) {
        if let Some(email) = &update.email { self.email = email.clone(); }
        if let Some(full_name) = &update.full_name {
            self.full_name = full_name.clone();
            if let Some(display) = display_name_from(full_name) { self.display_name = display; }
        }
    }
}

use chrono::Utc;

use crate::domain::api::AuthApi;
use crate::domain::session::{Credentials, ProfileUpdate, Registration, Session, SESSION_STORAGE_KEY};
use crate::domain::store::SessionStore;
use crate::error::{ActionError, ActionResult};
use crate::http::jwt;
use crate::http::types::AuthenticatedUser;

/// Owns the signed-in identity and keeps the durable copy in step with it.
pub struct SessionService<A: AuthApi, S: SessionStore> {
    api: A,
    store: S,
    current: Option<Session>,
}

impl<A: AuthApi, S: SessionStore> SessionService<A, S> {
    pub fn new(api: A, store: S) -> Self { Self { api, store, current: None } }

    pub fn current(&self) -> Option<&Session> { self.current.as_ref() }

    pub fn is_authenticated(&self) -> bool { self.current.is_some() }

    /// Loads the stored session, if any. Called once at startup.
    pub async fn restore(&mut self) -> Option<&Session> {
        let raw = match self.store.get(SESSION_STORAGE_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session");
                None
            }
        };
        self.current = raw.and_then(|raw| match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring corrupt stored session");
                None
            }
        });
        if let Some(session) = &self.current {
            tracing::info!(user_id = %session.user_id, "restored session");
        }
        self.current.as_ref()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ActionResult {
        let input = Credentials { email: email.to_string(), password: password.to_string() };
        let user = self.api.login(&input).await.map_err(|e| ActionError::from_api(&e, "Login failed"))?;
        self.start(user).await;
        Ok(())
    }

    pub async fn register(&mut self, input: &Registration) -> ActionResult {
        let user = self.api.register(input).await.map_err(|e| ActionError::from_api(&e, "Registration failed"))?;
        self.start(user).await;
        Ok(())
    }

    pub async fn logout(&mut self) {
        if let Some(session) = self.current.take() {
            tracing::info!(user_id = %session.user_id, "logged out");
        }
        if let Err(e) = self.store.remove(SESSION_STORAGE_KEY).await {
            tracing::warn!(error = %e, "could not clear stored session");
        }
    }

    /// Sends the profile changes; on success mirrors them into the cached
    /// session since the backend only answers `true`/`false`.
    pub async fn update_user(&mut self, update: &ProfileUpdate) -> ActionResult {
        let Some(session) = self.current.as_ref() else { return Err(ActionError::not_authenticated()) };
        let ok = self
            .api
            .update_profile(update, &session.token)
            .await
            .map_err(|e| ActionError::from_api(&e, "Update failed"))?;
        if !ok {
            return Err(ActionError::new("Update failed"));
        }
        if let Some(session) = self.current.as_mut() {
            session.merge_profile(update);
        }
        self.persist().await;
        Ok(())
    }

    async fn start(&mut self, user: AuthenticatedUser) {
        let session = Session {
            user_id: jwt::user_id(&user.token),
            display_name: user.display_name,
            full_name: user.full_name,
            email: user.email,
            token: user.token,
            session_started_at: Utc::now(),
        };
        tracing::info!(user_id = %session.user_id, "session started");
        self.current = Some(session);
        self.persist().await;
    }

    async fn persist(&self) {
        let Some(session) = &self.current else { return };
        let result = match serde_json::to_string(session) {
            Ok(raw) => self.store.set(SESSION_STORAGE_KEY, &raw).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "could not persist session");
        }
    }
}

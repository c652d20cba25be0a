use std::sync::Arc;

use serde::Deserialize;
use validator::Validate;

use console_core::error::ClientError;

use crate::models::{User, UserStats, UserUpdate, UserWithStats};
use crate::services::api::{to_body, ApiClient};

#[derive(Deserialize)]
struct UsersEnvelope {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Deserialize)]
struct StatsEnvelope {
    stats: UserStats,
}

/// Client for the backend's `/users` endpoints.
#[derive(Clone)]
pub struct UsersApi {
    api: Arc<ApiClient>,
}

impl UsersApi {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// List all users. The backend only answers this for admins.
    pub async fn list(&self) -> Result<Vec<User>, ClientError> {
        let envelope: UsersEnvelope = self.api.get_json("/users").await?;
        Ok(envelope.users)
    }

    /// Profile and stats for one user.
    pub async fn get(&self, user_id: &str) -> Result<UserWithStats, ClientError> {
        self.api.get_json(&format!("/users/{user_id}")).await
    }

    /// Profile and stats for the current user.
    pub async fn current(&self) -> Result<UserWithStats, ClientError> {
        self.api.get_json("/users/me").await
    }

    /// Update the current user's profile. The patch is validated before any
    /// network traffic happens.
    pub async fn update_current(&self, patch: &UserUpdate) -> Result<User, ClientError> {
        patch.validate()?;
        let envelope: UserEnvelope = self
            .api
            .patch_json("/users/me", &to_body(patch)?)
            .await?;
        Ok(envelope.user)
    }

    /// Update another user's profile. The backend only answers this for
    /// admins.
    pub async fn update(&self, user_id: &str, patch: &UserUpdate) -> Result<User, ClientError> {
        patch.validate()?;
        let envelope: UserEnvelope = self
            .api
            .patch_json(&format!("/users/{user_id}"), &to_body(patch)?)
            .await?;
        Ok(envelope.user)
    }

    /// Delete the current user's account.
    pub async fn delete_current(&self) -> Result<(), ClientError> {
        self.api.delete_checked("/users/me").await
    }

    /// Usage statistics for `user_id`, or for the current user when `None`.
    pub async fn stats(&self, user_id: Option<&str>) -> Result<UserStats, ClientError> {
        let path = match user_id {
            Some(id) => format!("/users/{id}/stats"),
            None => "/users/me/stats".to_string(),
        };
        let envelope: StatsEnvelope = self.api.get_json(&path).await?;
        Ok(envelope.stats)
    }
}

use std::sync::Arc;

use serde::Deserialize;

use console_core::error::ClientError;

use crate::models::{ApiSession, RevokeAllRequest};
use crate::services::api::{to_body, ApiClient};

#[derive(Deserialize)]
struct SessionsEnvelope {
    #[serde(default)]
    sessions: Vec<ApiSession>,
}

/// Client for the backend's session management endpoints.
#[derive(Clone)]
pub struct SessionsApi {
    api: Arc<ApiClient>,
}

impl SessionsApi {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// All sessions recorded for the current user, expired ones included.
    pub async fn list(&self) -> Result<Vec<ApiSession>, ClientError> {
        let envelope: SessionsEnvelope = self.api.get_json("/auth/sessions").await?;
        Ok(envelope.sessions)
    }

    /// Only the sessions that can still be used.
    pub async fn active(&self) -> Result<Vec<ApiSession>, ClientError> {
        let envelope: SessionsEnvelope = self.api.get_json("/auth/sessions/active").await?;
        Ok(envelope.sessions)
    }

    /// Revoke one session by id.
    pub async fn revoke(&self, session_id: &str) -> Result<(), ClientError> {
        self.api
            .delete_checked(&format!("/auth/sessions/{session_id}"))
            .await
    }

    /// Revoke every session, optionally sparing the current one.
    pub async fn revoke_all(&self, request: &RevokeAllRequest) -> Result<(), ClientError> {
        self.api
            .post_checked("/auth/sessions/revoke-all", Some(&to_body(request)?))
            .await
    }
}

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use console_core::error::ClientError;

use crate::models::{OAuthProvider, TokenPair, User};
use crate::services::api::ApiClient;

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

/// Client for the backend's `/auth` endpoints.
#[derive(Clone)]
pub struct AuthApi {
    api: Arc<ApiClient>,
}

impl AuthApi {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Fetch the authenticated user's profile.
    pub async fn me(&self) -> Result<User, ClientError> {
        let envelope: UserEnvelope = self.api.get_json("/auth/me").await?;
        Ok(envelope.user)
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// The pipeline performs this exchange automatically on 401; this
    /// method exists for explicit rotation.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ClientError> {
        self.api
            .post_json(
                "/auth/refresh",
                Some(&json!({ "refreshToken": refresh_token })),
            )
            .await
    }

    /// Revoke the current session server-side.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.api.post_checked("/auth/logout", None).await
    }

    /// Absolute URL of the backend's provider initiation endpoint; the host
    /// is sent here to start an OAuth login.
    pub fn provider_login_url(&self, provider: OAuthProvider) -> String {
        format!("{}/auth/{}", self.api.base_url(), provider.slug())
    }
}

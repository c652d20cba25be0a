//! Typed client for the admin console's REST backend.
//!
//! The embedding shell drives this crate through [`ConsoleClient`]: a
//! session manager for bootstrap, OAuth login, callback completion and
//! logout; an authenticated request pipeline that injects the bearer token
//! and transparently refreshes it once per call on 401; and typed clients
//! for the backend's resource endpoints.

pub mod auth;
pub mod config;
pub mod models;
pub mod services;

pub use console_core::error::ClientError;

use std::sync::Arc;

use crate::auth::navigator::Navigator;
use crate::auth::session::SessionManager;
use crate::auth::store::{FileTokenStore, MemoryTokenStore, TokenStore};
use crate::config::Settings;
use crate::services::api::ApiClient;
use crate::services::auth::AuthApi;
use crate::services::policies::PoliciesApi;
use crate::services::sessions::SessionsApi;
use crate::services::subscriptions::SubscriptionsApi;
use crate::services::usage::UsageApi;
use crate::services::users::UsersApi;

/// Aggregated client state handed to the embedding shell.
#[derive(Clone)]
pub struct ConsoleClient {
    pub session: Arc<SessionManager>,
    pub auth: AuthApi,
    pub users: UsersApi,
    pub subscriptions: SubscriptionsApi,
    pub policies: PoliciesApi,
    pub sessions: SessionsApi,
    pub usage: UsageApi,
}

impl ConsoleClient {
    /// Wire the full client from settings plus an injected store and
    /// navigator. Every component shares the same pipeline, so a refresh
    /// performed for one resource client is visible to all of them.
    pub fn new(
        settings: &Settings,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let api = Arc::new(ApiClient::new(settings, store.clone(), navigator.clone()));
        let session = Arc::new(SessionManager::new(settings, api.clone(), store, navigator));
        Self {
            session,
            auth: AuthApi::new(api.clone()),
            users: UsersApi::new(api.clone()),
            subscriptions: SubscriptionsApi::new(api.clone()),
            policies: PoliciesApi::new(api.clone()),
            sessions: SessionsApi::new(api.clone()),
            usage: UsageApi::new(api),
        }
    }

    /// Wire the client with the store selected by `settings.storage`: a
    /// file-backed store when a path is configured, in-memory otherwise.
    pub fn from_settings(
        settings: &Settings,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let store: Arc<dyn TokenStore> = match &settings.storage.path {
            Some(dir) => Arc::new(FileTokenStore::open(&settings.storage.namespace, dir)?),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Ok(Self::new(settings, store, navigator))
    }
}

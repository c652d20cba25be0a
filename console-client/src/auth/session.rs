use std::sync::{Arc, PoisonError, RwLock};

use console_core::error::ClientError;

use crate::auth::callback::CallbackTokens;
use crate::auth::navigator::Navigator;
use crate::auth::store::TokenStore;
use crate::config::{Routes, Settings};
use crate::models::{OAuthProvider, User};
use crate::services::api::ApiClient;
use crate::services::auth::AuthApi;

/// Snapshot of the session the shell renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_loading: bool,
}

impl Default for AuthState {
    /// Loading until [`SessionManager::init`] resolves.
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }
}

/// Owns the authenticated session: bootstrap, login hand-off, OAuth
/// callback completion, logout and profile refresh.
///
/// One manager per application instance; everything it touches is injected
/// at construction, nothing is process-global.
pub struct SessionManager {
    auth: AuthApi,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    routes: Routes,
    state: RwLock<AuthState>,
}

impl SessionManager {
    pub fn new(
        settings: &Settings,
        api: Arc<ApiClient>,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            auth: AuthApi::new(api),
            store,
            navigator,
            routes: settings.routes.clone(),
            state: RwLock::new(AuthState::default()),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Authenticated means a profile has been fetched, not merely that a
    /// token string exists.
    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .is_some()
    }

    fn set_state(&self, user: Option<User>) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = AuthState {
            user,
            is_loading: false,
        };
    }

    /// Bootstrap the session at application start.
    ///
    /// With a stored token the profile is fetched (the pipeline may refresh
    /// along the way); a rejected token clears the stored session. Without
    /// a token no network call happens. Either way the state leaves the
    /// loading phase.
    pub async fn init(&self) {
        if self.store.is_authenticated() {
            match self.auth.me().await {
                Ok(user) => {
                    self.cache_user(&user);
                    tracing::info!(user_id = %user.id, "session restored");
                    self.set_state(Some(user));
                    return;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored session rejected, clearing");
                    if let Err(e) = self.store.clear() {
                        tracing::warn!(error = %e, "failed to clear session storage");
                    }
                }
            }
        }
        self.set_state(None);
    }

    /// Hand the host to the backend's provider initiation endpoint. Local
    /// state only changes later, when the OAuth callback arrives.
    pub fn login(&self, provider: OAuthProvider) {
        let url = self.auth.provider_login_url(provider);
        tracing::info!(provider = %provider, "starting oauth login");
        self.navigator.navigate(&url);
    }

    /// Complete the OAuth redirect.
    ///
    /// `query` is the callback URL's query string. With both `token` and
    /// `refresh` present the pair is stored, the profile fetched, and the
    /// host sent to the dashboard. A missing parameter stores nothing and
    /// sends the host back to login carrying an error marker.
    pub async fn handle_oauth_callback(&self, query: &str) -> Result<(), ClientError> {
        let tokens = match CallbackTokens::from_query(query) {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(error = %e, "oauth callback rejected");
                self.navigator
                    .navigate(&format!("{}?error=oauth_failed", self.routes.login));
                return Err(e);
            }
        };

        self.store
            .set_tokens(&tokens.access_token, &tokens.refresh_token)?;

        let user = self.auth.me().await?;
        self.cache_user(&user);
        tracing::info!(user_id = %user.id, "oauth login completed");
        self.set_state(Some(user));
        self.navigator.navigate(&self.routes.dashboard);
        Ok(())
    }

    /// End the session. The backend revocation is best-effort; local
    /// teardown happens regardless of its outcome.
    pub async fn logout(&self) {
        if let Err(e) = self.auth.logout().await {
            tracing::warn!(error = %e, "logout request failed, clearing local session anyway");
        }
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear session storage");
        }
        self.set_state(None);
        tracing::info!("logged out");
    }

    /// Re-fetch the profile (after an edit, say) and replace the cached
    /// copy.
    pub async fn refresh_user(&self) -> Result<(), ClientError> {
        let user = self.auth.me().await?;
        self.cache_user(&user);
        self.set_state(Some(user));
        Ok(())
    }

    fn cache_user(&self, user: &User) {
        if let Err(e) = self.store.set_user(user) {
            tracing::warn!(error = %e, "failed to cache user profile");
        }
    }
}

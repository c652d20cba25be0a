use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use console_core::error::ClientError;

use crate::auth::navigator::Navigator;
use crate::auth::store::TokenStore;
use crate::config::Settings;
use crate::models::TokenPair;

/// Per-call bookkeeping: one id for tracing, one retry budget.
///
/// The budget is scoped to the logical operation, not to any transport
/// object, so rebuilding the request for the retry cannot widen it.
#[derive(Debug)]
struct RequestContext {
    op_id: Uuid,
    retried: bool,
}

impl RequestContext {
    fn new() -> Self {
        Self {
            op_id: Uuid::new_v4(),
            retried: false,
        }
    }

    /// Idempotent; marking twice still means one retry happened.
    fn mark_retried(&mut self) {
        self.retried = true;
    }

    fn retried(&self) -> bool {
        self.retried
    }
}

/// Authenticated HTTP pipeline for the backend API.
///
/// Every request carries the current access token as a bearer credential
/// when one is stored. A 401 triggers at most one refresh-and-retry per
/// logical call; a failed refresh tears the local session down and sends
/// the host to the login route, so the client fails closed.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    login_route: String,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    // Serializes refresh cycles so concurrent 401s share one refresh.
    refresh_gate: Mutex<()>,
}

impl ApiClient {
    pub fn new(
        settings: &Settings,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.api.base_url.trim_end_matches('/').to_string(),
            login_route: settings.routes.login.clone(),
            store,
            navigator,
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue `method path` through the refresh-and-retry pipeline.
    ///
    /// Responses other than the handled 401 pass through unchanged,
    /// whatever their status; decoding helpers below turn failures into
    /// typed errors.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        let mut ctx = RequestContext::new();
        loop {
            let token = self.store.access_token();
            let response = self.send(&method, path, body, token.as_deref()).await?;

            if response.status() != StatusCode::UNAUTHORIZED || ctx.retried() {
                return Ok(response);
            }
            ctx.mark_retried();
            tracing::debug!(op_id = %ctx.op_id, path, "401 received, attempting token refresh");

            match self.refreshed_access_token(token.as_deref()).await? {
                // A fresh pair is in the store; loop around for the retry.
                Some(_) => continue,
                // No refresh token: the original 401 propagates unchanged.
                None => return Ok(response),
            }
        }
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|e| {
            tracing::error!(%url, error = %e, "failed to send request");
            ClientError::TransportError(e)
        })
    }

    /// Run one refresh cycle, deduplicated across concurrent callers.
    ///
    /// Returns the fresh access token, or `None` when there is no refresh
    /// token to try. On refresh failure the stored session is cleared, the
    /// host is redirected to login, and the failure is returned as
    /// [`ClientError::SessionExpired`].
    async fn refreshed_access_token(
        &self,
        stale_access: Option<&str>,
    ) -> Result<Option<String>, ClientError> {
        let _gate = self.refresh_gate.lock().await;

        // A concurrent caller may have rotated the pair while we waited.
        if let Some(current) = self.store.access_token() {
            if stale_access != Some(current.as_str()) {
                tracing::debug!("token already refreshed by a concurrent call");
                return Ok(Some(current));
            }
        }

        let Some(refresh_token) = self.store.refresh_token() else {
            return Ok(None);
        };

        let url = format!("{}/auth/refresh", self.base_url);
        let outcome = self
            .http
            .post(&url)
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await;

        let pair: Result<TokenPair, ClientError> = match outcome {
            Ok(response) if response.status().is_success() => {
                response.json().await.map_err(ClientError::TransportError)
            }
            Ok(response) => Err(ClientError::from_response(response).await),
            Err(e) => Err(ClientError::TransportError(e)),
        };

        match pair {
            Ok(pair) => {
                self.store
                    .set_tokens(&pair.access_token, &pair.refresh_token)?;
                tracing::info!("access token refreshed");
                Ok(Some(pair.access_token))
            }
            Err(source) => {
                tracing::warn!(error = %source, "token refresh failed, ending session");
                if let Err(e) = self.store.clear() {
                    tracing::warn!(error = %e, "failed to clear session storage");
                }
                self.navigator.navigate(&self.login_route);
                Err(ClientError::SessionExpired(Box::new(source)))
            }
        }
    }

    pub async fn get(&self, path: &str) -> Result<Response, ClientError> {
        self.execute(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Response, ClientError> {
        self.execute(Method::POST, path, body).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Response, ClientError> {
        self.execute(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Response, ClientError> {
        self.execute(Method::DELETE, path, None).await
    }

    /// GET and decode a JSON body; non-success statuses become typed errors.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        decode(self.get(path).await?).await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ClientError> {
        decode(self.post(path, body).await?).await
    }

    pub async fn patch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, ClientError> {
        decode(self.patch(path, body).await?).await
    }

    /// POST where only success matters; the response body is discarded.
    pub async fn post_checked(&self, path: &str, body: Option<&Value>) -> Result<(), ClientError> {
        checked(self.post(path, body).await?).await.map(|_| ())
    }

    /// DELETE where only success matters; the response body is discarded.
    pub async fn delete_checked(&self, path: &str) -> Result<(), ClientError> {
        checked(self.delete(path).await?).await.map(|_| ())
    }
}

/// Decode a successful JSON response, mapping failures to typed errors.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = checked(response).await?;
    response.json().await.map_err(ClientError::TransportError)
}

/// Pass a successful response through, mapping failures to typed errors.
pub(crate) async fn checked(response: Response) -> Result<Response, ClientError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ClientError::from_response(response).await)
    }
}

/// Serialize a request payload into a JSON body.
pub(crate) fn to_body<T: serde::Serialize>(value: &T) -> Result<Value, ClientError> {
    serde_json::to_value(value).map_err(|e| ClientError::InternalError(anyhow::Error::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_budget_is_spent_once_per_operation() {
        let mut ctx = RequestContext::new();
        assert!(!ctx.retried());
        ctx.mark_retried();
        ctx.mark_retried();
        assert!(ctx.retried());
    }

    #[test]
    fn operations_get_distinct_ids() {
        let a = RequestContext::new();
        let b = RequestContext::new();
        assert_ne!(a.op_id, b.op_id);
    }
}

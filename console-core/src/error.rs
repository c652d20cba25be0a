use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Error body the backend attaches to failed requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// The backend rejected the credential and no recovery applies: either
    /// there was no refresh token to try, or the retried request was
    /// rejected again.
    #[error("Unauthorized")]
    Unauthorized,

    /// Token refresh failed; the local session has been torn down and the
    /// host redirected to login. Carries the refresh failure as its source.
    #[error("Session expired: {0}")]
    SessionExpired(#[source] Box<ClientError>),

    #[error("API error ({status}): {message}")]
    ApiError {
        status: u16,
        message: String,
        details: Option<String>,
    },

    #[error("Request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("OAuth callback missing {0} parameter")]
    MissingCallbackParam(&'static str),

    #[error("Session storage error: {0}")]
    StorageError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        ClientError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::StorageError(anyhow::Error::new(err))
    }
}

impl ClientError {
    /// Map a failed backend response to a typed error.
    ///
    /// 401 becomes [`ClientError::Unauthorized`]; any other status carries
    /// the backend's `{"error", "details"}` body when it parses, or the raw
    /// response text otherwise.
    pub async fn from_response(response: reqwest::Response) -> ClientError {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return ClientError::Unauthorized;
        }

        let bytes = response.bytes().await.unwrap_or_default();
        match serde_json::from_slice::<ErrorResponse>(&bytes) {
            Ok(body) => ClientError::ApiError {
                status: status.as_u16(),
                message: body.error,
                details: body.details,
            },
            Err(_) => {
                let text = String::from_utf8_lossy(&bytes);
                let text = text.trim();
                let message = if text.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    text.to_string()
                };
                ClientError::ApiError {
                    status: status.as_u16(),
                    message,
                    details: None,
                }
            }
        }
    }
}

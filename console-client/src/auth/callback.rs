use std::fmt;

use serde::Deserialize;

use console_core::error::ClientError;

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
}

/// Token pair extracted from a successful OAuth callback.
#[derive(Clone)]
pub struct CallbackTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for CallbackTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

impl CallbackTokens {
    /// Extract the `token`/`refresh` parameters from the callback URL's
    /// query string. Unknown parameters are ignored; either expected one
    /// missing or empty fails the flow.
    pub fn from_query(query: &str) -> Result<Self, ClientError> {
        let parsed: CallbackQuery = serde_urlencoded::from_str(query)
            .map_err(|_| ClientError::MissingCallbackParam("token"))?;

        let access_token = parsed
            .token
            .filter(|token| !token.is_empty())
            .ok_or(ClientError::MissingCallbackParam("token"))?;
        let refresh_token = parsed
            .refresh
            .filter(|token| !token.is_empty())
            .ok_or(ClientError::MissingCallbackParam("refresh"))?;

        Ok(Self {
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_parameters_present_yields_the_pair() {
        let tokens = CallbackTokens::from_query("token=a1&refresh=r1").unwrap();
        assert_eq!(tokens.access_token, "a1");
        assert_eq!(tokens.refresh_token, "r1");
    }

    #[test]
    fn missing_refresh_is_reported_by_name() {
        let err = CallbackTokens::from_query("token=a1").unwrap_err();
        assert!(matches!(err, ClientError::MissingCallbackParam("refresh")));
    }

    #[test]
    fn missing_token_is_reported_by_name() {
        let err = CallbackTokens::from_query("refresh=r1").unwrap_err();
        assert!(matches!(err, ClientError::MissingCallbackParam("token")));
    }

    #[test]
    fn empty_values_count_as_missing() {
        assert!(CallbackTokens::from_query("token=&refresh=r1").is_err());
        assert!(CallbackTokens::from_query("").is_err());
    }

    #[test]
    fn extra_parameters_are_ignored() {
        let tokens = CallbackTokens::from_query("state=xyz&token=a1&refresh=r1&lang=en").unwrap();
        assert_eq!(tokens.access_token, "a1");
    }

    #[test]
    fn url_encoding_is_decoded() {
        let tokens = CallbackTokens::from_query("token=a%2B1&refresh=r1").unwrap();
        assert_eq!(tokens.access_token, "a+1");
    }
}

use std::fmt;

use serde::Deserialize;

/// Access/refresh pair as returned by the token endpoints.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

// Tokens must not leak through debug output.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_decodes_from_the_refresh_response() {
        let pair: TokenPair = serde_json::from_str(
            r#"{"accessToken":"a1","refreshToken":"r1","expiresIn":"900s","tokenType":"Bearer"}"#,
        )
        .unwrap();
        assert_eq!(pair.access_token, "a1");
        assert_eq!(pair.refresh_token, "r1");
        assert_eq!(pair.token_type.as_deref(), Some("Bearer"));
    }

    #[test]
    fn debug_output_redacts_both_tokens() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"accessToken":"a1","refreshToken":"r1"}"#).unwrap();
        let debug = format!("{pair:?}");
        assert!(!debug.contains("a1"));
        assert!(!debug.contains("r1"));
    }
}

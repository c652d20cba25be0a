use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use console_core::error::ClientError;

use crate::models::{Policy, PolicyCreate, PolicyUpdate};
use crate::services::api::{to_body, ApiClient};

#[derive(Deserialize)]
struct PoliciesEnvelope {
    #[serde(default)]
    policies: Vec<Policy>,
}

#[derive(Deserialize)]
struct PolicyEnvelope {
    policy: Policy,
}

/// Client for the backend's `/policies` endpoints. All of them are
/// admin-gated server-side.
#[derive(Clone)]
pub struct PoliciesApi {
    api: Arc<ApiClient>,
}

impl PoliciesApi {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// List all policies, legacy records included, in normalized form.
    pub async fn list(&self) -> Result<Vec<Policy>, ClientError> {
        let envelope: PoliciesEnvelope = self.api.get_json("/policies").await?;
        Ok(envelope.policies)
    }

    pub async fn get(&self, policy_id: &str) -> Result<Policy, ClientError> {
        let envelope: PolicyEnvelope = self.api.get_json(&format!("/policies/{policy_id}")).await?;
        Ok(envelope.policy)
    }

    /// Create a policy. The payload is validated before any network
    /// traffic happens.
    pub async fn create(&self, policy: &PolicyCreate) -> Result<Policy, ClientError> {
        policy.validate()?;
        let envelope: PolicyEnvelope = self
            .api
            .post_json("/policies", Some(&to_body(policy)?))
            .await?;
        Ok(envelope.policy)
    }

    pub async fn update(
        &self,
        policy_id: &str,
        patch: &PolicyUpdate,
    ) -> Result<Policy, ClientError> {
        let envelope: PolicyEnvelope = self
            .api
            .patch_json(&format!("/policies/{policy_id}"), &to_body(patch)?)
            .await?;
        Ok(envelope.policy)
    }

    pub async fn delete(&self, policy_id: &str) -> Result<(), ClientError> {
        self.api
            .delete_checked(&format!("/policies/{policy_id}"))
            .await
    }

    /// Flip a policy on or off without touching the rest of it.
    pub async fn set_enabled(&self, policy_id: &str, enabled: bool) -> Result<Policy, ClientError> {
        let envelope: PolicyEnvelope = self
            .api
            .patch_json(
                &format!("/policies/{policy_id}"),
                &json!({ "enabled": enabled }),
            )
            .await?;
        Ok(envelope.policy)
    }
}

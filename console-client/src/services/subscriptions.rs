use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use console_core::error::ClientError;

use crate::models::{
    BillingCycle, OverageCharges, PricingInfo, Subscription, SubscriptionLimitsCheck,
    SubscriptionTier,
};
use crate::services::api::ApiClient;

#[derive(Deserialize)]
struct SubscriptionEnvelope {
    subscription: Subscription,
}

#[derive(Deserialize)]
struct SubscriptionsEnvelope {
    #[serde(default)]
    subscriptions: Vec<Subscription>,
}

#[derive(Deserialize)]
struct PricingEnvelope {
    pricing: PricingInfo,
}

/// Client for the backend's `/subscriptions` endpoints.
#[derive(Clone)]
pub struct SubscriptionsApi {
    api: Arc<ApiClient>,
}

impl SubscriptionsApi {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// The current user's subscription.
    pub async fn current(&self) -> Result<Subscription, ClientError> {
        let envelope: SubscriptionEnvelope = self.api.get_json("/subscriptions/me").await?;
        Ok(envelope.subscription)
    }

    /// Whether the account is still inside its tier quota.
    pub async fn limits(&self) -> Result<SubscriptionLimitsCheck, ClientError> {
        self.api.get_json("/subscriptions/me/limits").await
    }

    /// Published price points for every tier.
    pub async fn pricing(&self) -> Result<PricingInfo, ClientError> {
        let envelope: PricingEnvelope = self.api.get_json("/subscriptions/pricing").await?;
        Ok(envelope.pricing)
    }

    pub async fn upgrade(
        &self,
        tier: SubscriptionTier,
        billing_cycle: Option<BillingCycle>,
    ) -> Result<Subscription, ClientError> {
        let body = match billing_cycle {
            Some(cycle) => json!({ "tier": tier, "billingCycle": cycle }),
            None => json!({ "tier": tier }),
        };
        let envelope: SubscriptionEnvelope = self
            .api
            .post_json("/subscriptions/upgrade", Some(&body))
            .await?;
        Ok(envelope.subscription)
    }

    /// Downgrades take effect at the end of the billing period.
    pub async fn downgrade(&self, tier: SubscriptionTier) -> Result<Subscription, ClientError> {
        let envelope: SubscriptionEnvelope = self
            .api
            .post_json("/subscriptions/downgrade", Some(&json!({ "tier": tier })))
            .await?;
        Ok(envelope.subscription)
    }

    pub async fn cancel(&self) -> Result<Subscription, ClientError> {
        let envelope: SubscriptionEnvelope =
            self.api.post_json("/subscriptions/cancel", None).await?;
        Ok(envelope.subscription)
    }

    /// Overage billed beyond the tier quota this period.
    pub async fn overage_charges(&self) -> Result<OverageCharges, ClientError> {
        self.api.get_json("/subscriptions/me/overage").await
    }

    /// List all subscriptions. The backend only answers this for admins.
    pub async fn list(&self) -> Result<Vec<Subscription>, ClientError> {
        let envelope: SubscriptionsEnvelope = self.api.get_json("/subscriptions").await?;
        Ok(envelope.subscriptions)
    }
}

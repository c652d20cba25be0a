use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::SubscriptionTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    PastDue,
    Trialing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

/// Tier quota for the three metered resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionLimits {
    pub forms: u64,
    pub fields: u64,
    pub api_calls: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub tier: SubscriptionTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_cycle: Option<BillingCycle>,
    pub status: SubscriptionStatus,
    pub limits: SubscriptionLimits,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Point-in-time consumption, paired with the limits in a limits check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageCounters {
    pub forms: u64,
    pub fields: u64,
    pub api_calls: u64,
}

/// Answer to "can this account still create things".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionLimitsCheck {
    pub forms_allowed: bool,
    pub fields_allowed: bool,
    pub api_calls_allowed: bool,
    pub limits: SubscriptionLimits,
    pub usage: UsageCounters,
}

/// Price points for one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPricing {
    pub monthly: f64,
    pub yearly: f64,
    pub limits: SubscriptionLimits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingInfo {
    pub free: TierPricing,
    pub pro: TierPricing,
    pub enterprise: TierPricing,
}

/// Overage billed beyond the tier quota for the current period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverageCharges {
    #[serde(default)]
    pub charges: Vec<serde_json::Value>,
    pub total_amount: f64,
    pub currency: String,
}

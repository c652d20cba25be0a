pub mod auth;
pub mod policy;
pub mod session;
pub mod subscription;
pub mod usage;
pub mod user;

pub use auth::TokenPair;
pub use policy::{Effect, Policy, PolicyCreate, PolicyRule, PolicyUpdate};
pub use session::{ApiSession, RevokeAllRequest};
pub use subscription::{
    BillingCycle, OverageCharges, PricingInfo, Subscription, SubscriptionLimits,
    SubscriptionLimitsCheck, SubscriptionStatus, TierPricing, UsageCounters,
};
pub use usage::{UsageRecord, UsageStats};
pub use user::{
    OAuthProvider, Role, SubscriptionTier, User, UserStats, UserStatus, UserUpdate, UserWithStats,
};

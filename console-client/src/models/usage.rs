use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One billing month of metered usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub id: String,
    pub user_id: String,
    /// Billing month in `YYYY-MM` form.
    pub month: String,
    pub forms_created: u64,
    pub fields_generated: u64,
    pub api_calls_made: u64,
    pub total_charges: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dashboard aggregate derived client-side from the current record and the
/// usage history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageStats {
    pub api_calls_this_month: u64,
    pub forms_created: u64,
    pub fields_generated: u64,
    pub months_recorded: usize,
}

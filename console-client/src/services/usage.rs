use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use console_core::error::ClientError;

use crate::models::{UsageRecord, UsageStats};
use crate::services::api::ApiClient;

#[derive(Deserialize)]
struct UsageEnvelope {
    usage: UsageRecord,
}

#[derive(Deserialize)]
struct HistoryEnvelope {
    #[serde(default)]
    history: Vec<UsageRecord>,
}

#[derive(Deserialize)]
struct EventsEnvelope {
    #[serde(default)]
    events: Vec<Value>,
}

/// Client for the backend's `/usage` endpoints.
#[derive(Clone)]
pub struct UsageApi {
    api: Arc<ApiClient>,
}

impl UsageApi {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// The current billing month's record.
    pub async fn current_month(&self) -> Result<UsageRecord, ClientError> {
        let envelope: UsageEnvelope = self.api.get_json("/usage/me").await?;
        Ok(envelope.usage)
    }

    /// Month-by-month usage history, newest first.
    pub async fn history(&self) -> Result<Vec<UsageRecord>, ClientError> {
        let envelope: HistoryEnvelope = self.api.get_json("/usage/me/history").await?;
        Ok(envelope.history)
    }

    /// Most recent metering events, schema-free.
    pub async fn recent_events(&self, limit: usize) -> Result<Vec<Value>, ClientError> {
        let envelope: EventsEnvelope = self
            .api
            .get_json(&format!("/usage/me/events?limit={limit}"))
            .await?;
        Ok(envelope.events)
    }

    /// Dashboard aggregate over the current month plus history.
    pub async fn stats(&self) -> Result<UsageStats, ClientError> {
        let current = self.current_month().await?;
        let history = self.history().await?;
        Ok(UsageStats {
            api_calls_this_month: current.api_calls_made,
            forms_created: current.forms_created,
            fields_generated: current.fields_generated,
            months_recorded: history.len(),
        })
    }
}

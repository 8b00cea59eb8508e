// Audit entry types
use chrono::{DateTime, Utc};
use database_layer::NewHistoryEntry;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;

/// Mutation kinds recorded in analyzer history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
}

impl HistoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryAction::Create => "Create analyzer",
            HistoryAction::Update => "Update analyzer",
            HistoryAction::Delete => "Delete analyzer",
        }
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// History entry waiting for its table to be resolved
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    pub analyzer_id: Uuid,
    pub user_email: String,
    pub action: HistoryAction,
    pub timestamp: DateTime<Utc>,
    pub data: String,
    pub brief: Option<String>,
}

impl PendingEntry {
    /// Timestamped now, with an empty payload and no brief
    pub fn new(analyzer_id: Uuid, user_email: impl Into<String>, action: HistoryAction) -> Self {
        Self {
            analyzer_id,
            user_email: user_email.into(),
            action,
            timestamp: Utc::now(),
            data: "{}".to_string(),
            brief: None,
        }
    }

    /// Store `value` serialized as JSON
    ///
    /// # Errors
    ///
    /// Fails when `value` cannot be serialized.
    pub fn with_data<T: Serialize>(mut self, value: &T) -> Result<Self> {
        self.data = serde_json::to_string(value)?;
        Ok(self)
    }

    pub fn with_brief(mut self, brief: Option<String>) -> Self {
        self.brief = brief;
        self
    }

    pub fn into_history(self, table_id: Uuid) -> NewHistoryEntry {
        NewHistoryEntry {
            analyzer_id: self.analyzer_id,
            table_id,
            user_email: self.user_email,
            action: self.action.as_str().to_string(),
            timestamp: self.timestamp,
            data: self.data,
            brief: self.brief,
        }
    }
}

// Database models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// Top-level keys owned by the server; clients cannot smuggle them in as extras.
pub const RESERVED_FIELDS: &[&str] = &[
    "id",
    "_id",
    "name",
    "actived",
    "performedBy",
    "enabled",
    "createdAt",
    "updatedAt",
    "revision",
    "__v",
];

/// Drop reserved keys from a free-form field map.
pub fn strip_reserved(extra: &mut Map<String, Value>) {
    extra.retain(|key, _| !RESERVED_FIELDS.contains(&key.as_str()));
}

/// Laboratory analyzer tracked by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analyzer {
    pub id: Uuid,
    pub name: String,
    /// Activation status
    pub actived: bool,
    /// Assigned staff member, empty when unassigned
    pub performed_by: String,
    /// Visibility flag; disabled analyzers are hidden from listings
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every update. Server-internal, never part of API payloads.
    #[serde(skip)]
    pub revision: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Analyzer {
    pub fn is_assigned(&self) -> bool {
        !self.performed_by.is_empty()
    }
}

/// Body of a create request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnalyzer {
    pub name: String,
    #[serde(default)]
    pub actived: bool,
    #[serde(default)]
    pub performed_by: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

impl NewAnalyzer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actived: false,
            performed_by: String::new(),
            enabled: true,
            extra: Map::new(),
        }
    }

    /// Build the stored record. Ids and timestamps are assigned here, not by clients.
    pub fn into_analyzer(mut self, now: DateTime<Utc>) -> Analyzer {
        strip_reserved(&mut self.extra);
        Analyzer {
            id: Uuid::new_v4(),
            name: self.name,
            actived: self.actived,
            performed_by: self.performed_by,
            enabled: self.enabled,
            created_at: now,
            updated_at: now,
            revision: 0,
            extra: self.extra,
        }
    }
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalyzerPatch {
    /// True when applying the patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.actived.is_none()
            && self.performed_by.is_none()
            && self.enabled.is_none()
            && self.extra.is_empty()
    }

    /// Extra fields the store may merge, reserved keys removed
    pub fn mergeable_extra(&self) -> Map<String, Value> {
        let mut extra = self.extra.clone();
        strip_reserved(&mut extra);
        extra
    }

    /// Apply onto an in-memory record, bumping its revision
    pub fn apply_to(&self, analyzer: &mut Analyzer, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            analyzer.name.clone_from(name);
        }
        if let Some(actived) = self.actived {
            analyzer.actived = actived;
        }
        if let Some(performed_by) = &self.performed_by {
            analyzer.performed_by.clone_from(performed_by);
        }
        if let Some(enabled) = self.enabled {
            analyzer.enabled = enabled;
        }
        analyzer.extra.extend(self.mergeable_extra());
        analyzer.revision += 1;
        analyzer.updated_at = now;
    }
}

/// Listing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerFilter {
    /// `None` matches both enabled and disabled analyzers
    pub enabled: Option<bool>,
}

impl Default for AnalyzerFilter {
    /// Soft-delete visibility rule: only enabled analyzers
    fn default() -> Self {
        Self {
            enabled: Some(true),
        }
    }
}

impl AnalyzerFilter {
    pub fn all() -> Self {
        Self { enabled: None }
    }

    pub fn matches(&self, analyzer: &Analyzer) -> bool {
        self.enabled.map_or(true, |enabled| analyzer.enabled == enabled)
    }
}

/// Logical category used to tag history entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Table {
    pub id: Uuid,
    pub name: String,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Immutable audit record describing one analyzer mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct HistoryEntry {
    pub id: Uuid,
    #[serde(rename = "analyzer")]
    pub analyzer_id: Uuid,
    #[serde(rename = "table")]
    pub table_id: Uuid,
    #[serde(rename = "user")]
    pub user_email: String,
    pub action: String,
    #[sqlx(rename = "recorded_at")]
    pub timestamp: DateTime<Utc>,
    /// Serialized JSON snapshot of the entity or the update payload
    pub data: String,
    pub brief: Option<String>,
}

/// History entry ready to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryEntry {
    pub analyzer_id: Uuid,
    pub table_id: Uuid,
    pub user_email: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub data: String,
    pub brief: Option<String>,
}

impl NewHistoryEntry {
    pub fn into_entry(self) -> HistoryEntry {
        HistoryEntry {
            id: Uuid::new_v4(),
            analyzer_id: self.analyzer_id,
            table_id: self.table_id,
            user_email: self.user_email,
            action: self.action,
            timestamp: self.timestamp,
            data: self.data,
            brief: self.brief,
        }
    }
}

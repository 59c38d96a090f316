use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An immutable audit record from the data API's event feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: u64,
    #[serde(rename = "type")]
    pub event_type: AuditEventType,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub user: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub acknowledged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    UpdateService,
    UpdateServiceStatus,
    #[serde(other)]
    Unknown,
}

impl AuditEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditEventType::UpdateService => "update_service",
            AuditEventType::UpdateServiceStatus => "update_service_status",
            AuditEventType::Unknown => "unknown",
        }
    }
}

impl AuditEvent {
    fn data_str(&self, key: &str) -> Option<String> {
        match self.data.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    /// `update_service` events reference the snapshots bounding the edit.
    pub fn old_archived_service_id(&self) -> Option<String> {
        self.data_str("oldArchivedServiceId")
    }

    pub fn new_archived_service_id(&self) -> Option<String> {
        self.data_str("newArchivedServiceId")
    }

    /// `update_service_status` events carry the transition endpoints.
    pub fn new_status(&self) -> Option<String> {
        self.data_str("new_status")
    }

    pub fn old_status(&self) -> Option<String> {
        self.data_str("old_status")
    }
}

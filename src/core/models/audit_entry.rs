use serde::{Deserialize, Serialize};

/// Actions that get recorded in the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Snapshot,
    Plan,
    Apply,
    Check,
}

/// A single entry in the audit log (JSON lines format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub author: String,
    pub email: Option<String>,
    pub action: AuditAction,
    pub repository: Option<String>,
    pub environment: Option<String>,
    pub detail: Option<String>,
    /// Fingerprint of the configuration the action ran against.
    pub state_hash: Option<String>,
}

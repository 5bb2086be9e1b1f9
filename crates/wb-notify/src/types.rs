use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wb_core::types::WorkItemId;

/// How long a transient notification stays visible.
pub const DEFAULT_DURATION_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTopic {
    BranchCreated,
    BranchExists,
    PolicyRejected,
    PrerequisiteMissing,
}

/// Action offered alongside a notification, such as opening a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToAction {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub at: DateTime<Utc>,
    pub topic: NotificationTopic,
    pub severity: NotificationSeverity,
    pub duration_ms: u64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<CallToAction>,
    pub work_item_id: WorkItemId,
}

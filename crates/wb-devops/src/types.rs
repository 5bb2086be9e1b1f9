//! Wire shapes of the Git and work-item REST resources.

use serde::{Deserialize, Serialize};
use wb_core::types::{ProjectInfo, RepositoryId};

/// `oldObjectId` value that tells the server the ref must not exist yet.
pub const NULL_OBJECT_ID: &str = "0000000000000000000000000000000000000000";

pub const PATH_RELATIONS_APPEND: &str = "/relations/-";
pub const PATH_STATE_FIELD: &str = "/fields/System.State";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: usize,
    pub value: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamProjectReference {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepository {
    pub id: RepositoryId,
    pub name: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub project: Option<TeamProjectReference>,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl GitRepository {
    pub fn project_info(&self) -> Option<ProjectInfo> {
        self.project.as_ref().map(|project| ProjectInfo {
            id: project.id.clone(),
            name: project.name.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommitRef {
    pub commit_id: String,
}

/// Entry of `stats/branches`; `name` has no `refs/heads/` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitBranchStats {
    pub name: String,
    #[serde(default)]
    pub is_base_version: bool,
    pub commit: GitCommitRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRef {
    pub name: String,
    #[serde(default)]
    pub object_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRefUpdate {
    pub name: String,
    pub repository_id: RepositoryId,
    pub new_object_id: String,
    pub old_object_id: String,
    pub is_locked: bool,
}

impl GitRefUpdate {
    /// Create `refs/heads/<branch_name>` at `commit_id`.
    pub fn create_branch(
        branch_name: &str,
        repository_id: &RepositoryId,
        commit_id: impl Into<String>,
    ) -> Self {
        Self {
            name: crate::links::branch_ref_name(branch_name),
            repository_id: repository_id.clone(),
            new_object_id: commit_id.into(),
            old_object_id: NULL_OBJECT_ID.to_string(),
            is_locked: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RefUpdateStatus {
    Succeeded,
    ForcePushRequired,
    StaleOldObjectId,
    InvalidRefName,
    Unprocessed,
    UnresolvableToCommit,
    WritePermissionRequired,
    ManageNotePermissionRequired,
    CreateBranchPermissionRequired,
    CreateTagPermissionRequired,
    RejectedByPlugin,
    Locked,
    RefNameConflict,
    RejectedByPolicy,
    SucceededNonExistentRef,
    SucceededCorruptRef,
    #[serde(other)]
    Unknown,
}

impl RefUpdateStatus {
    /// The server refused the create because the ref is already there.
    pub fn indicates_existing_ref(self) -> bool {
        matches!(
            self,
            RefUpdateStatus::StaleOldObjectId | RefUpdateStatus::RefNameConflict
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRefUpdateResult {
    pub name: String,
    #[serde(default)]
    pub success: bool,
    pub update_status: RefUpdateStatus,
    #[serde(default)]
    pub custom_message: Option<String>,
    #[serde(default)]
    pub new_object_id: Option<String>,
}

impl GitRefUpdateResult {
    pub fn succeeded(name: impl Into<String>, new_object_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: true,
            update_status: RefUpdateStatus::Succeeded,
            custom_message: None,
            new_object_id: Some(new_object_id.into()),
        }
    }

    pub fn rejected(name: impl Into<String>, status: RefUpdateStatus) -> Self {
        Self {
            name: name.into(),
            success: false,
            update_status: status,
            custom_message: None,
            new_object_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkItemExpand {
    None,
    Relations,
    Fields,
    All,
}

impl WorkItemExpand {
    pub fn as_query_value(self) -> &'static str {
        match self {
            WorkItemExpand::None => "none",
            WorkItemExpand::Relations => "relations",
            WorkItemExpand::Fields => "fields",
            WorkItemExpand::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Test,
}

/// One JSON-patch operation against a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub value: serde_json::Value,
}

impl PatchOperation {
    pub fn add(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            op: PatchOp::Add,
            path: path.into(),
            from: None,
            value,
        }
    }
}

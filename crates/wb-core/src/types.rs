//! Work-item and branch data shared by every workbranch crate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FIELD_WORK_ITEM_TYPE: &str = "System.WorkItemType";
pub const FIELD_TITLE: &str = "System.Title";
pub const FIELD_STATE: &str = "System.State";

pub const REL_HIERARCHY_REVERSE: &str = "System.LinkTypes.Hierarchy-Reverse";
pub const REL_ARTIFACT_LINK: &str = "ArtifactLink";

/// Placeholder used for the type and title of a missing parent.
pub const UNKNOWN_PARENT: &str = "unknown";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct WorkItemId(pub u64);

impl WorkItemId {
    /// Id `0` never names a real work item; it marks the sentinel parent.
    pub fn is_placeholder(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for WorkItemId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<u64>()
            .map(WorkItemId)
            .map_err(|_| format!("invalid work item id '{value}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryId(pub String);

impl RepositoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RepositoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Team project the work items and repositories belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: String,
    pub name: String,
}

/// A single work-item field value as returned by the tracking backend.
///
/// Only `Text` values are sanitized when substituted into a branch name;
/// numbers and booleans are rendered as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Other(serde_json::Value),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(value) => value.clone(),
            FieldValue::Number(value) => value.to_string(),
            FieldValue::Bool(value) => value.to_string(),
            FieldValue::Other(value) => value.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Number(value.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemRelation {
    pub rel: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// Snapshot of a work item fetched for a single operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub relations: Vec<WorkItemRelation>,
}

impl WorkItem {
    pub fn new(id: WorkItemId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
            relations: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_relation(mut self, rel: impl Into<String>, url: impl Into<String>) -> Self {
        self.relations.push(WorkItemRelation {
            rel: rel.into(),
            url: url.into(),
            attributes: BTreeMap::new(),
        });
        self
    }

    /// Typed field lookup; `None` means the field is absent on this item.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn work_item_type(&self) -> Option<&str> {
        self.field(FIELD_WORK_ITEM_TYPE).and_then(FieldValue::as_text)
    }

    pub fn title(&self) -> Option<&str> {
        self.field(FIELD_TITLE).and_then(FieldValue::as_text)
    }

    pub fn parent_link(&self) -> Option<&WorkItemRelation> {
        self.relations
            .iter()
            .find(|relation| relation.rel == REL_HIERARCHY_REVERSE)
    }
}

/// Nearest hierarchical ancestor of a work item, already sanitized for use
/// in ref names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentDetails {
    pub id: WorkItemId,
    #[serde(rename = "type")]
    pub work_item_type: String,
    pub title: String,
    pub branch_name: String,
    pub suffix: String,
}

impl ParentDetails {
    pub fn new(id: WorkItemId, work_item_type: impl Into<String>, title: impl Into<String>) -> Self {
        let work_item_type = work_item_type.into();
        let title = title.into();
        Self {
            branch_name: format!("{work_item_type}/{id}-{title}"),
            suffix: format!("{work_item_type}/{id}/"),
            id,
            work_item_type,
            title,
        }
    }

    pub fn unknown() -> Self {
        Self::new(WorkItemId(0), UNKNOWN_PARENT, UNKNOWN_PARENT)
    }

    pub fn is_unknown(&self) -> bool {
        self.id.is_placeholder()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSource {
    PerType,
    Default,
}

/// Resolved target state for one branch-creation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchDetails {
    /// Present only when the work item has a real parent.
    pub parent_details: Option<ParentDetails>,
    pub branch_name: String,
    pub work_item_type: String,
    pub template_source: TemplateSource,
    /// Template fields that were absent on the work item and substituted as
    /// empty text.
    #[serde(default)]
    pub missing_fields: Vec<String>,
}

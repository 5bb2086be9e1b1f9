//! Configuration for workbranch: backend connection, branch-naming settings
//! and the branch policy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::TemplateSource;

pub const DEFAULT_PAT_ENV: &str = "AZURE_DEVOPS_EXT_PAT";
pub const DEFAULT_BRANCH_NAME_TEMPLATE: &str = "${System.WorkItemType}/${id}-${System.Title}";
pub const DEFAULT_REPLACEMENT: &str = "-";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level `workbranch.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub settings: SettingsDocument,
    #[serde(default)]
    pub policy: BranchPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// e.g. `https://dev.azure.com/contoso`
    pub organization_url: String,
    /// Environment variable holding the personal access token.
    #[serde(default = "default_pat_env")]
    pub pat_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ConnectionConfig {
    pub fn organization_url(&self) -> &str {
        self.organization_url.trim_end_matches('/')
    }

    /// Base URL of the web git UI for a project.
    pub fn git_base_url(&self, project_name: &str) -> String {
        format!("{}/{}/_git", self.organization_url(), project_name)
    }
}

/// An optionally-enabled per-work-item-type value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleValue {
    #[serde(default)]
    pub is_active: bool,
    pub value: String,
}

impl ToggleValue {
    pub fn active(value: impl Into<String>) -> Self {
        Self {
            is_active: true,
            value: value.into(),
        }
    }
}

/// Branch naming and work-item update settings. Read-only during a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsDocument {
    #[serde(default = "default_branch_name_template")]
    pub default_branch_name_template: String,
    /// Keyed by work-item type, e.g. `Bug`.
    #[serde(default)]
    pub branch_name_templates: BTreeMap<String, ToggleValue>,
    #[serde(default = "default_replacement")]
    pub non_alphanumeric_characters_replacement: String,
    #[serde(default)]
    pub lowercase_branch_name: bool,
    #[serde(default)]
    pub update_work_item_state: bool,
    /// Target `System.State` keyed by work-item type.
    #[serde(default)]
    pub work_item_state: BTreeMap<String, ToggleValue>,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            default_branch_name_template: default_branch_name_template(),
            branch_name_templates: BTreeMap::new(),
            non_alphanumeric_characters_replacement: default_replacement(),
            lowercase_branch_name: false,
            update_work_item_state: false,
            work_item_state: BTreeMap::new(),
        }
    }
}

impl SettingsDocument {
    /// Per-type template when one is configured and active, else the default.
    pub fn template_for(&self, work_item_type: &str) -> (&str, TemplateSource) {
        match self.branch_name_templates.get(work_item_type) {
            Some(template) if template.is_active => (template.value.as_str(), TemplateSource::PerType),
            _ => (
                self.default_branch_name_template.as_str(),
                TemplateSource::Default,
            ),
        }
    }

    /// Target state for a work-item type, if state updates are enabled and
    /// the mapping is active.
    pub fn state_for(&self, work_item_type: &str) -> Option<&str> {
        if !self.update_work_item_state {
            return None;
        }
        self.work_item_state
            .get(work_item_type)
            .filter(|state| state.is_active)
            .map(|state| state.value.as_str())
    }

    pub fn replacement(&self) -> &str {
        &self.non_alphanumeric_characters_replacement
    }
}

/// Which work items may get a branch. Empty lists allow everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPolicy {
    /// Compared case-insensitively with the raw work-item type.
    #[serde(default = "default_allowed_work_item_types")]
    pub allowed_work_item_types: Vec<String>,
    /// Compared case-insensitively with the sanitized parent type.
    #[serde(default = "default_allowed_parent_types")]
    pub allowed_parent_types: Vec<String>,
}

impl Default for BranchPolicy {
    fn default() -> Self {
        Self {
            allowed_work_item_types: default_allowed_work_item_types(),
            allowed_parent_types: default_allowed_parent_types(),
        }
    }
}

impl BranchPolicy {
    pub fn allow_all() -> Self {
        Self {
            allowed_work_item_types: Vec::new(),
            allowed_parent_types: Vec::new(),
        }
    }

    pub fn allows_work_item_type(&self, work_item_type: &str) -> bool {
        allows(&self.allowed_work_item_types, work_item_type)
    }

    pub fn allows_parent_type(&self, parent_type: &str) -> bool {
        allows(&self.allowed_parent_types, parent_type)
    }
}

fn allows(list: &[String], candidate: &str) -> bool {
    list.is_empty()
        || list
            .iter()
            .any(|allowed| allowed.trim().eq_ignore_ascii_case(candidate.trim()))
}

fn default_pat_env() -> String {
    DEFAULT_PAT_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_branch_name_template() -> String {
    DEFAULT_BRANCH_NAME_TEMPLATE.to_string()
}

fn default_replacement() -> String {
    DEFAULT_REPLACEMENT.to_string()
}

fn default_allowed_work_item_types() -> Vec<String> {
    vec!["Task".to_string(), "Bug".to_string()]
}

fn default_allowed_parent_types() -> Vec<String> {
    vec!["user-story".to_string(), "vulnerability".to_string()]
}

pub fn parse_app_config(contents: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(contents)
}

pub fn load_app_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path_ref = path.as_ref();
    let body = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
        path: path_ref.to_path_buf(),
        source,
    })?;
    parse_app_config(&body).map_err(|source| ConfigError::Parse {
        path: path_ref.to_path_buf(),
        source,
    })
}

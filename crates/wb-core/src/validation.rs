//! Validation for workbranch configuration.

use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, ConnectionConfig, SettingsDocument};

/// Characters git refuses inside a ref name component.
const ILLEGAL_REF_CHARS: &[char] = &[' ', '~', '^', ':', '?', '*', '[', '\\'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub level: ValidationLevel,
    pub code: &'static str,
    pub message: String,
}

pub trait Validate {
    fn validate(&self) -> Vec<ValidationIssue>;
}

pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues
        .iter()
        .any(|issue| issue.level == ValidationLevel::Error)
}

impl Validate for SettingsDocument {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.default_branch_name_template.trim().is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "settings.default_template.empty",
                message: "default_branch_name_template must not be empty".to_string(),
            });
        } else if !self.default_branch_name_template.contains("${") {
            issues.push(ValidationIssue {
                level: ValidationLevel::Warning,
                code: "settings.default_template.no_tokens",
                message: "default template has no ${...} tokens; every work item gets the same branch name"
                    .to_string(),
            });
        }

        let replacement = &self.non_alphanumeric_characters_replacement;
        if replacement.is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Warning,
                code: "settings.replacement.empty",
                message: "empty replacement drops non-alphanumeric characters from names"
                    .to_string(),
            });
        } else if replacement
            .chars()
            .any(|c| ILLEGAL_REF_CHARS.contains(&c) || c.is_control())
            || replacement.contains("..")
            || replacement.contains("@{")
        {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "settings.replacement.illegal_ref_char",
                message: format!(
                    "replacement {replacement:?} contains characters git rejects in ref names"
                ),
            });
        }

        for (work_item_type, template) in &self.branch_name_templates {
            if template.is_active && template.value.trim().is_empty() {
                issues.push(ValidationIssue {
                    level: ValidationLevel::Error,
                    code: "settings.branch_template.blank",
                    message: format!("active branch template for {work_item_type} is blank"),
                });
            }
        }

        for (work_item_type, state) in &self.work_item_state {
            if state.is_active && state.value.trim().is_empty() {
                issues.push(ValidationIssue {
                    level: ValidationLevel::Error,
                    code: "settings.work_item_state.blank",
                    message: format!("active state mapping for {work_item_type} is blank"),
                });
            }
        }

        if !self.update_work_item_state
            && self.work_item_state.values().any(|state| state.is_active)
        {
            issues.push(ValidationIssue {
                level: ValidationLevel::Warning,
                code: "settings.work_item_state.unused",
                message: "work_item_state mappings are active but update_work_item_state is off"
                    .to_string(),
            });
        }

        issues
    }
}

impl Validate for ConnectionConfig {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let url = self.organization_url.trim();
        if !url.starts_with("https://") && !url.starts_with("http://") {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "connection.organization_url.invalid",
                message: "organization_url should start with http:// or https://".to_string(),
            });
        }

        if self.pat_env.trim().is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "connection.pat_env.empty",
                message: "pat_env must name an environment variable".to_string(),
            });
        }

        if self.timeout_secs == 0 {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "connection.timeout.zero",
                message: "timeout_secs cannot be 0".to_string(),
            });
        }

        issues
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = self.connection.validate();
        issues.extend(self.settings.validate());
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::{has_errors, Validate, ValidationLevel};
    use crate::config::{ConnectionConfig, SettingsDocument, ToggleValue};

    fn valid_connection() -> ConnectionConfig {
        ConnectionConfig {
            organization_url: "https://dev.azure.com/contoso".to_string(),
            pat_env: "AZURE_DEVOPS_EXT_PAT".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn default_settings_are_valid() {
        assert!(SettingsDocument::default().validate().is_empty());
        assert!(valid_connection().validate().is_empty());
    }

    #[test]
    fn settings_validation_reports_blank_template_and_illegal_replacement() {
        let mut settings = SettingsDocument::default();
        settings.default_branch_name_template = " ".to_string();
        settings.non_alphanumeric_characters_replacement = "~".to_string();

        let issues = settings.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|issue| {
            issue.level == ValidationLevel::Error && issue.code == "settings.default_template.empty"
        }));
        assert!(issues.iter().any(|issue| {
            issue.level == ValidationLevel::Error
                && issue.code == "settings.replacement.illegal_ref_char"
        }));
        assert!(has_errors(&issues));
    }

    #[test]
    fn settings_validation_warns_on_tokenless_template_and_empty_replacement() {
        let mut settings = SettingsDocument::default();
        settings.default_branch_name_template = "feature/static".to_string();
        settings.non_alphanumeric_characters_replacement = String::new();

        let issues = settings.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues
            .iter()
            .all(|issue| issue.level == ValidationLevel::Warning));
        assert!(!has_errors(&issues));
    }

    #[test]
    fn settings_validation_reports_blank_active_mappings() {
        let mut settings = SettingsDocument::default();
        settings.update_work_item_state = true;
        settings
            .branch_name_templates
            .insert("Bug".to_string(), ToggleValue::active("  "));
        settings
            .work_item_state
            .insert("Task".to_string(), ToggleValue::active(""));

        let issues = settings.validate();
        assert!(issues
            .iter()
            .any(|issue| issue.code == "settings.branch_template.blank"
                && issue.message.contains("Bug")));
        assert!(issues
            .iter()
            .any(|issue| issue.code == "settings.work_item_state.blank"
                && issue.message.contains("Task")));
    }

    #[test]
    fn settings_validation_warns_when_state_mappings_are_unused() {
        let mut settings = SettingsDocument::default();
        settings
            .work_item_state
            .insert("Task".to_string(), ToggleValue::active("Active"));

        let issues = settings.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "settings.work_item_state.unused");
    }

    #[test]
    fn connection_validation_reports_url_env_and_timeout() {
        let mut connection = valid_connection();
        connection.organization_url = "dev.azure.com/contoso".to_string();
        connection.pat_env = " ".to_string();
        connection.timeout_secs = 0;

        let issues = connection.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues
            .iter()
            .any(|issue| issue.code == "connection.organization_url.invalid"));
        assert!(issues
            .iter()
            .any(|issue| issue.code == "connection.pat_env.empty"));
        assert!(issues
            .iter()
            .any(|issue| issue.code == "connection.timeout.zero"));
    }
}

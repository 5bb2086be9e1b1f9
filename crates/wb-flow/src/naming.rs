//! Resolve the branch name for a work item from the naming settings.

use tracing::{debug, warn};
use wb_core::config::SettingsDocument;
use wb_core::types::{BranchDetails, ParentDetails, WorkItemId};
use wb_devops::service::WorkItemService;
use wb_devops::types::WorkItemExpand;
use wb_template::compose::{compose_branch_name, render_draft, NamingContext};

use crate::error::{FlowError, NamingError};
use crate::parent::ParentResolver;

pub struct BranchNameResolver<'s, W> {
    work_items: W,
    settings: &'s SettingsDocument,
}

impl<'s, W: WorkItemService> BranchNameResolver<'s, W> {
    pub fn new(work_items: W, settings: &'s SettingsDocument) -> Self {
        Self {
            work_items,
            settings,
        }
    }

    /// Deterministic for a given work item and settings. Fails only on
    /// backend errors or when the composed name is empty.
    pub fn resolve(
        &self,
        work_item_id: WorkItemId,
        project: &str,
        source_branch_name: Option<&str>,
    ) -> Result<BranchDetails, FlowError> {
        let parent = ParentResolver::new(&self.work_items, self.settings.replacement())
            .resolve(work_item_id, project)?;
        let item = self
            .work_items
            .get_work_item(work_item_id, project, WorkItemExpand::Fields)?;

        let work_item_type = item.work_item_type().unwrap_or_default().to_string();
        let (template, template_source) = self.settings.template_for(&work_item_type);
        let context = NamingContext {
            work_item: &item,
            source_branch_name,
            replacement: self.settings.replacement(),
        };
        let draft = render_draft(template, &context);
        if !draft.missing_fields.is_empty() {
            warn!(
                work_item = %work_item_id,
                missing = ?draft.missing_fields,
                "template fields missing on work item; substituted as empty"
            );
        }

        let parent_details = real_parent(parent);
        let branch_name = compose_branch_name(
            &draft.name,
            parent_details.as_ref(),
            self.settings.lowercase_branch_name,
        );
        if !is_usable_branch_name(&branch_name) {
            return Err(NamingError::EmptyBranchName {
                work_item_id,
                template: template.to_string(),
            }
            .into());
        }
        debug!(work_item = %work_item_id, branch = %branch_name, ?template_source, "resolved branch name");

        Ok(BranchDetails {
            parent_details,
            branch_name,
            work_item_type,
            template_source,
            missing_fields: draft.missing_fields,
        })
    }
}

/// At least one alphanumeric character and no empty `/` segment.
fn is_usable_branch_name(name: &str) -> bool {
    name.chars().any(|ch| ch.is_ascii_alphanumeric())
        && name.split('/').all(|segment| !segment.is_empty())
}

fn real_parent(parent: ParentDetails) -> Option<ParentDetails> {
    if parent.is_unknown() {
        None
    } else {
        Some(parent)
    }
}

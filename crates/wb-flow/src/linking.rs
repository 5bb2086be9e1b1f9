//! Work-item mutations that follow a ref creation.

use serde_json::json;
use tracing::{info, warn};
use wb_core::config::SettingsDocument;
use wb_core::outcome::{StateSkipReason, StateTransitionOutcome};
use wb_core::types::{ProjectInfo, RepositoryId, WorkItemId, REL_ARTIFACT_LINK};
use wb_devops::error::DevOpsError;
use wb_devops::links::artifact_link_url;
use wb_devops::service::WorkItemService;
use wb_devops::types::{PatchOperation, WorkItemExpand, PATH_RELATIONS_APPEND, PATH_STATE_FIELD};

/// Attach `branch_name` to the work item's development links.
pub fn link_branch_to_work_item<W: WorkItemService>(
    work_items: &W,
    project_id: &str,
    repository_id: &RepositoryId,
    work_item_id: WorkItemId,
    branch_name: &str,
) -> Result<(), DevOpsError> {
    let relation = json!({
        "rel": REL_ARTIFACT_LINK,
        "url": artifact_link_url(project_id, repository_id.as_ref(), branch_name),
        "attributes": { "name": "Branch" },
    });
    work_items.update_work_item(
        &[PatchOperation::add(PATH_RELATIONS_APPEND, relation)],
        work_item_id,
    )?;
    info!(work_item = %work_item_id, branch = branch_name, "linked branch to work item");
    Ok(())
}

/// Move the work item to its configured state. `Ok(Skipped)` when updates
/// are disabled or the item's type has no active mapping.
pub fn update_work_item_state<W: WorkItemService>(
    work_items: &W,
    settings: &SettingsDocument,
    project: &ProjectInfo,
    work_item_id: WorkItemId,
) -> Result<StateTransitionOutcome, DevOpsError> {
    if !settings.update_work_item_state {
        return Ok(StateTransitionOutcome::Skipped {
            reason: StateSkipReason::Disabled,
        });
    }

    let item = work_items.get_work_item(work_item_id, &project.id, WorkItemExpand::Fields)?;
    let work_item_type = item.work_item_type().unwrap_or_default();
    let Some(state) = settings.state_for(work_item_type) else {
        return Ok(StateTransitionOutcome::Skipped {
            reason: StateSkipReason::NoActiveMapping {
                work_item_type: work_item_type.to_string(),
            },
        });
    };

    work_items.update_work_item(
        &[PatchOperation::add(PATH_STATE_FIELD, json!(state))],
        work_item_id,
    )?;
    Ok(StateTransitionOutcome::Applied {
        state: state.to_string(),
    })
}

/// Best-effort wrapper: failures become `Failed` and are only logged.
pub fn transition_state<W: WorkItemService>(
    work_items: &W,
    settings: &SettingsDocument,
    project: &ProjectInfo,
    work_item_id: WorkItemId,
) -> StateTransitionOutcome {
    match update_work_item_state(work_items, settings, project, work_item_id) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(work_item = %work_item_id, error = %err, "work item state update failed");
            StateTransitionOutcome::Failed {
                message: err.to_string(),
            }
        }
    }
}

use wb_core::config::BranchPolicy;
use wb_core::outcome::PolicyRejection;
use wb_core::types::BranchDetails;

/// Work-item type first, then the parent type when a real parent exists.
pub fn check_policy(policy: &BranchPolicy, details: &BranchDetails) -> Result<(), PolicyRejection> {
    if !policy.allows_work_item_type(&details.work_item_type) {
        return Err(PolicyRejection::WorkItemType {
            work_item_type: details.work_item_type.clone(),
            allowed: policy.allowed_work_item_types.clone(),
        });
    }

    if let Some(parent) = &details.parent_details {
        if !policy.allows_parent_type(&parent.work_item_type) {
            return Err(PolicyRejection::ParentType {
                parent_type: parent.work_item_type.clone(),
                allowed: policy.allowed_parent_types.clone(),
            });
        }
    }

    Ok(())
}

use wb_core::outcome::FlowStage;
use wb_core::types::WorkItemId;
use wb_devops::error::DevOpsError;
use wb_devops::types::RefUpdateStatus;

#[derive(Debug, thiserror::Error)]
pub enum NamingError {
    #[error("template '{template}' produced an empty branch name for work item {work_item_id}")]
    EmptyBranchName {
        work_item_id: WorkItemId,
        template: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("devops call failed: {0}")]
    DevOps(#[from] DevOpsError),
    #[error("branch naming failed: {0}")]
    Naming(#[from] NamingError),
    #[error("ref {name} already exists")]
    RefAlreadyExists { name: String },
    #[error("ref update for {name} was rejected: {status:?}")]
    RefUpdateRejected {
        name: String,
        status: RefUpdateStatus,
        message: Option<String>,
    },
    #[error("ref update for {name} returned no result")]
    RefUpdateMissing { name: String },
    #[error("illegal flow transition: {from} -> {to}")]
    IllegalTransition { from: FlowStage, to: FlowStage },
}

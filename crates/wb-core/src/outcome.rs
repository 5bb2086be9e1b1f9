//! Stages and outcomes of a branch-creation flow.
//!
//! Stage graph:
//! ```text
//! Resolving → CheckingTarget → TargetExists
//!                  ↓
//!             NeedsParent → CreatingParent → ParentLinked
//!                  ↓                              ↓
//!             CreatingChild ←─────────────────────┘
//!                  ↓
//!             ChildLinked → Done
//! ```
//! `Aborted` is reachable from every non-terminal stage.

use serde::{Deserialize, Serialize};

use crate::types::{BranchDetails, WorkItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStage {
    Resolving,
    CheckingTarget,
    TargetExists,
    NeedsParent,
    CreatingParent,
    ParentLinked,
    CreatingChild,
    ChildLinked,
    Done,
    Aborted,
}

impl FlowStage {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FlowStage::TargetExists | FlowStage::Done | FlowStage::Aborted
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlowStage::Resolving => "resolving",
            FlowStage::CheckingTarget => "checking_target",
            FlowStage::TargetExists => "target_exists",
            FlowStage::NeedsParent => "needs_parent",
            FlowStage::CreatingParent => "creating_parent",
            FlowStage::ParentLinked => "parent_linked",
            FlowStage::CreatingChild => "creating_child",
            FlowStage::ChildLinked => "child_linked",
            FlowStage::Done => "done",
            FlowStage::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for FlowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_stage_transition_allowed(from: FlowStage, to: FlowStage) -> bool {
    use FlowStage::*;

    if from.is_terminal() {
        return false;
    }
    if to == Aborted {
        return true;
    }

    matches!(
        (from, to),
        (Resolving, CheckingTarget)
            | (CheckingTarget, TargetExists)
            | (CheckingTarget, NeedsParent)
            | (CheckingTarget, CreatingChild)
            | (NeedsParent, CreatingParent)
            // parent branch already present
            | (NeedsParent, CreatingChild)
            | (CreatingParent, ParentLinked)
            | (ParentLinked, CreatingChild)
            | (CreatingChild, ChildLinked)
            | (ChildLinked, Done)
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PolicyRejection {
    WorkItemType {
        work_item_type: String,
        allowed: Vec<String>,
    },
    ParentType {
        parent_type: String,
        allowed: Vec<String>,
    },
}

impl std::fmt::Display for PolicyRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyRejection::WorkItemType {
                work_item_type,
                allowed,
            } => write!(
                f,
                "create a {} and branch from that instead of working directly on this {work_item_type}",
                allowed.join("/")
            ),
            PolicyRejection::ParentType {
                parent_type,
                allowed,
            } => write!(
                f,
                "branch only on items that sit under a {}; parent is {parent_type}",
                allowed.join("/")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MissingPrerequisite {
    DefaultBranchNotFound,
    BaseBranchNotFound { branch_name: String },
}

impl std::fmt::Display for MissingPrerequisite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingPrerequisite::DefaultBranchNotFound => f.write_str("Default branch not found"),
            MissingPrerequisite::BaseBranchNotFound { branch_name } => {
                write!(f, "Branch {branch_name} not found")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StateSkipReason {
    Disabled,
    NoActiveMapping { work_item_type: String },
}

/// Result of the best-effort work-item state update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StateTransitionOutcome {
    Applied { state: String },
    Skipped { reason: StateSkipReason },
    Failed { message: String },
}

impl StateTransitionOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StateTransitionOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ParentBranchOutcome {
    NotRequired,
    Existing {
        branch_name: String,
    },
    /// Required but absent, and nothing to create it from.
    Missing {
        work_item_id: WorkItemId,
        branch_name: String,
    },
    Created {
        work_item_id: WorkItemId,
        branch_name: String,
        state_transition: StateTransitionOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BranchOutcome {
    /// Policy refused the work item; nothing was mutated.
    Rejected { rejection: PolicyRejection },
    /// The branch is already there; nothing was mutated.
    AlreadyExists {
        branch_name: String,
        branch_url: String,
    },
    /// A required branch could not be located. A parent created earlier in
    /// the same flow is left in place.
    Aborted {
        missing: MissingPrerequisite,
        parent: ParentBranchOutcome,
    },
    Created {
        branch_name: String,
        branch_url: String,
        parent: ParentBranchOutcome,
        state_transition: StateTransitionOutcome,
    },
}

impl BranchOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, BranchOutcome::Created { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCreationReport {
    pub work_item_id: WorkItemId,
    pub details: BranchDetails,
    pub outcome: BranchOutcome,
    /// Stages in the order they were entered.
    pub stages: Vec<FlowStage>,
}

//! Turn flow reports into user-facing notifications.

use chrono::Utc;
use wb_core::outcome::{BranchCreationReport, BranchOutcome, ParentBranchOutcome};

use crate::types::{
    CallToAction, NotificationMessage, NotificationSeverity, NotificationTopic,
    DEFAULT_DURATION_MS,
};

pub const OPEN_BRANCH_LABEL: &str = "Open branch";

pub fn parent_summary(parent: &ParentBranchOutcome) -> Option<&'static str> {
    match parent {
        ParentBranchOutcome::NotRequired | ParentBranchOutcome::Missing { .. } => None,
        ParentBranchOutcome::Existing { .. } => Some("Parent Branch exists."),
        ParentBranchOutcome::Created { .. } => Some("Parent Branch created."),
    }
}

pub fn notification_for_outcome(report: &BranchCreationReport) -> NotificationMessage {
    let (topic, severity, message, call_to_action) = match &report.outcome {
        BranchOutcome::Rejected { rejection } => (
            NotificationTopic::PolicyRejected,
            NotificationSeverity::Warning,
            rejection.to_string(),
            None,
        ),
        BranchOutcome::AlreadyExists {
            branch_name,
            branch_url,
        } => (
            NotificationTopic::BranchExists,
            NotificationSeverity::Info,
            format!("Branch {branch_name} already exists"),
            Some(CallToAction {
                label: OPEN_BRANCH_LABEL.to_string(),
                url: branch_url.clone(),
            }),
        ),
        BranchOutcome::Aborted { missing, .. } => (
            NotificationTopic::PrerequisiteMissing,
            NotificationSeverity::Warning,
            missing.to_string(),
            None,
        ),
        BranchOutcome::Created {
            branch_name,
            parent,
            ..
        } => {
            let created = format!("Branch {branch_name} created.");
            let message = match parent_summary(parent) {
                Some(summary) => format!("{summary} {created}"),
                None => created,
            };
            (
                NotificationTopic::BranchCreated,
                NotificationSeverity::Info,
                message,
                None,
            )
        }
    };

    NotificationMessage {
        at: Utc::now(),
        topic,
        severity,
        duration_ms: DEFAULT_DURATION_MS,
        message,
        call_to_action,
        work_item_id: report.work_item_id,
    }
}

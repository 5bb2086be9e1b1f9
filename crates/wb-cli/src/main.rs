mod cli;

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use wb_core::config::{load_app_config, AppConfig, ConfigError};
use wb_core::outcome::{BranchCreationReport, BranchOutcome};
use wb_core::types::{ProjectInfo, RepositoryId};
use wb_core::validation::{has_errors, Validate, ValidationIssue, ValidationLevel};
use wb_devops::client::AzureDevOpsClient;
use wb_devops::error::DevOpsError;
use wb_devops::service::GitRefService;
use wb_flow::{BranchCreator, BranchPreview, BranchRequest, FlowError};
use wb_notify::sink::{
    CommandNavigator, LogNavigator, LogNotifier, Navigator, Notifier, StdoutNavigator,
    StdoutNotifier,
};

use crate::cli::{Cli, Command, CreateArgs, PreviewArgs};

#[derive(Debug, thiserror::Error)]
enum MainError {
    #[error("failed to load config at {path}: {source}")]
    LoadConfig {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error("config validation failed ({0})")]
    InvalidConfig(String),
    #[error(transparent)]
    DevOps(#[from] DevOpsError),
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error("repository {repository} has no project; pass --project-id")]
    MissingProjectId { repository: String },
    #[error("failed to encode report as json: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
    #[error("{failed} of {total} work items failed")]
    BranchFailures { failed: usize, total: usize },
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("workbranch failed: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), MainError> {
    let cli = Cli::parse();
    let config = load_app_config(&cli.config).map_err(|source| MainError::LoadConfig {
        path: cli.config.clone(),
        source,
    })?;

    match cli.command {
        Command::CheckConfig => run_check_config(&config, cli.json),
        Command::Create(args) => run_create(&config, args, cli.json),
        Command::Preview(args) => run_preview(&config, args, cli.json),
    }
}

fn run_check_config(config: &AppConfig, json: bool) -> Result<(), MainError> {
    let issues = config.validate();
    if json {
        println!("{}", to_json(&issues)?);
    } else if issues.is_empty() {
        println!("config ok");
    } else {
        for issue in &issues {
            println!("{}", render_issue(issue));
        }
    }
    ensure_valid(&issues)
}

fn run_create(config: &AppConfig, args: CreateArgs, json: bool) -> Result<(), MainError> {
    ensure_valid(&config.validate())?;
    let client = AzureDevOpsClient::from_connection(&config.connection)?;

    let repository = client.get_repository(&RepositoryId::new(args.repository.as_str()), &args.project)?;
    let project_id = match (&args.project_id, repository.project_info()) {
        (Some(id), _) => id.clone(),
        (None, Some(project)) => project.id,
        (None, None) => {
            return Err(MainError::MissingProjectId {
                repository: repository.name,
            })
        }
    };
    let project = ProjectInfo {
        id: project_id,
        name: args.project.clone(),
    };
    info!(repository = %repository.name, project = %project.name, "creating branches");

    let notifier = notifier_for(json);
    let navigator = navigator_for(json, args.open_with.as_deref());
    let creator = BranchCreator::new(
        &client,
        &client,
        notifier.as_ref(),
        navigator.as_ref(),
        config.settings.clone(),
        config.policy.clone(),
    );

    let requests = args
        .work_items
        .iter()
        .map(|&work_item_id| BranchRequest {
            work_item_id,
            repository_id: repository.id.clone(),
            project: project.clone(),
            source_branch: args.source_branch.clone(),
            git_base_url: config.connection.git_base_url(&project.name),
        })
        .collect::<Vec<_>>();

    let results = creator.create_branches(&requests);
    let total = results.len();
    let mut reports = Vec::new();
    let mut failed = 0;
    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(report) => reports.push(report),
            Err(err) => {
                failed += 1;
                eprintln!("work item {}: {err}", request.work_item_id);
            }
        }
    }

    if json {
        println!("{}", to_json(&reports)?);
    } else {
        for report in &reports {
            println!("{}", render_report(report));
        }
    }

    if failed > 0 {
        return Err(MainError::BranchFailures { failed, total });
    }
    Ok(())
}

fn run_preview(config: &AppConfig, args: PreviewArgs, json: bool) -> Result<(), MainError> {
    ensure_valid(&config.validate())?;
    let client = AzureDevOpsClient::from_connection(&config.connection)?;
    let creator = BranchCreator::new(
        &client,
        &client,
        LogNotifier,
        LogNavigator,
        config.settings.clone(),
        config.policy.clone(),
    );

    let previews = creator.preview(&args.work_items, &args.project, args.source_branch.as_deref())?;
    if json {
        let rendered = previews
            .iter()
            .map(|preview| {
                serde_json::json!({
                    "work_item_id": preview.work_item_id,
                    "details": preview.details,
                    "rejection": preview.verdict.as_ref().err(),
                })
            })
            .collect::<Vec<_>>();
        println!("{}", to_json(&rendered)?);
    } else {
        for preview in &previews {
            println!("{}", render_preview(preview));
        }
    }
    Ok(())
}

fn notifier_for(json: bool) -> Box<dyn Notifier> {
    if json {
        Box::new(LogNotifier)
    } else {
        Box::new(StdoutNotifier)
    }
}

fn navigator_for(json: bool, open_with: Option<&str>) -> Box<dyn Navigator> {
    if let Some(navigator) = open_with.and_then(CommandNavigator::from_command_line) {
        return Box::new(navigator);
    }
    if json {
        Box::new(LogNavigator)
    } else {
        Box::new(StdoutNavigator)
    }
}

fn ensure_valid(issues: &[ValidationIssue]) -> Result<(), MainError> {
    if !has_errors(issues) {
        return Ok(());
    }

    let rendered = issues
        .iter()
        .filter(|issue| issue.level == ValidationLevel::Error)
        .map(|issue| format!("{}: {}", issue.code, issue.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(MainError::InvalidConfig(rendered))
}

fn render_issue(issue: &ValidationIssue) -> String {
    let level = match issue.level {
        ValidationLevel::Error => "error",
        ValidationLevel::Warning => "warning",
    };
    format!("{level} {}: {}", issue.code, issue.message)
}

fn render_report(report: &BranchCreationReport) -> String {
    let status = match &report.outcome {
        BranchOutcome::Rejected { rejection } => format!("rejected ({rejection})"),
        BranchOutcome::AlreadyExists { branch_url, .. } => format!("exists {branch_url}"),
        BranchOutcome::Aborted { missing, .. } => format!("aborted ({missing})"),
        BranchOutcome::Created { branch_url, .. } => format!("created {branch_url}"),
    };
    format!(
        "{}\t{}\t{status}",
        report.work_item_id, report.details.branch_name
    )
}

fn render_preview(preview: &BranchPreview) -> String {
    let verdict = match &preview.verdict {
        Ok(()) => "allowed".to_string(),
        Err(rejection) => format!("rejected ({rejection})"),
    };
    let mut line = format!(
        "{}\t{}\t{verdict}",
        preview.work_item_id, preview.details.branch_name
    );
    if !preview.details.missing_fields.is_empty() {
        line.push_str(&format!(
            "\tmissing: {}",
            preview.details.missing_fields.join(",")
        ));
    }
    line
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, MainError> {
    serde_json::to_string_pretty(value).map_err(|source| MainError::Encode { source })
}

#[cfg(test)]
mod tests {
    use super::{ensure_valid, render_issue, render_preview, render_report, MainError};
    use wb_core::outcome::{
        BranchCreationReport, BranchOutcome, FlowStage, MissingPrerequisite,
        ParentBranchOutcome, PolicyRejection,
    };
    use wb_core::types::{BranchDetails, TemplateSource, WorkItemId};
    use wb_core::validation::{ValidationIssue, ValidationLevel};
    use wb_flow::BranchPreview;

    fn details(missing: &[&str]) -> BranchDetails {
        BranchDetails {
            parent_details: None,
            branch_name: "task/7-docs".to_string(),
            work_item_type: "Task".to_string(),
            template_source: TemplateSource::Default,
            missing_fields: missing.iter().map(|field| field.to_string()).collect(),
        }
    }

    #[test]
    fn ensure_valid_rejects_error_level_issues_only() {
        let warning = ValidationIssue {
            level: ValidationLevel::Warning,
            code: "settings.work_item_state.unused",
            message: "unused".to_string(),
        };
        assert!(ensure_valid(std::slice::from_ref(&warning)).is_ok());

        let error = ValidationIssue {
            level: ValidationLevel::Error,
            code: "connection.timeout.zero",
            message: "timeout must be positive".to_string(),
        };
        let err = ensure_valid(&[warning, error]).expect_err("error-level issue");
        assert!(matches!(err, MainError::InvalidConfig(ref text)
            if text == "connection.timeout.zero: timeout must be positive"));
    }

    #[test]
    fn renders_issue_with_level_prefix() {
        let issue = ValidationIssue {
            level: ValidationLevel::Warning,
            code: "settings.work_item_state.unused",
            message: "state mappings are ignored".to_string(),
        };
        assert_eq!(
            render_issue(&issue),
            "warning settings.work_item_state.unused: state mappings are ignored"
        );
    }

    #[test]
    fn renders_report_per_outcome() {
        let report = BranchCreationReport {
            work_item_id: WorkItemId(7),
            details: details(&[]),
            outcome: BranchOutcome::Aborted {
                missing: MissingPrerequisite::DefaultBranchNotFound,
                parent: ParentBranchOutcome::NotRequired,
            },
            stages: vec![FlowStage::Resolving, FlowStage::Aborted],
        };
        assert_eq!(
            render_report(&report),
            "7\ttask/7-docs\taborted (Default branch not found)"
        );
    }

    #[test]
    fn renders_preview_with_verdict_and_missing_fields() {
        let preview = BranchPreview {
            work_item_id: WorkItemId(7),
            details: details(&["Custom.Area"]),
            verdict: Err(PolicyRejection::WorkItemType {
                work_item_type: "Epic".to_string(),
                allowed: vec!["Task".to_string()],
            }),
        };
        let line = render_preview(&preview);
        assert!(line.starts_with("7\ttask/7-docs\trejected ("));
        assert!(line.ends_with("\tmissing: Custom.Area"));
    }
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use wb_core::types::WorkItemId;

pub const DEFAULT_CONFIG_PATH: &str = "workbranch.toml";

#[derive(Parser, Debug)]
#[command(
    name = "workbranch",
    version,
    about = "Create Git branches for Azure DevOps work items",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Config file.
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Print reports as JSON on stdout; notifications go to the log.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a branch for each work item, parent branches first.
    Create(CreateArgs),
    /// Show the branch names and policy verdicts without creating anything.
    Preview(PreviewArgs),
    /// Validate the config file.
    CheckConfig,
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Project name.
    #[arg(long)]
    pub project: String,

    /// Repository id or name.
    #[arg(long)]
    pub repository: String,

    #[arg(long = "work-item", value_name = "ID", required = true)]
    pub work_items: Vec<WorkItemId>,

    /// Branch the new branches from this branch.
    #[arg(long, value_name = "BRANCH")]
    pub source_branch: Option<String>,

    /// Project id used in branch links; defaults to the repository's project.
    #[arg(long, value_name = "ID")]
    pub project_id: Option<String>,

    /// Command used to open the created branch, e.g. `xdg-open`.
    #[arg(long, value_name = "CMD")]
    pub open_with: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    #[arg(long)]
    pub project: String,

    #[arg(long = "work-item", value_name = "ID", required = true)]
    pub work_items: Vec<WorkItemId>,

    #[arg(long, value_name = "BRANCH")]
    pub source_branch: Option<String>,
}

//! Branch creation for one or more work items.
//!
//! The flow walks the stage graph in `wb_core::outcome`: resolve the name and
//! apply policy, stop if the target already exists, make sure a required
//! parent branch exists, then create and link the child. Every remote call
//! is issued at most once per flow and nothing is rolled back.

use tracing::{debug, info, warn};
use wb_core::config::{BranchPolicy, SettingsDocument};
use wb_core::outcome::{
    is_stage_transition_allowed, BranchCreationReport, BranchOutcome, FlowStage,
    MissingPrerequisite, ParentBranchOutcome, PolicyRejection,
};
use wb_core::types::{BranchDetails, ProjectInfo, RepositoryId, WorkItemId};
use wb_devops::links::{branch_ref_filter, branch_ref_name, branch_url};
use wb_devops::service::{GitRefService, WorkItemService};
use wb_devops::types::{GitBranchStats, GitRefUpdate};
use wb_notify::mapper::notification_for_outcome;
use wb_notify::sink::{notify_best_effort, open_best_effort, Navigator, Notifier};

use crate::error::FlowError;
use crate::linking::{link_branch_to_work_item, transition_state};
use crate::naming::BranchNameResolver;
use crate::policy::check_policy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRequest {
    pub work_item_id: WorkItemId,
    pub repository_id: RepositoryId,
    pub project: ProjectInfo,
    /// Base the child on this branch instead of the parent/default branch.
    pub source_branch: Option<String>,
    /// `<organization>/<project>/_git`
    pub git_base_url: String,
}

/// Name and policy verdict for a work item, computed without mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPreview {
    pub work_item_id: WorkItemId,
    pub details: BranchDetails,
    pub verdict: Result<(), PolicyRejection>,
}

/// Stage history of a single flow.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StageTrail {
    stages: Vec<FlowStage>,
}

impl StageTrail {
    fn start() -> Self {
        Self {
            stages: vec![FlowStage::Resolving],
        }
    }

    fn current(&self) -> FlowStage {
        self.stages
            .last()
            .copied()
            .unwrap_or(FlowStage::Resolving)
    }

    fn enter(&mut self, to: FlowStage) -> Result<(), FlowError> {
        let from = self.current();
        if !is_stage_transition_allowed(from, to) {
            return Err(FlowError::IllegalTransition { from, to });
        }
        debug!(%from, %to, "flow stage");
        self.stages.push(to);
        Ok(())
    }
}

pub struct BranchCreator<G, W, N, V> {
    git: G,
    work_items: W,
    notifier: N,
    navigator: V,
    settings: SettingsDocument,
    policy: BranchPolicy,
}

impl<G, W, N, V> BranchCreator<G, W, N, V>
where
    G: GitRefService,
    W: WorkItemService,
    N: Notifier,
    V: Navigator,
{
    pub fn new(
        git: G,
        work_items: W,
        notifier: N,
        navigator: V,
        settings: SettingsDocument,
        policy: BranchPolicy,
    ) -> Self {
        Self {
            git,
            work_items,
            notifier,
            navigator,
            settings,
            policy,
        }
    }

    pub fn settings(&self) -> &SettingsDocument {
        &self.settings
    }

    /// Resolve names and policy verdicts for `work_item_ids` without
    /// touching any ref or work item.
    pub fn preview(
        &self,
        work_item_ids: &[WorkItemId],
        project: &str,
        source_branch: Option<&str>,
    ) -> Result<Vec<BranchPreview>, FlowError> {
        let resolver = BranchNameResolver::new(&self.work_items, &self.settings);
        work_item_ids
            .iter()
            .map(|&work_item_id| -> Result<BranchPreview, FlowError> {
                let details = resolver.resolve(work_item_id, project, source_branch)?;
                let verdict = check_policy(&self.policy, &details);
                Ok(BranchPreview {
                    work_item_id,
                    details,
                    verdict,
                })
            })
            .collect()
    }

    /// Run the flow once per request, in order. An error on one request
    /// does not stop the ones after it.
    pub fn create_branches(
        &self,
        requests: &[BranchRequest],
    ) -> Vec<Result<BranchCreationReport, FlowError>> {
        requests
            .iter()
            .map(|request| {
                let result = self.create_branch(request);
                if let Err(err) = &result {
                    warn!(work_item = %request.work_item_id, error = %err, "branch creation failed");
                }
                result
            })
            .collect()
    }

    pub fn create_branch(&self, request: &BranchRequest) -> Result<BranchCreationReport, FlowError> {
        let mut trail = StageTrail::start();
        let project_name = request.project.name.as_str();

        let repository = self
            .git
            .get_repository(&request.repository_id, project_name)?;
        let details = BranchNameResolver::new(&self.work_items, &self.settings).resolve(
            request.work_item_id,
            project_name,
            request.source_branch.as_deref(),
        )?;
        let branch_name = details.branch_name.clone();
        let url = branch_url(&request.git_base_url, &repository.name, &branch_name);

        if let Err(rejection) = check_policy(&self.policy, &details) {
            info!(work_item = %request.work_item_id, %rejection, "branch rejected by policy");
            trail.enter(FlowStage::Aborted)?;
            return Ok(self.finish(request, details, trail, BranchOutcome::Rejected { rejection }));
        }

        trail.enter(FlowStage::CheckingTarget)?;
        if self.branch_exists(request, &branch_name)? {
            info!(branch = %branch_name, repository = %repository.name, "branch already exists");
            trail.enter(FlowStage::TargetExists)?;
            let outcome = BranchOutcome::AlreadyExists {
                branch_name,
                branch_url: url,
            };
            return Ok(self.finish(request, details, trail, outcome));
        }

        let parent = match &details.parent_details {
            None => ParentBranchOutcome::NotRequired,
            Some(parent) => {
                trail.enter(FlowStage::NeedsParent)?;
                if self.branch_exists(request, &parent.branch_name)? {
                    ParentBranchOutcome::Existing {
                        branch_name: parent.branch_name.clone(),
                    }
                } else {
                    let branches = self.branches(request)?;
                    let Some(default_branch) = default_branch(&branches) else {
                        let missing = MissingPrerequisite::DefaultBranchNotFound;
                        warn!(work_item = %request.work_item_id, "{missing}");
                        trail.enter(FlowStage::Aborted)?;
                        let outcome = BranchOutcome::Aborted {
                            missing,
                            parent: ParentBranchOutcome::Missing {
                                work_item_id: parent.id,
                                branch_name: parent.branch_name.clone(),
                            },
                        };
                        return Ok(self.finish(request, details, trail, outcome));
                    };

                    trail.enter(FlowStage::CreatingParent)?;
                    self.create_ref(
                        request,
                        &parent.branch_name,
                        &default_branch.commit.commit_id,
                    )?;
                    link_branch_to_work_item(
                        &self.work_items,
                        &request.project.id,
                        &request.repository_id,
                        parent.id,
                        &parent.branch_name,
                    )?;
                    trail.enter(FlowStage::ParentLinked)?;
                    let state_transition = transition_state(
                        &self.work_items,
                        &self.settings,
                        &request.project,
                        parent.id,
                    );
                    info!(branch = %parent.branch_name, repository = %repository.name, "parent branch created");
                    ParentBranchOutcome::Created {
                        work_item_id: parent.id,
                        branch_name: parent.branch_name.clone(),
                        state_transition,
                    }
                }
            }
        };

        trail.enter(FlowStage::CreatingChild)?;
        let branches = self.branches(request)?;
        let base = match (&request.source_branch, &details.parent_details) {
            (Some(source), _) => find_branch(&branches, source).ok_or_else(|| {
                MissingPrerequisite::BaseBranchNotFound {
                    branch_name: source.clone(),
                }
            }),
            (None, Some(parent)) => find_branch(&branches, &parent.branch_name).ok_or_else(|| {
                MissingPrerequisite::BaseBranchNotFound {
                    branch_name: parent.branch_name.clone(),
                }
            }),
            (None, None) => {
                default_branch(&branches).ok_or(MissingPrerequisite::DefaultBranchNotFound)
            }
        };
        let base = match base {
            Ok(base) => base,
            Err(missing) => {
                warn!(work_item = %request.work_item_id, "{missing}");
                trail.enter(FlowStage::Aborted)?;
                let outcome = BranchOutcome::Aborted { missing, parent };
                return Ok(self.finish(request, details, trail, outcome));
            }
        };

        self.create_ref(request, &branch_name, &base.commit.commit_id)?;
        link_branch_to_work_item(
            &self.work_items,
            &request.project.id,
            &request.repository_id,
            request.work_item_id,
            &branch_name,
        )?;
        trail.enter(FlowStage::ChildLinked)?;
        let state_transition = transition_state(
            &self.work_items,
            &self.settings,
            &request.project,
            request.work_item_id,
        );
        info!(branch = %branch_name, repository = %repository.name, "branch created");
        trail.enter(FlowStage::Done)?;

        let outcome = BranchOutcome::Created {
            branch_name,
            branch_url: url.clone(),
            parent,
            state_transition,
        };
        let report = self.finish(request, details, trail, outcome);
        open_best_effort(&self.navigator, &url);
        Ok(report)
    }

    fn finish(
        &self,
        request: &BranchRequest,
        details: BranchDetails,
        trail: StageTrail,
        outcome: BranchOutcome,
    ) -> BranchCreationReport {
        let report = BranchCreationReport {
            work_item_id: request.work_item_id,
            details,
            outcome,
            stages: trail.stages,
        };
        notify_best_effort(&self.notifier, &notification_for_outcome(&report));
        report
    }

    fn branches(&self, request: &BranchRequest) -> Result<Vec<GitBranchStats>, FlowError> {
        Ok(self
            .git
            .get_branches(&request.repository_id, &request.project.name)?)
    }

    /// The refs filter is a prefix match, so look for the exact ref name.
    fn branch_exists(&self, request: &BranchRequest, branch_name: &str) -> Result<bool, FlowError> {
        let target = branch_ref_name(branch_name);
        let refs = self.git.get_refs(
            &request.repository_id,
            &request.project.name,
            &branch_ref_filter(branch_name),
        )?;
        Ok(refs.iter().any(|git_ref| git_ref.name == target))
    }

    fn create_ref(
        &self,
        request: &BranchRequest,
        branch_name: &str,
        commit_id: &str,
    ) -> Result<(), FlowError> {
        let update = GitRefUpdate::create_branch(branch_name, &request.repository_id, commit_id);
        let name = update.name.clone();
        let results = self
            .git
            .update_refs(std::slice::from_ref(&update), &request.repository_id)?;
        let result = results
            .into_iter()
            .find(|result| result.name == name)
            .ok_or_else(|| FlowError::RefUpdateMissing { name: name.clone() })?;

        if result.success {
            debug!(%name, commit = commit_id, "ref created");
            return Ok(());
        }
        if result.update_status.indicates_existing_ref() {
            return Err(FlowError::RefAlreadyExists { name });
        }
        Err(FlowError::RefUpdateRejected {
            name,
            status: result.update_status,
            message: result.custom_message,
        })
    }
}

fn default_branch(branches: &[GitBranchStats]) -> Option<&GitBranchStats> {
    branches.iter().find(|branch| branch.is_base_version)
}

fn find_branch<'a>(branches: &'a [GitBranchStats], name: &str) -> Option<&'a GitBranchStats> {
    branches.iter().find(|branch| branch.name == name)
}

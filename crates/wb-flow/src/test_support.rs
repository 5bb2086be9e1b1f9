//! In-memory fakes of the DevOps services and UI surfaces for flow tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use wb_core::types::{
    RepositoryId, WorkItem, WorkItemId, FIELD_TITLE, FIELD_WORK_ITEM_TYPE, REL_HIERARCHY_REVERSE,
};
use wb_devops::error::DevOpsError;
use wb_devops::service::{GitRefService, WorkItemService};
use wb_devops::types::{
    GitBranchStats, GitCommitRef, GitRef, GitRefUpdate, GitRefUpdateResult, GitRepository,
    PatchOperation, RefUpdateStatus, TeamProjectReference, WorkItemExpand, PATH_STATE_FIELD,
};
use wb_notify::error::NotifyError;
use wb_notify::sink::{Navigator, Notifier, NotifierKind};
use wb_notify::types::NotificationMessage;

pub const REPO_ID: &str = "repo-1";
pub const PROJECT_ID: &str = "proj-1";
pub const PROJECT_NAME: &str = "Fabrikam";
pub const DEFAULT_COMMIT: &str = "c0ffee";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetRepository,
    GetBranches,
    GetRefs { filter: String },
    UpdateRefs { name: String, new_object_id: String },
    GetWorkItem { id: WorkItemId, expand: WorkItemExpand },
    UpdateWorkItem { id: WorkItemId, path: String, value: serde_json::Value },
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Call::UpdateRefs { .. } | Call::UpdateWorkItem { .. })
    }
}

#[derive(Debug)]
struct FakeState {
    repository: GitRepository,
    branches: Vec<GitBranchStats>,
    work_items: BTreeMap<WorkItemId, WorkItem>,
    calls: Vec<Call>,
    ref_status_override: Option<RefUpdateStatus>,
    fail_state_updates: bool,
}

#[derive(Debug)]
pub struct FakeDevOps {
    state: Mutex<FakeState>,
}

impl Default for FakeDevOps {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDevOps {
    /// Repository `Fabrikam` with a single default branch `main`.
    pub fn new() -> Self {
        let repository = GitRepository {
            id: RepositoryId::new(REPO_ID),
            name: PROJECT_NAME.to_string(),
            default_branch: Some("refs/heads/main".to_string()),
            project: Some(TeamProjectReference {
                id: PROJECT_ID.to_string(),
                name: PROJECT_NAME.to_string(),
            }),
            web_url: None,
        };
        Self {
            state: Mutex::new(FakeState {
                repository,
                branches: vec![stats("main", DEFAULT_COMMIT, true)],
                work_items: BTreeMap::new(),
                calls: Vec::new(),
                ref_status_override: None,
                fail_state_updates: false,
            }),
        }
    }

    pub fn with_work_item(self, item: WorkItem) -> Self {
        self.lock().work_items.insert(item.id, item);
        self
    }

    pub fn with_branch(self, name: &str, commit: &str) -> Self {
        self.lock().branches.push(stats(name, commit, false));
        self
    }

    pub fn without_default_branch(self) -> Self {
        self.lock().branches.retain(|branch| !branch.is_base_version);
        self
    }

    pub fn rejecting_ref_updates(self, status: RefUpdateStatus) -> Self {
        self.lock().ref_status_override = Some(status);
        self
    }

    pub fn failing_state_updates(self) -> Self {
        self.lock().fail_state_updates = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.lock().calls.iter().filter(|call| call.is_mutation()).count()
    }

    /// `(ref name, commit)` for every ref creation, in call order.
    pub fn created_refs(&self) -> Vec<(String, String)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::UpdateRefs {
                    name,
                    new_object_id,
                } => Some((name.clone(), new_object_id.clone())),
                _ => None,
            })
            .collect()
    }

    /// Work-item updates against `path`, in call order.
    pub fn work_item_updates(&self, path: &str) -> Vec<(WorkItemId, serde_json::Value)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::UpdateWorkItem {
                    id,
                    path: updated,
                    value,
                } if updated == path => Some((*id, value.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn branch_commit(&self, name: &str) -> Option<String> {
        self.lock()
            .branches
            .iter()
            .find(|branch| branch.name == name)
            .map(|branch| branch.commit.commit_id.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake devops lock")
    }
}

impl GitRefService for FakeDevOps {
    fn get_repository(
        &self,
        _repository_id: &RepositoryId,
        _project: &str,
    ) -> Result<GitRepository, DevOpsError> {
        let mut state = self.lock();
        state.calls.push(Call::GetRepository);
        Ok(state.repository.clone())
    }

    fn get_branches(
        &self,
        _repository_id: &RepositoryId,
        _project: &str,
    ) -> Result<Vec<GitBranchStats>, DevOpsError> {
        let mut state = self.lock();
        state.calls.push(Call::GetBranches);
        Ok(state.branches.clone())
    }

    fn get_refs(
        &self,
        _repository_id: &RepositoryId,
        _project: &str,
        filter: &str,
    ) -> Result<Vec<GitRef>, DevOpsError> {
        let mut state = self.lock();
        state.calls.push(Call::GetRefs {
            filter: filter.to_string(),
        });
        let prefix = format!("refs/{filter}");
        Ok(state
            .branches
            .iter()
            .map(|branch| GitRef {
                name: format!("refs/heads/{}", branch.name),
                object_id: Some(branch.commit.commit_id.clone()),
            })
            .filter(|git_ref| git_ref.name.starts_with(&prefix))
            .collect())
    }

    fn update_refs(
        &self,
        updates: &[GitRefUpdate],
        _repository_id: &RepositoryId,
    ) -> Result<Vec<GitRefUpdateResult>, DevOpsError> {
        let mut state = self.lock();
        let mut results = Vec::new();
        for update in updates {
            state.calls.push(Call::UpdateRefs {
                name: update.name.clone(),
                new_object_id: update.new_object_id.clone(),
            });
            let branch = update
                .name
                .strip_prefix("refs/heads/")
                .unwrap_or(&update.name)
                .to_string();
            if let Some(status) = state.ref_status_override {
                results.push(GitRefUpdateResult::rejected(&update.name, status));
            } else if state.branches.iter().any(|existing| existing.name == branch) {
                results.push(GitRefUpdateResult::rejected(
                    &update.name,
                    RefUpdateStatus::StaleOldObjectId,
                ));
            } else {
                state
                    .branches
                    .push(stats(&branch, &update.new_object_id, false));
                results.push(GitRefUpdateResult::succeeded(
                    &update.name,
                    &update.new_object_id,
                ));
            }
        }
        Ok(results)
    }
}

impl WorkItemService for FakeDevOps {
    fn get_work_item(
        &self,
        id: WorkItemId,
        _project: &str,
        expand: WorkItemExpand,
    ) -> Result<WorkItem, DevOpsError> {
        let mut state = self.lock();
        state.calls.push(Call::GetWorkItem { id, expand });
        state
            .work_items
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("GET", id))
    }

    fn update_work_item(
        &self,
        patch: &[PatchOperation],
        id: WorkItemId,
    ) -> Result<WorkItem, DevOpsError> {
        let mut state = self.lock();
        for op in patch {
            state.calls.push(Call::UpdateWorkItem {
                id,
                path: op.path.clone(),
                value: op.value.clone(),
            });
        }
        if state.fail_state_updates && patch.iter().any(|op| op.path == PATH_STATE_FIELD) {
            return Err(DevOpsError::Status {
                method: "PATCH",
                url: format!("fake://workitems/{id}"),
                status: 400,
                body: "state transition not allowed".to_string(),
            });
        }
        state
            .work_items
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("PATCH", id))
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<NotificationMessage>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<NotificationMessage> {
        self.messages.lock().expect("notifier lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn kind(&self) -> NotifierKind {
        NotifierKind::Log
    }

    fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        self.messages
            .lock()
            .expect("notifier lock")
            .push(message.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    urls: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("navigator lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn open_link(&self, url: &str) -> Result<(), NotifyError> {
        self.urls.lock().expect("navigator lock").push(url.to_string());
        Ok(())
    }
}

pub fn work_item(id: u64, work_item_type: &str, title: &str) -> WorkItem {
    WorkItem::new(WorkItemId(id))
        .with_field(FIELD_WORK_ITEM_TYPE, work_item_type)
        .with_field(FIELD_TITLE, title)
}

pub fn child_of(item: WorkItem, parent_id: u64) -> WorkItem {
    item.with_relation(
        REL_HIERARCHY_REVERSE,
        format!("https://dev.azure.com/contoso/_apis/wit/workItems/{parent_id}"),
    )
}

fn stats(name: &str, commit: &str, is_base_version: bool) -> GitBranchStats {
    GitBranchStats {
        name: name.to_string(),
        is_base_version,
        commit: GitCommitRef {
            commit_id: commit.to_string(),
        },
    }
}

fn not_found(method: &'static str, id: WorkItemId) -> DevOpsError {
    DevOpsError::Status {
        method,
        url: format!("fake://workitems/{id}"),
        status: 404,
        body: "work item not found".to_string(),
    }
}

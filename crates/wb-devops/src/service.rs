//! Collaborator contracts the branch flow depends on.

use wb_core::types::{RepositoryId, WorkItem, WorkItemId};

use crate::error::DevOpsError;
use crate::types::{
    GitBranchStats, GitRef, GitRefUpdate, GitRefUpdateResult, GitRepository, PatchOperation,
    WorkItemExpand,
};

pub trait GitRefService {
    fn get_repository(
        &self,
        repository_id: &RepositoryId,
        project: &str,
    ) -> Result<GitRepository, DevOpsError>;

    fn get_branches(
        &self,
        repository_id: &RepositoryId,
        project: &str,
    ) -> Result<Vec<GitBranchStats>, DevOpsError>;

    /// Refs whose name starts with `refs/<filter>`.
    fn get_refs(
        &self,
        repository_id: &RepositoryId,
        project: &str,
        filter: &str,
    ) -> Result<Vec<GitRef>, DevOpsError>;

    fn update_refs(
        &self,
        updates: &[GitRefUpdate],
        repository_id: &RepositoryId,
    ) -> Result<Vec<GitRefUpdateResult>, DevOpsError>;
}

pub trait WorkItemService {
    fn get_work_item(
        &self,
        id: WorkItemId,
        project: &str,
        expand: WorkItemExpand,
    ) -> Result<WorkItem, DevOpsError>;

    fn update_work_item(
        &self,
        patch: &[PatchOperation],
        id: WorkItemId,
    ) -> Result<WorkItem, DevOpsError>;
}

impl<T: GitRefService + ?Sized> GitRefService for &T {
    fn get_repository(
        &self,
        repository_id: &RepositoryId,
        project: &str,
    ) -> Result<GitRepository, DevOpsError> {
        (**self).get_repository(repository_id, project)
    }

    fn get_branches(
        &self,
        repository_id: &RepositoryId,
        project: &str,
    ) -> Result<Vec<GitBranchStats>, DevOpsError> {
        (**self).get_branches(repository_id, project)
    }

    fn get_refs(
        &self,
        repository_id: &RepositoryId,
        project: &str,
        filter: &str,
    ) -> Result<Vec<GitRef>, DevOpsError> {
        (**self).get_refs(repository_id, project, filter)
    }

    fn update_refs(
        &self,
        updates: &[GitRefUpdate],
        repository_id: &RepositoryId,
    ) -> Result<Vec<GitRefUpdateResult>, DevOpsError> {
        (**self).update_refs(updates, repository_id)
    }
}

impl<T: WorkItemService + ?Sized> WorkItemService for &T {
    fn get_work_item(
        &self,
        id: WorkItemId,
        project: &str,
        expand: WorkItemExpand,
    ) -> Result<WorkItem, DevOpsError> {
        (**self).get_work_item(id, project, expand)
    }

    fn update_work_item(
        &self,
        patch: &[PatchOperation],
        id: WorkItemId,
    ) -> Result<WorkItem, DevOpsError> {
        (**self).update_work_item(patch, id)
    }
}

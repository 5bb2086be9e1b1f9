use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use wb_core::config::ConnectionConfig;
use wb_core::types::{RepositoryId, WorkItem, WorkItemId};

use crate::error::DevOpsError;
use crate::links::encode_uri_component;
use crate::service::{GitRefService, WorkItemService};
use crate::types::{
    GitBranchStats, GitRef, GitRefUpdate, GitRefUpdateResult, GitRepository, ListResponse,
    PatchOperation, WorkItemExpand,
};

pub const API_VERSION: &str = "7.1";

const JSON: &str = "application/json";
const JSON_PATCH: &str = "application/json-patch+json";

/// Blocking REST client for one Azure DevOps organization.
#[derive(Clone)]
pub struct AzureDevOpsClient {
    agent: ureq::Agent,
    organization_url: String,
    authorization: String,
}

impl std::fmt::Debug for AzureDevOpsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureDevOpsClient")
            .field("organization_url", &self.organization_url)
            .finish_non_exhaustive()
    }
}

impl AzureDevOpsClient {
    pub fn new(
        organization_url: impl Into<String>,
        personal_access_token: &str,
        timeout: Duration,
    ) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        let organization_url = organization_url.into().trim_end_matches('/').to_string();
        Self {
            agent,
            organization_url,
            authorization: basic_authorization(personal_access_token),
        }
    }

    /// Build a client from config, reading the token from `pat_env`.
    pub fn from_connection(config: &ConnectionConfig) -> Result<Self, DevOpsError> {
        let token = std::env::var(&config.pat_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| DevOpsError::MissingToken {
                var: config.pat_env.clone(),
            })?;
        Ok(Self::new(
            config.organization_url(),
            &token,
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn organization_url(&self) -> &str {
        &self.organization_url
    }

    fn repository_url(&self, project: &str, repository_id: &RepositoryId) -> String {
        format!(
            "{}/{}/_apis/git/repositories/{}",
            self.organization_url,
            encode_uri_component(project),
            encode_uri_component(repository_id.as_ref())
        )
    }

    fn branches_url(&self, project: &str, repository_id: &RepositoryId) -> String {
        format!("{}/stats/branches", self.repository_url(project, repository_id))
    }

    fn refs_url(&self, project: &str, repository_id: &RepositoryId) -> String {
        format!("{}/refs", self.repository_url(project, repository_id))
    }

    /// Repository ids are unique per organization, so ref updates skip the
    /// project segment.
    fn update_refs_url(&self, repository_id: &RepositoryId) -> String {
        format!(
            "{}/_apis/git/repositories/{}/refs",
            self.organization_url,
            encode_uri_component(repository_id.as_ref())
        )
    }

    fn work_item_url(&self, project: Option<&str>, id: WorkItemId) -> String {
        match project {
            Some(project) => format!(
                "{}/{}/_apis/wit/workitems/{id}",
                self.organization_url,
                encode_uri_component(project)
            ),
            None => format!("{}/_apis/wit/workitems/{id}", self.organization_url),
        }
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, DevOpsError> {
        debug!(method = "GET", url, "devops request");
        let mut request = self
            .agent
            .get(url)
            .set("Authorization", &self.authorization)
            .set("Accept", JSON)
            .query("api-version", API_VERSION);
        for (key, value) in query {
            request = request.query(key, value);
        }
        let response = request.call().map_err(|err| map_ureq_error("GET", url, err))?;
        decode(response, "GET", url)
    }

    fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: &'static str,
        url: &str,
        content_type: &str,
        body: &B,
    ) -> Result<T, DevOpsError> {
        debug!(method, url, "devops request");
        let payload = serde_json::to_string(body).map_err(|source| DevOpsError::Encode {
            context: format!("{method} {url}"),
            source,
        })?;
        let response = self
            .agent
            .request(method, url)
            .set("Authorization", &self.authorization)
            .set("Accept", JSON)
            .set("Content-Type", content_type)
            .query("api-version", API_VERSION)
            .send_string(&payload)
            .map_err(|err| map_ureq_error(method, url, err))?;
        decode(response, method, url)
    }
}

impl GitRefService for AzureDevOpsClient {
    fn get_repository(
        &self,
        repository_id: &RepositoryId,
        project: &str,
    ) -> Result<GitRepository, DevOpsError> {
        self.get_json(&self.repository_url(project, repository_id), &[])
    }

    fn get_branches(
        &self,
        repository_id: &RepositoryId,
        project: &str,
    ) -> Result<Vec<GitBranchStats>, DevOpsError> {
        let list: ListResponse<GitBranchStats> =
            self.get_json(&self.branches_url(project, repository_id), &[])?;
        Ok(list.value)
    }

    fn get_refs(
        &self,
        repository_id: &RepositoryId,
        project: &str,
        filter: &str,
    ) -> Result<Vec<GitRef>, DevOpsError> {
        let list: ListResponse<GitRef> = self.get_json(
            &self.refs_url(project, repository_id),
            &[("filter", filter)],
        )?;
        Ok(list.value)
    }

    fn update_refs(
        &self,
        updates: &[GitRefUpdate],
        repository_id: &RepositoryId,
    ) -> Result<Vec<GitRefUpdateResult>, DevOpsError> {
        let list: ListResponse<GitRefUpdateResult> = self.send_json(
            "POST",
            &self.update_refs_url(repository_id),
            JSON,
            updates,
        )?;
        Ok(list.value)
    }
}

impl WorkItemService for AzureDevOpsClient {
    fn get_work_item(
        &self,
        id: WorkItemId,
        project: &str,
        expand: WorkItemExpand,
    ) -> Result<WorkItem, DevOpsError> {
        self.get_json(
            &self.work_item_url(Some(project), id),
            &[("$expand", expand.as_query_value())],
        )
    }

    fn update_work_item(
        &self,
        patch: &[PatchOperation],
        id: WorkItemId,
    ) -> Result<WorkItem, DevOpsError> {
        self.send_json("PATCH", &self.work_item_url(None, id), JSON_PATCH, patch)
    }
}

fn basic_authorization(personal_access_token: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!(":{personal_access_token}")))
}

fn decode<T: DeserializeOwned>(
    response: ureq::Response,
    method: &'static str,
    url: &str,
) -> Result<T, DevOpsError> {
    response
        .into_json::<T>()
        .map_err(|source| DevOpsError::Decode {
            context: format!("{method} {url}"),
            source,
        })
}

fn map_ureq_error(method: &'static str, url: &str, err: ureq::Error) -> DevOpsError {
    match err {
        ureq::Error::Status(status, response) => DevOpsError::Status {
            method,
            url: url.to_string(),
            status,
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => DevOpsError::Transport {
            method,
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}

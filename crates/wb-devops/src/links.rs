//! Ref names, artifact links and web URLs derived from branch names.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use wb_core::types::WorkItemId;

/// Bytes left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Bytes left alone by JavaScript's `encodeURI`.
const URI: &AsciiSet = &URI_COMPONENT
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#');

pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

pub fn encode_uri(value: &str) -> String {
    utf8_percent_encode(value, URI).to_string()
}

pub fn branch_ref_name(branch_name: &str) -> String {
    format!("refs/heads/{branch_name}")
}

/// Prefix filter accepted by the refs endpoint.
pub fn branch_ref_filter(branch_name: &str) -> String {
    format!("heads/{branch_name}")
}

/// `vstfs:///Git/Ref/<projectId/repositoryId/GB<branch>>`, URL-encoded.
pub fn artifact_link_url(project_id: &str, repository_id: &str, branch_name: &str) -> String {
    let branch_ref = format!("{project_id}/{repository_id}/GB{branch_name}");
    format!("vstfs:///Git/Ref/{}", encode_uri_component(&branch_ref))
}

/// Web URL that opens `branch_name` in the repository browser.
pub fn branch_url(git_base_url: &str, repository_name: &str, branch_name: &str) -> String {
    format!(
        "{}/{}?version=GB{}",
        git_base_url.trim_end_matches('/'),
        repository_name,
        encode_uri(branch_name)
    )
}

/// Work-item id from the last path segment of a relation URL. Anything
/// that is not a positive integer yields `None`.
pub fn parse_trailing_work_item_id(url: &str) -> Option<WorkItemId> {
    url.rsplit('/')
        .next()
        .and_then(|segment| segment.trim().parse::<u64>().ok())
        .filter(|id| *id > 0)
        .map(WorkItemId)
}

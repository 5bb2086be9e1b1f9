use wb_core::types::{FieldValue, ParentDetails, WorkItem};

use crate::sanitize::sanitize;
use crate::tokenizer::replace_tokens;

/// Caller-selected source branch, verbatim.
pub const TOKEN_SOURCE_BRANCH_NAME: &str = "SourceBranchName";
/// Source branch after its last `/`.
pub const TOKEN_SOURCE_BRANCH_NAME_TAIL: &str = "SourceBranchNameTail";
/// The work item's own id.
pub const TOKEN_WORK_ITEM_ID: &str = "id";

/// Inputs for resolving template tokens against one work item.
#[derive(Debug, Clone, Copy)]
pub struct NamingContext<'a> {
    pub work_item: &'a WorkItem,
    pub source_branch_name: Option<&'a str>,
    pub replacement: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    /// Free text, or a structured field rendered as JSON; sanitized before
    /// substitution.
    Text(String),
    /// Number or boolean; substituted unsanitized.
    Raw(String),
    /// Field absent on the work item, or no source branch given.
    Missing,
}

/// Template rendered against a work item, before parent composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftName {
    pub name: String,
    /// Identifiers that resolved to nothing, first occurrence order.
    pub missing_fields: Vec<String>,
}

pub fn source_branch_tail(source_branch_name: &str) -> &str {
    match source_branch_name.rfind('/') {
        Some(index) => &source_branch_name[index + 1..],
        None => source_branch_name,
    }
}

pub fn resolve_token(identifier: &str, context: &NamingContext<'_>) -> TokenValue {
    match identifier {
        TOKEN_SOURCE_BRANCH_NAME => context
            .source_branch_name
            .map(|name| TokenValue::Text(name.to_string()))
            .unwrap_or(TokenValue::Missing),
        TOKEN_SOURCE_BRANCH_NAME_TAIL => context
            .source_branch_name
            .map(|name| TokenValue::Text(source_branch_tail(name).to_string()))
            .unwrap_or(TokenValue::Missing),
        TOKEN_WORK_ITEM_ID => TokenValue::Raw(context.work_item.id.to_string()),
        field => match context.work_item.field(field) {
            Some(FieldValue::Text(value)) => TokenValue::Text(value.clone()),
            Some(value @ (FieldValue::Number(_) | FieldValue::Bool(_))) => {
                TokenValue::Raw(value.render())
            }
            Some(structured @ FieldValue::Other(_)) => TokenValue::Text(structured.render()),
            None => TokenValue::Missing,
        },
    }
}

/// Substitute every token in `template`. Missing values become empty text
/// and are reported in `missing_fields`.
pub fn render_draft(template: &str, context: &NamingContext<'_>) -> DraftName {
    let mut missing_fields: Vec<String> = Vec::new();
    let name = replace_tokens(template, |identifier| {
        match resolve_token(identifier, context) {
            TokenValue::Text(value) => sanitize(&value, context.replacement),
            TokenValue::Raw(value) => value,
            TokenValue::Missing => {
                if !missing_fields.iter().any(|seen| seen == identifier) {
                    missing_fields.push(identifier.to_string());
                }
                String::new()
            }
        }
    });
    DraftName {
        name,
        missing_fields,
    }
}

/// Prepend the parent's `suffix` when a real parent exists, then apply
/// whole-string lowercasing.
pub fn compose_branch_name(draft: &str, parent: Option<&ParentDetails>, lowercase: bool) -> String {
    let composed = match parent {
        Some(parent) if !parent.is_unknown() => format!("{}{draft}", parent.suffix),
        _ => draft.to_string(),
    };
    if lowercase {
        composed.to_lowercase()
    } else {
        composed
    }
}

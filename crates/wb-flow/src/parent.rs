//! Locate a work item's hierarchical parent.

use tracing::debug;
use wb_core::types::{ParentDetails, WorkItem, WorkItemId, UNKNOWN_PARENT};
use wb_devops::links::parse_trailing_work_item_id;
use wb_devops::service::WorkItemService;
use wb_devops::types::WorkItemExpand;
use wb_template::sanitize::sanitize_lowercase;

use crate::error::FlowError;

pub struct ParentResolver<W> {
    work_items: W,
    replacement: String,
}

impl<W: WorkItemService> ParentResolver<W> {
    pub fn new(work_items: W, replacement: impl Into<String>) -> Self {
        Self {
            work_items,
            replacement: replacement.into(),
        }
    }

    /// Parent of `work_item_id`, or the sentinel when it has none.
    ///
    /// A relation whose URL does not end in a positive id counts as no
    /// parent. Backend failures propagate.
    pub fn resolve(&self, work_item_id: WorkItemId, project: &str) -> Result<ParentDetails, FlowError> {
        let item = self
            .work_items
            .get_work_item(work_item_id, project, WorkItemExpand::Relations)?;
        self.resolve_for(&item, project)
    }

    /// Same as [`resolve`](Self::resolve) for an item already fetched with
    /// relations.
    pub fn resolve_for(&self, item: &WorkItem, project: &str) -> Result<ParentDetails, FlowError> {
        let Some(parent_id) = item
            .parent_link()
            .and_then(|relation| parse_trailing_work_item_id(&relation.url))
        else {
            debug!(work_item = %item.id, "no parent relation");
            return Ok(ParentDetails::unknown());
        };

        let parent = self
            .work_items
            .get_work_item(parent_id, project, WorkItemExpand::Fields)?;
        let work_item_type = parent.work_item_type().unwrap_or(UNKNOWN_PARENT);
        let title = parent.title().unwrap_or(UNKNOWN_PARENT);

        Ok(ParentDetails::new(
            parent.id,
            sanitize_lowercase(work_item_type, &self.replacement),
            sanitize_lowercase(title, &self.replacement),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::ParentResolver;
    use crate::test_support::{child_of, work_item, Call, FakeDevOps};
    use wb_core::types::{WorkItemId, REL_HIERARCHY_REVERSE};
    use wb_devops::types::WorkItemExpand;

    #[test]
    fn resolves_parent_with_lowercased_sanitized_fields() {
        let fake = FakeDevOps::new()
            .with_work_item(child_of(work_item(42, "Bug", "Fix crash"), 12))
            .with_work_item(work_item(12, "User Story", "Login Page"));
        let resolver = ParentResolver::new(&fake, "-");

        let parent = resolver.resolve(WorkItemId(42), "Fabrikam").expect("resolve parent");

        assert_eq!(parent.id, WorkItemId(12));
        assert_eq!(parent.work_item_type, "user-story");
        assert_eq!(parent.title, "login-page");
        assert_eq!(parent.branch_name, "user-story/12-login-page");
        assert_eq!(parent.suffix, "user-story/12/");
        assert_eq!(
            fake.calls(),
            vec![
                Call::GetWorkItem {
                    id: WorkItemId(42),
                    expand: WorkItemExpand::Relations
                },
                Call::GetWorkItem {
                    id: WorkItemId(12),
                    expand: WorkItemExpand::Fields
                },
            ]
        );
    }

    #[test]
    fn missing_relation_yields_sentinel() {
        let fake = FakeDevOps::new().with_work_item(work_item(42, "Bug", "Fix"));
        let resolver = ParentResolver::new(&fake, "-");

        let parent = resolver.resolve(WorkItemId(42), "Fabrikam").expect("resolve parent");

        assert!(parent.is_unknown());
        assert_eq!(parent.branch_name, "unknown/0-unknown");
        assert_eq!(fake.calls().len(), 1);
    }

    #[test]
    fn unparseable_parent_url_yields_sentinel() {
        let item = work_item(42, "Bug", "Fix")
            .with_relation(REL_HIERARCHY_REVERSE, "https://dev.azure.com/o/_apis/wit/workItems/abc");
        let fake = FakeDevOps::new().with_work_item(item);
        let resolver = ParentResolver::new(&fake, "-");

        let parent = resolver.resolve(WorkItemId(42), "Fabrikam").expect("resolve parent");

        assert!(parent.is_unknown());
    }

    #[test]
    fn backend_failure_for_parent_propagates() {
        let fake = FakeDevOps::new().with_work_item(child_of(work_item(42, "Bug", "Fix"), 12));
        let resolver = ParentResolver::new(&fake, "-");

        let err = resolver
            .resolve(WorkItemId(42), "Fabrikam")
            .expect_err("parent 12 is missing");
        assert!(matches!(err, crate::error::FlowError::DevOps(ref inner) if inner.is_not_found()));
    }
}

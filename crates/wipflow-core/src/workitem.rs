use crate::binding::BindingTable;
use crate::client::{TaskDetails, TaskTracker};
use crate::error::{CoreError, Result};
use crate::policy;
use serde::Serialize;

/// A WIP code resolved to its parent task and matching subtask.
///
/// Recomputed for every operation; the parent details are whatever the
/// service returned during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    pub code: String,
    pub parent: TaskDetails,
    pub child_gid: String,
}

impl WorkItem {
    pub fn parent_gid(&self) -> &str {
        &self.parent.gid
    }
}

/// Locate the parent/child pair for `code` and check it may be operated on.
///
/// The search hit may be either the parent or the subtask; both shapes
/// normalize to the same pair. Fails before any mutating call is made.
pub fn resolve_work_item<C: TaskTracker + ?Sized>(
    client: &C,
    bindings: &BindingTable,
    code: &str,
) -> Result<WorkItem> {
    let hit = client
        .search_by_text(code)?
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::WorkItemNotFound(code.to_string()))?;

    let (parent_gid, child_gid) = match hit.parent {
        None => {
            let child = matching_child(client, &hit.gid, &hit.name, code)?;
            (hit.gid, child)
        }
        Some(parent) if policy::name_contains_code(&hit.name, code) => (parent.gid, hit.gid),
        Some(parent) => {
            let child = matching_child(client, &parent.gid, &parent.name, code)?;
            (parent.gid, child)
        }
    };

    let parent = client.get_details(&parent_gid)?;
    if policy::is_purged(&parent, bindings) {
        return Err(CoreError::PurgedParent(parent.name));
    }

    tracing::debug!(code, parent = %parent.gid, child = %child_gid, "work item resolved");
    Ok(WorkItem {
        code: code.to_string(),
        parent,
        child_gid,
    })
}

fn matching_child<C: TaskTracker + ?Sized>(
    client: &C,
    parent_gid: &str,
    parent_name: &str,
    code: &str,
) -> Result<String> {
    client
        .get_children(parent_gid)?
        .into_iter()
        .find(|child| policy::name_contains_code(&child.name, code))
        .map(|child| child.gid)
        .ok_or_else(|| CoreError::NoMatchingChild {
            code: code.to_string(),
            parent: if parent_name.is_empty() {
                parent_gid.to_string()
            } else {
                parent_name.to_string()
            },
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{bind, BindingSpec};
    use crate::testing::{full_taxonomy, FakeTracker};

    fn bindings() -> BindingTable {
        bind(&full_taxonomy(), &BindingSpec::default()).unwrap()
    }

    fn tracker() -> FakeTracker {
        let mut t = FakeTracker::default();
        t.task("1", "PO 5511 Applied Materials", None).projects = vec!["100".into()];
        t.task("2", "W-1001 Baratron 626", Some("1"));
        t.task("3", "W-1002 Baratron 627", Some("1"));
        t
    }

    #[test]
    fn hit_on_subtask_uses_it_directly() {
        let t = tracker();
        let item = resolve_work_item(&t, &bindings(), "w-1002").unwrap();
        assert_eq!(item.parent_gid(), "1");
        assert_eq!(item.child_gid, "3");
        assert!(!t.calls().iter().any(|c| c.starts_with("children")));
    }

    #[test]
    fn hit_on_parent_finds_child_by_code() {
        let t = tracker();
        let item = resolve_work_item(&t, &bindings(), "PO 5511").unwrap_err();
        // the parent's name matches but none of its subtasks do
        assert!(matches!(item, CoreError::NoMatchingChild { .. }));

        let mut t = FakeTracker::default();
        t.task("1", "Order W-2000", None);
        t.task("2", "w-2000 gauge", Some("1"));
        let item = resolve_work_item(&t, &bindings(), "W-2000").unwrap();
        assert_eq!((item.parent_gid(), item.child_gid.as_str()), ("1", "2"));
    }

    #[test]
    fn hit_without_code_in_name_looks_up_parent_children() {
        let mut t = FakeTracker::default();
        t.task("1", "PO 9", None);
        t.task("5", "Calibration data", Some("1")).notes = "see W-3000".into();
        t.task("6", "W-3000 gauge", Some("1"));
        let item = resolve_work_item(&t, &bindings(), "W-3000").unwrap();
        assert_eq!(item.parent_gid(), "1");
        assert_eq!(item.child_gid, "6");
        assert!(t.calls().contains(&"children 1".to_string()));
    }

    #[test]
    fn sibling_lookup_without_match_fails() {
        let mut t = FakeTracker::default();
        t.task("1", "PO 9", None);
        t.task("5", "Calibration data", Some("1")).notes = "see W-3000".into();
        let err = resolve_work_item(&t, &bindings(), "W-3000").unwrap_err();
        assert!(matches!(err, CoreError::NoMatchingChild { ref parent, .. } if parent == "1"));
    }

    #[test]
    fn no_search_hit_is_not_found() {
        let t = tracker();
        let err = resolve_work_item(&t, &bindings(), "W-9999").unwrap_err();
        assert!(matches!(err, CoreError::WorkItemNotFound(ref c) if c == "W-9999"));
    }

    #[test]
    fn purged_parent_blocks_every_child() {
        let mut t = tracker();
        t.tasks[0].tags.push("205".into());
        for code in ["W-1001", "W-1002"] {
            let err = resolve_work_item(&t, &bindings(), code).unwrap_err();
            assert!(matches!(err, CoreError::PurgedParent(ref n) if n.starts_with("PO 5511")));
        }
        assert!(t.mutations().is_empty());
    }

    #[test]
    fn resolution_is_idempotent() {
        let t = tracker();
        let b = bindings();
        let first = resolve_work_item(&t, &b, "W-1001").unwrap();
        let second = resolve_work_item(&t, &b, "W-1001").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn transport_failure_surfaces_as_api_error() {
        let mut t = tracker();
        t.fail("search");
        let err = resolve_work_item(&t, &bindings(), "W-1001").unwrap_err();
        assert!(matches!(err, CoreError::Api(_)));
    }
}

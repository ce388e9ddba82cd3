//! Domain rules expressed as plain predicates.

use crate::binding::{keys, BindingTable};
use crate::client::TaskDetails;

pub const COR_MARKER: &str = "*COR*";

/// A child matches a WIP code when its name contains the code, ignoring case.
pub fn name_contains_code(name: &str, code: &str) -> bool {
    name.to_lowercase().contains(&code.to_lowercase())
}

/// Parents carrying the purge tag block every operation on their children.
/// An unbound purge tag blocks nothing.
pub fn is_purged(parent: &TaskDetails, bindings: &BindingTable) -> bool {
    bindings
        .single(keys::PURGE_TAG)
        .is_some_and(|tag| parent.has_tag(tag))
}

pub fn in_root_project(parent: &TaskDetails, bindings: &BindingTable) -> bool {
    bindings
        .single(keys::PROJECT_AMAT_AGS)
        .is_some_and(|project| parent.in_project(project))
}

/// Order holds only apply to work outside the root project.
pub fn order_hold_available(parent: &TaskDetails, bindings: &BindingTable) -> bool {
    !in_root_project(parent, bindings)
}

pub fn has_cor_marker(name: &str) -> bool {
    name.trim().to_uppercase().starts_with(COR_MARKER)
}

/// `name` with the COR marker prepended, or `None` if it is already marked.
pub fn cor_title(name: &str) -> Option<String> {
    if has_cor_marker(name) {
        None
    } else {
        Some(format!("{COR_MARKER} {name}"))
    }
}

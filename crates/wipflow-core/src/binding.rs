use crate::error::{CoreError, Result};
use crate::taxonomy::{find_gids, names_match, Taxonomy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Well-known keys
// ---------------------------------------------------------------------------

pub mod keys {
    pub const PROJECT_AMAT_AGS: &str = "PROJECT_AMAT_AGS";

    pub const READY_FOR_BUYER_SECTION: &str = "READY_FOR_BUYER_SECTION";
    pub const NEEDS_COR_SECTION: &str = "NEEDS_COR_SECTION";

    pub const HEATER_SWAP_TAGS: &str = "HEATER_SWAP_TAGS";
    pub const ORDER_HOLD_TAG: &str = "ORDER_HOLD_TAG";
    pub const DOG_TAG: &str = "DOG_TAG";
    pub const DEVICE_COMPLETE_TAG: &str = "DEVICE_COMPLETE_TAG";
    pub const COR_TAG: &str = "COR_TAG";
    pub const PURGE_TAG: &str = "PURGE_TAG";
    pub const CLEANED_TAG: &str = "CLEANED_TAG";

    pub const SUSAN_HEARON_USER: &str = "SUSAN_HEARON_USER";
    pub const SHARED_SUBTASK_ASSIGNEE: &str = "SHARED_SUBTASK_ASSIGNEE";
    pub const ACCOUNT_MANAGER_ASSIGNEE: &str = "ACCOUNT_MANAGER_ASSIGNEE";

    /// Keys the workflows and policy checks look up directly. A spec may
    /// rename the names behind them but must keep every key.
    pub const REQUIRED: [&str; 13] = [
        PROJECT_AMAT_AGS,
        READY_FOR_BUYER_SECTION,
        NEEDS_COR_SECTION,
        HEATER_SWAP_TAGS,
        ORDER_HOLD_TAG,
        DOG_TAG,
        DEVICE_COMPLETE_TAG,
        COR_TAG,
        PURGE_TAG,
        CLEANED_TAG,
        SUSAN_HEARON_USER,
        SHARED_SUBTASK_ASSIGNEE,
        ACCOUNT_MANAGER_ASSIGNEE,
    ];
}

/// Keys ending in `S` bind every matching gid rather than the first.
pub fn is_list_key(key: &str) -> bool {
    key.ends_with('S')
}

/// Binding key for a reason tag name: "Bad Sensor" → "BAD_SENSOR_TAG".
pub fn tag_key_for(name: &str) -> String {
    format!("{}_TAG", name.trim().to_uppercase().replace(' ', "_"))
}

// ---------------------------------------------------------------------------
// BindingSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingEntry {
    pub key: String,
    pub name: String,
}

impl BindingEntry {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

/// Which human-readable names to look up, and under which keys to store them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSpec {
    #[serde(default = "default_root_project")]
    pub root_project: BindingEntry,
    /// Looked up among the root project's sections only.
    #[serde(default = "default_sections")]
    pub sections: Vec<BindingEntry>,
    #[serde(default = "default_tags")]
    pub tags: Vec<BindingEntry>,
    #[serde(default = "default_users")]
    pub users: Vec<BindingEntry>,
}

fn entries(pairs: &[(&str, &str)]) -> Vec<BindingEntry> {
    pairs
        .iter()
        .map(|(key, name)| BindingEntry::new(*key, *name))
        .collect()
}

fn default_root_project() -> BindingEntry {
    BindingEntry::new(keys::PROJECT_AMAT_AGS, "AMAT AGS")
}

fn default_sections() -> Vec<BindingEntry> {
    entries(&[
        (keys::READY_FOR_BUYER_SECTION, "Ready for Buyer"),
        (keys::NEEDS_COR_SECTION, "Needs COR"),
    ])
}

fn default_tags() -> Vec<BindingEntry> {
    entries(&[
        (keys::HEATER_SWAP_TAGS, "Heater Board Replacement"),
        (keys::ORDER_HOLD_TAG, "Order Hold"),
        (keys::DOG_TAG, "DOG"),
        (keys::DEVICE_COMPLETE_TAG, "Device Calibrated"),
        (keys::COR_TAG, "Return Unrepaired"),
        (keys::PURGE_TAG, "PURGE"),
        ("BAD_SENSOR_TAG", "Bad Sensor"),
        ("PRESSURE_OSCILLATION_TAG", "Pressure Oscillation"),
        ("INTERNAL_LEAK_TAG", "INTERNAL LEAK"),
        ("CONTAMINATED_TAG", "CONTAMINATED"),
        ("POSITIVE_READ_ERROR_TAG", "Positive Read Error"),
        ("RANGE_ERROR_TAG", "Range Error"),
        ("NEGATIVE_READERROR_TAG", "Negative ReadError"),
        ("PHYSICALLY_DAMAGED_TAG", "Physically Damaged"),
        ("DRIFTING_TAG", "DRIFTING"),
        (keys::CLEANED_TAG, "Cleaned"),
    ])
}

fn default_users() -> Vec<BindingEntry> {
    entries(&[
        (keys::SUSAN_HEARON_USER, "Susan Hearon"),
        (keys::SHARED_SUBTASK_ASSIGNEE, "Michelle Hughes"),
        (keys::ACCOUNT_MANAGER_ASSIGNEE, "Mandy McIntosh"),
    ])
}

impl Default for BindingSpec {
    fn default() -> Self {
        Self {
            root_project: default_root_project(),
            sections: default_sections(),
            tags: default_tags(),
            users: default_users(),
        }
    }
}

impl BindingSpec {
    /// Every key in declaration order, root project first.
    pub fn all_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.root_project.key.as_str()).chain(
            self.sections
                .iter()
                .chain(&self.tags)
                .chain(&self.users)
                .map(|e| e.key.as_str()),
        )
    }

    /// Well-known keys this spec no longer declares.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        keys::REQUIRED
            .into_iter()
            .filter(|required| !self.all_keys().any(|key| key == *required))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// BindingTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Binding {
    Single(String),
    List(Vec<String>),
    Missing,
}

/// Resolved key → gid map. Built once per session and never updated.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BindingTable {
    entries: BTreeMap<String, Binding>,
    warnings: Vec<String>,
}

impl BindingTable {
    pub fn get(&self, key: &str) -> Option<&Binding> {
        self.entries.get(key)
    }

    /// The bound gid for `key`; for list keys, the first one.
    pub fn single(&self, key: &str) -> Option<&str> {
        match self.entries.get(key)? {
            Binding::Single(gid) => Some(gid),
            Binding::List(gids) => gids.first().map(String::as_str),
            Binding::Missing => None,
        }
    }

    pub fn list(&self, key: &str) -> &[String] {
        match self.entries.get(key) {
            Some(Binding::List(gids)) => gids,
            Some(Binding::Single(gid)) => std::slice::from_ref(gid),
            _ => &[],
        }
    }

    pub fn require(&self, key: &str) -> Result<&str> {
        self.single(key)
            .ok_or_else(|| CoreError::MissingBinding(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names that could not be found during binding.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn insert(&mut self, key: &str, gids: Vec<&str>, what: &str, name: &str) {
        let binding = if is_list_key(key) {
            Binding::List(gids.iter().map(|g| g.to_string()).collect())
        } else {
            match gids.first() {
                Some(gid) => Binding::Single(gid.to_string()),
                None => Binding::Missing,
            }
        };
        if gids.is_empty() {
            let msg = format!("{what} '{name}' not found");
            tracing::warn!(key, "configuration warning: {msg}");
            self.warnings.push(msg);
        }
        self.entries.insert(key.to_string(), binding);
    }
}

/// Resolve every name in `spec` against `taxonomy`.
///
/// Fails if the spec drops a well-known key or the root project is not in
/// the snapshot. Every other miss is recorded as [`Binding::Missing`] (or an
/// empty list) plus a warning.
pub fn bind(taxonomy: &Taxonomy, spec: &BindingSpec) -> Result<BindingTable> {
    let missing = spec.missing_keys();
    if !missing.is_empty() {
        return Err(CoreError::Config(format!(
            "bindings must declare {}",
            missing.join(", ")
        )));
    }

    let mut table = BindingTable::default();

    let root = taxonomy
        .projects
        .iter()
        .find(|p| names_match(&p.name, &spec.root_project.name))
        .ok_or_else(|| CoreError::MissingRootProject(spec.root_project.name.clone()))?;
    table.entries.insert(
        spec.root_project.key.clone(),
        Binding::Single(root.gid.clone()),
    );

    for entry in &spec.sections {
        let gids = find_gids(&root.sections, &entry.name);
        table.insert(&entry.key, gids, "section", &entry.name);
    }
    for entry in &spec.tags {
        let gids = find_gids(&taxonomy.tags, &entry.name);
        table.insert(&entry.key, gids, "tag", &entry.name);
    }
    for entry in &spec.users {
        let gids = find_gids(&taxonomy.users, &entry.name);
        table.insert(&entry.key, gids, "user", &entry.name);
    }

    tracing::debug!(
        bound = table.entries.len(),
        missing = table.warnings.len(),
        "taxonomy bound"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{NamedItem, Project};

    fn snapshot() -> Taxonomy {
        Taxonomy {
            workspace_id: Some("1".into()),
            projects: vec![Project {
                gid: "100".into(),
                name: "AMAT AGS".into(),
                sections: vec![NamedItem::new("101", "Ready for Buyer")],
            }],
            tags: vec![
                NamedItem::new("200", "Heater Board Replacement"),
                NamedItem::new("201", "DOG"),
                NamedItem::new("202", " heater board replacement "),
                NamedItem::new("203", "dog"),
            ],
            users: vec![NamedItem::new("300", "Susan Hearon")],
        }
    }

    #[test]
    fn singular_key_binds_first_match() {
        let table = bind(&snapshot(), &BindingSpec::default()).unwrap();
        assert_eq!(table.single(keys::DOG_TAG), Some("201"));
        assert_eq!(table.single(keys::SUSAN_HEARON_USER), Some("300"));
        assert_eq!(table.single(keys::PROJECT_AMAT_AGS), Some("100"));
        assert_eq!(table.single(keys::READY_FOR_BUYER_SECTION), Some("101"));
    }

    #[test]
    fn list_key_keeps_all_matches_in_order() {
        let table = bind(&snapshot(), &BindingSpec::default()).unwrap();
        assert_eq!(table.list(keys::HEATER_SWAP_TAGS), &["200", "202"]);
        assert_eq!(table.single(keys::HEATER_SWAP_TAGS), Some("200"));
    }

    #[test]
    fn absent_name_is_missing_not_error() {
        let table = bind(&snapshot(), &BindingSpec::default()).unwrap();
        assert_eq!(table.get(keys::PURGE_TAG), Some(&Binding::Missing));
        assert_eq!(table.get(keys::NEEDS_COR_SECTION), Some(&Binding::Missing));
        assert!(table.require(keys::PURGE_TAG).is_err());
        assert!(table
            .warnings()
            .iter()
            .any(|w| w == "tag 'PURGE' not found"));
    }

    #[test]
    fn absent_list_key_is_empty_list() {
        let mut tax = snapshot();
        tax.tags.retain(|t| !t.name.to_lowercase().contains("heater"));
        let table = bind(&tax, &BindingSpec::default()).unwrap();
        assert_eq!(table.get(keys::HEATER_SWAP_TAGS), Some(&Binding::List(vec![])));
        assert!(table.single(keys::HEATER_SWAP_TAGS).is_none());
    }

    #[test]
    fn missing_root_project_is_fatal() {
        let mut tax = snapshot();
        tax.projects.clear();
        let err = bind(&tax, &BindingSpec::default()).unwrap_err();
        assert!(matches!(err, CoreError::MissingRootProject(ref n) if n == "AMAT AGS"));
        assert!(err.to_string().contains("AMAT AGS"));
    }

    #[test]
    fn sections_only_come_from_root_project() {
        let mut tax = snapshot();
        tax.projects.push(Project {
            gid: "900".into(),
            name: "Other".into(),
            sections: vec![NamedItem::new("901", "Needs COR")],
        });
        let table = bind(&tax, &BindingSpec::default()).unwrap();
        assert_eq!(table.single(keys::NEEDS_COR_SECTION), None);
    }

    #[test]
    fn tag_key_for_reason_names() {
        assert_eq!(tag_key_for("Bad Sensor"), "BAD_SENSOR_TAG");
        assert_eq!(tag_key_for("Negative ReadError"), "NEGATIVE_READERROR_TAG");
        assert_eq!(tag_key_for("INTERNAL LEAK"), "INTERNAL_LEAK_TAG");
    }

    #[test]
    fn renamed_well_known_key_is_rejected() {
        let mut spec = BindingSpec::default();
        spec.root_project = BindingEntry::new("ROOT_PROJECT", "AMAT AGS");
        spec.tags.retain(|e| e.key != keys::PURGE_TAG);
        assert_eq!(
            spec.missing_keys(),
            vec![keys::PROJECT_AMAT_AGS, keys::PURGE_TAG]
        );

        let err = bind(&snapshot(), &spec).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        assert!(err.to_string().contains("PROJECT_AMAT_AGS, PURGE_TAG"));
    }

    #[test]
    fn renamed_name_under_fixed_key_still_binds() {
        let mut spec = BindingSpec::default();
        spec.tags.push(BindingEntry::new("CART_7_TAG", "DOG"));
        for entry in spec.tags.iter_mut().filter(|e| e.key == keys::DOG_TAG) {
            entry.name = "heater board replacement".into();
        }
        assert!(spec.missing_keys().is_empty());
        let table = bind(&snapshot(), &spec).unwrap();
        assert_eq!(table.single(keys::DOG_TAG), Some("200"));
        assert_eq!(table.single("CART_7_TAG"), Some("201"));
    }

    #[test]
    fn spec_overrides_from_yaml_keep_defaults() {
        let yaml = "root_project:\n  key: PROJECT_AMAT_AGS\n  name: Bench\n";
        let spec: BindingSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.root_project.name, "Bench");
        assert_eq!(spec.tags, default_tags());
        assert_eq!(spec.all_keys().next(), Some("PROJECT_AMAT_AGS"));
    }
}

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Snapshot records
// ---------------------------------------------------------------------------

/// A tag, user, or section as exported from the tracking service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedItem {
    pub gid: String,
    #[serde(default)]
    pub name: String,
}

impl NamedItem {
    pub fn new(gid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            gid: gid.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub gid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sections: Vec<NamedItem>,
}

/// Point-in-time copy of the workspace's projects, tags and users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tags: Vec<NamedItem>,
    #[serde(default)]
    pub users: Vec<NamedItem>,
}

impl Taxonomy {
    /// Load a snapshot from disk. `.yaml`/`.yml` files are read as YAML,
    /// anything else as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Ok(serde_yaml::from_str(&data)?)
        } else {
            Ok(serde_json::from_str(&data)?)
        }
    }
}

// ---------------------------------------------------------------------------
// Name matching
// ---------------------------------------------------------------------------

/// Case-insensitive equality after trimming surrounding whitespace.
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Every gid in `items` whose name matches `name`, in snapshot order.
pub fn find_gids<'a>(items: &'a [NamedItem], name: &str) -> Vec<&'a str> {
    items
        .iter()
        .filter(|item| names_match(&item.name, name))
        .map(|item| item.gid.as_str())
        .collect()
}

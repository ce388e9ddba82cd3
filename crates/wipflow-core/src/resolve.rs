use crate::error::{CoreError, Result};
use crate::taxonomy::{names_match, Taxonomy};

/// Resolve a user-supplied name (or raw gid) to a gid.
///
/// All-digit input is taken as a gid verbatim. Otherwise users are searched
/// first, then tags, then each project followed by its sections; the first
/// match wins, so a user and a tag sharing a name resolve to the user.
pub fn resolve_value(text: &str, taxonomy: &Taxonomy) -> Result<String> {
    if is_raw_gid(text) {
        return Ok(text.to_string());
    }

    if let Some(item) = taxonomy
        .users
        .iter()
        .chain(&taxonomy.tags)
        .find(|item| names_match(&item.name, text))
    {
        return Ok(item.gid.clone());
    }

    for project in &taxonomy.projects {
        if names_match(&project.name, text) {
            return Ok(project.gid.clone());
        }
        if let Some(section) = project.sections.iter().find(|s| names_match(&s.name, text)) {
            return Ok(section.gid.clone());
        }
    }

    Err(CoreError::NameNotFound(text.to_string()))
}

fn is_raw_gid(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

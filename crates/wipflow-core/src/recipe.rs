use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    AddTag,
    RemoveTag,
    AssignTo,
    MoveToSection,
    AddComment,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::AddTag => "add_tag",
            ActionKind::RemoveTag => "remove_tag",
            ActionKind::AssignTo => "assign_to",
            ActionKind::MoveToSection => "move_to_section",
            ActionKind::AddComment => "add_comment",
        }
    }

    /// Formula command word.
    pub fn command(self) -> &'static str {
        match self {
            ActionKind::AddTag => "TAG",
            ActionKind::RemoveTag => "REMOVE_TAG",
            ActionKind::AssignTo => "ASSIGN",
            ActionKind::MoveToSection => "MOVE",
            ActionKind::AddComment => "COMMENT",
        }
    }

    fn from_command(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "TAG" => Some(ActionKind::AddTag),
            "REMOVE_TAG" => Some(ActionKind::RemoveTag),
            "ASSIGN" => Some(ActionKind::AssignTo),
            "MOVE" => Some(ActionKind::MoveToSection),
            "COMMENT" => Some(ActionKind::AddComment),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    #[default]
    Child,
    Parent,
}

impl Target {
    pub fn code(self) -> &'static str {
        match self {
            Target::Child => "SUB",
            Target::Parent => "MAIN",
        }
    }

    fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SUB" => Some(Target::Child),
            "MAIN" => Some(Target::Parent),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Child => f.write_str("subtask"),
            Target::Parent => f.write_str("main task"),
        }
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    #[serde(default)]
    pub target: Target,
    pub value: String,
}

impl Action {
    pub fn new(kind: ActionKind, target: Target, value: impl Into<String>) -> Self {
        Self {
            kind,
            target,
            value: value.into(),
        }
    }

    /// Sections only exist on the parent, so moves always land there.
    pub fn effective_target(&self) -> Target {
        match self.kind {
            ActionKind::MoveToSection => Target::Parent,
            _ => self.target,
        }
    }

    /// One line of the audit comment posted after a recipe runs.
    pub fn audit_line(&self) -> String {
        let target = match self.target {
            Target::Child => "Subtask",
            Target::Parent => "Main",
        };
        format!(
            "  • Target: {target} | Action: {} | Value: '{}'",
            self.kind, self.value
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.target.code(), self.kind.command(), self.value)
    }
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// An ordered, immutable list of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Recipe {
    actions: Vec<Action>,
}

impl Recipe {
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        if actions.is_empty() {
            return Err(CoreError::EmptyRecipe);
        }
        Ok(Self { actions })
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Parse a barcode formula: `;`-separated `[TARGET:]COMMAND:VALUE`.
    ///
    /// The whole formula is validated before anything can run; one bad
    /// segment rejects the recipe.
    pub fn parse(formula: &str) -> Result<Self> {
        let actions = formula
            .split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(parse_segment)
            .collect::<Result<Vec<_>>>()?;
        Self::new(actions)
    }

    /// Load a recipe from a JSON or YAML list of actions.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let actions: Vec<Action> = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&data)?,
            _ => serde_json::from_str(&data)?,
        };
        Self::new(actions)
    }

    /// Canonical formula with every target spelled out.
    pub fn to_formula(&self) -> String {
        self.actions
            .iter()
            .map(Action::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Splits on at most two colons. Three fields name a target and the value
/// keeps any further colons; two fields default the target to the child.
fn parse_segment(segment: &str) -> Result<Action> {
    let fields: Vec<&str> = segment.splitn(3, ':').collect();
    let (target, command, value) = match fields[..] {
        [target, command, value] => {
            let target = Target::from_code(target).ok_or_else(|| {
                CoreError::syntax(segment, format!("unknown target '{}'", target.trim()))
            })?;
            (target, command, value)
        }
        [command, value] => (Target::Child, command, value),
        _ => return Err(CoreError::syntax(segment, "expected COMMAND:VALUE")),
    };

    let kind = ActionKind::from_command(command).ok_or_else(|| {
        CoreError::syntax(segment, format!("unknown command '{}'", command.trim()))
    })?;
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::syntax(segment, "missing value"));
    }

    Ok(Action::new(kind, target, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn command_value_defaults_to_child() {
        let recipe = Recipe::parse("TAG:Cleaned").unwrap();
        assert_eq!(
            recipe.actions(),
            &[Action::new(ActionKind::AddTag, Target::Child, "Cleaned")]
        );
    }

    #[test]
    fn main_move_targets_parent() {
        let recipe = Recipe::parse("MAIN:MOVE:Ready for Buyer").unwrap();
        assert_eq!(
            recipe.actions(),
            &[Action::new(
                ActionKind::MoveToSection,
                Target::Parent,
                "Ready for Buyer"
            )]
        );
    }

    #[test]
    fn four_fields_are_rejected() {
        let err = Recipe::parse("TAG:X:Y:Z").unwrap_err();
        assert!(matches!(err, CoreError::Syntax { ref segment, .. } if segment == "TAG:X:Y:Z"));
        assert!(err.to_string().contains("unknown target 'TAG'"));
    }

    #[test]
    fn three_fields_need_a_target() {
        let err = Recipe::parse("COMMENT:a:b").unwrap_err();
        assert!(matches!(err, CoreError::Syntax { ref reason, .. } if reason == "unknown target 'COMMENT'"));
        assert!(Recipe::parse("MOVE:Needs COR:x").is_err());
    }

    #[test]
    fn value_after_explicit_target_keeps_colons() {
        let recipe = Recipe::parse("MAIN:TAG:a:b;SUB:COMMENT:a:b:c").unwrap();
        assert_eq!(
            recipe.actions(),
            &[
                Action::new(ActionKind::AddTag, Target::Parent, "a:b"),
                Action::new(ActionKind::AddComment, Target::Child, "a:b:c"),
            ]
        );
    }

    #[test]
    fn one_bad_segment_rejects_whole_formula() {
        assert!(Recipe::parse("TAG:Cleaned;BOGUS:x").is_err());
        assert!(Recipe::parse("TAG:Cleaned;justtext").is_err());
        assert!(Recipe::parse("SIDE:TAG:x").is_err());
    }

    #[test]
    fn multi_action_formula_with_trailing_separator() {
        let recipe =
            Recipe::parse(" sub:tag:Cleaned ; main:assign: Mandy McIntosh ;COMMENT:done;").unwrap();
        assert_eq!(recipe.len(), 3);
        assert_eq!(recipe.actions()[1].kind, ActionKind::AssignTo);
        assert_eq!(recipe.actions()[1].target, Target::Parent);
        assert_eq!(recipe.actions()[1].value, "Mandy McIntosh");
        assert_eq!(recipe.actions()[2].target, Target::Child);
    }

    #[test]
    fn comment_text_may_contain_colons() {
        let recipe = Recipe::parse("MAIN:COMMENT:note: sent 10:30").unwrap();
        assert_eq!(recipe.actions()[0].value, "note: sent 10:30");
        assert_eq!(recipe.actions()[0].target, Target::Parent);
    }

    #[test]
    fn empty_formula_and_empty_value_are_rejected() {
        assert!(matches!(Recipe::parse(" ; ;"), Err(CoreError::EmptyRecipe)));
        assert!(Recipe::parse("TAG: ").is_err());
    }

    #[test]
    fn move_always_targets_parent() {
        let action = Action::new(ActionKind::MoveToSection, Target::Child, "Needs COR");
        assert_eq!(action.effective_target(), Target::Parent);
        let tag = Action::new(ActionKind::AddTag, Target::Child, "DOG");
        assert_eq!(tag.effective_target(), Target::Child);
    }

    #[test]
    fn formula_display_reparses() {
        let recipe = Recipe::parse("TAG:DOG;MAIN:MOVE:Needs COR").unwrap();
        assert_eq!(recipe.to_formula(), "SUB:TAG:DOG;MAIN:MOVE:Needs COR");
        assert_eq!(Recipe::parse(&recipe.to_formula()).unwrap(), recipe);
    }

    #[test]
    fn audit_line_format() {
        let action = Action::new(ActionKind::AddTag, Target::Parent, "DOG");
        assert_eq!(
            action.audit_line(),
            "  • Target: Main | Action: add_tag | Value: 'DOG'"
        );
    }

    #[test]
    fn load_yaml_recipe_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recipe.yaml");
        std::fs::write(
            &path,
            "- kind: add_tag\n  value: Cleaned\n- kind: move_to_section\n  target: parent\n  value: Needs COR\n",
        )
        .unwrap();
        let recipe = Recipe::load(&path).unwrap();
        assert_eq!(recipe.actions()[0].target, Target::Child);
        assert_eq!(recipe.actions()[1].kind, ActionKind::MoveToSection);
    }

    #[test]
    fn load_empty_json_recipe_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recipe.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(Recipe::load(&path), Err(CoreError::EmptyRecipe)));
    }
}

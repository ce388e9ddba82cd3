use crate::client::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no task found with WIP '{0}'")]
    WorkItemNotFound(String),

    #[error("could not find an identifier for name '{0}'")]
    NameNotFound(String),

    #[error("no subtask with '{code}' in its name found under '{parent}'")]
    NoMatchingChild { code: String, parent: String },

    #[error("parent task '{0}' has the PURGE tag")]
    PurgedParent(String),

    #[error("unknown reason '{reason}' (expected one of: {known})")]
    UnknownReason { reason: String, known: String },

    #[error("order hold is not available for '{0}': its parent is in the root project")]
    OrderHoldUnavailable(String),

    #[error("invalid recipe formula segment '{segment}': {reason}")]
    Syntax { segment: String, reason: String },

    #[error("recipe is empty")]
    EmptyRecipe,

    #[error("no tasks found with tag '{0}'")]
    EmptyCart(String),

    #[error("'{0}' is not configured in the taxonomy snapshot")]
    MissingBinding(String),

    #[error("critical: project '{0}' not found in taxonomy snapshot")]
    MissingRootProject(String),

    #[error("could not find task for '{code}': provide the WIP manually")]
    ManualCodeRequired {
        code: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub fn syntax(segment: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::Syntax {
            segment: segment.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

//! The remote primitives the rest of the crate consumes.
//!
//! [`TaskTracker`] is the seam between workflow logic and the tracking
//! service. [`crate::asana::AsanaClient`] is the production implementation;
//! tests substitute an in-memory fake.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// A failed call against the tracking service. Every variant renders a
/// message suitable for showing to an operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Error 400: Bad Request. Check input data or request format. Details: {body}")]
    BadRequest { body: String },

    #[error("Error 401: Unauthorized. Check your Asana access token.")]
    Unauthorized,

    #[error("Error 403: Forbidden. Insufficient permissions for {operation}. Details: {body}")]
    Forbidden { operation: String, body: String },

    #[error("Error 404: Not Found. Verify IDs or endpoint. Details: {body}")]
    NotFound { body: String },

    #[error("Warning 429: Too Many Requests. Rate limit exceeded. Try again in {retry_after} seconds.")]
    RateLimited { retry_after: String },

    #[error("An unexpected HTTP error {status} occurred: {reason}. Details: {body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("A network connection error occurred. Please check your internet connection.")]
    Connection,

    #[error("The request to the Asana API timed out.")]
    Timeout,

    #[error("Failed to parse Asana API response for {operation}.")]
    Decode { operation: String },

    #[error("Attachment error: {0}")]
    Attachment(String),

    #[error("An unexpected error occurred during the API request: {0}")]
    Other(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Minimal task reference: gid plus (optionally) its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub gid: String,
    #[serde(default)]
    pub name: String,
}

impl TaskRef {
    pub fn new(gid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            gid: gid.into(),
            name: name.into(),
        }
    }
}

/// A text-search hit, carrying its parent when it is a subtask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub gid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent: Option<TaskRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GidRef {
    pub gid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    pub gid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Vec<GidRef>,
    #[serde(default)]
    pub projects: Vec<GidRef>,
}

impl TaskDetails {
    pub fn has_tag(&self, tag_gid: &str) -> bool {
        self.tags.iter().any(|t| t.gid == tag_gid)
    }

    pub fn in_project(&self, project_gid: &str) -> bool {
        self.projects.iter().any(|p| p.gid == project_gid)
    }
}

/// A file to upload to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

impl Attachment {
    pub const DEFAULT_CONTENT_TYPE: &'static str = "application/octet-stream";

    pub fn new(
        file_name: impl Into<String>,
        content: Vec<u8>,
        content_type: Option<&str>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content,
            content_type: content_type
                .unwrap_or(Self::DEFAULT_CONTENT_TYPE)
                .to_string(),
        }
    }

    pub fn from_path(path: &Path) -> ApiResult<Self> {
        if !path.exists() {
            return Err(ApiError::Attachment(format!(
                "attachment file not found at: {}",
                path.display()
            )));
        }
        let content = std::fs::read(path)
            .map_err(|e| ApiError::Attachment(format!("error reading file: {e}")))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, content, None))
    }

    /// File name without its extension; operators name certificates after
    /// the WIP code.
    pub fn stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }
}

// ---------------------------------------------------------------------------
// TaskTracker
// ---------------------------------------------------------------------------

pub trait TaskTracker {
    /// Free-text task search, in the service's own ranking order.
    fn search_by_text(&self, text: &str) -> ApiResult<Vec<TaskSummary>>;
    fn get_details(&self, task_gid: &str) -> ApiResult<TaskDetails>;
    fn get_children(&self, task_gid: &str) -> ApiResult<Vec<TaskRef>>;
    fn get_by_tag(&self, tag_gid: &str) -> ApiResult<Vec<TaskRef>>;
    fn add_tag(&self, task_gid: &str, tag_gid: &str) -> ApiResult<()>;
    fn remove_tag(&self, task_gid: &str, tag_gid: &str) -> ApiResult<()>;
    fn assign(&self, task_gid: &str, user_gid: &str) -> ApiResult<()>;
    fn comment(&self, task_gid: &str, text: &str) -> ApiResult<()>;
    fn rename(&self, task_gid: &str, name: &str) -> ApiResult<()>;
    fn move_to_section(&self, task_gid: &str, section_gid: &str) -> ApiResult<()>;
    fn upload_attachment(&self, task_gid: &str, attachment: &Attachment) -> ApiResult<()>;
}

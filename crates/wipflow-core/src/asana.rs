//! Blocking HTTP implementation of [`TaskTracker`] for the Asana REST API.

use crate::client::{
    ApiError, ApiResult, Attachment, TaskDetails, TaskRef, TaskSummary, TaskTracker,
};
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://app.asana.com/api/1.0";

const SEARCH_FIELDS: &str = "name,gid,parent,parent.name";
const DETAIL_FIELDS: &str = "name,gid,tags.gid,projects.gid";
const LIST_FIELDS: &str = "name,gid";

/// Every Asana response wraps its payload in `{"data": ...}`.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

pub struct AsanaClient {
    http: Client,
    base_url: String,
    token: String,
    workspace_id: String,
}

impl AsanaClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        workspace_id: impl Into<String>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Other(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            workspace_id: workspace_id.into(),
        })
    }

    fn request(&self, method: reqwest::Method, endpoint: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, endpoint))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn send(&self, operation: &str, builder: RequestBuilder) -> ApiResult<Response> {
        tracing::debug!(operation, "asana request");
        let response = builder.send().map_err(|e| transport_error(operation, &e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("N/A")
            .to_string();
        let body = response.text().unwrap_or_default();
        tracing::error!(operation, status = status.as_u16(), body = %body, "asana http error");
        Err(status_error(operation, status, body, retry_after))
    }

    fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let operation = format!("GET {endpoint}");
        let response = self.send(
            &operation,
            self.request(reqwest::Method::GET, endpoint).query(query),
        )?;
        decode(&operation, response)
    }

    /// Send a `{"data": payload}` body and discard the response payload.
    fn write(&self, method: reqwest::Method, endpoint: &str, payload: Value) -> ApiResult<()> {
        let operation = format!("{method} {endpoint}");
        self.send(
            &operation,
            self.request(method, endpoint).json(&json!({ "data": payload })),
        )?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(operation: &str, response: Response) -> ApiResult<T> {
    let envelope: Envelope<T> = response.json().map_err(|e| {
        tracing::error!(operation, error = %e, "failed to parse asana response");
        ApiError::Decode {
            operation: operation.to_string(),
        }
    })?;
    Ok(envelope.data)
}

fn transport_error(operation: &str, e: &reqwest::Error) -> ApiError {
    tracing::error!(operation, error = %e, "asana transport error");
    if e.is_timeout() {
        ApiError::Timeout
    } else if e.is_connect() {
        ApiError::Connection
    } else {
        ApiError::Other(e.to_string())
    }
}

fn status_error(operation: &str, status: StatusCode, body: String, retry_after: String) -> ApiError {
    match status.as_u16() {
        400 => ApiError::BadRequest { body },
        401 => ApiError::Unauthorized,
        403 => ApiError::Forbidden {
            operation: operation.to_string(),
            body,
        },
        404 => ApiError::NotFound { body },
        429 => ApiError::RateLimited { retry_after },
        code => ApiError::Status {
            status: code,
            reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            body,
        },
    }
}

impl TaskTracker for AsanaClient {
    fn search_by_text(&self, text: &str) -> ApiResult<Vec<TaskSummary>> {
        let endpoint = format!("/workspaces/{}/tasks/search", self.workspace_id);
        self.get(
            &endpoint,
            &[
                ("text", text),
                ("resource.type", "task"),
                ("opt_fields", SEARCH_FIELDS),
            ],
        )
    }

    fn get_details(&self, task_gid: &str) -> ApiResult<TaskDetails> {
        self.get(
            &format!("/tasks/{task_gid}"),
            &[("opt_fields", DETAIL_FIELDS)],
        )
    }

    fn get_children(&self, task_gid: &str) -> ApiResult<Vec<TaskRef>> {
        self.get(
            &format!("/tasks/{task_gid}/subtasks"),
            &[("opt_fields", LIST_FIELDS)],
        )
    }

    fn get_by_tag(&self, tag_gid: &str) -> ApiResult<Vec<TaskRef>> {
        self.get(
            &format!("/tags/{tag_gid}/tasks"),
            &[("opt_fields", LIST_FIELDS)],
        )
    }

    fn add_tag(&self, task_gid: &str, tag_gid: &str) -> ApiResult<()> {
        self.write(
            reqwest::Method::POST,
            &format!("/tasks/{task_gid}/addTag"),
            json!({ "tag": tag_gid }),
        )
    }

    fn remove_tag(&self, task_gid: &str, tag_gid: &str) -> ApiResult<()> {
        self.write(
            reqwest::Method::POST,
            &format!("/tasks/{task_gid}/removeTag"),
            json!({ "tag": tag_gid }),
        )
    }

    fn assign(&self, task_gid: &str, user_gid: &str) -> ApiResult<()> {
        self.write(
            reqwest::Method::PUT,
            &format!("/tasks/{task_gid}"),
            json!({ "assignee": user_gid }),
        )
    }

    fn comment(&self, task_gid: &str, text: &str) -> ApiResult<()> {
        self.write(
            reqwest::Method::POST,
            &format!("/tasks/{task_gid}/stories"),
            json!({ "text": text }),
        )
    }

    fn rename(&self, task_gid: &str, name: &str) -> ApiResult<()> {
        self.write(
            reqwest::Method::PUT,
            &format!("/tasks/{task_gid}"),
            json!({ "name": name }),
        )
    }

    fn move_to_section(&self, task_gid: &str, section_gid: &str) -> ApiResult<()> {
        self.write(
            reqwest::Method::POST,
            &format!("/sections/{section_gid}/addTask"),
            json!({ "task": task_gid }),
        )
    }

    fn upload_attachment(&self, task_gid: &str, attachment: &Attachment) -> ApiResult<()> {
        tracing::info!(task_gid, file = %attachment.file_name, "uploading attachment");
        let part = multipart::Part::bytes(attachment.content.clone())
            .file_name(attachment.file_name.clone())
            .mime_str(&attachment.content_type)
            .map_err(|e| ApiError::Attachment(format!("invalid content type: {e}")))?;
        let form = multipart::Form::new().part("file", part);
        let endpoint = format!("/tasks/{task_gid}/attachments");
        self.send(
            &format!("POST {endpoint}"),
            self.request(reqwest::Method::POST, &endpoint).multipart(form),
        )?;
        Ok(())
    }
}

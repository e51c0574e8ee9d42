//! Remote Task Store port and its HTTP adapter.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::BoardError;
use crate::task::{NewTask, Subtask, SubtaskId, Task};

/// The backend service of record for tasks and subtasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// `GET /tasks/`. The collection may be an array or an object keyed by id.
    async fn fetch_tasks(&self) -> Result<Vec<Task>, BoardError>;

    /// `PUT /tasks/{id}/` with the full task body.
    async fn update_task(&self, task: &Task) -> Result<(), BoardError>;

    /// `PUT /subtasks/{id}/` with `{title, status}`.
    async fn update_subtask(&self, id: SubtaskId, subtask: &Subtask) -> Result<(), BoardError>;

    /// `DELETE /subtasks/{id}/`.
    async fn delete_subtask(&self, id: SubtaskId) -> Result<(), BoardError>;

    /// `POST /tasks/`.
    async fn create_task(&self, task: &NewTask) -> Result<(), BoardError>;
}

#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct SubtaskBody<'a> {
    title: &'a str,
    status: bool,
}

impl HttpTaskStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn check(method: &'static str, url: &str, response: Response) -> Result<Response, BoardError> {
    let status = response.status();
    if !status.is_success() {
        return Err(BoardError::Status {
            method,
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// Accepts either a JSON array of tasks or an object keyed by opaque id.
pub fn parse_collection(body: &str) -> Result<Vec<Task>, BoardError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| BoardError::Malformed(format!("failed to parse response: {e}")))?;

    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(map) => map.into_iter().map(|(_, row)| row).collect(),
        Value::Null => Vec::new(),
        other => {
            return Err(BoardError::Malformed(format!(
                "expected task collection, got {other}"
            )))
        }
    };
    if rows.is_empty() {
        return Err(BoardError::EmptyResponse);
    }

    let total = rows.len();
    let mut last_error = None;
    let tasks: Vec<Task> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<Task>(row) {
            Ok(task) => Some(task),
            Err(e) => {
                warn!(error = %e, "skipping undecodable task row");
                last_error = Some(e);
                None
            }
        })
        .collect();
    match last_error {
        Some(e) if tasks.is_empty() => Err(BoardError::Malformed(format!(
            "none of {total} task rows could be decoded: {e}"
        ))),
        _ => Ok(tasks),
    }
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, BoardError> {
        let url = self.url("tasks/");
        debug!(%url, "fetching tasks");
        let response = check("GET", &url, self.client.get(&url).send().await?)?;
        let body = response.text().await?;
        parse_collection(&body)
    }

    async fn update_task(&self, task: &Task) -> Result<(), BoardError> {
        let url = self.url(&format!("tasks/{}/", task.id));
        debug!(%url, position = ?task.position, "updating task");
        let response = check("PUT", &url, self.client.put(&url).json(task).send().await?)?;
        // The backend echoes the task back; only the status matters here.
        let _ = response.bytes().await?;
        Ok(())
    }

    async fn update_subtask(&self, id: SubtaskId, subtask: &Subtask) -> Result<(), BoardError> {
        let url = self.url(&format!("subtasks/{id}/"));
        let body = SubtaskBody {
            title: &subtask.title,
            status: subtask.status,
        };
        debug!(%url, status = subtask.status, "updating subtask");
        check("PUT", &url, self.client.put(&url).json(&body).send().await?)?;
        Ok(())
    }

    async fn delete_subtask(&self, id: SubtaskId) -> Result<(), BoardError> {
        let url = self.url(&format!("subtasks/{id}/"));
        debug!(%url, "deleting subtask");
        check("DELETE", &url, self.client.delete(&url).send().await?)?;
        Ok(())
    }

    async fn create_task(&self, task: &NewTask) -> Result<(), BoardError> {
        let url = self.url("tasks/");
        debug!(%url, title = %task.title, "creating task");
        check("POST", &url, self.client.post(&url).json(task).send().await?)?;
        Ok(())
    }
}

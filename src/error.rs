use thiserror::Error;

use crate::task::TaskId;

/// Errors from the task store, cache and board operations.
///
/// Network failures and empty/malformed responses are the only kinds the
/// board distinguishes; callers log them and keep rendering the last cache.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {url} returned {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("store returned no tasks")]
    EmptyResponse,

    #[error("task {0} is not in the cache")]
    NotCached(TaskId),

    #[error("task {task} has no subtask at slot {slot}")]
    NoSuchSubtask { task: TaskId, slot: usize },

    #[error("{0}")]
    Invalid(String),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl BoardError {
    /// True for failures that came from talking to the store.
    pub fn is_network(&self) -> bool {
        matches!(self, BoardError::Http(_) | BoardError::Status { .. })
    }
}

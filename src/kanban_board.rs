use std::sync::Arc;

use chrono::Local;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::cache::TaskCache;
use crate::error::BoardError;
use crate::render::{BoardView, Renderer};
use crate::store::TaskStore;
use crate::summary::Summary;
use crate::task::{NewTask, Position, Task, TaskId};

/// What to do after a position write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPolicy {
    /// Reload even when the write failed; the board then shows the store's
    /// pre-write state.
    #[default]
    AlwaysReload,
    /// Reload only after a successful write; a failed write keeps the local
    /// position and is reported to the caller.
    ReloadOnSuccess,
}

impl std::str::FromStr for SyncPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "always-reload" => Ok(SyncPolicy::AlwaysReload),
            "reload-on-success" => Ok(SyncPolicy::ReloadOnSuccess),
            other => Err(format!(
                "unknown sync policy '{other}' (expected: always-reload|reload-on-success)"
            )),
        }
    }
}

/// Owns the task cache and its rendered view, and mediates every mutation
/// against the remote store.
pub struct KanbanBoard<S> {
    store: Arc<S>,
    cache: TaskCache,
    renderer: Renderer,
    view: BoardView,
    filter: Option<String>,
    policy: SyncPolicy,
}

impl<S: TaskStore> KanbanBoard<S> {
    pub fn new(store: Arc<S>, policy: SyncPolicy) -> Result<Self, BoardError> {
        Ok(Self {
            store,
            cache: TaskCache::new(),
            renderer: Renderer::new()?,
            view: BoardView::empty(),
            filter: None,
            policy,
        })
    }

    pub fn tasks(&self) -> &[Task] {
        self.cache.tasks()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.cache.get(id)
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut BoardView {
        &mut self.view
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn active_filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn summary(&self) -> Summary {
        Summary::from_tasks(self.cache.tasks())
    }

    /// Fetches the full collection and swaps it into the cache, then
    /// re-renders. On any failure the cache is left as it was.
    pub async fn reload(&mut self) -> Result<usize, BoardError> {
        match self.store.fetch_tasks().await {
            Ok(tasks) => {
                let count = tasks.len();
                self.cache.replace(tasks);
                debug!(count, "task cache reloaded");
                self.rerender();
                Ok(count)
            }
            Err(e) => {
                error!(error = %e, "failed to load tasks; keeping previous cache");
                Err(e)
            }
        }
    }

    /// Renders `filtered` if given, otherwise the whole cache.
    pub fn render(&mut self, filtered: Option<&[Task]>) {
        let tasks = filtered.unwrap_or(self.cache.tasks());
        self.view = self.renderer.render(tasks);
    }

    /// Re-renders honouring the active search query.
    fn rerender(&mut self) {
        match self.filter.clone() {
            Some(query) => {
                let subset = self.cache.filter(&query);
                self.render(Some(&subset));
            }
            None => self.render(None),
        }
    }

    /// Board search box. An empty query restores the full board.
    pub fn filter(&mut self, query: &str) {
        self.filter = if query.trim().is_empty() {
            None
        } else {
            Some(query.to_string())
        };
        self.rerender();
    }

    /// Moves a task to `target`: local update first, then a full-resource
    /// PUT, then a reload according to the sync policy.
    pub async fn change_position(&mut self, id: TaskId, target: Position) -> Result<(), BoardError> {
        let previous = self
            .cache
            .set_position(id, target)
            .ok_or(BoardError::NotCached(id))?;
        self.view.move_card(id, target);
        let snapshot = self.cache.get(id).cloned().ok_or(BoardError::NotCached(id))?;
        info!(task = id, from = ?previous, to = %target, "moving task");

        let written = self.store.update_task(&snapshot).await;
        if let Err(e) = &written {
            warn!(task = id, error = %e, "failed to write task position");
        }

        if written.is_ok() || self.policy == SyncPolicy::AlwaysReload {
            // Reload failures are logged inside and never mask the write result.
            let _ = self.reload().await;
        }
        written
    }

    /// Flips one subtask's completion flag and pushes it to the store.
    /// The local toggle stays even if the write fails.
    pub async fn toggle_subtask(&mut self, id: TaskId, slot: usize) -> Result<bool, BoardError> {
        let current = self
            .cache
            .get(id)
            .ok_or(BoardError::NotCached(id))?
            .subtasks
            .get(slot)
            .ok_or(BoardError::NoSuchSubtask { task: id, slot })?
            .status;
        let subtask = self
            .cache
            .set_subtask_status(id, slot, !current)
            .cloned()
            .ok_or(BoardError::NoSuchSubtask { task: id, slot })?;
        if let Some(task) = self.cache.get(id) {
            self.view.refresh_card(task);
        }

        let Some(subtask_id) = subtask.id else {
            debug!(task = id, slot, "subtask not persisted yet; toggled locally");
            return Ok(subtask.status);
        };
        if let Err(e) = self.store.update_subtask(subtask_id, &subtask).await {
            error!(task = id, subtask = subtask_id, error = %e, "failed to update subtask state");
            return Err(e);
        }
        Ok(subtask.status)
    }

    /// Deletes a subtask remotely (when persisted) and then locally. A failed
    /// remote delete leaves the list untouched.
    pub async fn delete_subtask(&mut self, id: TaskId, slot: usize) -> Result<(), BoardError> {
        let subtask = self
            .cache
            .get(id)
            .ok_or(BoardError::NotCached(id))?
            .subtasks
            .get(slot)
            .cloned()
            .ok_or(BoardError::NoSuchSubtask { task: id, slot })?;

        if let Some(subtask_id) = subtask.id {
            if let Err(e) = self.store.delete_subtask(subtask_id).await {
                error!(task = id, subtask = subtask_id, error = %e, "failed to delete subtask");
                return Err(e);
            }
        }
        self.cache.remove_subtask(id, slot);
        if let Some(task) = self.cache.get(id) {
            self.view.refresh_card(task);
        }
        Ok(())
    }

    /// Validates and posts a new task, then reloads the board.
    pub async fn create_task(&mut self, task: NewTask) -> Result<(), BoardError> {
        validate_new_task(&task)?;
        self.store.create_task(&task).await.inspect_err(|e| {
            error!(title = %task.title, error = %e, "failed to create task");
        })?;
        info!(title = %task.title, position = %task.position, "task created");
        let _ = self.reload().await;
        Ok(())
    }
}

/// Presence checks for title, due date and category, plus a due date that
/// is not in the past.
pub fn validate_new_task(task: &NewTask) -> Result<(), BoardError> {
    if task.title.trim().is_empty() {
        return Err(BoardError::Invalid("title is required".into()));
    }
    if task.due_date.trim().is_empty() {
        return Err(BoardError::Invalid("due date is required".into()));
    }
    if task.category.trim().is_empty() {
        return Err(BoardError::Invalid("category is required".into()));
    }
    let due = chrono::NaiveDate::parse_from_str(task.due_date.trim(), "%Y-%m-%d")
        .map_err(|_| BoardError::Invalid(format!("due date '{}' is not YYYY-MM-DD", task.due_date)))?;
    if due < Local::now().date_naive() {
        return Err(BoardError::Invalid("due date must not be in the past".into()));
    }
    Ok(())
}

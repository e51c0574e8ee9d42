use std::collections::HashMap;

use crate::task::{Position, Subtask, Task, TaskId};

/// Client-local mirror of the last fetched task collection.
///
/// The list keeps fetch order; the index maps stable task ids to slots and
/// is rebuilt together with the list, so lookups never go through positions
/// from an older load.
#[derive(Debug, Default)]
pub struct TaskCache {
    tasks: Vec<Task>,
    index: HashMap<TaskId, usize>,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a freshly fetched list in one step.
    pub fn replace(&mut self, tasks: Vec<Task>) {
        let index = tasks.iter().enumerate().map(|(slot, t)| (t.id, slot)).collect();
        self.tasks = tasks;
        self.index = index;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.index.get(&id).map(|&slot| &self.tasks[slot])
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.index.get(&id).map(|&slot| &mut self.tasks[slot])
    }

    /// Returns the previous position, or `None` if the task is not cached.
    pub fn set_position(&mut self, id: TaskId, position: Position) -> Option<Option<Position>> {
        let task = self.get_mut(id)?;
        Some(task.position.replace(position))
    }

    pub fn set_subtask_status(&mut self, id: TaskId, slot: usize, done: bool) -> Option<&Subtask> {
        let subtask = self.get_mut(id)?.subtasks.get_mut(slot)?;
        subtask.status = done;
        Some(subtask)
    }

    pub fn remove_subtask(&mut self, id: TaskId, slot: usize) -> Option<Subtask> {
        let subtasks = &mut self.get_mut(id)?.subtasks;
        (slot < subtasks.len()).then(|| subtasks.remove(slot))
    }

    /// Tasks whose title or description contains `query`, ignoring case.
    pub fn filter(&self, query: &str) -> Vec<Task> {
        let needle = query.trim().to_lowercase();
        self.tasks
            .iter()
            .filter(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }
}

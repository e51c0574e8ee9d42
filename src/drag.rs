//! Drag/drop gesture state: `Idle → Dragging → Dropped → Idle`.

use std::mem;

use tracing::debug;

use crate::error::BoardError;
use crate::kanban_board::KanbanBoard;
use crate::render::BoardView;
use crate::store::TaskStore;
use crate::task::{Position, TaskRef};

/// Result of releasing a card over a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved { task: TaskRef, from: Position, to: Position },
    /// Dropped onto the column it already occupies.
    Unchanged { task: TaskRef, column: Position },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        task: TaskRef,
        origin: Position,
        hover: Option<Position>,
    },
    Dropped(DropOutcome),
}

/// Holds the state of the one gesture in progress, if any.
#[derive(Debug, Default)]
pub struct DragDropCoordinator {
    state: Gesture,
}

impl DragDropCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Gesture {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, Gesture::Dragging { .. })
    }

    pub fn dragged(&self) -> Option<&TaskRef> {
        match &self.state {
            Gesture::Dragging { task, .. } => Some(task),
            _ => None,
        }
    }

    pub fn hover_target(&self) -> Option<Position> {
        match self.state {
            Gesture::Dragging { hover, .. } => hover,
            _ => None,
        }
    }

    /// Captures the dragged task. A drag already in progress is replaced.
    pub fn begin(&mut self, task: TaskRef, origin: Position) {
        debug!(task = task.id, %origin, "drag started");
        self.state = Gesture::Dragging {
            task,
            origin,
            hover: Some(origin),
        };
    }

    /// Records the column under the pointer.
    pub fn hover(&mut self, target: Position) {
        if let Gesture::Dragging { hover, .. } = &mut self.state {
            *hover = Some(target);
        }
    }

    /// Releases the card over `target`. The card node moves into the target
    /// container unless it already lives there. Does nothing unless a drag
    /// is in progress.
    pub fn drop_on(&mut self, target: Position, view: &mut BoardView) -> Option<&DropOutcome> {
        let Gesture::Dragging { task, origin, .. } = mem::take(&mut self.state) else {
            return None;
        };
        let current = view.locate(task.id).map_or(origin, |h| h.position);
        let outcome = if current == target {
            DropOutcome::Unchanged { task, column: target }
        } else {
            view.move_card(task.id, target);
            DropOutcome::Moved {
                task,
                from: current,
                to: target,
            }
        };
        debug!(?outcome, "card dropped");
        self.state = Gesture::Dropped(outcome);
        if let Gesture::Dropped(outcome) = &self.state {
            Some(outcome)
        } else {
            None
        }
    }

    /// Commits a dropped card through position sync and returns to idle.
    /// Same-column drops make no remote call. The gesture is reset even when
    /// the sync fails.
    pub async fn commit<S: TaskStore>(
        &mut self,
        board: &mut KanbanBoard<S>,
    ) -> Result<Option<DropOutcome>, BoardError> {
        let Gesture::Dropped(outcome) = mem::take(&mut self.state) else {
            return Ok(None);
        };
        if let DropOutcome::Moved { task, to, .. } = &outcome {
            board.change_position(task.id, *to).await?;
        }
        Ok(Some(outcome))
    }

    pub fn cancel(&mut self) {
        if self.state != Gesture::Idle {
            debug!("drag cancelled");
        }
        self.state = Gesture::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::task;
    use crate::kanban_board::SyncPolicy;
    use crate::render::Renderer;
    use crate::store::MockTaskStore;
    use std::sync::Arc;

    fn seven_ref() -> TaskRef {
        TaskRef { id: 7, title: "seven".into() }
    }

    fn view() -> BoardView {
        Renderer::new()
            .unwrap()
            .render(&[task(7, "seven", Position::ToDo), task(8, "eight", Position::Done)])
    }

    #[test]
    fn walks_idle_dragging_dropped() {
        let mut view = view();
        let mut dnd = DragDropCoordinator::new();
        assert_eq!(dnd.state(), &Gesture::Idle);

        dnd.begin(seven_ref(), Position::ToDo);
        dnd.hover(Position::AwaitFeedback);
        assert!(dnd.is_dragging());
        assert_eq!(dnd.hover_target(), Some(Position::AwaitFeedback));

        let outcome = dnd.drop_on(Position::AwaitFeedback, &mut view).cloned();
        assert_eq!(
            outcome,
            Some(DropOutcome::Moved {
                task: seven_ref(),
                from: Position::ToDo,
                to: Position::AwaitFeedback
            })
        );
        assert_eq!(view.locate(7).unwrap().position, Position::AwaitFeedback);
        assert!(matches!(dnd.state(), Gesture::Dropped(_)));
    }

    #[test]
    fn same_column_drop_leaves_view_alone() {
        let mut view = view();
        let before = view.clone();
        let mut dnd = DragDropCoordinator::new();
        dnd.begin(seven_ref(), Position::ToDo);

        let outcome = dnd.drop_on(Position::ToDo, &mut view).cloned();

        assert!(matches!(outcome, Some(DropOutcome::Unchanged { column: Position::ToDo, .. })));
        assert_eq!(view, before);
    }

    #[test]
    fn drop_without_drag_is_ignored() {
        let mut view = view();
        let mut dnd = DragDropCoordinator::new();
        assert!(dnd.drop_on(Position::Done, &mut view).is_none());
        assert_eq!(dnd.state(), &Gesture::Idle);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut dnd = DragDropCoordinator::new();
        dnd.begin(seven_ref(), Position::ToDo);
        dnd.cancel();
        assert_eq!(dnd.state(), &Gesture::Idle);
        assert_eq!(dnd.dragged(), None);
    }

    #[tokio::test]
    async fn commit_syncs_position_and_resets() {
        let mut store = MockTaskStore::new();
        store
            .expect_fetch_tasks()
            .returning(|| Ok(vec![task(7, "seven", Position::ToDo)]));
        store
            .expect_update_task()
            .withf(|t| t.id == 7 && t.position == Some(Position::Done))
            .times(1)
            .returning(|_| Ok(()));
        let mut board = KanbanBoard::new(Arc::new(store), SyncPolicy::AlwaysReload).unwrap();
        board.reload().await.unwrap();
        let mut dnd = DragDropCoordinator::new();

        dnd.begin(seven_ref(), Position::ToDo);
        dnd.drop_on(Position::Done, board.view_mut());
        let outcome = dnd.commit(&mut board).await.unwrap();

        assert!(matches!(outcome, Some(DropOutcome::Moved { to: Position::Done, .. })));
        assert_eq!(dnd.state(), &Gesture::Idle);
    }

    #[tokio::test]
    async fn same_column_commit_skips_the_store() {
        let mut store = MockTaskStore::new();
        store
            .expect_fetch_tasks()
            .times(1)
            .returning(|| Ok(vec![task(7, "seven", Position::ToDo)]));
        store.expect_update_task().never();
        let mut board = KanbanBoard::new(Arc::new(store), SyncPolicy::AlwaysReload).unwrap();
        board.reload().await.unwrap();
        let mut dnd = DragDropCoordinator::new();

        dnd.begin(seven_ref(), Position::ToDo);
        dnd.drop_on(Position::ToDo, board.view_mut());
        let outcome = dnd.commit(&mut board).await.unwrap();

        assert!(matches!(outcome, Some(DropOutcome::Unchanged { .. })));
        assert_eq!(dnd.state(), &Gesture::Idle);
    }

    #[tokio::test]
    async fn failed_sync_still_resets_gesture() {
        let mut store = MockTaskStore::new();
        store
            .expect_fetch_tasks()
            .returning(|| Ok(vec![task(7, "seven", Position::ToDo)]));
        store.expect_update_task().returning(|_| Err(BoardError::EmptyResponse));
        let mut board = KanbanBoard::new(Arc::new(store), SyncPolicy::AlwaysReload).unwrap();
        board.reload().await.unwrap();
        let mut dnd = DragDropCoordinator::new();

        dnd.begin(seven_ref(), Position::ToDo);
        dnd.drop_on(Position::InProgress, board.view_mut());

        assert!(dnd.commit(&mut board).await.is_err());
        assert_eq!(dnd.state(), &Gesture::Idle);
        assert_eq!(board.view().locate(7).unwrap().position, Position::ToDo);
    }
}

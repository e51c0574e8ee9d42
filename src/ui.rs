use std::io;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::info;

use crate::drag::{DragDropCoordinator, DropOutcome};
use crate::kanban_board::KanbanBoard;
use crate::render::{BoardView, Card, TaskDetail};
use crate::store::TaskStore;
use crate::task::{NewTask, Position, Priority, Subtask, TaskId};

/// Terminal lines per card; used for mouse hit-testing.
const CARD_HEIGHT: u16 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Board,
    Search,
    Detail(TaskId),
    Summary,
    MovePicker { task: TaskId, cursor: Position },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interaction state for the terminal board.
#[derive(Debug)]
pub struct App {
    pub mode: Mode,
    pub selected_column: Position,
    pub selected_card: usize,
    pub query: String,
    pub status: String,
    dnd: DragDropCoordinator,
    /// Card under the last left-button press; only this card can be dragged.
    pressed: Option<TaskId>,
    column_areas: [Rect; 4],
    list_offsets: [usize; 4],
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            mode: Mode::Board,
            selected_column: Position::ToDo,
            selected_card: 0,
            query: String::new(),
            status: String::from("r reload · / search · space drag · d detail · s summary · q quit"),
            dnd: DragDropCoordinator::new(),
            pressed: None,
            column_areas: [Rect::default(); 4],
            list_offsets: [0; 4],
        }
    }

    pub fn coordinator(&self) -> &DragDropCoordinator {
        &self.dnd
    }

    fn selected_id<S: TaskStore>(&self, board: &KanbanBoard<S>) -> Option<TaskId> {
        board
            .view()
            .column(self.selected_column)
            .cards
            .get(self.selected_card)
            .map(|c| c.id)
    }

    fn clamp_selection<S: TaskStore>(&mut self, board: &KanbanBoard<S>) {
        let len = board.view().column(self.selected_column).cards.len();
        self.selected_card = self.selected_card.min(len.saturating_sub(1));
    }

    fn select(&mut self, id: TaskId, board_view: &BoardView) {
        if let Some(handle) = board_view.locate(id) {
            self.selected_column = handle.position;
            self.selected_card = handle.slot;
        }
    }

    pub async fn handle_event<S: TaskStore>(&mut self, event: Event, board: &mut KanbanBoard<S>) -> Flow {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, board).await,
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse, board).await;
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    pub async fn handle_key<S: TaskStore>(&mut self, key: KeyEvent, board: &mut KanbanBoard<S>) -> Flow {
        match self.mode.clone() {
            Mode::Board => return self.board_key(key, board).await,
            Mode::Search => match key.code {
                KeyCode::Esc => {
                    self.query.clear();
                    board.filter("");
                    self.mode = Mode::Board;
                }
                KeyCode::Enter => self.mode = Mode::Board,
                KeyCode::Backspace => {
                    self.query.pop();
                    board.filter(&self.query);
                }
                KeyCode::Char(c) => {
                    self.query.push(c);
                    board.filter(&self.query);
                }
                _ => {}
            },
            Mode::Detail(id) => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => self.mode = Mode::Board,
                KeyCode::Char('m') => self.open_picker(id, board),
                KeyCode::Char(c @ '1'..='9') => {
                    let slot = c as usize - '1' as usize;
                    self.toggle(id, slot, board).await;
                }
                _ => {}
            },
            Mode::Summary => self.mode = Mode::Board,
            Mode::MovePicker { task, cursor } => match key.code {
                KeyCode::Left => self.mode = Mode::MovePicker { task, cursor: cursor.step(-1) },
                KeyCode::Right => self.mode = Mode::MovePicker { task, cursor: cursor.step(1) },
                KeyCode::Enter => {
                    self.mode = Mode::Board;
                    self.status = match board.change_position(task, cursor).await {
                        Ok(()) => format!("Moved #{task} to {}", cursor.label()),
                        Err(e) => format!("Move failed: {e}"),
                    };
                    self.select(task, board.view());
                }
                KeyCode::Esc => self.mode = Mode::Board,
                _ => {}
            },
        }
        Flow::Continue
    }

    async fn board_key<S: TaskStore>(&mut self, key: KeyEvent, board: &mut KanbanBoard<S>) -> Flow {
        let dragging = self.dnd.is_dragging();
        match key.code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Esc if dragging => {
                self.dnd.cancel();
                self.status = "Drag cancelled".into();
            }
            KeyCode::Left | KeyCode::Right => {
                let dir = if key.code == KeyCode::Left { -1 } else { 1 };
                if dragging {
                    let target = self.dnd.hover_target().unwrap_or(self.selected_column).step(dir);
                    self.dnd.hover(target);
                } else {
                    self.selected_column = self.selected_column.step(dir);
                    self.clamp_selection(board);
                }
            }
            KeyCode::Up if !dragging => self.selected_card = self.selected_card.saturating_sub(1),
            KeyCode::Down if !dragging => {
                self.selected_card += 1;
                self.clamp_selection(board);
            }
            KeyCode::Char(' ') if !dragging => {
                if let Some(id) = self.selected_id(board) {
                    self.pick_up(id, board);
                }
            }
            KeyCode::Enter if dragging => {
                let target = self.dnd.hover_target().unwrap_or(self.selected_column);
                self.finish_drop(target, board).await;
            }
            KeyCode::Enter | KeyCode::Char('d') => {
                if let Some(id) = self.selected_id(board) {
                    self.mode = Mode::Detail(id);
                }
            }
            KeyCode::Char('r') => {
                self.status = match board.reload().await {
                    Ok(count) => format!("Loaded {count} tasks"),
                    Err(e) => format!("Reload failed: {e}"),
                };
                self.clamp_selection(board);
            }
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Char('s') => self.mode = Mode::Summary,
            KeyCode::Char('m') => {
                if let Some(id) = self.selected_id(board) {
                    self.open_picker(id, board);
                }
            }
            KeyCode::Char('x') => {
                if let Some(id) = self.selected_id(board) {
                    match board.task(id).and_then(|t| t.subtasks.iter().position(|s| !s.status)) {
                        Some(slot) => self.toggle(id, slot, board).await,
                        None => self.status = "No open subtasks".into(),
                    }
                }
            }
            KeyCode::Char('a') => self.add_task(board).await,
            _ => {}
        }
        Flow::Continue
    }

    async fn handle_mouse<S: TaskStore>(&mut self, mouse: MouseEvent, board: &mut KanbanBoard<S>) {
        if self.mode != Mode::Board {
            return;
        }
        let column = self.column_at(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pressed = None;
                if let Some(position) = column {
                    self.selected_column = position;
                    if let Some(slot) = self.card_slot_at(position, mouse.row, board.view()) {
                        self.selected_card = slot;
                        self.pressed = self.selected_id(board);
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if !self.dnd.is_dragging() {
                    if let Some(id) = self.pressed {
                        self.pick_up(id, board);
                    }
                }
                if let Some(position) = column {
                    self.dnd.hover(position);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.pressed = None;
                if self.dnd.is_dragging() {
                    match column {
                        Some(target) => self.finish_drop(target, board).await,
                        None => {
                            self.dnd.cancel();
                            self.status = "Dropped outside the board".into();
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn pick_up<S: TaskStore>(&mut self, id: TaskId, board: &KanbanBoard<S>) {
        let (Some(task), Some(handle)) = (board.task(id), board.view().locate(id)) else {
            return;
        };
        self.dnd.begin(task.task_ref(), handle.position);
        self.status = format!("Dragging \"{}\" · ←/→ choose column · Enter drop · Esc cancel", task.title);
    }

    async fn finish_drop<S: TaskStore>(&mut self, target: Position, board: &mut KanbanBoard<S>) {
        if self.dnd.drop_on(target, board.view_mut()).is_none() {
            return;
        }
        self.status = match self.dnd.commit(board).await {
            Ok(Some(DropOutcome::Moved { task, to, .. })) => {
                self.select(task.id, board.view());
                format!("Moved \"{}\" to {}", task.title, to.label())
            }
            Ok(Some(DropOutcome::Unchanged { task, .. })) => format!("\"{}\" stays put", task.title),
            Ok(None) => String::new(),
            Err(e) => format!("Move failed: {e}"),
        };
        self.clamp_selection(board);
    }

    fn open_picker<S: TaskStore>(&mut self, id: TaskId, board: &KanbanBoard<S>) {
        let cursor = board.task(id).and_then(|t| t.position).unwrap_or(Position::ToDo);
        self.mode = Mode::MovePicker { task: id, cursor };
    }

    async fn toggle<S: TaskStore>(&mut self, id: TaskId, slot: usize, board: &mut KanbanBoard<S>) {
        self.status = match board.toggle_subtask(id, slot).await {
            Ok(true) => format!("Subtask {} done", slot + 1),
            Ok(false) => format!("Subtask {} reopened", slot + 1),
            Err(e) => format!("Subtask update failed: {e}"),
        };
    }

    async fn add_task<S: TaskStore>(&mut self, board: &mut KanbanBoard<S>) {
        let Some(title) = prompt("Enter task title") else {
            return;
        };
        let Some(due_date) = prompt("Enter due date (YYYY-MM-DD)") else {
            return;
        };
        let Some(category) = prompt("Enter category (Technical Task / User Story)") else {
            return;
        };
        let prio = prompt("Priority (low/medium/urgent) [medium]")
            .and_then(|p| p.parse::<Priority>().ok())
            .unwrap_or(Priority::Medium);
        let mut task = NewTask::new(title, due_date, category);
        task.prio = prio;
        task.position = self.selected_column;
        task.description = prompt("Description (optional)").unwrap_or_default();
        task.assigned_to = prompt("Assign to, comma separated (optional)")
            .map(|names| split_list(&names))
            .unwrap_or_default();
        task.subtasks = prompt("Subtasks, comma separated (optional)")
            .map(|titles| split_list(&titles).into_iter().map(Subtask::new).collect())
            .unwrap_or_default();
        self.status = match board.create_task(task).await {
            Ok(()) => "Task added".into(),
            Err(e) => format!("Could not add task: {e}"),
        };
    }

    fn column_at(&self, x: u16, y: u16) -> Option<Position> {
        Position::ALL
            .into_iter()
            .zip(self.column_areas.iter())
            .find(|(_, r)| x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height)
            .map(|(p, _)| p)
    }

    /// Slot of the card drawn at row `y`, accounting for list scrolling.
    fn card_slot_at(&self, position: Position, y: u16, view: &BoardView) -> Option<usize> {
        let area = self.column_areas[position.index()];
        let top = area.y + 1;
        let bottom = (area.y + area.height).saturating_sub(1);
        if y < top || y >= bottom {
            return None;
        }
        let slot = self.list_offsets[position.index()] + ((y - top) / CARD_HEIGHT) as usize;
        (slot < view.column(position).cards.len()).then_some(slot)
    }
}

pub async fn run_app<B: Backend, S: TaskStore>(
    terminal: &mut Terminal<B>,
    board: &mut KanbanBoard<S>,
) -> io::Result<()> {
    let mut app = App::new();
    loop {
        terminal.draw(|f| draw(f, &mut app, board))?;
        let event = event::read()?;
        if app.handle_event(event, board).await == Flow::Quit {
            info!("leaving board");
            return Ok(());
        }
    }
}

pub fn draw<S: TaskStore>(f: &mut Frame, app: &mut App, board: &KanbanBoard<S>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(25); 4])
        .split(rows[0]);

    let hover = app.dnd.hover_target();
    let dragged = app.dnd.dragged().map(|t| t.id);
    for (i, column) in board.view().columns().iter().enumerate() {
        app.column_areas[i] = chunks[i];
        let items: Vec<ListItem> = if column.cards.is_empty() {
            vec![ListItem::new(Span::styled(
                format!("No tasks {}", column.position.label().to_lowercase()),
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            column.cards.iter().map(|c| card_item(c, dragged == Some(c.id))).collect()
        };

        let border = if hover == Some(column.position) {
            Style::default().fg(Color::Yellow)
        } else if app.selected_column == column.position {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("{} ({})", column.position.label(), column.cards.len()))
                    .borders(Borders::ALL)
                    .border_style(border),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

        let mut state = ListState::default();
        if app.selected_column == column.position && !column.cards.is_empty() {
            state.select(Some(app.selected_card));
        }
        f.render_stateful_widget(list, chunks[i], &mut state);
        app.list_offsets[i] = state.offset();
    }

    let footer = match &app.mode {
        Mode::Search => format!("search: {}_", app.query),
        _ => match board.active_filter() {
            Some(q) => format!("[filter: {q}] {}", app.status),
            None => app.status.clone(),
        },
    };
    f.render_widget(Paragraph::new(footer), rows[1]);

    match &app.mode {
        Mode::Detail(id) => {
            if let Some(task) = board.task(*id) {
                draw_detail(f, &TaskDetail::from_task(task));
            }
        }
        Mode::Summary => {
            let area = centered(f.area(), 50, 50);
            f.render_widget(Clear, area);
            f.render_widget(
                Paragraph::new(board.summary().to_string())
                    .block(Block::default().title("Summary").borders(Borders::ALL)),
                area,
            );
        }
        Mode::MovePicker { cursor, .. } => {
            let area = centered(f.area(), 60, 20);
            let spans: Vec<Span> = Position::ALL
                .iter()
                .map(|p| {
                    let style = if p == cursor {
                        Style::default().add_modifier(Modifier::REVERSED)
                    } else {
                        Style::default()
                    };
                    Span::styled(format!(" {} ", p.label()), style)
                })
                .collect();
            f.render_widget(Clear, area);
            f.render_widget(
                Paragraph::new(Line::from(spans))
                    .block(Block::default().title("Move to").borders(Borders::ALL)),
                area,
            );
        }
        Mode::Board | Mode::Search => {}
    }
}

fn card_item(card: &Card, dragged: bool) -> ListItem<'static> {
    let title_style = if dragged {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC)
    } else {
        Style::default().fg(Color::White)
    };
    let mut meta = vec![Span::styled(card.category.clone(), Style::default().fg(Color::Blue))];
    if let Some(prio) = card.priority {
        let color = match prio {
            Priority::Urgent => Color::Red,
            Priority::Medium => Color::Yellow,
            Priority::Low => Color::Green,
        };
        meta.push(Span::styled(format!(" {}", prio.label()), Style::default().fg(color)));
    }
    if !card.initials.is_empty() {
        let chips: Vec<&str> = card.initials.iter().map(|c| c.text.as_str()).collect();
        meta.push(Span::raw(format!(" [{}]", chips.join(" "))));
    }
    let progress = match card.progress {
        Some(p) => Line::from(vec![
            Span::raw(format!("{} ", progress_bar(p.done, p.total, 10))),
            Span::raw(p.text()),
        ]),
        None => Line::default(),
    };
    ListItem::new(Text::from(vec![
        Line::from(vec![
            Span::raw(format!("[#{}] ", card.id)),
            Span::styled(card.title.clone(), title_style),
        ]),
        Line::from(meta),
        progress,
    ]))
}

fn progress_bar(done: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 { 0 } else { done * width / total };
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn draw_detail(f: &mut Frame, detail: &TaskDetail) {
    let area = centered(f.area(), 60, 70);
    let mut lines = vec![
        Line::from(Span::styled(detail.category.clone(), Style::default().fg(Color::Blue))),
        Line::from(Span::styled(detail.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(detail.description.clone()),
        Line::default(),
        Line::from(format!("Due date: {}", detail.due_date)),
        Line::from(format!("Priority: {}", detail.priority)),
        Line::from("Assigned to:"),
    ];
    lines.extend(
        detail
            .assignees
            .iter()
            .map(|(name, chip)| Line::from(format!("  ({}) {}", chip.text, name))),
    );
    lines.push(Line::from("Subtasks:"));
    lines.extend(detail.subtasks.iter().enumerate().map(|(i, (title, done))| {
        Line::from(format!("  {} [{}] {}", i + 1, if *done { "x" } else { " " }, title))
    }));
    lines.push(Line::default());
    lines.push(Line::from("1-9 toggle subtask · m move · Esc close"));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().title(format!("#{}", detail.id)).borders(Borders::ALL)),
        area,
    );
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn prompt(message: &str) -> Option<String> {
    disable_raw_mode().ok();
    println!("{}", message);
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input).is_ok();
    enable_raw_mode().ok();
    let input = input.trim();
    (read && !input.is_empty()).then(|| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::task;
    use crate::drag::Gesture;
    use crate::kanban_board::SyncPolicy;
    use crate::store::MockTaskStore;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn loaded(mut store: MockTaskStore) -> KanbanBoard<MockTaskStore> {
        store.expect_fetch_tasks().returning(|| {
            let mut t = task(7, "seven", Position::ToDo);
            t.subtasks = vec![Subtask { id: Some(1), title: "a".into(), status: true }, Subtask::new("b")];
            Ok(vec![t, task(8, "eight", Position::Done)])
        });
        let mut board = KanbanBoard::new(Arc::new(store), SyncPolicy::AlwaysReload).unwrap();
        board.reload().await.unwrap();
        board
    }

    #[tokio::test]
    async fn keyboard_drag_moves_card() {
        let mut store = MockTaskStore::new();
        store
            .expect_update_task()
            .withf(|t| t.id == 7 && t.position == Some(Position::AwaitFeedback))
            .times(1)
            .returning(|_| Ok(()));
        let mut board = loaded(store).await;
        let mut app = App::new();

        app.handle_key(key(KeyCode::Char(' ')), &mut board).await;
        assert!(app.coordinator().is_dragging());
        app.handle_key(key(KeyCode::Right), &mut board).await;
        app.handle_key(key(KeyCode::Right), &mut board).await;
        app.handle_key(key(KeyCode::Enter), &mut board).await;

        assert_eq!(app.coordinator().state(), &Gesture::Idle);
        assert!(app.status.starts_with("Moved \"seven\""));
    }

    #[tokio::test]
    async fn esc_cancels_drag_without_writing() {
        let mut store = MockTaskStore::new();
        store.expect_update_task().never();
        let mut board = loaded(store).await;
        let mut app = App::new();

        app.handle_key(key(KeyCode::Char(' ')), &mut board).await;
        app.handle_key(key(KeyCode::Right), &mut board).await;
        app.handle_key(key(KeyCode::Esc), &mut board).await;

        assert_eq!(app.coordinator().state(), &Gesture::Idle);
        assert_eq!(board.view().locate(7).unwrap().position, Position::ToDo);
    }

    #[tokio::test]
    async fn search_mode_filters_live() {
        let mut board = loaded(MockTaskStore::new()).await;
        let mut app = App::new();

        app.handle_key(key(KeyCode::Char('/')), &mut board).await;
        for c in "eig".chars() {
            app.handle_key(key(KeyCode::Char(c)), &mut board).await;
        }
        assert_eq!(board.view().card_count(), 1);

        app.handle_key(key(KeyCode::Esc), &mut board).await;
        assert_eq!(board.view().card_count(), 2);
        assert_eq!(app.mode, Mode::Board);
    }

    #[tokio::test]
    async fn x_toggles_first_open_subtask() {
        let mut store = MockTaskStore::new();
        store.expect_update_subtask().never();
        let mut board = loaded(store).await;
        let mut app = App::new();

        app.handle_key(key(KeyCode::Char('x')), &mut board).await;

        assert!(board.task(7).unwrap().subtasks[1].status);
        assert_eq!(app.status, "Subtask 2 done");

        app.handle_key(key(KeyCode::Char('x')), &mut board).await;

        let subtasks = &board.task(7).unwrap().subtasks;
        assert!(subtasks.iter().all(|s| s.status));
        assert_eq!(app.status, "No open subtasks");
    }

    #[tokio::test]
    async fn x_on_card_without_subtasks_reports_nothing_open() {
        let mut board = loaded(MockTaskStore::new()).await;
        let mut app = App::new();
        app.selected_column = Position::Done;

        app.handle_key(key(KeyCode::Char('x')), &mut board).await;

        assert_eq!(app.status, "No open subtasks");
    }

    #[tokio::test]
    async fn draws_columns_and_supports_mouse_drop() {
        let mut store = MockTaskStore::new();
        store
            .expect_update_task()
            .withf(|t| t.id == 7 && t.position == Some(Position::InProgress))
            .times(1)
            .returning(|_| Ok(()));
        let mut board = loaded(store).await;
        let mut app = App::new();
        let mut terminal = Terminal::new(TestBackend::new(160, 20)).unwrap();

        terminal.draw(|f| draw(f, &mut app, &board)).unwrap();
        let screen = format!("{:?}", terminal.backend().buffer());
        assert!(screen.contains("To do (1)"));
        assert!(screen.contains("1/2 Subtasks"));

        let at = |kind, column| {
            Event::Mouse(MouseEvent { kind, column, row: 1, modifiers: KeyModifiers::NONE })
        };
        app.handle_event(at(MouseEventKind::Down(MouseButton::Left), 5), &mut board).await;
        app.handle_event(at(MouseEventKind::Drag(MouseButton::Left), 45), &mut board).await;
        assert_eq!(app.coordinator().hover_target(), Some(Position::InProgress));
        app.handle_event(at(MouseEventKind::Up(MouseButton::Left), 45), &mut board).await;

        assert_eq!(app.coordinator().state(), &Gesture::Idle);
    }

    #[tokio::test]
    async fn mouse_drag_from_empty_space_picks_nothing_up() {
        let mut store = MockTaskStore::new();
        store.expect_update_task().never();
        let mut board = loaded(store).await;
        let mut app = App::new();
        let mut terminal = Terminal::new(TestBackend::new(160, 20)).unwrap();
        terminal.draw(|f| draw(f, &mut app, &board)).unwrap();

        let at = |kind, column, row| {
            Event::Mouse(MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE })
        };
        // The only card in the first column spans rows 1..=3.
        app.handle_event(at(MouseEventKind::Down(MouseButton::Left), 5, 10), &mut board).await;
        app.handle_event(at(MouseEventKind::Drag(MouseButton::Left), 45, 10), &mut board).await;

        assert!(!app.coordinator().is_dragging());
        assert_eq!(app.coordinator().dragged(), None);

        app.handle_event(at(MouseEventKind::Up(MouseButton::Left), 45, 10), &mut board).await;
        assert_eq!(board.view().locate(7).unwrap().position, Position::ToDo);
    }

    #[tokio::test]
    async fn mouse_press_on_card_then_release_without_drag_only_selects() {
        let mut board = loaded(MockTaskStore::new()).await;
        let mut app = App::new();
        let mut terminal = Terminal::new(TestBackend::new(160, 20)).unwrap();
        terminal.draw(|f| draw(f, &mut app, &board)).unwrap();

        let at = |kind, column, row| {
            Event::Mouse(MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE })
        };
        app.handle_event(at(MouseEventKind::Down(MouseButton::Left), 125, 2), &mut board).await;
        app.handle_event(at(MouseEventKind::Up(MouseButton::Left), 125, 2), &mut board).await;
        app.handle_event(at(MouseEventKind::Drag(MouseButton::Left), 45, 2), &mut board).await;

        assert_eq!(app.selected_column, Position::Done);
        assert!(!app.coordinator().is_dragging());
    }

    #[test]
    fn split_list_drops_blank_entries() {
        assert_eq!(split_list(" Ada Lovelace, ,Alan Turing,"), vec!["Ada Lovelace", "Alan Turing"]);
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(1, 2, 4), "██░░");
        assert_eq!(progress_bar(0, 0, 2), "░░");
    }
}

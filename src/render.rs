//! Board renderer: turns the task cache into four column containers of cards,
//! plus the HTML fragments for each container.

use std::collections::HashMap;

use chrono::NaiveDate;
use minijinja::{context, Environment, Value};
use serde::Serialize;
use tracing::warn;

use crate::error::BoardError;
use crate::task::{Position, Priority, Progress, Task, TaskId};

const MAX_VISIBLE_ASSIGNEES: usize = 5;
const OVERFLOW_COLOR: &str = "grey";
const CHIP_COLORS: [&str; 8] = [
    "#FF7A00", "#9327FF", "#6E52FF", "#FC71FF", "#FFBB2B", "#1FD7C1", "#462F8A", "#FF4646",
];

const CARD_TEMPLATE: &str = r#"<div class="card" id="card-{{ id }}" draggable="true" data-task="{{ id }}">
<span class="category">{{ category }}</span>
<h3 class="cardTitle">{{ title }}</h3>
<p class="cardDescription">{{ description }}</p>
{%- if progress %}
<div class="progressContainer" id="progressContainer{{ id }}"><div class="progress"><div class="progressBar" id="progressBar{{ id }}" style="width: {{ progress.width }};"></div></div><span id="progressText{{ id }}">{{ progress.text }}</span></div>
{%- endif %}
<div class="cardFooter"><div class="assignees">
{%- for chip in initials %}<div class="initials" style="background-color: {{ chip.color }};">{{ chip.text }}</div>{% endfor -%}
</div>{% if priority %}<img class="prio" src="./assets/img/prio_{{ priority }}.svg" alt="{{ priority }}">{% endif %}</div>
</div>"#;

const COLUMN_TEMPLATE: &str = r#"<div class="column" id="{{ id }}">
{%- for card in cards %}
{{ card|safe }}
{%- else %}
<div class="placeholder">No tasks {{ label }}</div>
{%- endfor %}
</div>"#;

const DETAIL_TEMPLATE: &str = r#"<div class="detailCard" id="detail-{{ id }}">
<span class="category">{{ category }}</span>
<h2>{{ title }}</h2>
<p>{{ description }}</p>
<p>Due date: {{ due_date }}</p>
<p>Priority: {{ priority }}</p>
<ul class="assignList">{% for name in assignees %}<li>{{ name.chip.text }} {{ name.name }}</li>{% endfor %}</ul>
<ul class="subtasks">{% for sub in subtasks %}<li><input type="checkbox" id="subtask-{{ id }}-{{ loop.index0 }}"{% if sub.done %} checked{% endif %}> {{ sub.title }}</li>{% endfor %}</ul>
</div>"#;

/// An initials bubble for one assignee, or the `+N` overflow bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chip {
    pub text: String,
    pub color: &'static str,
}

impl Chip {
    pub fn for_name(name: &str) -> Self {
        let text = name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect::<String>()
            .to_uppercase();
        let hash = name.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
        Self {
            text,
            color: CHIP_COLORS[hash % CHIP_COLORS.len()],
        }
    }
}

/// Chips for a card: up to five assignees, then `+N` for the rest.
pub fn initials(names: &[String]) -> Vec<Chip> {
    let mut chips: Vec<Chip> = names
        .iter()
        .take(MAX_VISIBLE_ASSIGNEES)
        .map(|n| Chip::for_name(n))
        .collect();
    if names.len() > MAX_VISIBLE_ASSIGNEES {
        chips.push(Chip {
            text: format!("+{}", names.len() - MAX_VISIBLE_ASSIGNEES),
            color: OVERFLOW_COLOR,
        });
    }
    chips
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: TaskId,
    pub title: String,
    pub category: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub initials: Vec<Chip>,
    pub progress: Option<Progress>,
}

impl Card {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            category: task.category.clone(),
            description: task.description.clone(),
            priority: task.prio,
            initials: initials(&task.assigned_to),
            progress: task.progress(),
        }
    }
}

/// One board lane's container.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub position: Position,
    pub cards: Vec<Card>,
}

/// Where a card currently sits in the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardHandle {
    pub position: Position,
    pub slot: usize,
}

/// Rendered board. Cards are addressed by task id, never by cache slot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    columns: [Column; 4],
    handles: HashMap<TaskId, Position>,
    /// Tasks whose position matched no column.
    pub orphaned: Vec<TaskId>,
}

impl BoardView {
    pub fn empty() -> Self {
        Self {
            columns: Position::ALL.map(|position| Column {
                position,
                cards: Vec::new(),
            }),
            handles: HashMap::new(),
            orphaned: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[Column; 4] {
        &self.columns
    }

    pub fn column(&self, position: Position) -> &Column {
        &self.columns[position.index()]
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }

    pub fn locate(&self, id: TaskId) -> Option<CardHandle> {
        let position = *self.handles.get(&id)?;
        let slot = self.column(position).cards.iter().position(|c| c.id == id)?;
        Some(CardHandle { position, slot })
    }

    pub fn card(&self, id: TaskId) -> Option<&Card> {
        let handle = self.locate(id)?;
        self.column(handle.position).cards.get(handle.slot)
    }

    /// Moves a card node into `target`, appending it. Returns false when the
    /// card is unknown or already in that container.
    pub fn move_card(&mut self, id: TaskId, target: Position) -> bool {
        let Some(handle) = self.locate(id) else {
            return false;
        };
        if handle.position == target {
            return false;
        }
        let card = self.columns[handle.position.index()].cards.remove(handle.slot);
        self.columns[target.index()].cards.push(card);
        self.handles.insert(id, target);
        true
    }

    /// Replaces one card's content in place, e.g. after a subtask toggle.
    pub fn refresh_card(&mut self, task: &Task) {
        if let Some(handle) = self.locate(task.id) {
            self.columns[handle.position.index()].cards[handle.slot] = Card::from_task(task);
        }
    }
}

impl Default for BoardView {
    fn default() -> Self {
        Self::empty()
    }
}

/// Converts tasks into a [`BoardView`] and views into HTML.
#[derive(Debug)]
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, BoardError> {
        let mut env = Environment::new();
        env.add_template("card.html", CARD_TEMPLATE)?;
        env.add_template("column.html", COLUMN_TEMPLATE)?;
        env.add_template("detail.html", DETAIL_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Clears every container and refills it in input order.
    pub fn render(&self, tasks: &[Task]) -> BoardView {
        let mut view = BoardView::empty();
        for task in tasks {
            match task.position {
                Some(position) => {
                    view.columns[position.index()].cards.push(Card::from_task(task));
                    view.handles.insert(task.id, position);
                }
                None => {
                    warn!(task = task.id, "task has no recognised position; card not placed");
                    view.orphaned.push(task.id);
                }
            }
        }
        view
    }

    pub fn card_html(&self, card: &Card) -> Result<String, BoardError> {
        let progress = card
            .progress
            .map(|p| context! { width => p.width(), text => Value::from_safe_string(p.text()) });
        let html = self.env.get_template("card.html")?.render(context! {
            id => card.id,
            title => &card.title,
            category => &card.category,
            description => &card.description,
            priority => card.priority.map(Priority::as_str),
            initials => &card.initials,
            progress => progress,
        })?;
        Ok(html)
    }

    pub fn column_html(&self, column: &Column) -> Result<String, BoardError> {
        let cards = column
            .cards
            .iter()
            .map(|c| self.card_html(c))
            .collect::<Result<Vec<_>, _>>()?;
        let html = self.env.get_template("column.html")?.render(context! {
            id => column.position.as_str(),
            label => column.position.label().to_lowercase(),
            cards => cards,
        })?;
        Ok(html)
    }

    pub fn board_html(&self, view: &BoardView) -> Result<String, BoardError> {
        let columns = view
            .columns()
            .iter()
            .map(|c| self.column_html(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns.join("\n"))
    }

    pub fn detail_html(&self, detail: &TaskDetail) -> Result<String, BoardError> {
        let assignees: Vec<_> = detail
            .assignees
            .iter()
            .map(|(name, chip)| context! { name => name, chip => chip })
            .collect();
        let subtasks: Vec<_> = detail
            .subtasks
            .iter()
            .map(|(title, done)| context! { title => title, done => done })
            .collect();
        // Formatted dates hold only digits and slashes; a raw fallback is escaped.
        let due_date = if NaiveDate::parse_from_str(&detail.due_date, "%d/%m/%Y").is_ok() {
            Value::from_safe_string(detail.due_date.clone())
        } else {
            Value::from(detail.due_date.as_str())
        };
        let html = self.env.get_template("detail.html")?.render(context! {
            id => detail.id,
            title => &detail.title,
            category => &detail.category,
            description => &detail.description,
            due_date => due_date,
            priority => &detail.priority,
            assignees => assignees,
            subtasks => subtasks,
        })?;
        Ok(html)
    }
}

/// Everything the detail overlay shows for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDetail {
    pub id: TaskId,
    pub title: String,
    pub category: String,
    pub description: String,
    /// `DD/MM/YYYY`, or the raw backend string if it does not parse.
    pub due_date: String,
    pub priority: String,
    pub position: Option<Position>,
    pub assignees: Vec<(String, Chip)>,
    pub subtasks: Vec<(String, bool)>,
}

impl TaskDetail {
    pub fn from_task(task: &Task) -> Self {
        let due_date = task
            .due()
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| task.due_date.clone());
        Self {
            id: task.id,
            title: task.title.clone(),
            category: task.category.clone(),
            description: task.description.clone(),
            due_date,
            priority: task.prio.map(Priority::label).unwrap_or_default().to_string(),
            position: task.position,
            assignees: task
                .assigned_to
                .iter()
                .map(|n| (n.clone(), Chip::for_name(n)))
                .collect(),
            subtasks: task.subtasks.iter().map(|s| (s.title.clone(), s.status)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::task;
    use crate::task::Subtask;
    use rstest::{fixture, rstest};

    #[fixture]
    fn renderer() -> Renderer {
        Renderer::new().expect("templates compile")
    }

    fn with_subtasks(mut t: Task, done: &[bool]) -> Task {
        t.subtasks = done
            .iter()
            .enumerate()
            .map(|(i, &status)| Subtask {
                id: Some(i as u64 + 1),
                title: format!("step {i}"),
                status,
            })
            .collect();
        t
    }

    #[rstest]
    fn places_one_card_per_task_in_its_column(renderer: Renderer) {
        let tasks = vec![
            task(1, "a", Position::ToDo),
            task(2, "b", Position::Done),
            task(3, "c", Position::ToDo),
            task(4, "d", Position::AwaitFeedback),
        ];
        let view = renderer.render(&tasks);

        assert_eq!(view.card_count(), tasks.len());
        let todo: Vec<_> = view.column(Position::ToDo).cards.iter().map(|c| c.id).collect();
        assert_eq!(todo, vec![1, 3]);
        assert!(view.column(Position::InProgress).cards.is_empty());
        assert_eq!(view.locate(4), Some(CardHandle { position: Position::AwaitFeedback, slot: 0 }));
    }

    #[rstest]
    fn unknown_position_is_reported_as_orphaned(renderer: Renderer) {
        let mut lost = task(9, "lost", Position::ToDo);
        lost.position = None;
        let view = renderer.render(&[lost, task(1, "a", Position::Done)]);

        assert_eq!(view.orphaned, vec![9]);
        assert_eq!(view.card_count(), 1);
        assert_eq!(view.locate(9), None);
    }

    #[rstest]
    fn progress_text_and_width(renderer: Renderer) {
        let t = with_subtasks(task(7, "seven", Position::ToDo), &[true, false]);
        let view = renderer.render(&[t]);
        let card = view.card(7).unwrap();
        let html = renderer.card_html(card).unwrap();

        assert!(html.contains("1/2 Subtasks"));
        assert!(html.contains("width: 50%;"));
        assert!(html.contains(r#"id="progressBar7""#));
    }

    #[rstest]
    fn no_subtasks_hides_progress(renderer: Renderer) {
        let view = renderer.render(&[task(3, "plain", Position::Done)]);
        let card = view.card(3).unwrap();

        assert_eq!(card.progress, None);
        assert!(!renderer.card_html(card).unwrap().contains("progressContainer"));
    }

    #[rstest]
    fn card_html_escapes_user_text(renderer: Renderer) {
        let mut t = task(5, "<script>alert(1)</script>", Position::ToDo);
        t.description = "a & b".into();
        let view = renderer.render(&[t]);
        let html = renderer.card_html(view.card(5).unwrap()).unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &amp; b"));
    }

    #[rstest]
    fn empty_column_renders_placeholder(renderer: Renderer) {
        let view = renderer.render(&[task(1, "a", Position::ToDo)]);
        let html = renderer.column_html(view.column(Position::Done)).unwrap();

        assert!(html.contains(r#"id="done""#));
        assert!(html.contains("No tasks done"));
        let todo = renderer.column_html(view.column(Position::ToDo)).unwrap();
        assert!(todo.contains(r#"id="card-1""#));
        assert!(!todo.contains("placeholder"));
    }

    #[rstest]
    fn move_card_is_noop_for_same_column(renderer: Renderer) {
        let mut view = renderer.render(&[task(1, "a", Position::ToDo), task(2, "b", Position::Done)]);

        assert!(!view.move_card(1, Position::ToDo));
        assert!(view.move_card(1, Position::Done));
        assert_eq!(view.locate(1), Some(CardHandle { position: Position::Done, slot: 1 }));
        assert!(view.column(Position::ToDo).cards.is_empty());
        assert!(!view.move_card(42, Position::Done));
    }

    #[test]
    fn initials_cap_at_five_with_overflow_chip() {
        let names: Vec<String> = ["Ada Lovelace", "alan turing", "Grace Hopper", "Linus", "Ken Thompson", "Dennis Ritchie", "Rob Pike"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let chips = initials(&names);

        assert_eq!(chips.len(), 6);
        assert_eq!(chips[0].text, "AL");
        assert_eq!(chips[1].text, "AT");
        assert_eq!(chips[3].text, "L");
        assert_eq!(chips[5], Chip { text: "+2".into(), color: OVERFLOW_COLOR });
    }

    #[test]
    fn chip_color_is_stable_per_name() {
        assert_eq!(Chip::for_name("Ada Lovelace"), Chip::for_name("Ada Lovelace"));
    }

    #[rstest]
    fn detail_formats_date_and_checklist(renderer: Renderer) {
        let mut t = with_subtasks(task(4, "detail", Position::InProgress), &[false, true]);
        t.due_date = "2026-03-09".into();
        t.prio = Some(Priority::Urgent);
        t.assigned_to = vec!["Ada Lovelace".into()];
        let detail = TaskDetail::from_task(&t);

        assert_eq!(detail.due_date, "09/03/2026");
        assert_eq!(detail.priority, "Urgent");
        let html = renderer.detail_html(&detail).unwrap();
        assert!(html.contains(r#"id="subtask-4-1" checked"#));
        assert!(html.contains("AL Ada Lovelace"));
        assert!(html.contains("Due date: 09/03/2026"));
    }
}

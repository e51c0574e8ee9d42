use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

pub type TaskId = u64;
pub type SubtaskId = u64;

/// One of the four board lanes a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "toDo")]
    ToDo,
    #[serde(rename = "inProgress")]
    InProgress,
    #[serde(rename = "awaitFeedback")]
    AwaitFeedback,
    #[serde(rename = "done")]
    Done,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::ToDo,
        Position::InProgress,
        Position::AwaitFeedback,
        Position::Done,
    ];

    /// Identifier used on the wire and as the column container id.
    pub fn as_str(self) -> &'static str {
        match self {
            Position::ToDo => "toDo",
            Position::InProgress => "inProgress",
            Position::AwaitFeedback => "awaitFeedback",
            Position::Done => "done",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::ToDo => "To do",
            Position::InProgress => "In progress",
            Position::AwaitFeedback => "Await feedback",
            Position::Done => "Done",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Position::ToDo => 0,
            Position::InProgress => 1,
            Position::AwaitFeedback => 2,
            Position::Done => 3,
        }
    }

    /// Neighbouring lane, clamped at the board edges.
    pub fn step(self, direction: isize) -> Position {
        let next = (self.index() as isize + direction).clamp(0, Self::ALL.len() as isize - 1);
        Self::ALL[next as usize]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownValue(pub String);

impl FromStr for Position {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::Urgent => "urgent",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::Urgent => "Urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "urgent" => Ok(Priority::Urgent),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Subtask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SubtaskId>,
    pub title: String,
    #[serde(default)]
    pub status: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            status: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub due_date: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub prio: Option<Priority>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assigned_to: Vec<String>,
    #[serde(
        rename = "PositionID",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<Position>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn due(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d").ok()
    }

    pub fn progress(&self) -> Option<Progress> {
        Progress::of(&self.subtasks)
    }

    pub fn task_ref(&self) -> TaskRef {
        TaskRef {
            id: self.id,
            title: self.title.clone(),
        }
    }
}

/// Identity captured while a card is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRef {
    pub id: TaskId,
    pub title: String,
}

/// Subtask completion ratio; absent when a task has no subtasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    pub fn of(subtasks: &[Subtask]) -> Option<Self> {
        if subtasks.is_empty() {
            return None;
        }
        Some(Self {
            done: subtasks.iter().filter(|s| s.status).count(),
            total: subtasks.len(),
        })
    }

    pub fn percent(&self) -> f64 {
        100.0 * self.done as f64 / self.total as f64
    }

    pub fn text(&self) -> String {
        format!("{}/{} Subtasks", self.done, self.total)
    }

    /// CSS width of the progress bar, e.g. `50%`.
    pub fn width(&self) -> String {
        format!("{}%", self.percent())
    }
}

/// Payload for `POST /tasks/`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub assigned_to: Vec<String>,
    pub due_date: String,
    pub prio: Priority,
    pub category: String,
    #[serde(rename = "PositionID")]
    pub position: Position,
    pub subtasks: Vec<Subtask>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, due_date: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            assigned_to: Vec::new(),
            due_date: due_date.into(),
            prio: Priority::Medium,
            category: category.into(),
            position: Position::ToDo,
            subtasks: Vec::new(),
        }
    }
}

/// Unrecognised enum strings become `None` so one bad row cannot sink a whole fetch.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(value = %s, "unrecognised enum value in task payload");
            None
        }
    }))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

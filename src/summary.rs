use std::fmt;

use chrono::NaiveDate;

use crate::task::{Position, Priority, Task};

/// Counters for the summary page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub per_column: [usize; 4],
    pub urgent: usize,
    pub earliest_urgent_due: Option<NaiveDate>,
}

impl Summary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut summary = Summary {
            total: tasks.len(),
            ..Default::default()
        };
        for task in tasks {
            if let Some(position) = task.position {
                summary.per_column[position.index()] += 1;
            }
            if task.prio == Some(Priority::Urgent) {
                summary.urgent += 1;
                if let Some(due) = task.due() {
                    summary.earliest_urgent_due = Some(match summary.earliest_urgent_due {
                        Some(current) => current.min(due),
                        None => due,
                    });
                }
            }
        }
        summary
    }

    pub fn count(&self, position: Position) -> usize {
        self.per_column[position.index()]
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tasks in board: {}", self.total)?;
        for position in Position::ALL {
            writeln!(f, "{}: {}", position.label(), self.count(position))?;
        }
        writeln!(f, "Urgent: {}", self.urgent)?;
        match self.earliest_urgent_due {
            Some(due) => write!(f, "Upcoming deadline: {}", due.format("%Y-%m-%d")),
            None => write!(f, "No urgent tasks found."),
        }
    }
}

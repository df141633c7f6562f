//! Sort/search/due projections for task snapshots.

use crate::model::task::Task;
use crate::model::validation::ValidationError;
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Field a task list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Title,
    #[default]
    DueDate,
    Category,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Title, SortKey::DueDate, SortKey::Category];

    /// Strict parse of `title|due_date|category` (case-insensitive).
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "due_date" => Ok(Self::DueDate),
            "category" => Ok(Self::Category),
            _ => Err(ValidationError::InvalidSortKey(value.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::DueDate => "due_date",
            Self::Category => "category",
        }
    }

    fn compare(self, left: &Task, right: &Task) -> Ordering {
        match self {
            Self::Title => left.title.cmp(&right.title),
            Self::DueDate => left.due_date.cmp(&right.due_date),
            Self::Category => left.category.cmp(&right.category),
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Sorted snapshot plus the key that was actually applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedTasks {
    pub tasks: Vec<Task>,
    pub key: SortKey,
    /// Requested key that was not recognized, when `key` is the fallback.
    pub fallback_from: Option<String>,
}

impl SortedTasks {
    pub fn fell_back(&self) -> bool {
        self.fallback_from.is_some()
    }
}

/// Stable ascending sort by a user-supplied key.
///
/// A blank key selects `due_date`. An unrecognized key also sorts by
/// `due_date`, and `fallback_from` carries the rejected input so callers
/// can tell the user.
pub fn sort_tasks(tasks: &[Task], key: &str) -> SortedTasks {
    let (key, fallback_from) = if key.trim().is_empty() {
        (SortKey::default(), None)
    } else {
        match SortKey::parse(key) {
            Ok(parsed) => (parsed, None),
            Err(_) => (SortKey::default(), Some(key.to_string())),
        }
    };

    SortedTasks {
        tasks: sort_by_key(tasks, key),
        key,
        fallback_from,
    }
}

/// Stable ascending sort by a typed key.
pub fn sort_by_key(tasks: &[Task], key: SortKey) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|left, right| key.compare(left, right));
    sorted
}

/// Case-insensitive substring match on title; an empty query matches all.
pub fn search_tasks(tasks: &[Task], query: &str) -> Vec<Task> {
    let needle = query.to_lowercase();
    tasks
        .iter()
        .filter(|task| task.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Tasks whose due day has started at `reference`.
///
/// Overdue and due-today tasks are returned alike.
pub fn due_now(tasks: &[Task], reference: NaiveDateTime) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.due_at() <= reference)
        .cloned()
        .collect()
}

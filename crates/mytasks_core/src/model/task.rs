//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted `Task` record and its write-side draft `NewTask`.
//! - Parse and validate raw adapter input into typed fields.
//!
//! # Invariants
//! - `title` is never blank.
//! - `due_date` is a valid calendar date; its text form is `YYYY-MM-DD`.
//! - `owner` is fixed at creation.

use crate::model::validation::ValidationError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Identifier of a task, unique within its owner's list.
///
/// SQLite uses the autoincrement rowid; the flat-file store uses the
/// 1-based position in the owner's list.
pub type TaskId = i64;

/// Text format of `due_date` at every boundary (input, SQLite, JSON).
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// One persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    /// Username of the account this task belongs to.
    pub owner: String,
    pub title: String,
    pub due_date: NaiveDate,
    /// Free-form grouping label; empty when not set.
    pub category: String,
}

impl Task {
    /// Start of the due day, used by reminder checks.
    pub fn due_at(&self) -> NaiveDateTime {
        self.due_date.and_time(NaiveTime::default())
    }

    /// Due date rendered as `YYYY-MM-DD`.
    pub fn due_date_text(&self) -> String {
        self.due_date.format(DUE_DATE_FORMAT).to_string()
    }
}

/// Validated task draft that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub owner: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub category: String,
}

impl NewTask {
    /// Builds a draft from raw adapter fields.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is empty or whitespace only.
    /// - `InvalidDueDate` when `due_date` is not `YYYY-MM-DD`.
    pub fn parse(
        owner: impl Into<String>,
        title: impl Into<String>,
        due_date: &str,
        category: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let draft = Self {
            owner: owner.into(),
            title: title.into(),
            due_date: parse_due_date(due_date)?,
            category: category.unwrap_or_default().to_string(),
        };
        draft.validate()?;
        Ok(draft)
    }

    /// Re-checks invariants that a hand-built draft could violate.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Materializes the draft once storage has assigned an id.
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            owner: self.owner,
            title: self.title,
            due_date: self.due_date,
            category: self.category,
        }
    }
}

/// Parses a `YYYY-MM-DD` due date.
pub fn parse_due_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, DUE_DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDueDate(value.to_string()))
}

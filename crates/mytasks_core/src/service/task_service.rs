//! Task use-case service.
//!
//! # Responsibility
//! - Add and list tasks for an authenticated [`Identity`].
//! - Combine repository snapshots with the query layer for sorted, searched
//!   and due views.
//!
//! # Invariants
//! - Every call is scoped to the identity's own tasks.
//! - Input is validated before the repository is touched.
//! - Storage failures propagate; they never become an empty list.

use crate::model::task::{NewTask, Task, TaskId};
use crate::model::validation::ValidationError;
use crate::query::{due_now, search_tasks, sort_tasks, SortedTasks};
use crate::repo::{RepoError, TaskRepository};
use crate::service::auth_service::Identity;
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaskResult<T> = Result<T, TaskError>;

#[derive(Debug)]
pub enum TaskError {
    Validation(ValidationError),
    Storage(RepoError),
}

impl Display for TaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ValidationError> for TaskError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for TaskError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Storage(other),
        }
    }
}

/// Task service facade over a [`TaskRepository`].
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a task to the identity's list.
    ///
    /// # Errors
    /// - `Validation` for a blank title or a due date that is not
    ///   `YYYY-MM-DD`; nothing is written.
    /// - `Storage` when persistence fails.
    pub fn add(
        &self,
        identity: &Identity,
        title: &str,
        due_date: &str,
        category: Option<&str>,
    ) -> TaskResult<TaskId> {
        let draft = match NewTask::parse(identity.username(), title, due_date, category) {
            Ok(draft) => draft,
            Err(err) => {
                debug!("event=task_add module=task status=rejected error={err}");
                return Err(err.into());
            }
        };

        match self.repo.insert_task(&draft) {
            Ok(task_id) => {
                info!("event=task_add module=task status=ok task_id={task_id}");
                Ok(task_id)
            }
            Err(err) => {
                warn!("event=task_add module=task status=error error={err}");
                Err(err.into())
            }
        }
    }

    /// Returns the identity's tasks in insertion order.
    pub fn list(&self, identity: &Identity) -> TaskResult<Vec<Task>> {
        let tasks = self.repo.list_tasks(identity.username())?;
        debug!(
            "event=task_list module=task status=ok count={}",
            tasks.len()
        );
        Ok(tasks)
    }

    /// Lists and sorts by a user-supplied key, reporting any fallback.
    pub fn list_sorted(&self, identity: &Identity, sort_by: &str) -> TaskResult<SortedTasks> {
        let sorted = sort_tasks(&self.list(identity)?, sort_by);
        if sorted.fell_back() {
            debug!(
                "event=task_sort module=task status=fallback key={}",
                sorted.key
            );
        }
        Ok(sorted)
    }

    /// Lists tasks whose title contains `query`, ignoring case.
    pub fn search(&self, identity: &Identity, query: &str) -> TaskResult<Vec<Task>> {
        Ok(search_tasks(&self.list(identity)?, query))
    }

    /// Lists tasks due on or before `reference`.
    pub fn due(&self, identity: &Identity, reference: NaiveDateTime) -> TaskResult<Vec<Task>> {
        Ok(due_now(&self.list(identity)?, reference))
    }
}

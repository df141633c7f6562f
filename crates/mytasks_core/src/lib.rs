//! Core domain logic for My Tasks.
//! This crate is the single source of truth for credential and task invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError, LoggingConfig, StorageBackend, StorageConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{parse_due_date, NewTask, Task, TaskId, DUE_DATE_FORMAT};
pub use model::user::{validate_username, User};
pub use model::validation::ValidationError;
pub use query::{due_now, search_tasks, sort_by_key, sort_tasks, SortKey, SortedTasks};
pub use repo::flat_file_repo::FlatFileStore;
pub use repo::sqlite_repo::SqliteStore;
pub use repo::{
    open_store, CredentialRepository, RepoError, RepoResult, TaskRepository, TaskStore,
};
pub use service::auth_service::{AuthError, AuthResult, AuthService, Identity};
pub use service::task_service::{TaskError, TaskResult, TaskService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage capability set: register/lookup credentials,
//!   append/list tasks.
//! - Provide two interchangeable backends (SQLite, flat files) selected once
//!   at startup through [`open_store`].
//!
//! # Invariants
//! - Write paths validate records before touching storage.
//! - Each single write is atomic: fully applied or not applied at all.
//! - Read paths reject invalid persisted state instead of masking it as an
//!   empty result.

pub mod flat_file_repo;
pub mod sqlite_repo;

use crate::config::{StorageBackend, StorageConfig};
use crate::db::DbError;
use crate::model::task::{NewTask, Task, TaskId};
use crate::model::user::User;
use crate::model::validation::ValidationError;
use flat_file_repo::FlatFileStore;
use sqlite_repo::SqliteStore;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// File name of the SQLite database inside the configured data directory.
pub const SQLITE_DB_FILE_NAME: &str = "tasks_app.db";

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage-level error shared by both backends.
#[derive(Debug)]
pub enum RepoError {
    /// Username is already registered.
    AlreadyExists(String),
    /// Task owner is not a registered user.
    UnknownOwner(String),
    Validation(ValidationError),
    Db(DbError),
    Io(std::io::Error),
    /// Persisted data cannot be decoded into domain records.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists(username) => write!(f, "Username `{username}` already exists"),
            Self::UnknownOwner(username) => write!(f, "task owner is not registered: {username}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "task database error: {err}"),
            Self::Io(err) => write!(f, "task storage I/O error: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::AlreadyExists(_) | Self::UnknownOwner(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Credential persistence: one `(username, password_hash)` pair per account.
pub trait CredentialRepository {
    /// Inserts a new account.
    ///
    /// Fails with [`RepoError::AlreadyExists`] without touching the stored
    /// record when the username is taken.
    fn insert_user(&self, user: &User) -> RepoResult<()>;

    /// Returns the stored PHC hash, or `None` for an unknown username.
    fn find_password_hash(&self, username: &str) -> RepoResult<Option<String>>;
}

/// Task persistence: one ordered, append-only list per owner.
pub trait TaskRepository {
    /// Appends a task to its owner's list and returns the assigned id.
    fn insert_task(&self, task: &NewTask) -> RepoResult<TaskId>;

    /// Returns every task of `owner` in insertion order.
    fn list_tasks(&self, owner: &str) -> RepoResult<Vec<Task>>;
}

/// Full storage capability set implemented by every backend.
pub trait TaskStore: CredentialRepository + TaskRepository {
    fn backend(&self) -> StorageBackend;
}

impl<T: CredentialRepository + ?Sized> CredentialRepository for &T {
    fn insert_user(&self, user: &User) -> RepoResult<()> {
        (**self).insert_user(user)
    }

    fn find_password_hash(&self, username: &str) -> RepoResult<Option<String>> {
        (**self).find_password_hash(username)
    }
}

impl<T: TaskRepository + ?Sized> TaskRepository for &T {
    fn insert_task(&self, task: &NewTask) -> RepoResult<TaskId> {
        (**self).insert_task(task)
    }

    fn list_tasks(&self, owner: &str) -> RepoResult<Vec<Task>> {
        (**self).list_tasks(owner)
    }
}

/// Opens the backend named by `config`, creating its data directory first.
///
/// # Side effects
/// - SQLite: opens `<data_dir>/tasks_app.db` and applies migrations.
/// - Flat files: only creates the directory; files appear on first write.
pub fn open_store(config: &StorageConfig) -> RepoResult<Box<dyn TaskStore>> {
    std::fs::create_dir_all(&config.data_dir)?;
    match config.backend {
        StorageBackend::Sqlite => {
            let store = SqliteStore::open(config.data_dir.join(SQLITE_DB_FILE_NAME))?;
            Ok(Box::new(store))
        }
        StorageBackend::FlatFile => Ok(Box::new(FlatFileStore::open(&config.data_dir)?)),
    }
}

//! Flat-file backend: a credential text file plus one JSON task document.
//!
//! # Responsibility
//! - Persist credentials as `username,password_hash` lines in `users.txt`.
//! - Persist tasks in `tasks.json`, a map from username to an ordered list of
//!   `{title, due_date, category}` objects.
//!
//! # Invariants
//! - Every write replaces the whole file through a temp file in the same
//!   directory, fsynced, then atomically renamed into place; on Unix the
//!   directory is fsynced after the rename, so an acknowledged write survives
//!   a crash. Readers see old or new content, never a partial write.
//! - Files are re-read on every call, so several processes observe each
//!   other's completed writes. Concurrent writers may still race (last
//!   rename wins).
//! - A task id is the 1-based position in the owner's list.

use crate::config::StorageBackend;
use crate::model::task::{parse_due_date, NewTask, Task, TaskId, DUE_DATE_FORMAT};
use crate::model::user::User;
use crate::repo::{CredentialRepository, RepoError, RepoResult, TaskRepository, TaskStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const USERS_FILE_NAME: &str = "users.txt";
pub const TASKS_FILE_NAME: &str = "tasks.json";

/// On-disk task shape; owner and id are implied by the document layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaskRecord {
    title: String,
    due_date: String,
    #[serde(default)]
    category: Option<String>,
}

type TaskDocument = BTreeMap<String, Vec<TaskRecord>>;

/// Directory-backed credential and task store.
pub struct FlatFileStore {
    dir: PathBuf,
}

impl FlatFileStore {
    /// Uses `dir` as the data directory, creating it when missing.
    pub fn open(dir: impl AsRef<Path>) -> RepoResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn users_path(&self) -> PathBuf {
        self.dir.join(USERS_FILE_NAME)
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.dir.join(TASKS_FILE_NAME)
    }

    fn load_users(&self) -> RepoResult<Vec<User>> {
        let Some(content) = read_optional(&self.users_path())? else {
            return Ok(Vec::new());
        };

        let mut users = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (username, password_hash) = line.split_once(',').ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "{USERS_FILE_NAME} line {} has no `username,hash` separator",
                    index + 1
                ))
            })?;
            users.push(User {
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            });
        }

        Ok(users)
    }

    fn load_task_document(&self) -> RepoResult<TaskDocument> {
        let Some(content) = read_optional(&self.tasks_path())? else {
            return Ok(TaskDocument::new());
        };
        if content.trim().is_empty() {
            return Ok(TaskDocument::new());
        }

        serde_json::from_str(&content).map_err(|err| {
            RepoError::InvalidData(format!("{TASKS_FILE_NAME} is not a task document: {err}"))
        })
    }

    fn write_atomically(&self, path: &Path, contents: &[u8]) -> RepoResult<()> {
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(contents)?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|err| RepoError::Io(err.error))?;
        sync_dir(&self.dir)
    }
}

/// Flushes the directory entry so a completed rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> RepoResult<()> {
    std::fs::File::open(dir)?.sync_all()?;
    Ok(())
}

// No directory handle to sync off Unix.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> RepoResult<()> {
    Ok(())
}

impl CredentialRepository for FlatFileStore {
    fn insert_user(&self, user: &User) -> RepoResult<()> {
        let mut users = self.load_users()?;
        if users.iter().any(|existing| existing.username == user.username) {
            return Err(RepoError::AlreadyExists(user.username.clone()));
        }
        users.push(user.clone());

        let mut content = String::new();
        for entry in &users {
            content.push_str(&entry.username);
            content.push(',');
            content.push_str(&entry.password_hash);
            content.push('\n');
        }
        self.write_atomically(&self.users_path(), content.as_bytes())
    }

    fn find_password_hash(&self, username: &str) -> RepoResult<Option<String>> {
        Ok(self
            .load_users()?
            .into_iter()
            .find(|user| user.username == username)
            .map(|user| user.password_hash))
    }
}

impl TaskRepository for FlatFileStore {
    fn insert_task(&self, task: &NewTask) -> RepoResult<TaskId> {
        task.validate()?;
        if self.find_password_hash(&task.owner)?.is_none() {
            return Err(RepoError::UnknownOwner(task.owner.clone()));
        }

        let mut document = self.load_task_document()?;
        let records = document.entry(task.owner.clone()).or_default();
        records.push(TaskRecord {
            title: task.title.clone(),
            due_date: task.due_date.format(DUE_DATE_FORMAT).to_string(),
            category: Some(task.category.clone()),
        });
        let id = records.len() as TaskId;

        let encoded = serde_json::to_vec_pretty(&document).map_err(|err| {
            RepoError::InvalidData(format!("failed to encode {TASKS_FILE_NAME}: {err}"))
        })?;
        self.write_atomically(&self.tasks_path(), &encoded)?;
        Ok(id)
    }

    fn list_tasks(&self, owner: &str) -> RepoResult<Vec<Task>> {
        let mut document = self.load_task_document()?;
        let records = document.remove(owner).unwrap_or_default();

        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let id = index as TaskId + 1;
                let due_date = parse_due_date(&record.due_date).map_err(|_| {
                    RepoError::InvalidData(format!(
                        "invalid due date `{}` for task {id} of `{owner}` in {TASKS_FILE_NAME}",
                        record.due_date
                    ))
                })?;
                Ok(Task {
                    id,
                    owner: owner.to_string(),
                    title: record.title,
                    due_date,
                    category: record.category.unwrap_or_default(),
                })
            })
            .collect()
    }
}

impl TaskStore for FlatFileStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::FlatFile
    }
}

fn read_optional(path: &Path) -> RepoResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

//! Relational backend over `users` and `tasks` tables.
//!
//! # Responsibility
//! - Persist credentials and tasks with one SQL statement per write.
//! - Map SQLite constraint failures to semantic repository errors.
//!
//! # Invariants
//! - `users.username` is the primary key; duplicates surface as
//!   `RepoError::AlreadyExists`.
//! - `tasks.username` references `users`; orphan inserts surface as
//!   `RepoError::UnknownOwner`.
//! - Listing order is `tasks.id ASC`, i.e. insertion order.

use crate::config::StorageBackend;
use crate::db::{open_db, open_db_in_memory};
use crate::model::task::{parse_due_date, NewTask, Task, TaskId, DUE_DATE_FORMAT};
use crate::model::user::User;
use crate::repo::{CredentialRepository, RepoError, RepoResult, TaskRepository, TaskStore};
use rusqlite::{ffi, params, Connection, OptionalExtension, Row};
use std::path::Path;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    username,
    title,
    due_date,
    category
FROM tasks";

/// SQLite-backed credential and task store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wraps a connection that already went through `db::open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (or creates) the database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }
}

impl CredentialRepository for SqliteStore {
    fn insert_user(&self, user: &User) -> RepoResult<()> {
        let result = self.conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2);",
            params![user.username.as_str(), user.password_hash.as_str()],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err)
                if is_constraint(
                    &err,
                    &[ffi::SQLITE_CONSTRAINT_PRIMARYKEY, ffi::SQLITE_CONSTRAINT_UNIQUE],
                ) =>
            {
                Err(RepoError::AlreadyExists(user.username.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn find_password_hash(&self, username: &str) -> RepoResult<Option<String>> {
        let hash = self
            .conn
            .query_row(
                "SELECT password_hash FROM users WHERE username = ?1;",
                [username],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(hash)
    }
}

impl TaskRepository for SqliteStore {
    fn insert_task(&self, task: &NewTask) -> RepoResult<TaskId> {
        task.validate()?;

        let result = self.conn.execute(
            "INSERT INTO tasks (username, title, due_date, category)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                task.owner.as_str(),
                task.title.as_str(),
                task.due_date.format(DUE_DATE_FORMAT).to_string(),
                task.category.as_str(),
            ],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(err) if is_constraint(&err, &[ffi::SQLITE_CONSTRAINT_FOREIGNKEY]) => {
                Err(RepoError::UnknownOwner(task.owner.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn list_tasks(&self, owner: &str) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE username = ?1
             ORDER BY id ASC;"
        ))?;

        let mut rows = stmt.query([owner])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }
}

impl TaskStore for SqliteStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Sqlite
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;
    let due_text: String = row.get("due_date")?;
    let due_date = parse_due_date(&due_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid due date `{due_text}` in tasks.due_date for task {id}"
        ))
    })?;

    Ok(Task {
        id,
        owner: row.get("username")?,
        title: row.get("title")?,
        due_date,
        category: row.get::<_, Option<String>>("category")?.unwrap_or_default(),
    })
}

fn is_constraint(err: &rusqlite::Error, extended_codes: &[i32]) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if extended_codes.contains(&failure.extended_code)
    )
}

#[cfg(test)]
mod tests {
    use super::SqliteStore;
    use crate::model::user::User;
    use crate::repo::CredentialRepository;

    #[test]
    fn duplicate_primary_key_maps_to_already_exists() {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = User {
            username: "bob".to_string(),
            password_hash: "hash-a".to_string(),
        };
        store.insert_user(&user).unwrap();

        let err = store
            .insert_user(&User {
                password_hash: "hash-b".to_string(),
                ..user
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Username `bob` already exists");
        assert_eq!(
            store.find_password_hash("bob").unwrap().as_deref(),
            Some("hash-a")
        );
    }
}

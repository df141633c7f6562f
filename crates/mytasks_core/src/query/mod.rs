//! Snapshot queries over an owner's task list.
//!
//! # Responsibility
//! - Sort, search and due-filter tasks already fetched from a repository.
//!
//! # Invariants
//! - Queries never touch storage; input slices are left unchanged.
//! - Every result preserves insertion order among equal elements.

pub mod task_query;

pub use task_query::{due_now, search_tasks, sort_by_key, sort_tasks, SortKey, SortedTasks};

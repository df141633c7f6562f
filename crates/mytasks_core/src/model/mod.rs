//! Domain model for accounts and their task lists.
//!
//! # Responsibility
//! - Define the canonical `User` and `Task` records shared by both storage
//!   backends.
//! - Own input validation so no backend persists an unchecked record.
//!
//! # Invariants
//! - A `Task` always carries a real calendar `due_date` and a non-empty title.
//! - A `Task` belongs to exactly one owner; ownership never changes.

pub mod task;
pub mod user;
pub mod validation;

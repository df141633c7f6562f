//! Input validation errors shared by the credential and task paths.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected user input, detected before any storage access.
///
/// `Display` renders the message shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyUsername,
    /// Username contains a character the flat-file layout cannot hold.
    InvalidUsername(String),
    EmptyPassword,
    EmptyTitle,
    /// Due date is not a `YYYY-MM-DD` calendar date.
    InvalidDueDate(String),
    /// Sort key is not one of `title|due_date|category`.
    InvalidSortKey(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "Username is required"),
            Self::InvalidUsername(value) => write!(
                f,
                "Invalid username `{value}`: commas and control characters are not allowed"
            ),
            Self::EmptyPassword => write!(f, "Passcode is required"),
            Self::EmptyTitle => write!(f, "Task title is required"),
            Self::InvalidDueDate(value) => {
                write!(f, "Invalid due date format `{value}`, use YYYY-MM-DD")
            }
            Self::InvalidSortKey(value) => write!(
                f,
                "Invalid sort key `{value}`, expected title|due_date|category"
            ),
        }
    }
}

impl Error for ValidationError {}

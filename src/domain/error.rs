//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent client-side validation failures.
/// They are raised before any request leaves the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0} is required")]
    EmptyField(&'static str),

    #[error("{field} must be an integer, got: {input}")]
    InvalidNumber { field: &'static str, input: String },

    #[error("please enter a valid email address: {0}")]
    InvalidEmail(String),

    #[error("password must be at least {min} characters long")]
    WeakPassword { min: usize },

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("direction must be 'left' or 'right', got: {0}")]
    InvalidDirection(String),

    #[error("traversal type must be preorder, inorder or postorder, got: {0}")]
    InvalidTraversal(String),

    #[error("message too long: {len} characters (max {max})")]
    MessageTooLong { len: usize, max: usize },

    #[error("no messages to export")]
    NoMessages,

    #[error("invalid chat export: {0}")]
    InvalidExport(String),
}

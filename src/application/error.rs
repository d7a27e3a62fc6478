//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add request-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("request failed: {context}")]
    Transport {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("session expired, please log in again")]
    AuthExpired,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("no tree selected: pass --tree or run `treectl tree select`")]
    NoTreeSelected,

    #[error("unexpected response from {context}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("session store: {context}")]
    Session {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

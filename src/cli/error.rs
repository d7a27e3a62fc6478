//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<crate::domain::DomainError> for CliError {
    fn from(e: crate::domain::DomainError) -> Self {
        CliError::from(ApplicationError::Domain(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Selector { .. } => crate::exitcode::SOFTWARE,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                    ApplicationError::AuthExpired | ApplicationError::NotLoggedIn => {
                        crate::exitcode::NOPERM
                    }
                    ApplicationError::Api { status: 401 | 403, .. } => crate::exitcode::NOPERM,
                    ApplicationError::NoTreeSelected => crate::exitcode::USAGE,
                    ApplicationError::Transport { .. } => crate::exitcode::UNAVAILABLE,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Session { .. }
                    | ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                    ApplicationError::Api { .. } | ApplicationError::Decode { .. } => {
                        crate::exitcode::SOFTWARE
                    }
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_validation_error_when_mapping_exit_code_then_dataerr() {
        let err = CliError::from(DomainError::EmptyField("value"));
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_auth_expired_when_mapping_exit_code_then_noperm() {
        let err = CliError::from(ApplicationError::AuthExpired);
        assert_eq!(err.exit_code(), crate::exitcode::NOPERM);
    }

    #[test]
    fn given_api_error_when_displaying_then_shows_server_message() {
        let err = CliError::from(ApplicationError::Api {
            status: 404,
            message: "Tree not found".into(),
        });
        assert_eq!(err.to_string(), "Tree not found (HTTP 404)");
        assert_eq!(err.exit_code(), crate::exitcode::SOFTWARE);
    }
}

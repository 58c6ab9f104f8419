//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use liftbook_core::{ErrorKind, LiftbookError};

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, workout, session, etc.)
    NotFound {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Payload rows belong to a different parent
    Conflict(String),

    /// Integrity check reported problems
    IntegrityFailed(String),

    /// Anything else
    Internal(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message)
            | CliError::Conflict(message)
            | CliError::IntegrityFailed(message)
            | CliError::Internal(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::Conflict(_) => exit_codes::CONFLICT,
            CliError::IntegrityFailed(_) => exit_codes::INTEGRITY_FAILED,
            CliError::Internal(_) => exit_codes::INTERNAL,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}

impl From<LiftbookError> for CliError {
    fn from(err: LiftbookError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::NotFound => CliError::NotFound {
                hint: not_found_hint(&message),
                message,
            },
            ErrorKind::Validation => CliError::InvalidInput(message),
            ErrorKind::Conflict => CliError::Conflict(message),
            ErrorKind::Internal => CliError::Internal(message),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<CliError>() {
            Ok(cli) => return cli,
            Err(err) => err,
        };
        match err.downcast::<LiftbookError>() {
            Ok(core) => core.into(),
            Err(err) => CliError::Internal(format!("{:#}", err)),
        }
    }
}

/// Suggest the listing command that shows valid ids for the missing record.
fn not_found_hint(message: &str) -> Option<String> {
    let hint = if message.contains("Workout") {
        "Hint: Run `liftbook workout list` to see your workouts."
    } else if message.contains("Session") || message.contains("Set") {
        "Hint: Run `liftbook session list` to see your sessions."
    } else if message.contains("Exercise") {
        "Hint: Run `liftbook exercise list` to see the catalog."
    } else {
        return None;
    };
    Some(hint.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_kinds_map_to_exit_codes() {
        let cases = [
            (LiftbookError::not_found("Workout", "x"), exit_codes::NOT_FOUND),
            (
                LiftbookError::Validation("bad".into()),
                exit_codes::INVALID_INPUT,
            ),
            (LiftbookError::Conflict("foreign".into()), exit_codes::CONFLICT),
            (LiftbookError::Storage("disk".into()), exit_codes::INTERNAL),
        ];
        for (err, code) in cases {
            assert_eq!(CliError::from(err).exit_code(), code);
        }
    }

    #[test]
    fn test_anyhow_wrapping_is_unwrapped() {
        let wrapped = anyhow::Error::from(LiftbookError::not_found("Session", "abc"));
        let err = CliError::from(wrapped);
        assert_eq!(err.exit_code(), exit_codes::NOT_FOUND);
        assert!(err.to_string().contains("liftbook session list"));

        let cli = anyhow::Error::from(CliError::invalid_input("nope"));
        assert_eq!(CliError::from(cli).exit_code(), exit_codes::INVALID_INPUT);

        let other = CliError::from(anyhow::anyhow!("boom"));
        assert_eq!(other.exit_code(), exit_codes::INTERNAL);
    }
}

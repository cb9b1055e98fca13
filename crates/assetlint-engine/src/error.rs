//! Step and engine errors.

use assetlint_core::{RemoteError, RepoError};

/// Failure raised by a check step or fix operation.
///
/// A `Fault` is folded into the aggregate as a single error entry attributed
/// to the step. A `Fatal` aborts the whole run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("{0}")]
    Fault(String),

    #[error("fatal: {0}")]
    Fatal(String),
}

impl StepError {
    pub fn fault(message: impl std::fmt::Display) -> Self {
        StepError::Fault(message.to_string())
    }

    pub fn fatal(message: impl std::fmt::Display) -> Self {
        StepError::Fatal(message.to_string())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, StepError::Fatal(_))
    }
}

impl From<RepoError> for StepError {
    fn from(err: RepoError) -> Self {
        if err.is_fatal() {
            StepError::fatal(err)
        } else {
            StepError::fault(err)
        }
    }
}

impl From<RemoteError> for StepError {
    fn from(err: RemoteError) -> Self {
        if err.is_fatal() {
            StepError::fatal(err)
        } else {
            StepError::fault(err)
        }
    }
}

/// Errors that abort an engine run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("fatal error in {action} / {step}: {message}")]
    Fatal {
        action: String,
        step: String,
        message: String,
    },
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

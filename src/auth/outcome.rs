use std::fmt;

use crate::auth::projector::IdentityView;
use crate::error::{AppError, AuthError};

/// Result of a single authentication call.
///
/// `Failure` carries a normalized reason for a rejected credential;
/// `Error` carries an infrastructure fault that the caller may log or retry.
#[derive(Debug)]
pub enum Outcome {
    Success(IdentityView),
    Failure(AuthError),
    Error(AppError),
}

impl Outcome {
    pub fn fault(err: impl Into<AppError>) -> Self {
        Outcome::Error(err.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn failure_reason(&self) -> Option<AuthError> {
        match self {
            Outcome::Failure(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Collapses the outcome into the crate's error type for `?` at the
    /// HTTP boundary.
    pub fn into_result(self) -> Result<IdentityView, AppError> {
        match self {
            Outcome::Success(view) => Ok(view),
            Outcome::Failure(reason) => Err(AppError::AuthError(reason)),
            Outcome::Error(err) => Err(err),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(_) => write!(f, "success"),
            Outcome::Failure(reason) => write!(f, "failure: {}", reason),
            Outcome::Error(err) => write!(f, "error: {}", err),
        }
    }
}

//! Error types for the Session actor.

use crate::model::Step;
use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    /// No session for this rider.
    #[error("Session not found: {0}")]
    NotFound(String),

    /// The session's current step does not allow the requested move.
    #[error("Cannot {action} from step {from}")]
    InvalidTransition { from: Step, action: &'static str },

    /// The session store could not be reached or could not persist the change.
    #[error("Session store error: {0}")]
    Store(String),
}

impl From<String> for SessionError {
    fn from(msg: String) -> Self {
        SessionError::Store(msg)
    }
}

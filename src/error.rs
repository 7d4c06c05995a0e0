use thiserror::Error;

use crate::services::Cue;
use crate::session::{Operation, Phase};

/// Errors surfaced synchronously by [`SessionManager`](crate::session::SessionManager).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {operation} while {phase}")]
    InvalidTransition { operation: Operation, phase: Phase },
}

/// Non-fatal: the effect is skipped, the operation that wanted it carries on.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceError {
    #[error("no clip loaded for the {0:?} cue")]
    MissingResource(Cue),
    #[error("no audio output device")]
    NoOutputDevice,
}

pub type SessionResult<T> = Result<T, SessionError>;

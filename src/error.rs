use thiserror::Error;

use crate::coordinator::{Phase, TransitionState};

/// Errors raised while configuring a presenter or requesting a transition.
///
/// Animation itself never fails: a missing view or an interrupted animation
/// completes as a no-op instead of producing an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransitionError {
    #[error("unknown transition effect `{0}`")]
    UnknownEffect(String),

    #[error("unknown move direction `{0}`")]
    UnknownDirection(String),

    #[error("target frame must have a non-negative, finite size (got {width}x{height})")]
    InvalidFrame { width: f32, height: f32 },

    #[error("backdrop color channels must lie in [0, 1]")]
    InvalidColor,

    #[error("cannot begin {requested:?} while the transition is {state:?}")]
    InvalidTransition {
        state: TransitionState,
        requested: Phase,
    },
}

pub type Result<T> = std::result::Result<T, TransitionError>;

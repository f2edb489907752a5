//! Engine error types.
//!
//! Two classes of failure exist: data failures, which prevent a session from
//! starting at all, and rule violations, which reject a single intent and leave
//! the session untouched. Data providers live in another crate and return
//! `anyhow::Error`; the engine downcasts to `EngineError` where it can.

use thiserror::Error;

/// Errors produced by the puzzle engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The data provider had nothing to offer, or its data could not be read.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// Too few records survived filtering to build the requested puzzle.
    #[error("insufficient data: {found} playable question(s), need at least {required}")]
    InsufficientData { found: usize, required: usize },

    /// The intent is not legal in the current state.
    #[error("illegal transition: {0}")]
    IllegalTransition(String),

    /// An answer was chosen before any question was focused.
    #[error("no question is focused")]
    NoFocus,

    /// A reorder would disturb an answer that is already locked.
    #[error("position {position} is locked")]
    LockedPositionViolation { position: usize },
}

impl EngineError {
    /// Returns `true` if the error only rejected one intent and the session
    /// can continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::IllegalTransition(_)
                | EngineError::NoFocus
                | EngineError::LockedPositionViolation { .. }
        )
    }

    pub(crate) fn illegal(message: impl Into<String>) -> Self {
        EngineError::IllegalTransition(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_violations_are_recoverable() {
        assert!(EngineError::NoFocus.is_recoverable());
        assert!(EngineError::LockedPositionViolation { position: 2 }.is_recoverable());
        assert!(EngineError::illegal("already submitted").is_recoverable());
    }

    #[test]
    fn data_failures_are_not_recoverable() {
        assert!(!EngineError::DataUnavailable("empty".into()).is_recoverable());
        assert!(!EngineError::InsufficientData {
            found: 2,
            required: 5
        }
        .is_recoverable());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = EngineError::InsufficientData {
            found: 0,
            required: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: 0 playable question(s), need at least 1"
        );
        assert_eq!(
            EngineError::LockedPositionViolation { position: 3 }.to_string(),
            "position 3 is locked"
        );
    }
}

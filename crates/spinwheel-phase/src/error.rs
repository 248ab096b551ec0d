//! Error types for the phase layer.

use std::fmt;

use spinwheel_select::SelectError;

use crate::Phase;

/// A caller request to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Confirm,
    Cancel,
    Close,
    Open,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Confirm => write!(f, "confirm"),
            Self::Cancel => write!(f, "cancel"),
            Self::Close => write!(f, "close"),
            Self::Open => write!(f, "open"),
        }
    }
}

/// Errors returned by the wheel.
///
/// Every variant means the call was ignored and the wheel's state is
/// unchanged. None of them are fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhaseError {
    /// `start` with no participants. Surface as "spin unavailable".
    #[error("spin unavailable: no participants")]
    EmptyPool,

    /// The action is not legal in the current phase.
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: Action, phase: Phase },

    /// `confirm` in Revealed before the countdown gate opened.
    #[error("confirmation locked for {remaining} more ticks")]
    ConfirmLocked { remaining: u32 },

    /// The selection engine rejected its parameters.
    #[error(transparent)]
    Selection(#[from] SelectError),

    /// The controller's actor has stopped.
    #[error("wheel is unavailable")]
    Unavailable,
}

impl PhaseError {
    pub(crate) fn invalid(action: Action, phase: Phase) -> Self {
        Self::InvalidTransition { action, phase }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let err = PhaseError::invalid(Action::Confirm, Phase::Spinning);
        assert_eq!(err.to_string(), "cannot confirm while Spinning");
    }

    #[test]
    fn test_selection_error_converts() {
        let err: PhaseError = SelectError::InvalidJitter(2.0).into();
        assert!(matches!(err, PhaseError::Selection(_)));
        assert!(err.to_string().contains("jitter"));
    }
}

//! Unified error type for Spinwheel.

use spinwheel_phase::PhaseError;
use spinwheel_select::SelectError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attributes let `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum SpinwheelError {
    /// Selection rejected its input (empty pool, bad index or jitter).
    #[error(transparent)]
    Select(#[from] SelectError),

    /// The phase controller refused a transition or is gone.
    #[error(transparent)]
    Phase(#[from] PhaseError),

    /// A config file could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    /// A config file could not be read.
    #[error("config unreadable: {0}")]
    Io(#[from] std::io::Error),
}

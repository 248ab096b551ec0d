//! Error types for the selection layer.

/// Errors that can occur while selecting a winner or computing a rotation.
///
/// None of these are fatal. A caller that receives one should treat the
/// spin as unavailable and leave its own state untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectError {
    /// There is nobody to spin for.
    #[error("cannot spin an empty pool")]
    EmptyPool,

    /// A segment index outside `0..len` was requested.
    #[error("segment {index} out of range for a wheel of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The jitter fraction must lie in `[0, 1)` so the landing point can
    /// never cross into a neighbouring segment.
    #[error("jitter fraction {0} outside [0, 1)")]
    InvalidJitter(f64),

    /// The decoded strategy needs `min_turns <= max_turns`.
    #[error("invalid turn range {min}..{max}")]
    InvalidTurns { min: u32, max: u32 },
}

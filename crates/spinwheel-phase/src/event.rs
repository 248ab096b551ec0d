//! What the wheel tells the outside world.
//!
//! The renderer and the roster are pure consumers: they read
//! [`WheelSnapshot`]s and [`WheelEvent`]s but never mutate the wheel.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::Phase;

/// A unique identifier for a wheel instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WheelId(pub u64);

/// Counter for generating unique wheel IDs.
static NEXT_WHEEL_ID: AtomicU64 = AtomicU64::new(1);

impl WheelId {
    /// Allocates a process-unique ID.
    pub fn next() -> Self {
        Self(NEXT_WHEEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W-{}", self.0)
    }
}

/// The committed removal of one participant.
///
/// `index` is the participant's position in the spin's snapshot, so a
/// roster holding duplicate names can still remove the right entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elimination {
    pub name: String,
    pub index: usize,
}

/// Notifications emitted by a running wheel, in the order they happen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WheelEvent {
    /// A human-readable status line (for a screen-reader live region).
    Announce(String),
    /// The wheel entered a new phase.
    PhaseChanged(Phase),
    /// Fired exactly once per confirmed spin, on entering Floating.
    Eliminated(Elimination),
    /// The wheel entered Closed.
    Closed,
}

/// Read-only view of a wheel for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelSnapshot {
    pub phase: Phase,
    /// Absolute rotation in degrees.
    pub rotation: f64,
    /// Countdown gate value. Equals the seed outside Revealed.
    pub countdown: u32,
    /// `true` only in Revealed with the countdown at zero.
    pub can_confirm: bool,
    /// Set from Revealed onwards.
    pub winner: Option<String>,
    pub winner_index: Option<usize>,
    pub roast_line: Option<String>,
    /// The spin's participant snapshot; empty while Idle or Closed.
    pub participants: Vec<String>,
}

impl WheelSnapshot {
    /// Participants other than the winner, in order.
    pub fn remaining(&self) -> Vec<&str> {
        self.participants
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != self.winner_index)
            .map(|(_, name)| name.as_str())
            .collect()
    }
}

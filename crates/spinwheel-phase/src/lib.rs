//! Phase state machine and timed controller for Spinwheel.
//!
//! A wheel walks through a fixed ritual:
//!
//! ```text
//! Idle ──start──→ Spinning ──(spin elapses)──→ Revealed ──confirm──→ Ejecting
//!  ↑                                              │                     │
//!  └──────────────────cancel──────────────────────┘          (eject elapses,
//!                                                             eliminate fired)
//!                                                                       ↓
//!                              Closed ←──(float elapses)──────────  Floating
//! ```
//!
//! # Key types
//!
//! - [`PhaseMachine`]: the pure transition function `(state, input) → effects`
//! - [`PhaseController`]: handle to a running wheel actor that executes
//!   those effects with real (or paused) Tokio timers
//! - [`WheelManager`]: opens and tears down one controller per wheel
//! - [`Phase`]: the externally visible lifecycle state
//! - [`WheelConfig`]: durations, turns, jitter, countdown seed

mod config;
mod controller;
mod error;
mod event;
mod machine;
mod manager;

pub use config::{Phase, StrategyKind, WheelConfig};
pub use controller::{
    spawn_wheel, EventReceiver, EventSender, PhaseController, DEFAULT_CHANNEL_SIZE,
};
pub use error::{Action, PhaseError};
pub use event::{Elimination, WheelEvent, WheelId, WheelSnapshot};
pub use machine::{
    Effect, Input, PhaseMachine, PhaseTimer, TimerToken, ANNOUNCE_CANCELLED, ANNOUNCE_SPINNING,
};
pub use manager::WheelManager;

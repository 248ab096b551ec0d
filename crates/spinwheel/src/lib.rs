//! # Spinwheel
//!
//! A timed elimination wheel. One participant is picked uniformly at random,
//! the wheel is animated to land on them, and a countdown gate stands between
//! the reveal and the irreversible elimination.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spinwheel::prelude::*;
//!
//! # async fn run() -> Result<(), SpinwheelError> {
//! spinwheel::init_tracing();
//!
//! let (wheel, mut events) = Spinwheel::builder()
//!     .countdown_seed(3)
//!     .seed(42)
//!     .spawn();
//!
//! wheel.start(SpinRequest::new(["Alice", "Bob", "Carol"])).await?;
//! while let Some(event) = events.recv().await {
//!     if event == WheelEvent::PhaseChanged(Phase::Revealed) {
//!         break;
//!     }
//! }
//! wheel.cancel().await?;
//! # Ok(())
//! # }
//! ```
//!
//! The workspace is split the same way at runtime:
//!
//! - [`select`]: random source, wheel geometry, winner selection
//! - [`timer`]: the single pending-timer slot
//! - [`phase`]: the phase state machine and its Tokio actor

mod builder;
mod error;

use std::path::Path;

pub use builder::{Spinwheel, SpinwheelBuilder};
pub use error::SpinwheelError;

pub use spinwheel_phase as phase;
pub use spinwheel_select as select;
pub use spinwheel_timer as timer;

use spinwheel_phase::WheelConfig;

/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG`, defaulting to
/// `info`. Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Reads a JSON [`WheelConfig`] from `path`. Missing fields take their
/// defaults and out-of-range values are clamped.
pub fn load_config(path: impl AsRef<Path>) -> Result<WheelConfig, SpinwheelError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let config = parse_config(&raw)?;
    tracing::info!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Parses a JSON [`WheelConfig`].
pub fn parse_config(raw: &str) -> Result<WheelConfig, SpinwheelError> {
    let config: WheelConfig = serde_json::from_str(raw)?;
    Ok(config.validated())
}

pub mod prelude {
    pub use crate::{Spinwheel, SpinwheelBuilder, SpinwheelError};

    pub use spinwheel_phase::{
        Elimination, EventReceiver, Phase, PhaseController, PhaseError, StrategyKind,
        WheelConfig, WheelEvent, WheelId, WheelManager, WheelSnapshot,
    };
    pub use spinwheel_select::{
        RandomSource, SeededRandom, SelectionEngine, SelectionResult, SpinRequest, SpinStrategy,
        ThreadRandom,
    };
}

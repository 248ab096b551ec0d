//! Winner selection for the Spinwheel elimination wheel.
//!
//! This crate answers two questions and nothing else:
//!
//! - **Who?** A uniformly random participant out of an immutable
//!   [`SpinRequest`] snapshot.
//! - **Where does the wheel stop?** The rotation (in degrees) that puts the
//!   chosen segment under the fixed pointer, and the inverse mapping from a
//!   final rotation back to a segment.
//!
//! Randomness is never an ambient call: every draw goes through a
//! [`RandomSource`], so tests plug in [`SeededRandom`] or [`ScriptedRandom`]
//! and get reproducible winners and jitter.
//!
//! # Strategies
//!
//! [`SpinStrategy`] picks one of two equivalent geometry methods:
//!
//! ```text
//! Precomputed: pick index ──→ compute exact landing rotation (+ jitter)
//! Decoded:     pick random large rotation ──→ decode index from it
//! ```
//!
//! Both produce a [`SelectionResult`] whose `final_rotation` decodes back to
//! `winner_index` through [`WheelGeometry::decode`].

mod engine;
mod error;
mod geometry;
mod random;
mod types;

pub use engine::{SelectionEngine, SpinStrategy};
pub use error::SelectError;
pub use geometry::{normalize_degrees, WheelGeometry, FULL_TURN, POINTER_ANGLE};
pub use random::{RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};
pub use types::{DuplicateName, SelectionResult, SpinRequest};

//! The selection engine and its pluggable geometry strategy.
//!
//! [`SelectionEngine`] is the only place a winner is chosen. It owns the
//! [`RandomSource`] and a [`SpinStrategy`]; the phase controller above it
//! never sees which strategy produced a result, only the
//! [`SelectionResult`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    RandomSource, SelectError, SelectionResult, SpinRequest, WheelGeometry, FULL_TURN,
    POINTER_ANGLE,
};

// ---------------------------------------------------------------------------
// SpinStrategy
// ---------------------------------------------------------------------------

/// How the engine turns a random draw into a landing rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpinStrategy {
    /// Pick the winner first, then compute the exact rotation that lands
    /// its segment under the pointer, plus a small jitter.
    Precomputed {
        /// Full revolutions added for visual effect.
        extra_turns: u32,
        /// Jitter width as a fraction of one segment. Must be in `[0, 1)`.
        jitter_fraction: f64,
    },
    /// Spin a random large amount (`min_turns..max_turns` whole turns plus a
    /// free offset) and read the winner off wherever the wheel stops.
    Decoded { min_turns: u32, max_turns: u32 },
}

impl Default for SpinStrategy {
    fn default() -> Self {
        Self::Precomputed {
            extra_turns: 8,
            jitter_fraction: 0.2,
        }
    }
}

impl SpinStrategy {
    /// Rejects parameters that would break the round-trip guarantee.
    pub fn validate(&self) -> Result<(), SelectError> {
        match *self {
            Self::Precomputed {
                jitter_fraction, ..
            } => check_jitter(jitter_fraction),
            Self::Decoded {
                min_turns,
                max_turns,
            } if min_turns > max_turns => Err(SelectError::InvalidTurns {
                min: min_turns,
                max: max_turns,
            }),
            Self::Decoded { .. } => Ok(()),
        }
    }
}

fn check_jitter(jitter_fraction: f64) -> Result<(), SelectError> {
    if (0.0..1.0).contains(&jitter_fraction) {
        Ok(())
    } else {
        Err(SelectError::InvalidJitter(jitter_fraction))
    }
}

// ---------------------------------------------------------------------------
// SelectionEngine
// ---------------------------------------------------------------------------

/// Picks winners and computes wheel rotations.
///
/// Stateless apart from the random source: two engines with identically
/// seeded sources and the same strategy produce identical results.
#[derive(Debug, Clone)]
pub struct SelectionEngine<R> {
    strategy: SpinStrategy,
    pointer_angle: f64,
    rng: R,
}

impl<R: RandomSource> SelectionEngine<R> {
    pub fn new(strategy: SpinStrategy, rng: R) -> Self {
        Self {
            strategy,
            pointer_angle: POINTER_ANGLE,
            rng,
        }
    }

    /// Uses a different pointer reference angle for both encode and decode.
    pub fn with_pointer_angle(mut self, pointer_angle: f64) -> Self {
        self.pointer_angle = pointer_angle;
        self
    }

    pub fn strategy(&self) -> SpinStrategy {
        self.strategy
    }

    pub fn pointer_angle(&self) -> f64 {
        self.pointer_angle
    }

    /// The engine's random source, for callers that draw cosmetic values
    /// (e.g. a reveal line) from the same stream.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Geometry for a wheel of `segments` with this engine's pointer.
    pub fn geometry(&self, segments: usize) -> Result<WheelGeometry, SelectError> {
        Ok(WheelGeometry::new(segments)?.with_pointer(self.pointer_angle))
    }

    /// Draws a uniformly random index into `participants`.
    ///
    /// # Errors
    /// [`SelectError::EmptyPool`] when there is nobody to pick.
    pub fn pick_winner<S>(&mut self, participants: &[S]) -> Result<usize, SelectError> {
        if participants.is_empty() {
            return Err(SelectError::EmptyPool);
        }
        Ok(self.rng.next_index(participants.len()))
    }

    /// Rotation that lands `target_index` under the pointer, starting from
    /// `current_rotation`, with jitter drawn from the random source.
    ///
    /// `jitter_fraction < 1` keeps `|jitter| < segment / 2`, so the landing
    /// point never leaves the target segment.
    pub fn compute_target_rotation(
        &mut self,
        segments: usize,
        target_index: usize,
        current_rotation: f64,
        extra_turns: u32,
        jitter_fraction: f64,
    ) -> Result<f64, SelectError> {
        check_jitter(jitter_fraction)?;
        let geometry = self.geometry(segments)?;
        geometry.check_index(target_index)?;

        let jitter = geometry.jitter(self.rng.next_unit(), jitter_fraction);
        let target =
            geometry.target_rotation(target_index, current_rotation, extra_turns, jitter);
        debug!(
            segments,
            target_index,
            needed = geometry.needed_rotation(target_index),
            jitter,
            target,
            "target rotation computed"
        );
        Ok(target)
    }

    /// Inverse of [`compute_target_rotation`](Self::compute_target_rotation):
    /// the segment under the pointer after rotating by `final_rotation`.
    pub fn decode_winner(&self, segments: usize, final_rotation: f64) -> Result<usize, SelectError> {
        Ok(self.geometry(segments)?.decode(final_rotation))
    }

    /// Runs one full selection for `request`.
    ///
    /// Duplicate names are logged and otherwise ignored: every entry keeps
    /// its own segment.
    pub fn spin(
        &mut self,
        request: &SpinRequest,
        current_rotation: f64,
    ) -> Result<SelectionResult, SelectError> {
        if request.is_empty() {
            return Err(SelectError::EmptyPool);
        }
        self.strategy.validate()?;

        for dup in request.duplicates() {
            warn!(name = %dup.name, first = dup.first, second = dup.second, "duplicate participant name");
        }

        let segments = request.len();
        let (winner_index, final_rotation) = match self.strategy {
            SpinStrategy::Precomputed {
                extra_turns,
                jitter_fraction,
            } => {
                let index = self.pick_winner(request.participants())?;
                let rotation = self.compute_target_rotation(
                    segments,
                    index,
                    current_rotation,
                    extra_turns,
                    jitter_fraction,
                )?;
                (index, rotation)
            }
            SpinStrategy::Decoded {
                min_turns,
                max_turns,
            } => {
                let span = (max_turns - min_turns) as usize;
                let turns = min_turns + self.rng.next_index(span) as u32;
                let offset = self.rng.next_unit() * FULL_TURN;
                let geometry = self.geometry(segments)?;
                let rotation = geometry.free_rotation(current_rotation, turns, offset);
                (geometry.decode(rotation), rotation)
            }
        };

        // The index always comes from the request, so the name exists.
        let winner_name = request
            .name(winner_index)
            .ok_or(SelectError::IndexOutOfRange {
                index: winner_index,
                len: segments,
            })?
            .to_owned();

        info!(
            winner = %winner_name,
            index = winner_index,
            segments,
            rotation = final_rotation,
            "winner selected"
        );

        Ok(SelectionResult {
            winner_index,
            winner_name,
            final_rotation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScriptedRandom, SeededRandom};

    fn crew() -> SpinRequest {
        SpinRequest::new(["Alice", "Bob", "Carol", "Dave"])
    }

    #[test]
    fn test_default_strategy() {
        assert_eq!(
            SpinStrategy::default(),
            SpinStrategy::Precomputed {
                extra_turns: 8,
                jitter_fraction: 0.2
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let bad_jitter = SpinStrategy::Precomputed {
            extra_turns: 8,
            jitter_fraction: 1.0,
        };
        assert_eq!(bad_jitter.validate(), Err(SelectError::InvalidJitter(1.0)));

        let bad_turns = SpinStrategy::Decoded {
            min_turns: 8,
            max_turns: 5,
        };
        assert_eq!(
            bad_turns.validate(),
            Err(SelectError::InvalidTurns { min: 8, max: 5 })
        );
    }

    #[test]
    fn test_pick_winner_empty_pool() {
        let mut engine = SelectionEngine::new(SpinStrategy::default(), SeededRandom::new(1));
        let empty: [&str; 0] = [];
        assert_eq!(engine.pick_winner(&empty), Err(SelectError::EmptyPool));
    }

    #[test]
    fn test_scenario_forced_carol() {
        let mut engine = SelectionEngine::new(
            SpinStrategy::default(),
            ScriptedRandom::selecting(2, 4),
        );
        let result = engine.spin(&crew(), 0.0).unwrap();
        assert_eq!(result.winner_index, 2);
        assert_eq!(result.winner_name, "Carol");
        assert_eq!(result.final_rotation, 2925.0);
        assert_eq!(engine.decode_winner(4, result.final_rotation).unwrap(), 2);
    }

    #[test]
    fn test_scenario_forced_carol_zero_pointer() {
        let mut engine = SelectionEngine::new(
            SpinStrategy::default(),
            ScriptedRandom::selecting(2, 4),
        )
        .with_pointer_angle(0.0);
        let result = engine.spin(&crew(), 0.0).unwrap();
        assert_eq!(result.final_rotation, 3015.0);
        assert_eq!(engine.decode_winner(4, 3015.0).unwrap(), 2);
    }

    #[test]
    fn test_compute_target_rejects_out_of_range_index() {
        let mut engine = SelectionEngine::new(SpinStrategy::default(), SeededRandom::new(1));
        assert_eq!(
            engine.compute_target_rotation(4, 4, 0.0, 8, 0.2),
            Err(SelectError::IndexOutOfRange { index: 4, len: 4 })
        );
        assert_eq!(
            engine.compute_target_rotation(4, 0, 0.0, 8, -0.1),
            Err(SelectError::InvalidJitter(-0.1))
        );
    }

    #[test]
    fn test_decoded_strategy_turn_range() {
        let mut engine = SelectionEngine::new(
            SpinStrategy::Decoded {
                min_turns: 5,
                max_turns: 8,
            },
            SeededRandom::new(99),
        );
        for _ in 0..200 {
            let result = engine.spin(&crew(), 0.0).unwrap();
            assert!(result.final_rotation >= 5.0 * FULL_TURN);
            assert!(result.final_rotation < 8.0 * FULL_TURN);
            assert_eq!(
                engine.decode_winner(4, result.final_rotation).unwrap(),
                result.winner_index
            );
        }
    }

    #[test]
    fn test_decoded_strategy_fixed_turns() {
        let mut engine = SelectionEngine::new(
            SpinStrategy::Decoded {
                min_turns: 6,
                max_turns: 6,
            },
            ScriptedRandom::new(vec![0.25]).then_repeat(0.25),
        );
        // 6 turns + 90° offset: pointer at 270 sits over local 180 -> segment 2.
        let result = engine.spin(&crew(), 0.0).unwrap();
        assert_eq!(result.final_rotation, 6.0 * FULL_TURN + 90.0);
        assert_eq!(result.winner_name, "Carol");
    }

    #[test]
    fn test_single_participant_still_gets_rotation() {
        let mut engine = SelectionEngine::new(SpinStrategy::default(), SeededRandom::new(3));
        let result = engine.spin(&SpinRequest::new(["Solo"]), 0.0).unwrap();
        assert_eq!(result.winner_index, 0);
        assert!(result.final_rotation >= 8.0 * FULL_TURN);
    }

    #[test]
    fn test_duplicates_still_spin() {
        let mut engine = SelectionEngine::new(SpinStrategy::default(), ScriptedRandom::selecting(1, 2));
        let result = engine.spin(&SpinRequest::new(["Sam", "Sam"]), 0.0).unwrap();
        assert_eq!(result.winner_index, 1);
        assert_eq!(result.winner_name, "Sam");
    }

    #[test]
    fn test_strategy_serde_tagged() {
        let json = serde_json::to_string(&SpinStrategy::Decoded {
            min_turns: 5,
            max_turns: 8,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"decoded","min_turns":5,"max_turns":8}"#);
    }
}

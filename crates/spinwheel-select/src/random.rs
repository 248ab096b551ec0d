//! Injectable randomness.
//!
//! Everything random in a spin (the winner, the jitter, the decoded
//! strategy's turn count, the roast line) is drawn through [`RandomSource`].
//! Production code uses [`ThreadRandom`]; tests use [`SeededRandom`] for
//! reproducible streams or [`ScriptedRandom`] to force exact values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Largest value [`ScriptedRandom`] will hand out; keeps samples in `[0, 1)`.
const MAX_UNIT: f64 = 1.0 - f64::EPSILON;

/// A supplier of uniformly distributed values.
///
/// `Send` so an engine holding one can live inside a Tokio task.
pub trait RandomSource: Send {
    /// A uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// A uniform index in `[0, len)`. Returns 0 for `len <= 1`.
    fn next_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let scaled = (self.next_unit() * len as f64) as usize;
        scaled.min(len - 1)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }

    fn next_index(&mut self, len: usize) -> usize {
        (**self).next_index(len)
    }
}

// ---------------------------------------------------------------------------
// ThreadRandom
// ---------------------------------------------------------------------------

/// Draws from the thread-local OS-seeded generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        rand::rng().random_range(0..len)
    }
}

// ---------------------------------------------------------------------------
// SeededRandom
// ---------------------------------------------------------------------------

/// Deterministic generator for tests and replays.
///
/// The same seed always yields the same sequence of winners.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    inner: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.inner.random_range(0..len)
    }
}

// ---------------------------------------------------------------------------
// ScriptedRandom
// ---------------------------------------------------------------------------

/// Replays a fixed list of unit values.
///
/// Values are clamped into `[0, 1)`. Once the script is exhausted it either
/// repeats a fixed tail value or, without one, cycles from the start. An
/// empty script with no tail always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    tail: Option<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values = values.into().into_iter().map(clamp_unit).collect();
        Self {
            values,
            tail: None,
            cursor: 0,
        }
    }

    /// A script whose first draw selects `index` out of `len` and whose
    /// later draws all sit at 0.5 (zero jitter, middle of any range).
    pub fn selecting(index: usize, len: usize) -> Self {
        let len = len.max(1) as f64;
        Self::new(vec![(index as f64 + 0.5) / len]).then_repeat(0.5)
    }

    /// Repeat `value` forever after the scripted values run out.
    pub fn then_repeat(mut self, value: f64) -> Self {
        self.tail = Some(clamp_unit(value));
        self
    }

    /// How many values have been drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, MAX_UNIT)
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        let value = match (self.values.get(self.cursor), self.tail) {
            (Some(&v), _) => v,
            (None, Some(tail)) => tail,
            (None, None) if self.values.is_empty() => 0.0,
            (None, None) => self.values[self.cursor % self.values.len()],
        };
        self.cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        for _ in 0..32 {
            assert_eq!(a.next_index(10), b.next_index(10));
        }
    }

    #[test]
    fn test_thread_random_in_range() {
        let mut rng = ThreadRandom;
        for _ in 0..1_000 {
            let u = rng.next_unit();
            assert!((0.0..1.0).contains(&u));
            assert!(rng.next_index(6) < 6);
        }
    }

    #[test]
    fn test_next_index_degenerate_lengths() {
        let mut rng = ThreadRandom;
        assert_eq!(rng.next_index(0), 0);
        assert_eq!(rng.next_index(1), 0);
    }

    #[test]
    fn test_scripted_clamps_and_cycles() {
        let mut rng = ScriptedRandom::new(vec![-1.0, 0.25, 2.0]);
        assert_eq!(rng.next_unit(), 0.0);
        assert_eq!(rng.next_unit(), 0.25);
        assert!(rng.next_unit() < 1.0);
        assert_eq!(rng.next_unit(), 0.0);
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn test_selecting_forces_index_then_midpoints() {
        let mut rng = ScriptedRandom::selecting(2, 4);
        assert_eq!(rng.next_index(4), 2);
        assert_eq!(rng.next_unit(), 0.5);
        assert_eq!(rng.next_unit(), 0.5);
    }

    #[test]
    fn test_boxed_source_delegates() {
        let mut rng: Box<dyn RandomSource> = Box::new(ScriptedRandom::new(vec![0.9]));
        assert_eq!(rng.next_index(10), 9);
    }
}

//! Wheel geometry: segments, the pointer, and the rotation mapping.
//!
//! ## Coordinate frame
//!
//! Angles are in degrees, measured clockwise from 3 o'clock in the wheel's
//! own (unrotated) frame. Segment `i` of `n` covers `[i * a, (i + 1) * a)`
//! with `a = 360 / n`. A clockwise rotation `R` moves wheel-local angle `θ`
//! to screen angle `θ + R`, so the pointer, fixed at screen angle `P`, sits
//! over wheel-local angle `P - R`.
//!
//! Both directions of the mapping use the same `P`:
//!
//! ```text
//! encode: needed = (P - midpoint(i)) mod 360
//! decode: index  = floor(((P - R) mod 360) / a) mod n
//! ```
//!
//! With the default `P = 270` (12 o'clock) and `n = 4`, segment 2 has its
//! midpoint at 225°, needs a net rotation of 45°, and a rotation of
//! `8 * 360 + 45 = 2925` decodes back to 2.

use crate::SelectError;

/// One full revolution, in degrees.
pub const FULL_TURN: f64 = 360.0;

/// Default pointer position: 12 o'clock in a 0°-at-3-o'clock frame.
pub const POINTER_ANGLE: f64 = 270.0;

/// Reduces any angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(FULL_TURN);
    // rem_euclid can round tiny negatives up to exactly 360.
    if r >= FULL_TURN { 0.0 } else { r }
}

/// The smallest whole-turn rotation at or after `current`.
///
/// New spins start from here so the wheel always keeps turning forward.
fn turn_base(current: f64) -> f64 {
    if current <= 0.0 {
        0.0
    } else {
        (current / FULL_TURN).ceil() * FULL_TURN
    }
}

/// Derived geometry for a wheel of `n` equal segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelGeometry {
    segments: usize,
    pointer_angle: f64,
}

impl WheelGeometry {
    /// Geometry for `segments` slices with the pointer at [`POINTER_ANGLE`].
    ///
    /// # Errors
    /// [`SelectError::EmptyPool`] when `segments == 0`.
    pub fn new(segments: usize) -> Result<Self, SelectError> {
        if segments == 0 {
            return Err(SelectError::EmptyPool);
        }
        Ok(Self {
            segments,
            pointer_angle: POINTER_ANGLE,
        })
    }

    /// Moves the pointer reference. The angle is normalized into `[0, 360)`.
    pub fn with_pointer(mut self, pointer_angle: f64) -> Self {
        self.pointer_angle = normalize_degrees(pointer_angle);
        self
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn pointer_angle(&self) -> f64 {
        self.pointer_angle
    }

    /// Angular width of one segment.
    pub fn segment_angle(&self) -> f64 {
        FULL_TURN / self.segments as f64
    }

    /// `[start, end)` of segment `index` in the unrotated frame.
    pub fn segment_span(&self, index: usize) -> (f64, f64) {
        let a = self.segment_angle();
        (index as f64 * a, (index + 1) as f64 * a)
    }

    pub fn segment_midpoint(&self, index: usize) -> f64 {
        let a = self.segment_angle();
        index as f64 * a + a / 2.0
    }

    /// Checks that `index` names a segment on this wheel.
    pub fn check_index(&self, index: usize) -> Result<(), SelectError> {
        if index < self.segments {
            Ok(())
        } else {
            Err(SelectError::IndexOutOfRange {
                index,
                len: self.segments,
            })
        }
    }

    /// Net rotation in `[0, 360)` that brings the midpoint of `index` under
    /// the pointer.
    pub fn needed_rotation(&self, index: usize) -> f64 {
        normalize_degrees(self.pointer_angle - self.segment_midpoint(index))
    }

    /// Maps a unit sample `u ∈ [0, 1)` to a jitter offset in
    /// `[-a * fraction / 2, +a * fraction / 2)`.
    pub fn jitter(&self, unit: f64, jitter_fraction: f64) -> f64 {
        (unit - 0.5) * self.segment_angle() * jitter_fraction
    }

    /// Absolute rotation that lands segment `index` under the pointer,
    /// offset by `jitter` degrees, after `extra_turns` full revolutions
    /// beyond the current whole turn.
    pub fn target_rotation(
        &self,
        index: usize,
        current_rotation: f64,
        extra_turns: u32,
        jitter: f64,
    ) -> f64 {
        turn_base(current_rotation)
            + f64::from(extra_turns) * FULL_TURN
            + self.needed_rotation(index)
            + jitter
    }

    /// Absolute rotation for the decoded strategy: `turns` full revolutions
    /// beyond the current whole turn plus a free `offset` in `[0, 360)`.
    pub fn free_rotation(&self, current_rotation: f64, turns: u32, offset: f64) -> f64 {
        turn_base(current_rotation) + f64::from(turns) * FULL_TURN + offset
    }

    /// Inverse mapping: which segment sits under the pointer after the wheel
    /// has rotated by `final_rotation` degrees.
    pub fn decode(&self, final_rotation: f64) -> usize {
        let normalized = normalize_degrees(final_rotation);
        let under_pointer = normalize_degrees(self.pointer_angle - normalized);
        (under_pointer / self.segment_angle()).floor() as usize % self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheel(n: usize) -> WheelGeometry {
        WheelGeometry::new(n).unwrap()
    }

    #[test]
    fn test_zero_segments_is_empty_pool() {
        assert_eq!(WheelGeometry::new(0), Err(SelectError::EmptyPool));
    }

    #[test]
    fn test_segment_layout() {
        let g = wheel(4);
        assert_eq!(g.segment_angle(), 90.0);
        assert_eq!(g.segment_span(2), (180.0, 270.0));
        assert_eq!(g.segment_midpoint(2), 225.0);
    }

    #[test]
    fn test_normalize_handles_negatives_and_wraps() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(normalize_degrees(3015.0), 135.0);
        assert!(normalize_degrees(-1e-18) < FULL_TURN);
    }

    #[test]
    fn test_four_way_scenario_top_pointer() {
        let g = wheel(4);
        assert_eq!(g.needed_rotation(2), 45.0);
        let target = g.target_rotation(2, 0.0, 8, 0.0);
        assert_eq!(target, 2925.0);
        assert_eq!(g.decode(target), 2);
    }

    #[test]
    fn test_four_way_scenario_zero_pointer() {
        // With the pointer at 0° the encode step reduces to
        // (360 - midpoint) mod 360.
        let g = wheel(4).with_pointer(0.0);
        assert_eq!(g.needed_rotation(2), 135.0);
        let target = g.target_rotation(2, 0.0, 8, 0.0);
        assert_eq!(target, 3015.0);
        assert_eq!(g.decode(target), 2);
    }

    #[test]
    fn test_decode_walks_segments_backwards_under_pointer() {
        let g = wheel(4);
        // No rotation: the pointer at 270° sits over segment 3.
        assert_eq!(g.decode(0.0), 3);
        assert_eq!(g.decode(90.0), 2);
        assert_eq!(g.decode(-90.0), 0);
    }

    #[test]
    fn test_target_keeps_moving_forward() {
        let g = wheel(5);
        let first = g.target_rotation(1, 0.0, 8, 0.0);
        let second = g.target_rotation(3, first, 8, 0.0);
        assert!(second > first + 8.0 * FULL_TURN - 1e-9);
        assert_eq!(g.decode(second), 3);
    }

    #[test]
    fn test_jitter_bounds() {
        let g = wheel(4);
        assert_eq!(g.jitter(0.5, 0.2), 0.0);
        assert_eq!(g.jitter(0.0, 0.2), -9.0);
        assert!(g.jitter(0.999, 0.2) < 9.0);
    }

    #[test]
    fn test_round_trip_every_segment_and_jitter_edge() {
        for n in [1usize, 2, 3, 7, 12, 37] {
            for pointer in [0.0, 90.0, POINTER_ANGLE] {
                let g = wheel(n).with_pointer(pointer);
                let limit = g.segment_angle() / 2.0 * 0.999;
                for index in 0..n {
                    for jitter in [-limit, 0.0, limit] {
                        let target = g.target_rotation(index, 1234.5, 6, jitter);
                        assert_eq!(g.decode(target), index, "n={n} i={index} j={jitter}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_check_index() {
        let g = wheel(3);
        assert!(g.check_index(2).is_ok());
        assert_eq!(
            g.check_index(3),
            Err(SelectError::IndexOutOfRange { index: 3, len: 3 })
        );
    }
}

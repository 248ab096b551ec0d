//! Wheel configuration and the phase enum.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spinwheel_select::{SpinStrategy, POINTER_ANGLE};
use tracing::warn;

// ---------------------------------------------------------------------------
// StrategyKind
// ---------------------------------------------------------------------------

/// Which geometry method the wheel uses. The precomputed strategy reads its
/// turn count and jitter from the surrounding [`WheelConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Precomputed,
    Decoded { min_turns: u32, max_turns: u32 },
}

// ---------------------------------------------------------------------------
// WheelConfig
// ---------------------------------------------------------------------------

/// Timing and geometry settings for one wheel.
///
/// Every field has a default, so a JSON config only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Length of the rotation animation.
    pub spin_duration: Duration,

    /// Extra slack after the animation before the winner is revealed, for
    /// renderers whose animation may overrun slightly. Zero by default.
    pub settle_padding: Duration,

    /// Full revolutions added for visual effect (precomputed strategy).
    pub extra_turns: u32,

    pub strategy: StrategyKind,

    /// Jitter width as a fraction of one segment. Clamped to
    /// `0.0..=MAX_JITTER_FRACTION`.
    pub jitter_fraction: f64,

    /// Pointer reference angle in the wheel's 0°-at-3-o'clock frame.
    pub pointer_angle: f64,

    /// Countdown gate start value, in ticks.
    pub countdown_seed: u32,

    /// Length of one countdown tick.
    pub countdown_interval: Duration,

    /// How long the Ejecting phase is held before the elimination commits.
    pub eject_duration: Duration,

    /// How long the Floating phase is held before the wheel closes.
    pub float_duration: Duration,

    /// Pick a celebratory line when the winner is revealed.
    pub roast_mode: bool,

    /// Line pool for `roast_mode`. `{name}` is replaced with the winner.
    pub roast_lines: Vec<String>,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            spin_duration: Duration::from_secs(6),
            settle_padding: Duration::ZERO,
            extra_turns: 8,
            strategy: StrategyKind::Precomputed,
            jitter_fraction: 0.2,
            pointer_angle: POINTER_ANGLE,
            countdown_seed: 15,
            countdown_interval: Duration::from_secs(1),
            eject_duration: Duration::from_secs(5),
            float_duration: Duration::from_secs(8),
            roast_mode: true,
            roast_lines: default_roast_lines(),
        }
    }
}

fn default_roast_lines() -> Vec<String> {
    [
        "{name} just won a one-way ticket out of the airlock!",
        "{name} is off to explore the galaxy. Dance party starts now!",
        "{name} has been promoted to shooting star!",
        "{name} got the VIP cosmic tour. Wave goodbye!",
        "{name} was launched to the moon. Celebrate!",
        "{name} hit the space adventure jackpot!",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl WheelConfig {
    /// Largest accepted jitter fraction. Anything below 1 keeps the landing
    /// point inside the target segment; the margin absorbs float rounding.
    pub const MAX_JITTER_FRACTION: f64 = 0.99;

    /// Longest accepted duration for any phase hold.
    pub const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called by [`PhaseMachine::new`](crate::PhaseMachine::new). Rules:
    /// - `jitter_fraction` clamped to `0.0..=MAX_JITTER_FRACTION` (NaN → default).
    /// - A decoded strategy with `min_turns > max_turns` has its bounds swapped.
    /// - A zero `countdown_interval` is reset to one second.
    /// - Every duration is capped at `MAX_DURATION`.
    /// - A non-finite `pointer_angle` is reset to [`POINTER_ANGLE`].
    pub fn validated(mut self) -> Self {
        if self.jitter_fraction.is_nan() {
            warn!("jitter_fraction is NaN, using default");
            self.jitter_fraction = Self::default().jitter_fraction;
        } else if !(0.0..=Self::MAX_JITTER_FRACTION).contains(&self.jitter_fraction) {
            warn!(
                jitter = self.jitter_fraction,
                max = Self::MAX_JITTER_FRACTION,
                "jitter_fraction out of range, clamping"
            );
            self.jitter_fraction = self.jitter_fraction.clamp(0.0, Self::MAX_JITTER_FRACTION);
        }

        if let StrategyKind::Decoded {
            min_turns,
            max_turns,
        } = self.strategy
        {
            if min_turns > max_turns {
                warn!(min_turns, max_turns, "decoded turn range reversed, swapping");
                self.strategy = StrategyKind::Decoded {
                    min_turns: max_turns,
                    max_turns: min_turns,
                };
            }
        }

        if self.countdown_interval.is_zero() {
            warn!("countdown_interval is zero, using one second");
            self.countdown_interval = Duration::from_secs(1);
        }

        for (field, duration) in [
            ("spin_duration", &mut self.spin_duration),
            ("settle_padding", &mut self.settle_padding),
            ("countdown_interval", &mut self.countdown_interval),
            ("eject_duration", &mut self.eject_duration),
            ("float_duration", &mut self.float_duration),
        ] {
            if *duration > Self::MAX_DURATION {
                warn!(
                    field,
                    secs = duration.as_secs(),
                    max_secs = Self::MAX_DURATION.as_secs(),
                    "duration too long, clamping"
                );
                *duration = Self::MAX_DURATION;
            }
        }

        if !self.pointer_angle.is_finite() {
            warn!(pointer_angle = self.pointer_angle, "pointer_angle not finite, using default");
            self.pointer_angle = POINTER_ANGLE;
        }
        self
    }

    /// Delay between `start` and the reveal.
    pub fn reveal_delay(&self) -> Duration {
        self.spin_duration.saturating_add(self.settle_padding)
    }

    /// The selection strategy these settings describe.
    pub fn spin_strategy(&self) -> SpinStrategy {
        match self.strategy {
            StrategyKind::Precomputed => SpinStrategy::Precomputed {
                extra_turns: self.extra_turns,
                jitter_fraction: self.jitter_fraction,
            },
            StrategyKind::Decoded {
                min_turns,
                max_turns,
            } => SpinStrategy::Decoded {
                min_turns,
                max_turns,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The lifecycle state of a wheel.
///
/// ```text
/// Idle → Spinning → Revealed → Ejecting → Floating → Closed
///              Revealed → Idle (cancel)
///              Idle | Revealed → Closed (close)
///              Closed → Idle (open)
/// ```
///
/// - **Idle**: no spin in flight; `start` is accepted.
/// - **Spinning**: the winner is fixed, the wheel is animating.
/// - **Revealed**: the winner is shown; the countdown gate runs.
/// - **Ejecting**: confirmed. The elimination is decided and cannot be
///   cancelled.
/// - **Floating**: the elimination has been reported; cosmetic hold.
/// - **Closed**: terminal until reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Spinning,
    Revealed,
    Ejecting,
    Floating,
    Closed,
}

impl Phase {
    /// Returns `true` if a new spin may start.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns `true` if `close` is accepted.
    pub fn can_close(&self) -> bool {
        matches!(self, Self::Idle | Self::Revealed)
    }

    /// Returns `true` once the elimination is decided and must run to
    /// completion.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Ejecting | Self::Floating)
    }

    /// Returns `true` while a spin lifecycle is in flight.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Spinning | Self::Revealed | Self::Ejecting | Self::Floating
        )
    }

    /// Returns `true` when the winner may be shown.
    pub fn has_winner(&self) -> bool {
        matches!(self, Self::Revealed | Self::Ejecting | Self::Floating)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Spinning => write!(f, "Spinning"),
            Self::Revealed => write!(f, "Revealed"),
            Self::Ejecting => write!(f, "Ejecting"),
            Self::Floating => write!(f, "Floating"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

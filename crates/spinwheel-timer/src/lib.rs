//! Single-slot phase timer for Spinwheel.
//!
//! Every delay in the wheel's lifecycle (the spin animation, each countdown
//! second, the ejecting and floating holds) is one [`TimerSlot`] entry. The
//! slot holds at most one pending timer: arming a new one replaces the old,
//! and leaving a state cancels whatever it scheduled. A timer that has been
//! replaced or cancelled can never fire.
//!
//! # Keys
//!
//! The slot is generic over a key `K` that is handed back when the timer
//! fires. The phase controller uses a generation-stamped token as the key,
//! so even a fire that races with a transition can be recognised as stale.
//!
//! # Integration
//!
//! The slot is designed to sit inside an actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* may arm or cancel */ }
//!         fired = slot.wait() => { /* feed fired.key to the state machine */ }
//!     }
//! }
//! ```
//!
//! With nothing armed, [`TimerSlot::wait`] pends forever and `select!`
//! simply keeps serving the other branches.

use std::fmt;
use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

/// Deadline offset used when `now + after` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`TimerSlot`].
#[derive(Debug, Clone)]
pub struct TimerConfig {
    /// A fire is reported as late when it wakes more than this fraction of
    /// the armed duration past its deadline. Default: 0.10 (10%).
    pub late_threshold: f64,
    /// Track lateness metrics. Counters are always kept.
    pub metrics_enabled: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            late_threshold: 0.10,
            metrics_enabled: true,
        }
    }
}

impl TimerConfig {
    /// Clamp out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        if self.late_threshold.is_nan() {
            warn!("late_threshold is NaN, using default");
            self.late_threshold = Self::default().late_threshold;
        }
        if !(0.0..=1.0).contains(&self.late_threshold) {
            warn!(
                threshold = self.late_threshold,
                "late_threshold outside 0..=1, clamping"
            );
            self.late_threshold = self.late_threshold.clamp(0.0, 1.0);
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Fired / metrics
// ---------------------------------------------------------------------------

/// A timer that reached its deadline, returned by [`TimerSlot::wait`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<K> {
    /// The key the timer was armed with.
    pub key: K,
    /// How long the duration that elapsed was supposed to be.
    pub scheduled: Duration,
    /// How far past the deadline the slot actually woke.
    pub late_by: Duration,
    /// `true` if `late_by` exceeded the configured threshold.
    pub late: bool,
}

/// Counters for one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerMetrics {
    /// Timers armed (including ones that replaced an earlier timer).
    pub armed: u64,
    /// Timers that reached their deadline.
    pub fired: u64,
    /// Timers removed by [`TimerSlot::cancel`].
    pub cancelled: u64,
    /// Timers dropped because a new one was armed over them.
    pub replaced: u64,
    /// Fires flagged as late.
    pub late: u64,
    /// Largest lateness observed.
    pub max_lateness: Duration,
}

// ---------------------------------------------------------------------------
// TimerSlot
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Pending<K> {
    key: K,
    deadline: Instant,
    duration: Duration,
}

/// Holds at most one pending timer.
pub struct TimerSlot<K> {
    config: TimerConfig,
    pending: Option<Pending<K>>,
    metrics: TimerMetrics,
}

impl<K> Default for TimerSlot<K> {
    fn default() -> Self {
        Self {
            config: TimerConfig::default(),
            pending: None,
            metrics: TimerMetrics::default(),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for TimerSlot<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerSlot")
            .field("pending", &self.pending)
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl<K: fmt::Debug> TimerSlot<K> {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config: config.validated(),
            pending: None,
            metrics: TimerMetrics::default(),
        }
    }

    /// Arms a timer that fires `after` from now, replacing any pending one.
    pub fn arm(&mut self, key: K, after: Duration) {
        let now = Instant::now();
        let deadline = now
            .checked_add(after)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        if let Some(old) = self.pending.take() {
            self.metrics.replaced += 1;
            debug!(old = ?old.key, new = ?key, "pending timer replaced");
        }
        debug!(?key, after_ms = after.as_millis() as u64, "timer armed");
        self.metrics.armed += 1;
        self.pending = Some(Pending {
            key,
            deadline,
            duration: after,
        });
    }

    /// Clears the pending timer, returning its key.
    pub fn cancel(&mut self) -> Option<K> {
        let pending = self.pending.take()?;
        self.metrics.cancelled += 1;
        debug!(key = ?pending.key, "timer cancelled");
        Some(pending.key)
    }

    /// Clears the pending timer only if it carries `key`.
    pub fn cancel_if(&mut self, key: &K) -> bool
    where
        K: PartialEq,
    {
        if self.pending.as_ref().is_some_and(|p| &p.key == key) {
            self.cancel();
            true
        } else {
            false
        }
    }

    /// Waits until the pending timer's deadline and returns it.
    ///
    /// With nothing armed this future never resolves. Dropping it before it
    /// resolves (e.g. another `select!` branch won) leaves the timer armed.
    pub async fn wait(&mut self) -> Fired<K> {
        let Some(deadline) = self.pending.as_ref().map(|p| p.deadline) else {
            return std::future::pending().await;
        };

        time::sleep_until(deadline).await;

        let Some(pending) = self.pending.take() else {
            return std::future::pending().await;
        };

        let late_by = Instant::now().saturating_duration_since(pending.deadline);
        let allowed = Duration::try_from_secs_f64(
            pending.duration.as_secs_f64() * self.config.late_threshold,
        )
        .unwrap_or(Duration::MAX);
        let late = late_by > allowed;

        self.metrics.fired += 1;
        if self.config.metrics_enabled {
            if late {
                self.metrics.late += 1;
                warn!(
                    key = ?pending.key,
                    late_ms = late_by.as_secs_f64() * 1000.0,
                    "timer fired late"
                );
            }
            if late_by > self.metrics.max_lateness {
                self.metrics.max_lateness = late_by;
            }
        }
        trace!(key = ?pending.key, "timer fired");

        Fired {
            key: pending.key,
            scheduled: pending.duration,
            late_by,
            late,
        }
    }

    /// Whether a timer is pending.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Key of the pending timer, if any.
    pub fn pending_key(&self) -> Option<&K> {
        self.pending.as_ref().map(|p| &p.key)
    }

    /// Time left until the pending timer fires.
    pub fn remaining(&self) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.deadline.saturating_duration_since(Instant::now()))
    }

    pub fn metrics(&self) -> &TimerMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = TimerConfig::default();
        assert_eq!(cfg.late_threshold, 0.10);
        assert!(cfg.metrics_enabled);
    }

    #[test]
    fn test_validated_clamps_threshold() {
        let cfg = TimerConfig {
            late_threshold: 3.0,
            ..TimerConfig::default()
        }
        .validated();
        assert_eq!(cfg.late_threshold, 1.0);
    }

    #[test]
    fn test_validated_resets_nan_threshold() {
        let cfg = TimerConfig {
            late_threshold: f64::NAN,
            ..TimerConfig::default()
        }
        .validated();
        assert_eq!(cfg.late_threshold, 0.10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nan_threshold_slot_fires() {
        let mut slot = TimerSlot::new(TimerConfig {
            late_threshold: f64::NAN,
            ..TimerConfig::default()
        });
        slot.arm(4u32, Duration::from_millis(50));
        let fired = slot.wait().await;
        assert_eq!(fired.key, 4);
        assert!(!fired.late);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_huge_duration_stays_pending() {
        let mut slot = TimerSlot::<u32>::default();
        slot.arm(9, Duration::MAX);
        assert!(slot.is_armed());
        assert!(slot.remaining().unwrap() >= FAR_FUTURE - Duration::from_secs(1));

        let outcome = time::timeout(Duration::from_secs(3_600), slot.wait()).await;
        assert!(outcome.is_err());
        assert_eq!(slot.pending_key(), Some(&9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_if_only_matching_key() {
        let mut slot = TimerSlot::<u32>::default();
        slot.arm(1, Duration::from_secs(1));
        assert!(!slot.cancel_if(&2));
        assert!(slot.is_armed());
        assert!(slot.cancel_if(&1));
        assert!(!slot.is_armed());
        assert_eq!(slot.metrics().cancelled, 1);
    }
}

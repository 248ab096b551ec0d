//! `Spinwheel` builder.
//!
//! Collects a [`WheelConfig`] field by field, picks a random source and
//! spawns the wheel actor.

use std::time::Duration;

use spinwheel_phase::{
    spawn_wheel, EventReceiver, PhaseController, PhaseMachine, StrategyKind, WheelConfig,
    WheelId, DEFAULT_CHANNEL_SIZE,
};
use spinwheel_select::{RandomSource, SeededRandom, ThreadRandom};
use tokio::sync::mpsc;

/// Entry point for building wheels.
pub struct Spinwheel;

impl Spinwheel {
    /// Creates a new builder with default settings.
    pub fn builder() -> SpinwheelBuilder {
        SpinwheelBuilder::new()
    }
}

/// Builder for configuring and spawning a wheel.
///
/// # Example
///
/// ```rust,ignore
/// let (wheel, events) = Spinwheel::builder()
///     .spin_duration(Duration::from_secs(4))
///     .countdown_seed(5)
///     .spawn();
/// ```
#[derive(Debug, Clone)]
pub struct SpinwheelBuilder {
    config: WheelConfig,
    seed: Option<u64>,
    channel_size: usize,
}

impl SpinwheelBuilder {
    pub fn new() -> Self {
        Self {
            config: WheelConfig::default(),
            seed: None,
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }

    /// Replaces the whole configuration, e.g. one from
    /// [`load_config`](crate::load_config).
    pub fn config(mut self, config: WheelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn spin_duration(mut self, duration: Duration) -> Self {
        self.config.spin_duration = duration;
        self
    }

    pub fn settle_padding(mut self, padding: Duration) -> Self {
        self.config.settle_padding = padding;
        self
    }

    pub fn extra_turns(mut self, turns: u32) -> Self {
        self.config.extra_turns = turns;
        self
    }

    pub fn strategy(mut self, strategy: StrategyKind) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn jitter_fraction(mut self, fraction: f64) -> Self {
        self.config.jitter_fraction = fraction;
        self
    }

    pub fn pointer_angle(mut self, degrees: f64) -> Self {
        self.config.pointer_angle = degrees;
        self
    }

    pub fn countdown_seed(mut self, ticks: u32) -> Self {
        self.config.countdown_seed = ticks;
        self
    }

    pub fn countdown_interval(mut self, interval: Duration) -> Self {
        self.config.countdown_interval = interval;
        self
    }

    pub fn eject_duration(mut self, duration: Duration) -> Self {
        self.config.eject_duration = duration;
        self
    }

    pub fn float_duration(mut self, duration: Duration) -> Self {
        self.config.float_duration = duration;
        self
    }

    pub fn roast_mode(mut self, enabled: bool) -> Self {
        self.config.roast_mode = enabled;
        self
    }

    /// Replaces the roast line pool. `{name}` is substituted on reveal.
    pub fn roast_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.roast_lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Makes selection reproducible. Without a seed the thread RNG is used.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the command channel size for the wheel actor.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.channel_size = size;
        self
    }

    /// The validated configuration this builder would spawn with.
    pub fn build_config(&self) -> WheelConfig {
        self.config.clone().validated()
    }

    /// Builds a bare state machine for callers that drive timers
    /// themselves.
    pub fn machine<R: RandomSource>(self, rng: R) -> PhaseMachine<R> {
        PhaseMachine::new(self.config, rng)
    }

    /// Spawns the wheel actor with the seeded or thread RNG.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(self) -> (PhaseController, EventReceiver) {
        let rng: Box<dyn RandomSource> = match self.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(ThreadRandom),
        };
        self.spawn_with(rng)
    }

    /// Spawns the wheel actor with a caller-supplied random source.
    pub fn spawn_with<R: RandomSource + 'static>(self, rng: R) -> (PhaseController, EventReceiver) {
        let wheel_id = WheelId::next();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        tracing::debug!(%wheel_id, seeded = self.seed.is_some(), "spawning wheel");
        let controller = spawn_wheel(wheel_id, self.config, rng, events_tx, self.channel_size);
        (controller, events_rx)
    }
}

impl Default for SpinwheelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

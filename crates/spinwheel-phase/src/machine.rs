//! The pure phase state machine.
//!
//! [`PhaseMachine`] owns the wheel's only mutable state: one [`State`] value
//! (which carries the current round and countdown), the rotation, and the
//! token of the single pending timer. Every input goes through one
//! transition function that returns the side effects to perform: timers to
//! arm or cancel, announcements, the elimination. The machine itself never
//! sleeps or spawns; [`PhaseController`](crate::PhaseController) executes the
//! effects against real timers, and tests can execute them by hand.
//!
//! Rejected inputs return `Err` and leave every field untouched.

use std::time::Duration;

use spinwheel_select::{RandomSource, SelectionEngine, SelectionResult, SpinRequest};
use tracing::{debug, info, trace, warn};

use crate::{Action, Elimination, Phase, PhaseError, WheelConfig, WheelSnapshot};

/// Announced when a spin starts.
pub const ANNOUNCE_SPINNING: &str = "Emergency meeting in progress";

/// Announced when a revealed winner is cancelled.
pub const ANNOUNCE_CANCELLED: &str = "Vote cancelled";

fn announce_selected(name: &str) -> String {
    format!("{name} has been selected for ejection")
}

// ---------------------------------------------------------------------------
// Inputs and effects
// ---------------------------------------------------------------------------

/// Which delay a timer stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseTimer {
    /// Spinning → Revealed.
    Reveal,
    /// One countdown second inside Revealed.
    CountdownTick,
    /// Ejecting → Floating (commits the elimination).
    Eject,
    /// Floating → Closed.
    Float,
}

/// Identifies one armed timer. The generation is unique per machine, so a
/// token from a cancelled timer never matches the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub timer: PhaseTimer,
    pub generation: u64,
}

/// Everything that can happen to a wheel.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Start(SpinRequest),
    Confirm,
    Cancel,
    Close,
    Open,
    TimerFired(TimerToken),
}

/// A side effect requested by a transition, to be executed in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ArmTimer { token: TimerToken, after: Duration },
    CancelTimer(TimerToken),
    Announce(String),
    PhaseChanged(Phase),
    Eliminate(Elimination),
    Closed,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// One spin lifecycle: created at `start`, dropped on cancel or close.
#[derive(Debug, Clone)]
struct Round {
    request: SpinRequest,
    selection: SelectionResult,
    roast_line: Option<String>,
}

impl Round {
    fn elimination(&self) -> Elimination {
        Elimination {
            name: self.selection.winner_name.clone(),
            index: self.selection.winner_index,
        }
    }
}

#[derive(Debug)]
enum State {
    Idle,
    Spinning(Round),
    Revealed { round: Round, countdown: u32 },
    Ejecting(Round),
    Floating(Round),
    Closed,
}

impl State {
    fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Spinning(_) => Phase::Spinning,
            Self::Revealed { .. } => Phase::Revealed,
            Self::Ejecting(_) => Phase::Ejecting,
            Self::Floating(_) => Phase::Floating,
            Self::Closed => Phase::Closed,
        }
    }

    fn round(&self) -> Option<&Round> {
        match self {
            Self::Spinning(round)
            | Self::Revealed { round, .. }
            | Self::Ejecting(round)
            | Self::Floating(round) => Some(round),
            Self::Idle | Self::Closed => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PhaseMachine
// ---------------------------------------------------------------------------

/// The wheel's state machine.
pub struct PhaseMachine<R> {
    config: WheelConfig,
    engine: SelectionEngine<R>,
    state: State,
    rotation: f64,
    pending: Option<TimerToken>,
    generation: u64,
}

impl<R: RandomSource> PhaseMachine<R> {
    /// A new machine in [`Phase::Idle`]. The config is validated first.
    pub fn new(config: WheelConfig, rng: R) -> Self {
        let config = config.validated();
        let engine = SelectionEngine::new(config.spin_strategy(), rng)
            .with_pointer_angle(config.pointer_angle);
        Self {
            config,
            engine,
            state: State::Idle,
            rotation: 0.0,
            pending: None,
            generation: 0,
        }
    }

    /// Applies one input.
    pub fn handle(&mut self, input: Input) -> Result<Vec<Effect>, PhaseError> {
        match input {
            Input::Start(request) => self.start(request),
            Input::Confirm => self.confirm(),
            Input::Cancel => self.cancel(),
            Input::Close => self.close(),
            Input::Open => self.open(),
            Input::TimerFired(token) => Ok(self.timer_fired(token)),
        }
    }

    /// Idle → Spinning. Picks the winner and the landing rotation.
    pub fn start(&mut self, request: SpinRequest) -> Result<Vec<Effect>, PhaseError> {
        let phase = self.phase();
        if !phase.can_start() {
            debug!(%phase, "start rejected, spin already in flight");
            return Err(PhaseError::invalid(Action::Start, phase));
        }
        if request.is_empty() {
            debug!("start rejected, no participants");
            return Err(PhaseError::EmptyPool);
        }

        let selection = self.engine.spin(&request, self.rotation)?;
        self.rotation = selection.final_rotation;
        info!(
            participants = request.len(),
            rotation = self.rotation,
            "spin started"
        );
        self.state = State::Spinning(Round {
            request,
            selection,
            roast_line: None,
        });

        let reveal = self.arm(PhaseTimer::Reveal, self.config.reveal_delay());
        Ok(vec![
            Effect::PhaseChanged(Phase::Spinning),
            Effect::Announce(ANNOUNCE_SPINNING.to_owned()),
            reveal,
        ])
    }

    /// Revealed (countdown at zero) → Ejecting.
    pub fn confirm(&mut self) -> Result<Vec<Effect>, PhaseError> {
        let phase = self.phase();
        let countdown = match &self.state {
            State::Revealed { countdown, .. } => *countdown,
            _ => {
                debug!(%phase, "confirm rejected");
                return Err(PhaseError::invalid(Action::Confirm, phase));
            }
        };
        if countdown > 0 {
            debug!(remaining = countdown, "confirm rejected, countdown running");
            return Err(PhaseError::ConfirmLocked {
                remaining: countdown,
            });
        }

        let mut effects = self.disarm().into_iter().collect::<Vec<_>>();
        self.state = match std::mem::replace(&mut self.state, State::Idle) {
            State::Revealed { round, .. } => {
                info!(winner = %round.selection.winner_name, "elimination confirmed");
                State::Ejecting(round)
            }
            other => other,
        };
        effects.push(Effect::PhaseChanged(Phase::Ejecting));
        effects.push(self.arm(PhaseTimer::Eject, self.config.eject_duration));
        Ok(effects)
    }

    /// Revealed → Idle. Drops the round; nothing is eliminated.
    pub fn cancel(&mut self) -> Result<Vec<Effect>, PhaseError> {
        let phase = self.phase();
        if phase != Phase::Revealed {
            debug!(%phase, "cancel rejected");
            return Err(PhaseError::invalid(Action::Cancel, phase));
        }
        Ok(self.cancel_round())
    }

    /// Idle | Revealed → Closed. Closing from Revealed cancels the round.
    pub fn close(&mut self) -> Result<Vec<Effect>, PhaseError> {
        let phase = self.phase();
        let mut effects = match phase {
            Phase::Idle => Vec::new(),
            Phase::Revealed => self.cancel_round(),
            _ => {
                debug!(%phase, "close rejected");
                return Err(PhaseError::invalid(Action::Close, phase));
            }
        };
        self.state = State::Closed;
        info!("wheel closed");
        effects.push(Effect::PhaseChanged(Phase::Closed));
        effects.push(Effect::Closed);
        Ok(effects)
    }

    /// Closed → Idle, with the wheel back at rest.
    pub fn open(&mut self) -> Result<Vec<Effect>, PhaseError> {
        let phase = self.phase();
        if phase != Phase::Closed {
            debug!(%phase, "open rejected");
            return Err(PhaseError::invalid(Action::Open, phase));
        }
        self.state = State::Idle;
        self.rotation = 0.0;
        info!("wheel reopened");
        Ok(vec![Effect::PhaseChanged(Phase::Idle)])
    }

    /// Advances the machine for a fired timer. Tokens that are not the
    /// current pending timer are stale and ignored.
    pub fn timer_fired(&mut self, token: TimerToken) -> Vec<Effect> {
        if self.pending != Some(token) {
            trace!(?token, pending = ?self.pending, "stale timer ignored");
            return Vec::new();
        }
        self.pending = None;

        match (std::mem::replace(&mut self.state, State::Idle), token.timer) {
            (State::Spinning(mut round), PhaseTimer::Reveal) => {
                round.roast_line = self.pick_roast_line(&round.selection.winner_name);
                let announcement = announce_selected(&round.selection.winner_name);
                info!(
                    winner = %round.selection.winner_name,
                    index = round.selection.winner_index,
                    "winner revealed"
                );
                let countdown = self.config.countdown_seed;
                self.state = State::Revealed { round, countdown };

                let mut effects = vec![
                    Effect::PhaseChanged(Phase::Revealed),
                    Effect::Announce(announcement),
                ];
                if countdown > 0 {
                    effects.push(self.arm(PhaseTimer::CountdownTick, self.config.countdown_interval));
                }
                effects
            }
            (State::Revealed { round, countdown }, PhaseTimer::CountdownTick) => {
                let countdown = countdown.saturating_sub(1);
                self.state = State::Revealed { round, countdown };
                if countdown > 0 {
                    debug!(remaining = countdown, "countdown tick");
                    vec![self.arm(PhaseTimer::CountdownTick, self.config.countdown_interval)]
                } else {
                    debug!("countdown finished, confirmation unlocked");
                    Vec::new()
                }
            }
            (State::Ejecting(round), PhaseTimer::Eject) => {
                let elimination = round.elimination();
                info!(name = %elimination.name, index = elimination.index, "elimination committed");
                self.state = State::Floating(round);
                vec![
                    Effect::PhaseChanged(Phase::Floating),
                    Effect::Eliminate(elimination),
                    self.arm(PhaseTimer::Float, self.config.float_duration),
                ]
            }
            (State::Floating(_), PhaseTimer::Float) => {
                self.state = State::Closed;
                info!("wheel closed");
                vec![Effect::PhaseChanged(Phase::Closed), Effect::Closed]
            }
            (state, timer) => {
                warn!(phase = %state.phase(), ?timer, "timer does not belong to current phase");
                self.state = state;
                Vec::new()
            }
        }
    }

    /// Unconditional teardown: cancels the pending timer and moves to
    /// Closed without emitting any events.
    pub fn teardown(&mut self) -> Vec<Effect> {
        let effects = self.disarm().into_iter().collect();
        if self.phase() != Phase::Closed {
            debug!(phase = %self.phase(), "wheel torn down");
        }
        self.state = State::Closed;
        effects
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Absolute rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// The countdown gate. Equals the seed outside Revealed.
    pub fn countdown(&self) -> u32 {
        match &self.state {
            State::Revealed { countdown, .. } => *countdown,
            _ => self.config.countdown_seed,
        }
    }

    pub fn can_confirm(&self) -> bool {
        matches!(self.state, State::Revealed { countdown: 0, .. })
    }

    /// The selection, once it may be shown (Revealed or later).
    pub fn winner(&self) -> Option<&SelectionResult> {
        if self.phase().has_winner() {
            self.state.round().map(|r| &r.selection)
        } else {
            None
        }
    }

    /// The pending timer, if any.
    pub fn pending_timer(&self) -> Option<TimerToken> {
        self.pending
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn snapshot(&self) -> WheelSnapshot {
        let winner = self.winner();
        let round = self.state.round();
        WheelSnapshot {
            phase: self.phase(),
            rotation: self.rotation,
            countdown: self.countdown(),
            can_confirm: self.can_confirm(),
            winner: winner.map(|w| w.winner_name.clone()),
            winner_index: winner.map(|w| w.winner_index),
            roast_line: winner.and(round).and_then(|r| r.roast_line.clone()),
            participants: round
                .map(|r| r.request.participants().to_vec())
                .unwrap_or_default(),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn arm(&mut self, timer: PhaseTimer, after: Duration) -> Effect {
        self.generation += 1;
        let token = TimerToken {
            timer,
            generation: self.generation,
        };
        self.pending = Some(token);
        Effect::ArmTimer { token, after }
    }

    fn disarm(&mut self) -> Option<Effect> {
        self.pending.take().map(Effect::CancelTimer)
    }

    fn cancel_round(&mut self) -> Vec<Effect> {
        let mut effects: Vec<Effect> = self.disarm().into_iter().collect();
        if let Some(round) = self.state.round() {
            info!(winner = %round.selection.winner_name, "vote cancelled");
        }
        self.state = State::Idle;
        effects.push(Effect::PhaseChanged(Phase::Idle));
        effects.push(Effect::Announce(ANNOUNCE_CANCELLED.to_owned()));
        effects
    }

    fn pick_roast_line(&mut self, name: &str) -> Option<String> {
        if !self.config.roast_mode || self.config.roast_lines.is_empty() {
            return None;
        }
        let index = self.engine.rng_mut().next_index(self.config.roast_lines.len());
        self.config
            .roast_lines
            .get(index)
            .map(|line| line.replace("{name}", name))
    }
}

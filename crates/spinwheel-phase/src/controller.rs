//! Wheel actor: a Tokio task that owns one [`PhaseMachine`] and its timer.
//!
//! Callers talk to the actor through a [`PhaseController`] handle. Commands
//! travel over a bounded mpsc channel and answer on a oneshot. Timer fires
//! arrive on the same `select!` loop, so inputs are handled one at a time
//! and no two transitions ever interleave.

use spinwheel_select::{RandomSource, SpinRequest};
use spinwheel_timer::{TimerConfig, TimerSlot};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::{
    Effect, PhaseError, PhaseMachine, TimerToken, WheelConfig, WheelEvent, WheelId, WheelSnapshot,
};

/// Channel the actor reports [`WheelEvent`]s on.
pub type EventSender = mpsc::UnboundedSender<WheelEvent>;

/// Receiving half of an [`EventSender`].
pub type EventReceiver = mpsc::UnboundedReceiver<WheelEvent>;

/// Default command channel size for wheel actors.
pub const DEFAULT_CHANNEL_SIZE: usize = 32;

type Reply<T> = oneshot::Sender<Result<T, PhaseError>>;

pub(crate) enum WheelCommand {
    Start {
        request: SpinRequest,
        reply: Reply<()>,
    },
    Confirm {
        reply: Reply<()>,
    },
    Cancel {
        reply: Reply<()>,
    },
    Close {
        reply: Reply<()>,
    },
    Open {
        reply: Reply<()>,
    },
    Snapshot {
        reply: oneshot::Sender<WheelSnapshot>,
    },
    /// Cancel everything and stop the actor. No events are emitted.
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a running wheel actor.
///
/// Cheap to clone. When the last handle is dropped the actor tears the
/// wheel down and exits.
#[derive(Clone)]
pub struct PhaseController {
    wheel_id: WheelId,
    sender: mpsc::Sender<WheelCommand>,
    snapshot: watch::Receiver<WheelSnapshot>,
}

impl PhaseController {
    pub fn wheel_id(&self) -> WheelId {
        self.wheel_id
    }

    /// Starts a spin over `request`. Accepted only while Idle.
    pub async fn start(&self, request: SpinRequest) -> Result<(), PhaseError> {
        self.request(|reply| WheelCommand::Start { request, reply })
            .await
    }

    /// Confirms the revealed winner once the countdown reached zero.
    pub async fn confirm(&self) -> Result<(), PhaseError> {
        self.request(|reply| WheelCommand::Confirm { reply }).await
    }

    /// Cancels the revealed winner and returns to Idle.
    pub async fn cancel(&self) -> Result<(), PhaseError> {
        self.request(|reply| WheelCommand::Cancel { reply }).await
    }

    /// Closes the wheel from Idle or Revealed.
    pub async fn close(&self) -> Result<(), PhaseError> {
        self.request(|reply| WheelCommand::Close { reply }).await
    }

    /// Reopens a closed wheel.
    pub async fn open(&self) -> Result<(), PhaseError> {
        self.request(|reply| WheelCommand::Open { reply }).await
    }

    /// Asks the actor for its current state.
    pub async fn snapshot(&self) -> Result<WheelSnapshot, PhaseError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(WheelCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| PhaseError::Unavailable)?;
        reply_rx.await.map_err(|_| PhaseError::Unavailable)
    }

    /// Tears the wheel down and waits for the actor to stop.
    pub async fn shutdown(&self) -> Result<(), PhaseError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(WheelCommand::Shutdown { reply: reply_tx })
            .await
            .map_err(|_| PhaseError::Unavailable)?;
        reply_rx.await.map_err(|_| PhaseError::Unavailable)
    }

    /// A receiver that sees every published snapshot.
    pub fn watch(&self) -> watch::Receiver<WheelSnapshot> {
        self.snapshot.clone()
    }

    /// The latest published snapshot, without a round trip to the actor.
    pub fn current(&self) -> WheelSnapshot {
        self.snapshot.borrow().clone()
    }

    async fn request(
        &self,
        command: impl FnOnce(Reply<()>) -> WheelCommand,
    ) -> Result<(), PhaseError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| PhaseError::Unavailable)?;
        reply_rx.await.map_err(|_| PhaseError::Unavailable)?
    }
}

struct WheelActor<R> {
    wheel_id: WheelId,
    machine: PhaseMachine<R>,
    timer: TimerSlot<TimerToken>,
    receiver: mpsc::Receiver<WheelCommand>,
    events: EventSender,
    snapshot: watch::Sender<WheelSnapshot>,
}

impl<R: RandomSource> WheelActor<R> {
    async fn run(mut self) {
        info!(wheel_id = %self.wheel_id, "wheel actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => {
                        if !self.handle_command(cmd) {
                            break;
                        }
                    }
                    None => {
                        debug!(wheel_id = %self.wheel_id, "all handles dropped");
                        self.teardown();
                        break;
                    }
                },
                fired = self.timer.wait() => {
                    if fired.late {
                        warn!(
                            wheel_id = %self.wheel_id,
                            timer = ?fired.key.timer,
                            late_ms = fired.late_by.as_millis() as u64,
                            "phase timer fired late"
                        );
                    }
                    let effects = self.machine.timer_fired(fired.key);
                    self.apply(effects);
                }
            }
        }

        info!(wheel_id = %self.wheel_id, "wheel actor stopped");
    }

    /// Returns `false` once the actor should stop.
    fn handle_command(&mut self, cmd: WheelCommand) -> bool {
        let (result, reply) = match cmd {
            WheelCommand::Start { request, reply } => (self.machine.start(request), reply),
            WheelCommand::Confirm { reply } => (self.machine.confirm(), reply),
            WheelCommand::Cancel { reply } => (self.machine.cancel(), reply),
            WheelCommand::Close { reply } => (self.machine.close(), reply),
            WheelCommand::Open { reply } => (self.machine.open(), reply),
            WheelCommand::Snapshot { reply } => {
                let _ = reply.send(self.machine.snapshot());
                return true;
            }
            WheelCommand::Shutdown { reply } => {
                info!(wheel_id = %self.wheel_id, "wheel shutting down");
                self.teardown();
                let _ = reply.send(());
                return false;
            }
        };

        let result = result.map(|effects| self.apply(effects));
        let _ = reply.send(result);
        true
    }

    /// Executes effects in order, then publishes a fresh snapshot.
    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ArmTimer { token, after } => self.timer.arm(token, after),
                Effect::CancelTimer(token) => {
                    self.timer.cancel_if(&token);
                }
                Effect::Announce(text) => self.emit(WheelEvent::Announce(text)),
                Effect::PhaseChanged(phase) => self.emit(WheelEvent::PhaseChanged(phase)),
                Effect::Eliminate(elimination) => self.emit(WheelEvent::Eliminated(elimination)),
                Effect::Closed => self.emit(WheelEvent::Closed),
            }
        }
        self.publish();
    }

    /// Publishes the machine's snapshot if it differs from the last one.
    fn publish(&self) {
        let latest = self.machine.snapshot();
        self.snapshot.send_if_modified(|current| {
            if *current == latest {
                false
            } else {
                *current = latest;
                true
            }
        });
    }

    fn emit(&self, event: WheelEvent) {
        // Nobody listening is fine; the wheel keeps running.
        let _ = self.events.send(event);
    }

    fn teardown(&mut self) {
        for effect in self.machine.teardown() {
            if let Effect::CancelTimer(token) = effect {
                self.timer.cancel_if(&token);
            }
        }
        self.timer.cancel();
        self.publish();
        let metrics = self.timer.metrics();
        info!(
            wheel_id = %self.wheel_id,
            fired = metrics.fired,
            cancelled = metrics.cancelled,
            late = metrics.late,
            "wheel torn down"
        );
    }
}

/// Spawns a wheel actor and returns a handle to it.
///
/// `channel_size` bounds the command queue; callers wait when it is full.
pub fn spawn_wheel<R: RandomSource + 'static>(
    wheel_id: WheelId,
    config: WheelConfig,
    rng: R,
    events: EventSender,
    channel_size: usize,
) -> PhaseController {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let machine = PhaseMachine::new(config, rng);
    let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());

    let actor = WheelActor {
        wheel_id,
        machine,
        timer: TimerSlot::new(TimerConfig::default()),
        receiver: rx,
        events,
        snapshot: snapshot_tx,
    };

    tokio::spawn(actor.run());

    PhaseController {
        wheel_id,
        sender: tx,
        snapshot: snapshot_rx,
    }
}

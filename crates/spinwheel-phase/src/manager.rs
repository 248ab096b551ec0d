//! Wheel manager: spawns, tracks, and tears down wheel actors.

use std::collections::HashMap;

use spinwheel_select::RandomSource;
use tokio::sync::mpsc;

use crate::{
    spawn_wheel, EventReceiver, PhaseController, PhaseError, WheelConfig, WheelId,
    DEFAULT_CHANNEL_SIZE,
};

/// Owns a controller per open wheel.
#[derive(Default)]
pub struct WheelManager {
    wheels: HashMap<WheelId, PhaseController>,
}

impl WheelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a new wheel and returns its controller together with the
    /// receiver for its events.
    pub fn open<R: RandomSource + 'static>(
        &mut self,
        config: WheelConfig,
        rng: R,
    ) -> (PhaseController, EventReceiver) {
        let wheel_id = WheelId::next();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let controller = spawn_wheel(wheel_id, config, rng, events_tx, DEFAULT_CHANNEL_SIZE);
        self.wheels.insert(wheel_id, controller.clone());
        tracing::info!(%wheel_id, "wheel opened");
        (controller, events_rx)
    }

    pub fn get(&self, wheel_id: WheelId) -> Option<&PhaseController> {
        self.wheels.get(&wheel_id)
    }

    /// Tears a wheel down and forgets it. Returns `false` if the ID is
    /// unknown.
    pub async fn remove(&mut self, wheel_id: WheelId) -> bool {
        let Some(controller) = self.wheels.remove(&wheel_id) else {
            return false;
        };
        if let Err(err) = controller.shutdown().await {
            tracing::debug!(%wheel_id, %err, "wheel already stopped");
        }
        tracing::info!(%wheel_id, "wheel removed");
        true
    }

    /// Tears every wheel down.
    pub async fn shutdown_all(&mut self) {
        let count = self.wheels.len();
        for (wheel_id, controller) in self.wheels.drain() {
            if let Err(PhaseError::Unavailable) = controller.shutdown().await {
                tracing::debug!(%wheel_id, "wheel already stopped");
            }
        }
        tracing::info!(wheels = count, "all wheels shut down");
    }

    pub fn wheel_count(&self) -> usize {
        self.wheels.len()
    }

    pub fn wheel_ids(&self) -> Vec<WheelId> {
        self.wheels.keys().copied().collect()
    }
}

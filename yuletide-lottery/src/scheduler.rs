use crate::gift::{GiftSpawner, SpawnOutcome};
use crate::{GameError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use yuletide_core::{ChannelId, SharedConfig, SharedRandom};

#[derive(Debug, Default)]
struct LoopState {
    running: bool,
    generation: u64,
}

/// Background loop that drops a gift after every random pause.
///
/// Each start bumps a generation counter so a loop that was stopped and is
/// still sleeping cannot resume after a quick restart.
pub struct SpawnLoop {
    spawner: Arc<GiftSpawner>,
    config: SharedConfig,
    random: SharedRandom,
    state: Arc<Mutex<LoopState>>,
}

impl SpawnLoop {
    pub fn new(spawner: Arc<GiftSpawner>, config: SharedConfig, random: SharedRandom) -> Self {
        Self {
            spawner,
            config,
            random,
            state: Arc::new(Mutex::new(LoopState::default())),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn start(&self, channels: Vec<ChannelId>) -> Result<JoinHandle<()>> {
        if channels.is_empty() {
            return Err(GameError::NoChannels);
        }

        let generation = {
            let mut state = self.state.lock();
            if state.running {
                return Err(GameError::AlreadyRunning);
            }
            state.running = true;
            state.generation += 1;
            state.generation
        };

        tracing::info!(
            "Starting spawn loop #{} over {} channel(s)",
            generation,
            channels.len()
        );

        let worker = LoopWorker {
            spawner: self.spawner.clone(),
            config: self.config.clone(),
            random: self.random.clone(),
            state: self.state.clone(),
            generation,
            channels,
        };

        Ok(tokio::spawn(worker.run()))
    }

    /// Stops future spawns. Returns whether a loop was running.
    ///
    /// A gift that is already open keeps its timer.
    pub fn stop(&self) -> bool {
        let mut state = self.state.lock();
        let was_running = state.running;
        state.running = false;
        if was_running {
            tracing::info!("Stopping spawn loop #{}", state.generation);
        }
        was_running
    }
}

struct LoopWorker {
    spawner: Arc<GiftSpawner>,
    config: SharedConfig,
    random: SharedRandom,
    state: Arc<Mutex<LoopState>>,
    generation: u64,
    channels: Vec<ChannelId>,
}

impl LoopWorker {
    fn is_current(&self) -> bool {
        let state = self.state.lock();
        state.running && state.generation == self.generation
    }

    async fn run(self) {
        while self.is_current() {
            let config = self.config.snapshot();
            let delay = self
                .random
                .between(config.min_spawn_interval_secs, config.max_spawn_interval_secs);
            tracing::debug!("Next gift in {}s", delay);
            tokio::time::sleep(Duration::from_secs(delay)).await;

            if !self.is_current() {
                break;
            }

            match self.spawner.spawn_gift(&self.channels).await {
                Ok(SpawnOutcome::Spawned(gift)) => {
                    // Wait out the gift's lifetime before scheduling the next one
                    if let Err(e) = gift.expiry.await {
                        tracing::error!("Expiry task of gift {} failed: {}", gift.gift_id, e);
                    }
                }
                Ok(SpawnOutcome::AlreadyActive { gift_id }) => {
                    tracing::debug!("Gift {} still open, skipping spawn", gift_id);
                }
                Err(e) => {
                    tracing::warn!("Failed to spawn gift: {}", e);
                }
            }
        }

        tracing::info!("Spawn loop #{} stopped", self.generation);
    }
}

use crate::engine::{LotteryEngine, LotteryOutcome};
use crate::gift::{ClaimResult, ClaimedGift, GiftEvent, GiftSpawner, SpawnOutcome};
use crate::ledger::LedgerStats;
use crate::scheduler::SpawnLoop;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;
use yuletide_core::{
    ChannelId, FactProvider, GuildId, Platform, SharedConfig, SharedRandom, UserId, WinnerStore,
};

/// "User Y pressed the claim button of gift X at time T"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub gift_id: Uuid,
    pub user: UserId,
    pub guild: GuildId,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClaimReply {
    /// The claim won the gift and the lottery ran
    Resolved {
        gift: ClaimedGift,
        outcome: LotteryOutcome,
    },
    TooLate { claimed_by: UserId },
    Gone,
}

/// Capability the platform invokes when someone interacts with a gift
#[async_trait]
pub trait ClaimHandler: Send + Sync {
    async fn handle_claim(&self, request: ClaimRequest) -> ClaimReply;
}

/// Wires the spawner, the spawn loop and the lottery engine together
pub struct GiftBot {
    config: SharedConfig,
    spawner: Arc<GiftSpawner>,
    spawn_loop: SpawnLoop,
    engine: LotteryEngine,
}

impl GiftBot {
    pub async fn new(
        platform: Arc<dyn Platform>,
        config: SharedConfig,
        store: Arc<dyn WinnerStore>,
        facts: Arc<dyn FactProvider>,
        random: SharedRandom,
    ) -> Self {
        let spawner = Arc::new(GiftSpawner::new(
            platform.clone(),
            config.clone(),
            random.clone(),
        ));
        let spawn_loop = SpawnLoop::new(spawner.clone(), config.clone(), random.clone());
        let engine = LotteryEngine::load(platform, config.clone(), store, facts, random).await;

        Self {
            config,
            spawner,
            spawn_loop,
            engine,
        }
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn start(&self, channels: Vec<ChannelId>) -> Result<JoinHandle<()>> {
        self.spawn_loop.start(channels)
    }

    pub fn stop(&self) -> bool {
        self.spawn_loop.stop()
    }

    pub fn is_running(&self) -> bool {
        self.spawn_loop.is_running()
    }

    pub async fn spawn_gift(&self, channels: &[ChannelId]) -> Result<SpawnOutcome> {
        self.spawner.spawn_gift(channels).await
    }

    pub fn active_gift(&self) -> Option<GiftEvent> {
        self.spawner.active_gift()
    }

    pub async fn stats(&self) -> LedgerStats {
        self.engine.stats().await
    }
}

#[async_trait]
impl ClaimHandler for GiftBot {
    async fn handle_claim(&self, request: ClaimRequest) -> ClaimReply {
        match self
            .spawner
            .attempt_claim(request.gift_id, request.user, request.at)
            .await
        {
            ClaimResult::Accepted(gift) => {
                let outcome = self.engine.resolve(request.user, request.guild).await;
                ClaimReply::Resolved { gift, outcome }
            }
            ClaimResult::TooLate { claimed_by } => ClaimReply::TooLate { claimed_by },
            ClaimResult::Gone => ClaimReply::Gone,
        }
    }
}

//! Gift drops and the reward lottery
//!
//! A spawn loop drops time-limited gifts into channels. The first user to
//! claim a gift wins it and enters a lottery for the book or the seasonal
//! role; everyone else is told they were too late.

pub mod bot;
pub mod engine;
pub mod error;
pub mod gift;
pub mod ledger;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use bot::{ClaimHandler, ClaimReply, ClaimRequest, GiftBot};
pub use engine::{LotteryEngine, LotteryOutcome};
pub use error::{GameError, Result};
pub use gift::{
    ClaimResult, ClaimedGift, GiftEvent, GiftSpawner, GiftState, SpawnOutcome, SpawnedGift,
};
pub use ledger::{LedgerStats, RewardLedger};
pub use scheduler::SpawnLoop;

use std::sync::Arc;
use yuletide_core::{ChristmasFacts, Platform, SharedConfig, SharedRandom, WinnerStore};

/// Create a bot with the Christmas fact pool and an entropy-seeded random source
pub async fn create_bot(
    platform: Arc<dyn Platform>,
    config: SharedConfig,
    store: Arc<dyn WinnerStore>,
) -> GiftBot {
    let random = SharedRandom::from_entropy();
    let facts = Arc::new(ChristmasFacts::new(random.clone()));
    GiftBot::new(platform, config, store, facts, random).await
}

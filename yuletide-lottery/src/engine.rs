use crate::ledger::{LedgerStats, RewardLedger};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use yuletide_core::{
    FactProvider, GameConfig, GuildId, Notice, Platform, PlatformError, Reward, SharedConfig,
    SharedRandom, UserId, WinnerStore,
};

/// What a claimant receives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LotteryOutcome {
    /// Already holds the role and already won the book
    AlreadyWonEverything,
    BookWin,
    RoleWin,
    /// The draw was won but the platform refused the grant. No stock used.
    RoleGrantFailed { reason: String },
    /// The draw was won but the grant failed for another reason. No stock used.
    RoleGrantError { reason: String },
    /// The role could not be looked up or read before drawing
    Failed { reason: String },
    NoWin { fact: String },
}

impl LotteryOutcome {
    pub fn reward(&self) -> Option<Reward> {
        match self {
            LotteryOutcome::BookWin => Some(Reward::Book),
            LotteryOutcome::RoleWin => Some(Reward::Role),
            _ => None,
        }
    }
}

/// Decides rewards for accepted claims and is the only writer of the ledger.
///
/// The ledger lock is held for a whole resolution, role grant and winners save
/// included, so two resolutions never interleave their updates.
pub struct LotteryEngine {
    platform: Arc<dyn Platform>,
    config: SharedConfig,
    ledger: Mutex<RewardLedger>,
    store: Arc<dyn WinnerStore>,
    facts: Arc<dyn FactProvider>,
    random: SharedRandom,
}

impl LotteryEngine {
    pub fn new(
        platform: Arc<dyn Platform>,
        config: SharedConfig,
        ledger: RewardLedger,
        store: Arc<dyn WinnerStore>,
        facts: Arc<dyn FactProvider>,
        random: SharedRandom,
    ) -> Self {
        Self {
            platform,
            config,
            ledger: Mutex::new(ledger),
            store,
            facts,
            random,
        }
    }

    /// Builds an engine with the winners currently in `store`.
    ///
    /// An unreadable store starts the engine with no known winners.
    pub async fn load(
        platform: Arc<dyn Platform>,
        config: SharedConfig,
        store: Arc<dyn WinnerStore>,
        facts: Arc<dyn FactProvider>,
        random: SharedRandom,
    ) -> Self {
        let winners = match store.load_winners().await {
            Ok(winners) => {
                tracing::info!("Loaded {} book winners", winners.len());
                winners
            }
            Err(e) => {
                tracing::warn!("Failed to load book winners, starting empty: {}", e);
                Default::default()
            }
        };

        Self::new(
            platform,
            config,
            RewardLedger::new(winners),
            store,
            facts,
            random,
        )
    }

    pub async fn stats(&self) -> LedgerStats {
        let config = self.config.snapshot();
        self.ledger.lock().await.stats(config.role_max, config.book_max)
    }

    pub async fn has_book(&self, user: UserId) -> bool {
        self.ledger.lock().await.has_book(user)
    }

    /// Runs the lottery for the user who claimed a gift
    pub async fn resolve(&self, user: UserId, guild: GuildId) -> LotteryOutcome {
        let config = self.config.snapshot();

        let outcome = {
            let mut ledger = self.ledger.lock().await;
            self.resolve_locked(&mut ledger, &config, user, guild).await
        };

        if let Some(reward) = outcome.reward() {
            tracing::info!("User {} won the {}", user, reward);
            self.log_win(&config, user, reward).await;
        }

        outcome
    }

    async fn resolve_locked(
        &self,
        ledger: &mut RewardLedger,
        config: &GameConfig,
        user: UserId,
        guild: GuildId,
    ) -> LotteryOutcome {
        let role = match self
            .platform
            .find_or_create_role(guild, &config.role_name)
            .await
        {
            Ok(role) => role,
            Err(e) => {
                tracing::error!("Failed to look up role '{}': {}", config.role_name, e);
                return LotteryOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let has_role = match self.platform.has_role(guild, user, role).await {
            Ok(has_role) => has_role,
            Err(e) => {
                tracing::error!("Failed to read roles of user {}: {}", user, e);
                return LotteryOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };
        let has_book = ledger.has_book(user);

        if has_role && has_book {
            return LotteryOutcome::AlreadyWonEverything;
        }

        // The book is drawn first, even for users who could still win the role
        if !has_book
            && ledger.book_available(config.book_max)
            && self.random.draw(config.book_probability)
        {
            ledger.record_book_win(user);
            self.persist_winners(ledger).await;
            return LotteryOutcome::BookWin;
        }

        if !has_role
            && ledger.role_available(config.role_max)
            && self.random.draw(config.role_probability)
        {
            return match self.platform.grant_role(guild, user, role).await {
                Ok(()) => {
                    ledger.record_role_win();
                    LotteryOutcome::RoleWin
                }
                Err(PlatformError::PermissionDenied(reason)) => {
                    tracing::warn!("Not allowed to grant role to {}: {}", user, reason);
                    LotteryOutcome::RoleGrantFailed { reason }
                }
                Err(e) => {
                    tracing::error!("Failed to grant role to {}: {}", user, e);
                    LotteryOutcome::RoleGrantError {
                        reason: e.to_string(),
                    }
                }
            };
        }

        LotteryOutcome::NoWin {
            fact: self.facts.random_fact(),
        }
    }

    async fn persist_winners(&self, ledger: &RewardLedger) {
        if let Err(e) = self.store.save_winners(ledger.book_winners()).await {
            tracing::warn!("Failed to save book winners: {}", e);
        }
    }

    async fn log_win(&self, config: &GameConfig, user: UserId, reward: Reward) {
        let Some(channel) = config.log_channel else {
            return;
        };

        if let Err(e) = self
            .platform
            .send(channel, Notice::WinRecord { user, reward })
            .await
        {
            tracing::warn!("Failed to log {} win of {}: {}", reward, user, e);
        }
    }
}

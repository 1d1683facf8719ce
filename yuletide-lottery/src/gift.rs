use crate::{GameError, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;
use yuletide_core::{
    retract, ChannelId, MessageHandle, Notice, Platform, SharedConfig, SharedRandom, UserId,
};

/// Lifecycle of a gift. Leaves `Open` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GiftState {
    Open,
    Claimed { by: UserId, at: DateTime<Utc> },
    Expired,
}

#[derive(Debug, Clone)]
pub struct GiftEvent {
    id: Uuid,
    channel: ChannelId,
    created_at: DateTime<Utc>,
    lifetime: Duration,
    state: GiftState,
    message: Option<MessageHandle>,
}

impl GiftEvent {
    fn new(channel: ChannelId, lifetime: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel,
            created_at: Utc::now(),
            lifetime,
            state: GiftState::Open,
            message: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn state(&self) -> &GiftState {
        &self.state
    }

    pub fn message(&self) -> Option<MessageHandle> {
        self.message
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, GiftState::Open)
    }
}

/// A gift that is now on screen, with the task that will expire it
#[derive(Debug)]
pub struct SpawnedGift {
    pub gift_id: Uuid,
    pub channel: ChannelId,
    /// Resolves to `true` if the timer expired the gift, `false` if it was claimed first
    pub expiry: JoinHandle<bool>,
}

#[derive(Debug)]
pub enum SpawnOutcome {
    Spawned(SpawnedGift),
    /// Another gift is still open; nothing was spawned
    AlreadyActive { gift_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedGift {
    pub gift_id: Uuid,
    pub channel: ChannelId,
    pub claimed_by: UserId,
    pub claimed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimResult {
    /// First claim: the caller owns the gift and goes on to the lottery
    Accepted(ClaimedGift),
    TooLate { claimed_by: UserId },
    /// The gift expired or was replaced
    Gone,
}

type GiftSlot = Arc<Mutex<Option<GiftEvent>>>;

/// Owns the single gift slot and arbitrates claims against it.
///
/// Every transition out of `Open` happens inside one critical section on the
/// slot, so a claim and the expiry timer can never both win. The slot lock is
/// never held across an `.await`.
pub struct GiftSpawner {
    slot: GiftSlot,
    platform: Arc<dyn Platform>,
    config: SharedConfig,
    random: SharedRandom,
}

impl GiftSpawner {
    pub fn new(platform: Arc<dyn Platform>, config: SharedConfig, random: SharedRandom) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            platform,
            config,
            random,
        }
    }

    /// Snapshot of the current (or last resolved) gift
    pub fn active_gift(&self) -> Option<GiftEvent> {
        self.slot.lock().clone()
    }

    pub fn has_open_gift(&self) -> bool {
        self.slot.lock().as_ref().is_some_and(GiftEvent::is_open)
    }

    /// Drops a gift into one of `channels`, unless a gift is already open
    pub async fn spawn_gift(&self, channels: &[ChannelId]) -> Result<SpawnOutcome> {
        if channels.is_empty() {
            return Err(GameError::NoChannels);
        }

        let lifetime = self.config.snapshot().gift_lifetime();

        let (gift_id, channel) = {
            let mut slot = self.slot.lock();
            if let Some(active) = slot.as_ref().filter(|gift| gift.is_open()) {
                return Ok(SpawnOutcome::AlreadyActive { gift_id: active.id });
            }

            let channel = channels[self.random.index(channels.len())];
            let gift = GiftEvent::new(channel, lifetime);
            let gift_id = gift.id;
            *slot = Some(gift);
            (gift_id, channel)
        };

        let notice = Notice::Gift {
            gift_id,
            lifetime_secs: lifetime.as_secs(),
        };

        let handle = match self.platform.send(channel, notice).await {
            Ok(handle) => handle,
            Err(e) => {
                let mut slot = self.slot.lock();
                if slot.as_ref().is_some_and(|gift| gift.id == gift_id) {
                    *slot = None;
                }
                return Err(e.into());
            }
        };

        let published = {
            let mut slot = self.slot.lock();
            match slot.as_mut() {
                Some(gift) if gift.id == gift_id && gift.is_open() => {
                    gift.message = Some(handle);
                    true
                }
                _ => false,
            }
        };

        if !published {
            // Resolved while the message was in flight
            retract(self.platform.as_ref(), handle).await;
        }

        tracing::info!(
            "Spawned gift {} in channel {} for {}s",
            gift_id,
            channel,
            lifetime.as_secs()
        );

        let expiry = tokio::spawn(expire_after(
            self.slot.clone(),
            self.platform.clone(),
            gift_id,
            lifetime,
        ));

        Ok(SpawnOutcome::Spawned(SpawnedGift {
            gift_id,
            channel,
            expiry,
        }))
    }

    /// Claims `gift_id` for `user`. Only the first claim on an open gift is accepted.
    pub async fn attempt_claim(
        &self,
        gift_id: Uuid,
        user: UserId,
        at: DateTime<Utc>,
    ) -> ClaimResult {
        let (result, message) = {
            let mut slot = self.slot.lock();
            match slot.as_mut() {
                Some(gift) if gift.id == gift_id => match gift.state {
                    GiftState::Open => {
                        gift.state = GiftState::Claimed { by: user, at };
                        let claimed = ClaimedGift {
                            gift_id,
                            channel: gift.channel,
                            claimed_by: user,
                            claimed_at: at,
                        };
                        (ClaimResult::Accepted(claimed), gift.message.take())
                    }
                    GiftState::Claimed { by, .. } => {
                        (ClaimResult::TooLate { claimed_by: by }, None)
                    }
                    GiftState::Expired => (ClaimResult::Gone, None),
                },
                _ => (ClaimResult::Gone, None),
            }
        };

        match &result {
            ClaimResult::Accepted(_) => {
                tracing::info!("Gift {} claimed by {}", gift_id, user);
                if let Some(handle) = message {
                    retract(self.platform.as_ref(), handle).await;
                }
            }
            ClaimResult::TooLate { claimed_by } => {
                tracing::debug!(
                    "User {} was too late for gift {}, already claimed by {}",
                    user,
                    gift_id,
                    claimed_by
                );
            }
            ClaimResult::Gone => {
                tracing::debug!("User {} claimed gift {} which is gone", user, gift_id);
            }
        }

        result
    }
}

async fn expire_after(
    slot: GiftSlot,
    platform: Arc<dyn Platform>,
    gift_id: Uuid,
    lifetime: Duration,
) -> bool {
    tokio::time::sleep(lifetime).await;

    let message = {
        let mut slot = slot.lock();
        match slot.as_mut() {
            Some(gift) if gift.id == gift_id && gift.is_open() => {
                gift.state = GiftState::Expired;
                Some(gift.message.take())
            }
            _ => None,
        }
    };

    match message {
        Some(handle) => {
            tracing::info!("Gift {} expired unclaimed", gift_id);
            if let Some(handle) = handle {
                retract(platform.as_ref(), handle).await;
            }
            true
        }
        None => false,
    }
}

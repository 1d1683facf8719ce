//! Seam between the game and the chat platform.
//!
//! Session handling, rendering and command registration live behind this
//! trait. The game only needs to post and retract messages and to manage the
//! seasonal role.

use crate::types::{ChannelId, GuildId, MessageHandle, Notice, RoleId, UserId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Platform request failed: {0}")]
    Other(String),
}

impl PlatformError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlatformError::NotFound(_))
    }
}

pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

#[async_trait]
pub trait Platform: Send + Sync {
    async fn send(&self, channel: ChannelId, notice: Notice) -> PlatformResult<MessageHandle>;

    /// Deleting a message that is already gone yields `NotFound`
    async fn delete(&self, handle: MessageHandle) -> PlatformResult<()>;

    async fn grant_role(&self, guild: GuildId, user: UserId, role: RoleId) -> PlatformResult<()>;

    async fn has_role(&self, guild: GuildId, user: UserId, role: RoleId) -> PlatformResult<bool>;

    /// Idempotent: returns the existing role when one with this name exists
    async fn find_or_create_role(&self, guild: GuildId, name: &str) -> PlatformResult<RoleId>;
}

/// Deletes a message, treating an already-vanished message as success.
///
/// Any other failure is logged and swallowed: a stale gift message must never
/// break claim handling or the spawn loop.
pub async fn retract(platform: &dyn Platform, handle: MessageHandle) {
    match platform.delete(handle).await {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            tracing::debug!("Message {} already gone", handle.message);
        }
        Err(e) => {
            tracing::warn!(
                "Failed to retract message {} in channel {}: {}",
                handle.message,
                handle.channel,
                e
            );
        }
    }
}

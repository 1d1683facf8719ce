use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

snowflake_id!(
    /// A chat platform user
    UserId
);
snowflake_id!(
    /// A text channel gifts can be dropped into
    ChannelId
);
snowflake_id!(
    /// A guild (server) the bot is running in
    GuildId
);
snowflake_id!(RoleId);

/// Identifies a posted message so it can be retracted later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    pub channel: ChannelId,
    pub message: u64,
}

/// The two scarce rewards the lottery hands out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reward {
    Book,
    Role,
}

impl fmt::Display for Reward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reward::Book => write!(f, "book"),
            Reward::Role => write!(f, "role"),
        }
    }
}

/// Something the bot posts to a channel. Rendering is up to the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notice {
    /// A claimable gift with its claim button
    Gift { gift_id: Uuid, lifetime_secs: u64 },
    /// Audit record of a win, sent to the log channel
    WinRecord { user: UserId, reward: Reward },
}

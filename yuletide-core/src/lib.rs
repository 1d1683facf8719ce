//! Yuletide core - shared building blocks of the seasonal gift bot
//!
//! Identifiers, configuration, the platform seam, persistence of book winners
//! and the injectable random source used by the game crate.

pub mod config;
pub mod error;
pub mod facts;
pub mod platform;
pub mod random;
pub mod storage;
pub mod types;

pub use config::{ConfigUpdate, GameConfig, SharedConfig, StockCap};
pub use error::{Result, YuletideError};
pub use facts::{ChristmasFacts, FactProvider};
pub use platform::{retract, Platform, PlatformError, PlatformResult};
pub use random::{RandomSource, SharedRandom};
pub use storage::{MemoryWinnerStore, SqliteWinnerStore, Storage, WinnerRecord, WinnerStore};
pub use types::{ChannelId, GuildId, MessageHandle, Notice, Reward, RoleId, UserId};

use crate::error::{Result, YuletideError};
use crate::types::ChannelId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const MIN_GIFT_LIFETIME_SECS: u64 = 1;
pub const MAX_GIFT_LIFETIME_SECS: u64 = 60;

/// Upper bound on how many of a reward may be handed out.
///
/// On the configuration surface `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum StockCap {
    Unlimited,
    Limited(u32),
}

impl StockCap {
    pub fn from_raw(raw: i64) -> Result<Self> {
        match raw {
            -1 => Ok(StockCap::Unlimited),
            n if n >= 0 => u32::try_from(n)
                .map(StockCap::Limited)
                .map_err(|_| YuletideError::config(format!("Stock cap {} is too large", n))),
            n => Err(YuletideError::config(format!(
                "Stock cap must be -1 (unlimited) or a non-negative number, got {}",
                n
            ))),
        }
    }

    pub fn as_raw(self) -> i64 {
        match self {
            StockCap::Unlimited => -1,
            StockCap::Limited(n) => n as i64,
        }
    }

    /// Whether another unit may be given out when `given` already went out
    pub fn has_remaining(self, given: u32) -> bool {
        match self {
            StockCap::Unlimited => true,
            StockCap::Limited(max) => given < max,
        }
    }
}

impl TryFrom<i64> for StockCap {
    type Error = YuletideError;

    fn try_from(raw: i64) -> Result<Self> {
        StockCap::from_raw(raw)
    }
}

impl From<StockCap> for i64 {
    fn from(cap: StockCap) -> Self {
        cap.as_raw()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub gift_lifetime_secs: u64,
    pub min_spawn_interval_secs: u64,
    pub max_spawn_interval_secs: u64,
    pub role_probability: f64,
    pub book_probability: f64,
    pub role_max: StockCap,
    pub book_max: StockCap,
    pub log_channel: Option<ChannelId>,
    pub role_name: String,
    pub book_title: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            gift_lifetime_secs: 5,
            min_spawn_interval_secs: 1,
            max_spawn_interval_secs: 5,
            role_probability: 0.25,
            book_probability: 0.05,
            role_max: StockCap::Unlimited,
            book_max: StockCap::Unlimited,
            log_channel: None,
            role_name: "🎅 Elfe de Noël".to_string(),
            book_title: "Guide de survie au lycée".to_string(),
        }
    }
}

impl GameConfig {
    pub fn gift_lifetime(&self) -> Duration {
        Duration::from_secs(self.gift_lifetime_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_GIFT_LIFETIME_SECS..=MAX_GIFT_LIFETIME_SECS).contains(&self.gift_lifetime_secs) {
            return Err(YuletideError::config(format!(
                "Gift lifetime must be between {} and {} seconds",
                MIN_GIFT_LIFETIME_SECS, MAX_GIFT_LIFETIME_SECS
            )));
        }

        if self.min_spawn_interval_secs < 1 {
            return Err(YuletideError::config(
                "Minimum spawn interval must be at least 1 second",
            ));
        }

        if self.max_spawn_interval_secs < self.min_spawn_interval_secs {
            return Err(YuletideError::config(
                "Maximum spawn interval must not be below the minimum",
            ));
        }

        validate_probability("Role probability", self.role_probability)?;
        validate_probability("Book probability", self.book_probability)?;

        if self.role_name.trim().is_empty() {
            return Err(YuletideError::config("Role name cannot be empty"));
        }

        Ok(())
    }

    /// Applies a partial update, keeping `self` untouched if the result is invalid
    pub fn apply(&mut self, update: &ConfigUpdate) -> Result<()> {
        let mut next = self.clone();

        if let Some(v) = update.gift_lifetime_secs {
            next.gift_lifetime_secs = v;
        }
        if let Some(v) = update.min_spawn_interval_secs {
            next.min_spawn_interval_secs = v;
        }
        if let Some(v) = update.max_spawn_interval_secs {
            next.max_spawn_interval_secs = v;
        }
        if let Some(v) = update.role_probability {
            next.role_probability = v;
        }
        if let Some(v) = update.book_probability {
            next.book_probability = v;
        }
        if let Some(v) = update.role_max {
            next.role_max = StockCap::from_raw(v)?;
        }
        if let Some(v) = update.book_max {
            next.book_max = StockCap::from_raw(v)?;
        }
        if update.clear_log_channel {
            next.log_channel = None;
        } else if let Some(v) = update.log_channel {
            next.log_channel = Some(v);
        }

        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Loads the configuration file, falling back to defaults when it does not exist
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

fn validate_probability(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(YuletideError::config(format!(
            "{} must be between 0.0 and 1.0",
            name
        )));
    }
    Ok(())
}

/// Admin-side partial update. Caps use the raw `-1` sentinel.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub gift_lifetime_secs: Option<u64>,
    pub min_spawn_interval_secs: Option<u64>,
    pub max_spawn_interval_secs: Option<u64>,
    pub role_probability: Option<f64>,
    pub book_probability: Option<f64>,
    pub role_max: Option<i64>,
    pub book_max: Option<i64>,
    pub log_channel: Option<ChannelId>,
    /// Stop recording wins. Takes precedence over `log_channel`.
    pub clear_log_channel: bool,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.gift_lifetime_secs.is_none()
            && self.min_spawn_interval_secs.is_none()
            && self.max_spawn_interval_secs.is_none()
            && self.role_probability.is_none()
            && self.book_probability.is_none()
            && self.role_max.is_none()
            && self.book_max.is_none()
            && self.log_channel.is_none()
            && !self.clear_log_channel
    }
}

/// Live configuration shared between the admin surface, the spawner and the lottery
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<GameConfig>>,
}

impl SharedConfig {
    pub fn new(config: GameConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn snapshot(&self) -> GameConfig {
        self.inner.read().clone()
    }

    pub fn update(&self, update: &ConfigUpdate) -> Result<GameConfig> {
        let mut config = self.inner.write();
        config.apply(update)?;
        Ok(config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn test_stock_cap_sentinel() {
        assert_eq!(StockCap::from_raw(-1).unwrap(), StockCap::Unlimited);
        assert_eq!(StockCap::from_raw(3).unwrap(), StockCap::Limited(3));
        assert!(StockCap::from_raw(-2).is_err());

        assert!(StockCap::Unlimited.has_remaining(u32::MAX));
        assert!(StockCap::Limited(3).has_remaining(2));
        assert!(!StockCap::Limited(3).has_remaining(3));
        assert!(!StockCap::Limited(0).has_remaining(0));
    }

    #[test]
    fn test_apply_rejects_invalid_update_atomically() {
        let mut config = GameConfig::default();

        let update = ConfigUpdate {
            gift_lifetime_secs: Some(10),
            role_probability: Some(1.5),
            ..Default::default()
        };
        assert!(config.apply(&update).is_err());
        assert_eq!(config, GameConfig::default());

        let update = ConfigUpdate {
            gift_lifetime_secs: Some(61),
            ..Default::default()
        };
        assert!(config.apply(&update).is_err());
    }

    #[test]
    fn test_interval_bounds() {
        let mut config = GameConfig::default();

        let update = ConfigUpdate {
            min_spawn_interval_secs: Some(0),
            ..Default::default()
        };
        assert!(config.apply(&update).is_err());

        // max is checked against the merged minimum
        let update = ConfigUpdate {
            min_spawn_interval_secs: Some(300),
            max_spawn_interval_secs: Some(1800),
            ..Default::default()
        };
        config.apply(&update).unwrap();
        assert_eq!(config.min_spawn_interval_secs, 300);

        let update = ConfigUpdate {
            max_spawn_interval_secs: Some(200),
            ..Default::default()
        };
        assert!(config.apply(&update).is_err());
        assert_eq!(config.max_spawn_interval_secs, 1800);
    }

    #[test]
    fn test_caps_serialize_as_sentinel() {
        let config = GameConfig {
            book_max: StockCap::Limited(3),
            ..Default::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["role_max"], -1);
        assert_eq!(json["book_max"], 3);

        let parsed: GameConfig = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, config);
    }

    #[tokio::test]
    async fn test_load_missing_file_gives_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");

        let config = GameConfig::load(&path).await.unwrap();
        assert_eq!(config, GameConfig::default());

        let changed = GameConfig {
            gift_lifetime_secs: 30,
            log_channel: Some(ChannelId(42)),
            ..Default::default()
        };
        changed.save(&path).await.unwrap();
        assert_eq!(GameConfig::load(&path).await.unwrap(), changed);
    }

    #[test]
    fn test_log_channel_can_be_cleared() {
        let mut config = GameConfig::default();
        config
            .apply(&ConfigUpdate {
                log_channel: Some(ChannelId(7)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.log_channel, Some(ChannelId(7)));

        let clear = ConfigUpdate {
            clear_log_channel: true,
            ..Default::default()
        };
        assert!(!clear.is_empty());
        config.apply(&clear).unwrap();
        assert_eq!(config.log_channel, None);
    }

    #[test]
    fn test_shared_config_update() {
        let shared = SharedConfig::default();
        let update = ConfigUpdate {
            book_max: Some(2),
            ..Default::default()
        };
        let updated = shared.update(&update).unwrap();
        assert_eq!(updated.book_max, StockCap::Limited(2));
        assert_eq!(shared.snapshot().book_max, StockCap::Limited(2));
    }
}

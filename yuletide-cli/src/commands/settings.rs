use crate::config::CliConfig;
use crate::render;
use anyhow::Result;
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Table};
use yuletide_core::{ChannelId, ConfigUpdate, GameConfig};

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// How long a gift stays claimable, in seconds (1-60)
    #[arg(long)]
    pub gift_lifetime: Option<u64>,
    /// Minimum pause between gifts, in seconds
    #[arg(long)]
    pub min_interval: Option<u64>,
    /// Maximum pause between gifts, in seconds
    #[arg(long)]
    pub max_interval: Option<u64>,
    /// Chance to win the role (0.0 to 1.0)
    #[arg(long)]
    pub role_probability: Option<f64>,
    /// Chance to win the book (0.0 to 1.0)
    #[arg(long)]
    pub book_probability: Option<f64>,
    /// How many roles may be handed out, -1 for unlimited
    #[arg(long, allow_hyphen_values = true)]
    pub role_max: Option<i64>,
    /// How many books may be handed out, -1 for unlimited
    #[arg(long, allow_hyphen_values = true)]
    pub book_max: Option<i64>,
    /// Channel receiving a record of every win
    #[arg(long)]
    pub log_channel: Option<u64>,
    /// Stop recording wins in a log channel
    #[arg(long, conflicts_with = "log_channel")]
    pub no_log_channel: bool,
}

impl From<&ConfigArgs> for ConfigUpdate {
    fn from(args: &ConfigArgs) -> Self {
        ConfigUpdate {
            gift_lifetime_secs: args.gift_lifetime,
            min_spawn_interval_secs: args.min_interval,
            max_spawn_interval_secs: args.max_interval,
            role_probability: args.role_probability,
            book_probability: args.book_probability,
            role_max: args.role_max,
            book_max: args.book_max,
            log_channel: args.log_channel.map(ChannelId),
            clear_log_channel: args.no_log_channel,
        }
    }
}

/// Shows the settings, or applies and saves the given changes
pub async fn configure(cli_config: &CliConfig, args: ConfigArgs) -> Result<()> {
    let path = cli_config.config_path();
    let mut config = GameConfig::load(&path).await?;
    let update = ConfigUpdate::from(&args);

    if update.is_empty() {
        println!("Current configuration:");
        println!("{}", settings_table(&config));
        return Ok(());
    }

    config.apply(&update)?;
    config.save(&path).await?;

    println!("Configuration updated:");
    for change in describe_changes(&update, &config) {
        println!("  • {}", change);
    }

    Ok(())
}

pub fn settings_table(config: &GameConfig) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![
        "Gift lifetime".to_string(),
        format!("{}s", config.gift_lifetime_secs),
    ]);
    table.add_row(vec![
        "Spawn interval".to_string(),
        format!(
            "{}s - {}s",
            config.min_spawn_interval_secs, config.max_spawn_interval_secs
        ),
    ]);
    table.add_row(vec![
        "Role probability".to_string(),
        render::percent(config.role_probability),
    ]);
    table.add_row(vec![
        "Book probability".to_string(),
        render::percent(config.book_probability),
    ]);
    table.add_row(vec!["Role stock".to_string(), render::cap(config.role_max)]);
    table.add_row(vec!["Book stock".to_string(), render::cap(config.book_max)]);
    table.add_row(vec![
        "Log channel".to_string(),
        config
            .log_channel
            .map(|c| format!("#{}", c))
            .unwrap_or_else(|| "none".to_string()),
    ]);
    table.add_row(vec!["Role".to_string(), config.role_name.clone()]);
    table.add_row(vec!["Book".to_string(), config.book_title.clone()]);
    table
}

pub fn describe_changes(update: &ConfigUpdate, config: &GameConfig) -> Vec<String> {
    let mut changes = Vec::new();

    if update.gift_lifetime_secs.is_some() {
        changes.push(format!("Gift lifetime: {}s", config.gift_lifetime_secs));
    }
    if update.min_spawn_interval_secs.is_some() {
        changes.push(format!(
            "Minimum interval: {}s",
            config.min_spawn_interval_secs
        ));
    }
    if update.max_spawn_interval_secs.is_some() {
        changes.push(format!(
            "Maximum interval: {}s",
            config.max_spawn_interval_secs
        ));
    }
    if update.role_probability.is_some() {
        changes.push(format!(
            "Role probability: {}",
            render::percent(config.role_probability)
        ));
    }
    if update.book_probability.is_some() {
        changes.push(format!(
            "Book probability: {}",
            render::percent(config.book_probability)
        ));
    }
    if update.role_max.is_some() {
        changes.push(format!("Role stock: {}", render::cap(config.role_max)));
    }
    if update.book_max.is_some() {
        changes.push(format!("Book stock: {}", render::cap(config.book_max)));
    }
    if update.clear_log_channel {
        changes.push("Log channel: none".to_string());
    } else if let Some(channel) = update.log_channel {
        changes.push(format!("Log channel: #{}", channel));
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_configure_persists_changes() {
        let temp_dir = tempdir().unwrap();
        let cli_config = CliConfig::new(Some(temp_dir.path().to_path_buf()));

        let args = ConfigArgs {
            gift_lifetime: Some(20),
            book_max: Some(-1),
            role_max: Some(10),
            ..Default::default()
        };
        configure(&cli_config, args).await.unwrap();

        let saved = GameConfig::load(&cli_config.config_path()).await.unwrap();
        assert_eq!(saved.gift_lifetime_secs, 20);
        assert_eq!(saved.role_max, yuletide_core::StockCap::Limited(10));
    }

    #[tokio::test]
    async fn test_configure_rejects_bad_lifetime() {
        let temp_dir = tempdir().unwrap();
        let cli_config = CliConfig::new(Some(temp_dir.path().to_path_buf()));

        let args = ConfigArgs {
            gift_lifetime: Some(0),
            ..Default::default()
        };
        assert!(configure(&cli_config, args).await.is_err());
        assert!(!cli_config.config_path().exists());
    }

    #[tokio::test]
    async fn test_configure_clears_log_channel() {
        let temp_dir = tempdir().unwrap();
        let cli_config = CliConfig::new(Some(temp_dir.path().to_path_buf()));

        let args = ConfigArgs {
            log_channel: Some(55),
            ..Default::default()
        };
        configure(&cli_config, args).await.unwrap();
        let saved = GameConfig::load(&cli_config.config_path()).await.unwrap();
        assert_eq!(saved.log_channel, Some(ChannelId(55)));

        let args = ConfigArgs {
            no_log_channel: true,
            ..Default::default()
        };
        configure(&cli_config, args).await.unwrap();
        let saved = GameConfig::load(&cli_config.config_path()).await.unwrap();
        assert_eq!(saved.log_channel, None);
    }

    #[test]
    fn test_describe_only_changed_settings() {
        let update = ConfigUpdate {
            role_probability: Some(0.5),
            ..Default::default()
        };
        let changes = describe_changes(&update, &GameConfig::default());
        assert_eq!(changes.len(), 1);
        assert!(changes[0].starts_with("Role probability"));
    }
}

use super::settings::{describe_changes, settings_table};
use crate::config::CliConfig;
use crate::console::ConsolePlatform;
use crate::render;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Table};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use yuletide_core::{
    ChannelId, ConfigUpdate, GameConfig, GuildId, SharedConfig, SqliteWinnerStore, Storage,
    UserId,
};
use yuletide_lottery::{ClaimHandler, ClaimRequest, GameError, GiftBot, GiftState, SpawnOutcome};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Channel gifts may appear in (repeatable)
    #[arg(short, long = "channel", required = true)]
    pub channels: Vec<u64>,
    /// Guild the role lives in
    #[arg(short, long, default_value_t = 1)]
    pub guild: u64,
    /// User who already holds the seasonal role (repeatable)
    #[arg(long = "role-holder")]
    pub role_holders: Vec<u64>,
    /// Refuse every role grant, as a server with a misplaced bot role would
    #[arg(long)]
    pub deny_role_grants: bool,
}

/// One line typed into the session
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Claim(UserId),
    Drop,
    Start,
    Stop,
    Status,
    ShowConfig,
    SetConfig { key: String, value: String },
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<SessionCommand>> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };

    let command = match word {
        "claim" => {
            let user = words.next().context("usage: claim <user id>")?;
            let user: u64 = user
                .parse()
                .with_context(|| format!("invalid user id '{}'", user))?;
            SessionCommand::Claim(UserId(user))
        }
        "drop" => SessionCommand::Drop,
        "start" => SessionCommand::Start,
        "stop" => SessionCommand::Stop,
        "status" => SessionCommand::Status,
        "config" => match (words.next(), words.next()) {
            (None, _) => SessionCommand::ShowConfig,
            (Some(key), Some(value)) => SessionCommand::SetConfig {
                key: key.to_string(),
                value: value.to_string(),
            },
            (Some(_), None) => bail!("usage: config [<setting> <value>]"),
        },
        "help" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        other => bail!("unknown command '{}', try 'help'", other),
    };

    Ok(Some(command))
}

/// Turns `config <setting> <value>` into an update of that one setting
fn parse_setting(key: &str, value: &str) -> Result<ConfigUpdate> {
    fn number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
        value
            .parse()
            .ok()
            .with_context(|| format!("invalid value '{}' for {}", value, key))
    }

    let mut update = ConfigUpdate::default();
    match key {
        "gift-lifetime" => update.gift_lifetime_secs = Some(number(key, value)?),
        "min-interval" => update.min_spawn_interval_secs = Some(number(key, value)?),
        "max-interval" => update.max_spawn_interval_secs = Some(number(key, value)?),
        "role-probability" => update.role_probability = Some(number(key, value)?),
        "book-probability" => update.book_probability = Some(number(key, value)?),
        "role-max" => update.role_max = Some(number(key, value)?),
        "book-max" => update.book_max = Some(number(key, value)?),
        "log-channel" if value == "none" => update.clear_log_channel = true,
        "log-channel" => update.log_channel = Some(ChannelId(number(key, value)?)),
        other => bail!("unknown setting '{}'", other),
    }

    Ok(update)
}

struct Session {
    bot: GiftBot,
    guild: GuildId,
    channels: Vec<ChannelId>,
    config_path: PathBuf,
}

impl Session {
    /// Returns false once the session should end
    async fn execute(&self, command: SessionCommand) -> Result<bool> {
        match command {
            SessionCommand::Claim(user) => self.claim(user).await,
            SessionCommand::Drop => match self.bot.spawn_gift(&self.channels).await {
                Ok(SpawnOutcome::Spawned(gift)) => {
                    println!("Dropped gift {} in #{}", gift.gift_id, gift.channel)
                }
                Ok(SpawnOutcome::AlreadyActive { gift_id }) => {
                    println!("Gift {} is still waiting to be claimed", gift_id)
                }
                Err(e) => println!("Could not drop a gift: {}", e),
            },
            SessionCommand::Start => match self.bot.start(self.channels.clone()) {
                Ok(_) => println!("🎄 Christmas game started!"),
                Err(GameError::AlreadyRunning) => println!("The game is already running!"),
                Err(e) => return Err(e.into()),
            },
            SessionCommand::Stop => {
                if self.bot.stop() {
                    println!("Christmas game stopped.");
                } else {
                    println!("The game is not running.");
                }
            }
            SessionCommand::Status => self.print_status().await,
            SessionCommand::ShowConfig => {
                println!("{}", settings_table(&self.bot.config().snapshot()))
            }
            SessionCommand::SetConfig { key, value } => self.set_config(&key, &value).await,
            SessionCommand::Help => print_help(),
            SessionCommand::Quit => return Ok(false),
        }

        Ok(true)
    }

    /// Changes one setting of the running game and saves it
    async fn set_config(&self, key: &str, value: &str) {
        let update = match parse_setting(key, value) {
            Ok(update) => update,
            Err(e) => {
                println!("{}", e);
                return;
            }
        };

        let config = match self.bot.config().update(&update) {
            Ok(config) => config,
            Err(e) => {
                println!("Configuration unchanged: {}", e);
                return;
            }
        };

        for change in describe_changes(&update, &config) {
            println!("  • {}", change);
        }

        if let Err(e) = config.save(&self.config_path).await {
            tracing::warn!("Failed to save configuration: {}", e);
            println!("The change applies to this session but could not be saved.");
        }
    }

    async fn claim(&self, user: UserId) {
        let Some(gift) = self.bot.active_gift() else {
            println!("There is no gift to claim right now.");
            return;
        };

        let reply = self
            .bot
            .handle_claim(ClaimRequest {
                gift_id: gift.id(),
                user,
                guild: self.guild,
                at: Utc::now(),
            })
            .await;

        let config = self.bot.config().snapshot();
        println!("#{} {}", gift.channel(), render::reply(&reply, &config));
    }

    async fn print_status(&self) {
        let stats = self.bot.stats().await;

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Item", "Value"]);
        table.add_row(vec![
            "Spawn loop".to_string(),
            if self.bot.is_running() {
                "running"
            } else {
                "stopped"
            }
            .to_string(),
        ]);
        table.add_row(vec![
            "Current gift".to_string(),
            match self.bot.active_gift() {
                Some(gift) => match gift.state() {
                    GiftState::Open => format!("{} open in #{}", gift.id(), gift.channel()),
                    GiftState::Claimed { by, .. } => {
                        format!("{} claimed by {}", gift.id(), render::mention(*by))
                    }
                    GiftState::Expired => format!("{} expired", gift.id()),
                },
                None => "none".to_string(),
            },
        ]);
        table.add_row(vec![
            "Roles given".to_string(),
            format!("{} / {}", stats.role_given, render::cap(stats.role_max)),
        ]);
        table.add_row(vec![
            "Books given".to_string(),
            format!("{} / {}", stats.book_given, render::cap(stats.book_max)),
        ]);
        table.add_row(vec![
            "Book winners".to_string(),
            stats.book_winners.to_string(),
        ]);

        println!("{}", table);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  claim <user>  claim the current gift as <user>");
    println!("  drop          drop a gift right now");
    println!("  start         start the spawn loop");
    println!("  stop          stop the spawn loop");
    println!("  status        show the loop, the current gift and reward stock");
    println!("  config        show the settings of the running game");
    println!("  config <setting> <value>");
    println!("                change a setting, e.g. 'config role-probability 0.5'");
    println!("                or 'config log-channel none'");
    println!("  quit          end the session");
}

pub async fn run_session(cli_config: &CliConfig, args: RunArgs) -> Result<()> {
    let config = GameConfig::load(&cli_config.config_path()).await?;
    let guild = GuildId(args.guild);
    let channels: Vec<ChannelId> = args.channels.into_iter().map(ChannelId).collect();

    let platform = Arc::new(ConsolePlatform::new(args.deny_role_grants));
    let holders: Vec<UserId> = args.role_holders.into_iter().map(UserId).collect();
    platform.preload_role_holders(guild, &config.role_name, &holders);

    let storage = Arc::new(Storage::new(&cli_config.db_path()).await?);
    let store = Arc::new(SqliteWinnerStore::new(storage));

    let bot = yuletide_lottery::create_bot(platform, SharedConfig::new(config), store).await;
    let session = Session {
        bot,
        guild,
        channels,
        config_path: cli_config.config_path(),
    };

    session.bot.start(session.channels.clone())?;
    println!(
        "🎄 Christmas game started in {} channel(s). Type 'help' for commands.",
        session.channels.len()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };

        let Some(line) = line else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if !session.execute(command).await? {
            break;
        }
    }

    session.bot.stop();
    tracing::info!("Session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use yuletide_core::MemoryWinnerStore;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("claim 42").unwrap(),
            Some(SessionCommand::Claim(UserId(42)))
        );
        assert_eq!(parse_command("  stop ").unwrap(), Some(SessionCommand::Stop));
        assert_eq!(parse_command("exit").unwrap(), Some(SessionCommand::Quit));
        assert_eq!(parse_command("").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_command("claim").is_err());
        assert!(parse_command("claim santa").is_err());
        assert!(parse_command("dance").is_err());
        assert!(parse_command("config role-max").is_err());
    }

    #[test]
    fn test_parse_settings() {
        assert_eq!(
            parse_command("config book-max 3").unwrap(),
            Some(SessionCommand::SetConfig {
                key: "book-max".to_string(),
                value: "3".to_string(),
            })
        );
        assert_eq!(
            parse_command("config").unwrap(),
            Some(SessionCommand::ShowConfig)
        );

        assert_eq!(parse_setting("role-max", "-1").unwrap().role_max, Some(-1));
        assert_eq!(
            parse_setting("log-channel", "12").unwrap().log_channel,
            Some(ChannelId(12))
        );
        assert!(parse_setting("log-channel", "none").unwrap().clear_log_channel);
        assert!(parse_setting("role-probability", "lots").is_err());
        assert!(parse_setting("snow", "1").is_err());
    }

    async fn session_in(dir: &std::path::Path) -> Session {
        let bot = yuletide_lottery::create_bot(
            Arc::new(ConsolePlatform::new(false)),
            SharedConfig::default(),
            Arc::new(MemoryWinnerStore::default()),
        )
        .await;
        Session {
            bot,
            guild: GuildId(1),
            channels: vec![ChannelId(3)],
            config_path: dir.join("config.json"),
        }
    }

    #[tokio::test]
    async fn test_config_command_updates_running_game() {
        let temp_dir = tempdir().unwrap();
        let session = session_in(temp_dir.path()).await;

        let command = parse_command("config max-interval 30").unwrap().unwrap();
        assert!(session.execute(command).await.unwrap());
        assert_eq!(session.bot.config().snapshot().max_spawn_interval_secs, 30);

        let saved = GameConfig::load(&session.config_path).await.unwrap();
        assert_eq!(saved.max_spawn_interval_secs, 30);
    }

    #[tokio::test]
    async fn test_invalid_config_command_keeps_session() {
        let temp_dir = tempdir().unwrap();
        let session = session_in(temp_dir.path()).await;

        let command = parse_command("config gift-lifetime 500").unwrap().unwrap();
        assert!(session.execute(command).await.unwrap());
        assert_eq!(session.bot.config().snapshot(), GameConfig::default());
        assert!(!session.config_path.exists());
    }

    #[tokio::test]
    async fn test_drop_without_channels_keeps_session() {
        let temp_dir = tempdir().unwrap();
        let mut session = session_in(temp_dir.path()).await;
        session.channels.clear();

        assert!(session.execute(SessionCommand::Drop).await.unwrap());
        assert!(session.bot.active_gift().is_none());
    }
}

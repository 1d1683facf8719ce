use crate::config::CliConfig;
use crate::render::{self, BOOK_EMOJI, GIFT_EMOJI, TREE_EMOJI};
use anyhow::Result;
use yuletide_core::GameConfig;

pub async fn show_info(cli_config: &CliConfig) -> Result<()> {
    let config = GameConfig::load(&cli_config.config_path()).await?;
    println!("{}", describe(&config));
    Ok(())
}

fn describe(config: &GameConfig) -> String {
    let mut text = format!(
        "{tree} Christmas gift game {tree}\n\n\
         How it works:\n\
         • {gift} A gift appears in a random channel every {min} to {max} seconds\n\
         • The first person to claim it wins the gift\n\
         • Gifts disappear after {life} seconds\n\
         • Each gift enters you in a lottery\n\n\
         Possible prizes:\n\
         • {book} The book '{title}' ({book_odds} chance, stock: {book_cap})\n\
         • The role {role} ({role_odds} chance, stock: {role_cap})\n\
         • A Christmas fun fact when luck is not on your side\n\n\
         Each prize can only be won once per person.",
        tree = TREE_EMOJI,
        gift = GIFT_EMOJI,
        book = BOOK_EMOJI,
        min = config.min_spawn_interval_secs,
        max = config.max_spawn_interval_secs,
        life = config.gift_lifetime_secs,
        title = config.book_title,
        book_odds = render::percent(config.book_probability),
        book_cap = render::cap(config.book_max),
        role = config.role_name,
        role_odds = render::percent(config.role_probability),
        role_cap = render::cap(config.role_max),
    );

    let book_winnable = config.book_probability > 0.0 && config.book_max.has_remaining(0);
    let role_winnable = config.role_probability > 0.0 && config.role_max.has_remaining(0);
    if !book_winnable && !role_winnable {
        text.push_str("\n\n⚠️ With the current settings no prize can be won.");
    }

    text
}

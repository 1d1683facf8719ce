use crate::config::CliConfig;
use crate::render;
use anyhow::Result;
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Table};
use std::sync::Arc;
use yuletide_core::{SqliteWinnerStore, Storage, WinnerRecord};

#[derive(Args, Debug, Default)]
pub struct WinnersArgs {
    /// Print the winners as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn list_winners(cli_config: &CliConfig, args: WinnersArgs) -> Result<()> {
    let storage = Arc::new(Storage::new(&cli_config.db_path()).await?);
    let store = SqliteWinnerStore::new(storage);
    let records = store.list_records().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No book winners yet.");
        return Ok(());
    }

    println!("{}", winners_table(&records));
    println!("{} winner(s)", records.len());
    Ok(())
}

fn winners_table(records: &[WinnerRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["User", "Won at"]);
    for record in records {
        table.add_row(vec![
            render::mention(record.user),
            record.won_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ]);
    }
    table
}

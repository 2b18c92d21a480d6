//! Conversation summary subcommands: add, list, count.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use botmem_core::memory::store::{effective_limit, SummaryRepository, DEFAULT_SUMMARY_LIST_LIMIT};

use crate::cli::truncate;
use crate::state::AppState;

/// Summary subcommands.
#[derive(Subcommand)]
pub enum SummaryCommand {
    /// Store a summary.
    Add {
        /// Summary text.
        content: String,

        /// Compression level (0 is the most granular).
        #[arg(long, default_value_t = 0)]
        level: u32,

        /// Free-form provenance (e.g. ids of summarized items).
        #[arg(long, default_value = "")]
        sources: String,
    },

    /// List summaries at a level, most recent first.
    #[command(alias = "ls")]
    List {
        #[arg(long, default_value_t = 0)]
        level: u32,

        /// Maximum results.
        #[arg(long, default_value_t = DEFAULT_SUMMARY_LIST_LIMIT)]
        limit: i64,
    },

    /// Count summaries at a level.
    Count {
        #[arg(long, default_value_t = 0)]
        level: u32,
    },
}

/// Handle a summary subcommand.
pub async fn handle_summary_command(
    cmd: SummaryCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        SummaryCommand::Add {
            content,
            level,
            sources,
        } => {
            let summary = state
                .summaries
                .add(level, &content, &sources)
                .await
                .context("Failed to store summary")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!();
                println!(
                    "  {} Stored level-{} summary #{}",
                    style("ok").green(),
                    summary.level,
                    style(summary.id).cyan()
                );
                println!();
            }
            Ok(())
        }
        SummaryCommand::List { level, limit } => list_summaries(state, level, limit, json).await,
        SummaryCommand::Count { level } => {
            let count = state.summaries.count_at_level(level).await?;
            if json {
                println!("{}", serde_json::json!({ "level": level, "count": count }));
            } else {
                println!("  {count} summar{} at level {level}", if count == 1 { "y" } else { "ies" });
            }
            Ok(())
        }
    }
}

async fn list_summaries(state: &AppState, level: u32, limit: i64, json: bool) -> Result<()> {
    let summaries = state
        .summaries
        .list(level, effective_limit(limit, DEFAULT_SUMMARY_LIST_LIMIT))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!();
        println!("  {} No summaries at level {level}.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Summary").fg(Color::White),
        Cell::new("Sources").fg(Color::White),
        Cell::new("Date").fg(Color::White),
    ]);
    for summary in &summaries {
        table.add_row(vec![
            Cell::new(summary.id).fg(Color::Cyan),
            Cell::new(truncate(&summary.content, 70)),
            Cell::new(&summary.source_ids).fg(Color::DarkGrey),
            Cell::new(summary.created_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

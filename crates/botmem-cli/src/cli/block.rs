//! Working-memory block subcommands: list, get, set, create, delete.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use botmem_core::memory::store::BlockRepository;
use botmem_types::memory::{Block, CORE_BLOCK_TYPE};

use crate::cli::truncate;
use crate::state::AppState;

/// Block subcommands.
#[derive(Subcommand)]
pub enum BlockCommand {
    /// List blocks ordered by label.
    #[command(alias = "ls")]
    List {
        /// Only blocks of this type (e.g. "core").
        #[arg(long = "type")]
        block_type: Option<String>,
    },

    /// Show one block.
    Get {
        /// Block label.
        label: String,
    },

    /// Replace a block's content, creating a core block if absent.
    Set {
        /// Block label.
        label: String,

        /// Full replacement content.
        content: String,
    },

    /// Create a new block. Fails if the label exists.
    Create {
        /// Block label.
        label: String,

        /// Initial content.
        content: String,

        /// Block type.
        #[arg(long = "type", default_value = CORE_BLOCK_TYPE)]
        block_type: String,
    },

    /// Delete a block. Deleting an absent label succeeds.
    #[command(alias = "rm")]
    Delete {
        /// Block label.
        label: String,
    },
}

/// Handle a block subcommand.
pub async fn handle_block_command(cmd: BlockCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        BlockCommand::List { block_type } => {
            list_blocks(state, block_type.as_deref().unwrap_or(""), json).await
        }
        BlockCommand::Get { label } => get_block(state, &label, json).await,
        BlockCommand::Set { label, content } => set_block(state, &label, &content, json).await,
        BlockCommand::Create {
            label,
            content,
            block_type,
        } => create_block(state, &label, &block_type, &content, json).await,
        BlockCommand::Delete { label } => delete_block(state, &label, json).await,
    }
}

async fn list_blocks(state: &AppState, block_type: &str, json: bool) -> Result<()> {
    let blocks = state.blocks.list(block_type).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
        return Ok(());
    }

    if blocks.is_empty() {
        println!();
        println!(
            "  {} No blocks yet. Create one with {}",
            style("i").blue().bold(),
            style("botmem block set <label> <content>").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Label").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("Content").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for block in &blocks {
        table.add_row(vec![
            Cell::new(&block.label).fg(Color::Cyan),
            Cell::new(&block.block_type),
            Cell::new(truncate(&block.content, 60)),
            Cell::new(block.updated_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

async fn get_block(state: &AppState, label: &str, json: bool) -> Result<()> {
    let block = state
        .blocks
        .get_by_label(label)
        .await
        .with_context(|| format!("Block '{label}' not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&block)?);
    } else {
        print_block(&block);
    }
    Ok(())
}

async fn set_block(state: &AppState, label: &str, content: &str, json: bool) -> Result<()> {
    let block = state
        .blocks
        .set(label, content)
        .await
        .with_context(|| format!("Failed to set block '{label}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&block)?);
    } else {
        println!();
        println!(
            "  {} Set block '{}'",
            style("ok").green(),
            style(&block.label).cyan()
        );
        println!();
    }
    Ok(())
}

async fn create_block(
    state: &AppState,
    label: &str,
    block_type: &str,
    content: &str,
    json: bool,
) -> Result<()> {
    let block = state
        .blocks
        .create(label, block_type, content)
        .await
        .with_context(|| format!("Failed to create block '{label}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&block)?);
    } else {
        println!();
        println!(
            "  {} Created {} block '{}'",
            style("ok").green(),
            block.block_type,
            style(&block.label).cyan()
        );
        println!();
    }
    Ok(())
}

async fn delete_block(state: &AppState, label: &str, json: bool) -> Result<()> {
    state.blocks.delete(label).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": label }));
    } else {
        println!(
            "  {} Block '{}' deleted.",
            style("x").red().bold(),
            label
        );
    }
    Ok(())
}

fn print_block(block: &Block) {
    println!();
    println!(
        "  {} {}",
        style(&block.label).cyan().bold(),
        style(format!("({})", block.block_type)).dim()
    );
    println!(
        "  {}",
        style(format!(
            "id {} | created {} | updated {}",
            block.id,
            block.created_at.format("%Y-%m-%d %H:%M"),
            block.updated_at.format("%Y-%m-%d %H:%M"),
        ))
        .dim()
    );
    println!();
    for line in block.content.lines() {
        println!("  {line}");
    }
    println!();
}

//! Archival memory subcommands: add, search, list, delete, similar.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use botmem_core::memory::store::{
    effective_limit, ArchivalRepository, DEFAULT_ARCHIVAL_LIST_LIMIT, DEFAULT_SEARCH_LIMIT,
};
use botmem_core::memory::vector::{rank_by_similarity, serialize_embedding};
use botmem_infra::config::load_config_or_default;
use botmem_infra::embedding::create_embedder;
use botmem_types::memory::ArchivalEntry;

use crate::cli::truncate;
use crate::state::AppState;

/// Archival subcommands.
#[derive(Subcommand)]
pub enum ArchiveCommand {
    /// Store a fact.
    Add {
        /// Fact text.
        content: String,

        /// Comma-separated tags.
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Full-text search, most relevant first.
    Search {
        /// Search terms.
        query: String,

        /// Maximum results.
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: i64,
    },

    /// List facts, most recent first.
    #[command(alias = "ls")]
    List {
        /// Only facts whose tags contain this text.
        #[arg(long)]
        tag: Option<String>,

        /// Maximum results.
        #[arg(long, default_value_t = DEFAULT_ARCHIVAL_LIST_LIMIT)]
        limit: i64,
    },

    /// Delete a fact by id.
    #[command(alias = "rm")]
    Delete {
        /// Fact id.
        id: i64,
    },

    /// Rank embedded facts by cosine similarity to a query (needs embeddings).
    Similar {
        /// Query text.
        query: String,

        /// Maximum results.
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: i64,
    },
}

/// Handle an archive subcommand.
pub async fn handle_archive_command(
    cmd: ArchiveCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        ArchiveCommand::Add { content, tags } => add_fact(state, &content, &tags, json).await,
        ArchiveCommand::Search { query, limit } => search_facts(state, &query, limit, json).await,
        ArchiveCommand::List { tag, limit } => {
            list_facts(state, tag.as_deref().unwrap_or(""), limit, json).await
        }
        ArchiveCommand::Delete { id } => delete_fact(state, id, json).await,
        ArchiveCommand::Similar { query, limit } => {
            similar_facts(state, &query, limit, json).await
        }
    }
}

/// Store a fact, attaching an embedding when embeddings are enabled.
///
/// Embedding failures are logged and the fact is stored without a vector.
async fn add_fact(state: &AppState, content: &str, tags: &[String], json: bool) -> Result<()> {
    let tags: Vec<String> = tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let config = load_config_or_default(&state.data_dir).await;
    let embedding = match create_embedder(&config.embeddings) {
        Some(embedder) => match embedder.embed_one(content).await {
            Ok(vector) => Some(serialize_embedding(&vector)),
            Err(e) => {
                tracing::warn!(error = %e, "embedding failed, storing fact without vector");
                None
            }
        },
        None => None,
    };

    let entry = state
        .archival
        .add(content, &tags, embedding.as_deref())
        .await
        .context("Failed to store fact")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!();
        println!(
            "  {} Stored fact #{}{}",
            style("ok").green(),
            style(entry.id).cyan(),
            if entry.embedding.is_some() {
                format!(" {}", style("(embedded)").dim())
            } else {
                String::new()
            }
        );
        println!();
    }
    Ok(())
}

async fn search_facts(state: &AppState, query: &str, limit: i64, json: bool) -> Result<()> {
    let entries = state
        .archival
        .search(query, effective_limit(limit, DEFAULT_SEARCH_LIMIT))
        .await
        .with_context(|| format!("Search for '{query}' failed"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    print_entries(&entries, None, &format!("No facts match '{query}'."));
    Ok(())
}

async fn list_facts(state: &AppState, tag: &str, limit: i64, json: bool) -> Result<()> {
    let entries = state
        .archival
        .list(tag, effective_limit(limit, DEFAULT_ARCHIVAL_LIST_LIMIT))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    print_entries(&entries, None, "No facts stored yet.");
    Ok(())
}

async fn delete_fact(state: &AppState, id: i64, json: bool) -> Result<()> {
    state
        .archival
        .delete(id)
        .await
        .with_context(|| format!("Fact #{id} not found"))?;

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("  {} Fact #{} deleted.", style("x").red().bold(), id);
    }
    Ok(())
}

async fn similar_facts(state: &AppState, query: &str, limit: i64, json: bool) -> Result<()> {
    let config = load_config_or_default(&state.data_dir).await;
    let Some(embedder) = create_embedder(&config.embeddings) else {
        bail!("embeddings are disabled -- run 'botmem init --embeddings' to enable them");
    };

    let query_vector = embedder
        .embed_one(query)
        .await
        .with_context(|| format!("Failed to embed query with '{}'", embedder.model_name()))?;

    let candidates = state.archival.all_with_embeddings().await?;
    let limit = effective_limit(limit, DEFAULT_SEARCH_LIMIT) as usize;
    let ranked = rank_by_similarity(&query_vector, candidates, limit);

    if json {
        let results: Vec<_> = ranked
            .iter()
            .map(|(entry, score)| serde_json::json!({ "entry": entry, "score": score }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let (entries, scores): (Vec<ArchivalEntry>, Vec<f32>) = ranked.into_iter().unzip();
    print_entries(&entries, Some(&scores), "No embedded facts to compare against.");
    Ok(())
}

fn print_entries(entries: &[ArchivalEntry], scores: Option<&[f32]>, empty_message: &str) {
    if entries.is_empty() {
        println!();
        println!("  {} {}", style("i").blue().bold(), empty_message);
        println!();
        return;
    }

    let mut header = vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Fact").fg(Color::White),
        Cell::new("Tags").fg(Color::White),
        Cell::new("Date").fg(Color::White),
    ];
    if scores.is_some() {
        header.push(Cell::new("Score").fg(Color::White));
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);

    for (i, entry) in entries.iter().enumerate() {
        let mut row = vec![
            Cell::new(entry.id).fg(Color::Cyan),
            Cell::new(truncate(&entry.content, 60)),
            Cell::new(entry.tag_list().join(", ")).fg(Color::Magenta),
            Cell::new(entry.created_at.format("%Y-%m-%d").to_string()).fg(Color::DarkGrey),
        ];
        if let Some(score) = scores.and_then(|s| s.get(i)) {
            row.push(Cell::new(format!("{score:.3}")));
        }
        table.add_row(row);
    }

    println!();
    println!("{table}");
    println!();
}

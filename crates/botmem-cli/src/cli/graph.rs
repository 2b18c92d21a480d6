//! Knowledge graph subcommands: add, query, search, entities.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use botmem_core::memory::store::GraphRepository;
use botmem_types::memory::Relation;

use crate::state::AppState;

/// Graph subcommands.
#[derive(Subcommand)]
pub enum GraphCommand {
    /// Add a subject-predicate-object relation. Missing entities are created.
    Add {
        subject: String,
        predicate: String,
        object: String,

        /// Free-form metadata stored with the relation.
        #[arg(long, default_value = "")]
        metadata: String,
    },

    /// Relations where the entity is subject or object.
    Query {
        /// Entity name.
        entity: String,
    },

    /// Relations whose predicate contains the given text.
    Search {
        /// Predicate substring.
        predicate: String,
    },

    /// List entities ordered by name.
    Entities {
        /// Only entities of this type.
        #[arg(long = "type")]
        entity_type: Option<String>,
    },
}

/// Handle a graph subcommand.
pub async fn handle_graph_command(cmd: GraphCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        GraphCommand::Add {
            subject,
            predicate,
            object,
            metadata,
        } => add_relation(state, &subject, &predicate, &object, &metadata, json).await,
        GraphCommand::Query { entity } => {
            let relations = state
                .graph
                .query_entity(&entity)
                .await
                .with_context(|| format!("Failed to query entity '{entity}'"))?;
            print_relations(&relations, &format!("No relations involve '{entity}'."), json)
        }
        GraphCommand::Search { predicate } => {
            let relations = state.graph.search_relations(&predicate).await?;
            print_relations(
                &relations,
                &format!("No relations with a predicate like '{predicate}'."),
                json,
            )
        }
        GraphCommand::Entities { entity_type } => {
            list_entities(state, entity_type.as_deref().unwrap_or(""), json).await
        }
    }
}

async fn add_relation(
    state: &AppState,
    subject: &str,
    predicate: &str,
    object: &str,
    metadata: &str,
    json: bool,
) -> Result<()> {
    state
        .graph
        .add_relation(subject, predicate, object, metadata)
        .await
        .context("Failed to add relation")?;

    if json {
        let result = serde_json::json!({
            "subject": subject,
            "predicate": predicate,
            "object": object,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!(
            "  {} {} {} {}",
            style("ok").green(),
            style(subject).cyan(),
            style(predicate).yellow(),
            style(object).cyan()
        );
        println!();
    }
    Ok(())
}

async fn list_entities(state: &AppState, entity_type: &str, json: bool) -> Result<()> {
    let entities = state.graph.list_entities(entity_type).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entities)?);
        return Ok(());
    }

    if entities.is_empty() {
        println!();
        println!("  {} No entities yet.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Type").fg(Color::White),
    ]);
    for entity in &entities {
        let type_cell = if entity.entity_type.is_empty() {
            Cell::new("-").fg(Color::DarkGrey)
        } else {
            Cell::new(&entity.entity_type).fg(Color::Magenta)
        };
        table.add_row(vec![
            Cell::new(entity.id),
            Cell::new(&entity.name).fg(Color::Cyan),
            type_cell,
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

fn print_relations(relations: &[Relation], empty_message: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(relations)?);
        return Ok(());
    }

    if relations.is_empty() {
        println!();
        println!("  {} {}", style("i").blue().bold(), empty_message);
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Subject").fg(Color::White),
        Cell::new("Predicate").fg(Color::White),
        Cell::new("Object").fg(Color::White),
        Cell::new("Metadata").fg(Color::White),
    ]);
    for rel in relations {
        table.add_row(vec![
            Cell::new(&rel.subject).fg(Color::Cyan),
            Cell::new(&rel.predicate).fg(Color::Yellow),
            Cell::new(&rel.object).fg(Color::Cyan),
            Cell::new(&rel.metadata).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

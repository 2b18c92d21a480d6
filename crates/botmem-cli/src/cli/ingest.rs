//! `botmem ingest`: extract memories from conversation text and store them.

use anyhow::{bail, Context, Result};
use console::style;
use tokio::io::{AsyncRead, AsyncReadExt};

use botmem_infra::ingest::load_pipeline;
use botmem_types::extraction::ExtractionResult;

use crate::state::AppState;

/// Run one extraction over `text` (or stdin) with the configured backend.
pub async fn ingest(state: &AppState, text: Option<String>, json: bool) -> Result<()> {
    let text = read_input(text, tokio::io::stdin()).await?;

    let pipeline = load_pipeline(&state.data_dir, &state.db_pool).await?;

    tracing::info!(
        backend = pipeline.provider().name(),
        model = pipeline.provider().model(),
        chars = text.len(),
        "ingesting conversation text"
    );

    let result = pipeline.run(&text).await.context("Ingest failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

/// The text argument, or all of `stdin` when it is absent.
/// Whitespace-only input is rejected before any backend is contacted.
async fn read_input<R: AsyncRead + Unpin>(text: Option<String>, mut stdin: R) -> Result<String> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            stdin
                .read_to_string(&mut buf)
                .await
                .context("Failed to read conversation text from stdin")?;
            buf
        }
    };

    if text.trim().is_empty() {
        bail!("no input text -- pass TEXT or pipe conversation text on stdin");
    }
    Ok(text)
}

fn print_result(result: &ExtractionResult) {
    println!();
    if result.is_empty() {
        println!("  {} Nothing worth remembering.", style("i").blue().bold());
        println!();
        return;
    }

    println!("  {} Ingested conversation", style("ok").green());
    for update in &result.block_updates {
        println!("    {} block {}", style("~").yellow(), style(&update.label).cyan());
    }
    for fact in &result.facts {
        println!("    {} fact  {}", style("+").green(), fact.content);
    }
    for t in &result.triplets {
        println!(
            "    {} rel   {} {} {}",
            style("+").green(),
            style(&t.subject).cyan(),
            style(&t.predicate).yellow(),
            style(&t.object).cyan()
        );
    }
    if !result.summary.is_empty() {
        println!("    {} summary {}", style("+").green(), style(&result.summary).dim());
    }
    println!();
}

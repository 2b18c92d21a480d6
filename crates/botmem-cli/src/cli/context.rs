//! `botmem context`: print the assembled context payload.

use anyhow::{Context, Result};

use botmem_infra::ingest::context_assembler;

use crate::state::AppState;

/// Print the context payload as pretty JSON. The output is always JSON since
/// it is meant to be piped into an agent's prompt.
pub async fn show_context(state: &AppState) -> Result<()> {
    let payload = context_assembler(&state.db_pool)
        .build()
        .await
        .context("Failed to assemble context")?;
    println!("{}", payload.to_json()?);
    Ok(())
}

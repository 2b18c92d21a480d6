//! botmem CLI entry point.
//!
//! Binary name: `botmem`
//!
//! Parses CLI arguments, installs tracing, opens the memory database, then
//! dispatches to the appropriate command handler.

mod cli;
mod state;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;

use botmem_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_directive};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(verbosity_directive(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Commands that never touch the database.
    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(*shell, &mut cmd, "botmem", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Init(args) => {
            let data_dir = botmem_infra::filesystem::resolve_data_dir();
            return cli::init::init(&data_dir, args, cli.json).await;
        }
        _ => {}
    }

    let state = AppState::init(cli.db.as_deref())
        .await
        .context("failed to open memory database")?;

    let result = match cli.command {
        Commands::Block { action } => cli::block::handle_block_command(action, &state, cli.json).await,
        Commands::Archive { action } => {
            cli::archive::handle_archive_command(action, &state, cli.json).await
        }
        Commands::Graph { action } => cli::graph::handle_graph_command(action, &state, cli.json).await,
        Commands::Summary { action } => {
            cli::summary::handle_summary_command(action, &state, cli.json).await
        }
        Commands::Context => cli::context::show_context(&state).await,
        Commands::Ingest { text } => cli::ingest::ingest(&state, text, cli.json).await,
        Commands::Completions { .. } | Commands::Init(_) => Ok(()),
    };

    state.db_pool.close().await;
    result
}

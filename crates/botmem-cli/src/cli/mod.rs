//! CLI command definitions for the `botmem` binary.
//!
//! Uses clap derive macros for argument parsing. Commands are grouped by
//! memory store (`botmem block set`, `botmem archive search`, ...).

pub mod archive;
pub mod block;
pub mod context;
pub mod graph;
pub mod ingest;
pub mod init;
pub mod summary;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Persistent memory for AI agents.
#[derive(Parser)]
#[command(name = "botmem", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file (defaults to botmem.db in the data directory).
    #[arg(long, global = true, env = "BOTMEM_DB")]
    pub db: Option<PathBuf>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed log output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write config.toml (extraction backend and embeddings).
    Init(init::InitArgs),

    /// Manage working-memory blocks.
    Block {
        #[command(subcommand)]
        action: block::BlockCommand,
    },

    /// Manage archival facts (add, search, list, delete, similar).
    #[command(alias = "archival")]
    Archive {
        #[command(subcommand)]
        action: archive::ArchiveCommand,
    },

    /// Manage the entity/relation knowledge graph.
    Graph {
        #[command(subcommand)]
        action: graph::GraphCommand,
    },

    /// Manage leveled conversation summaries.
    Summary {
        #[command(subcommand)]
        action: summary::SummaryCommand,
    },

    /// Print the assembled context payload as JSON.
    Context,

    /// Extract memories from conversation text and store them.
    Ingest {
        /// Conversation text. Read from stdin when omitted.
        text: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Shorten `s` to at most `max` characters for table display.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["botmem", "context", "--json", "-vv", "--db", "/tmp/x.db"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.command, Commands::Context));
    }

    #[test]
    fn test_ingest_text_is_optional() {
        let cli = Cli::try_parse_from(["botmem", "ingest"]).unwrap();
        assert!(matches!(cli.command, Commands::Ingest { text: None }));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
        assert_eq!(truncate("héllo wörld", 6), "hél...");
    }
}

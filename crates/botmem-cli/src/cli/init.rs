//! `botmem init`: write `config.toml` in the data directory.
//!
//! Non-interactive: everything comes from flags. An existing config is only
//! replaced after confirmation (or with `--force`).

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;
use dialoguer::Confirm;

use botmem_infra::config::{config_exists, config_path, save_config};
use botmem_infra::secret::resolve_api_key;
use botmem_types::config::{AppConfig, EmbeddingsConfig, LlmConfig};
use botmem_types::llm::ProviderType;

/// Flags for `botmem init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Extraction backend: claude, anthropic or ollama.
    #[arg(long, default_value = "claude")]
    pub provider: ProviderType,

    /// Backend model (defaults per backend).
    #[arg(long)]
    pub model: Option<String>,

    /// Anthropic API key. ANTHROPIC_API_KEY is used when omitted.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Ollama base URL for the extraction backend.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Enable Ollama embeddings for archival facts.
    #[arg(long)]
    pub embeddings: bool,

    /// Embedding model.
    #[arg(long)]
    pub embedding_model: Option<String>,

    /// Ollama base URL for embeddings.
    #[arg(long)]
    pub embedding_url: Option<String>,

    /// Expected embedding vector length.
    #[arg(long)]
    pub embedding_dimension: Option<usize>,

    /// Overwrite an existing config without asking.
    #[arg(long)]
    pub force: bool,
}

/// Write the config described by `args` into `data_dir`.
pub async fn init(data_dir: &Path, args: &InitArgs, json: bool) -> Result<()> {
    if config_exists(data_dir).await && !args.force {
        if json {
            bail!(
                "config already exists at {} -- pass --force to overwrite",
                config_path(data_dir).display()
            );
        }
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Overwrite existing config at {}?",
                style(config_path(data_dir).display()).yellow()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let config = config_from_args(args);
    let path = save_config(data_dir, &config)
        .await
        .context("Failed to write config")?;

    let has_key = resolve_api_key(&config.llm).is_some();

    if json {
        let result = serde_json::json!({
            "path": path.display().to_string(),
            "provider": config.llm.provider.to_string(),
            "model": config.llm.resolved_model(),
            "embeddings": config.embeddings.enabled,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Wrote {}",
        style("ok").green(),
        style(path.display()).cyan()
    );
    println!(
        "    backend    {} ({})",
        style(config.llm.provider).bold(),
        config.llm.resolved_model()
    );
    println!(
        "    embeddings {}",
        if config.embeddings.enabled {
            format!("{} ({})", style("on").green(), config.embeddings.model)
        } else {
            style("off").dim().to_string()
        }
    );
    if config.llm.provider == ProviderType::Anthropic && !has_key {
        println!();
        println!(
            "  {} No API key configured. Set ANTHROPIC_API_KEY or rerun with --api-key.",
            style("!").yellow().bold()
        );
    }
    println!();
    Ok(())
}

fn config_from_args(args: &InitArgs) -> AppConfig {
    let defaults = EmbeddingsConfig::default();
    let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

    AppConfig {
        llm: LlmConfig {
            provider: args.provider,
            model: non_empty(&args.model).unwrap_or_default(),
            api_key: non_empty(&args.api_key),
            base_url: non_empty(&args.base_url),
        },
        embeddings: EmbeddingsConfig {
            enabled: args.embeddings,
            model: non_empty(&args.embedding_model).unwrap_or(defaults.model),
            base_url: non_empty(&args.embedding_url).unwrap_or(defaults.base_url),
            dimension: args.embedding_dimension.unwrap_or(defaults.dimension),
        },
    }
}

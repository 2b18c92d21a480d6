//! Configuration file load/save.
//!
//! `config.toml` lives in the data directory. Commands that need a backend
//! use [`load_config`], which treats a missing file as an error; commands that
//! only read memory use [`load_config_or_default`].

use std::path::{Path, PathBuf};

use botmem_types::config::AppConfig;
use botmem_types::error::ConfigError;

const CONFIG_FILE: &str = "config.toml";

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

pub async fn config_exists(data_dir: &Path) -> bool {
    tokio::fs::try_exists(config_path(data_dir))
        .await
        .unwrap_or(false)
}

/// Load `{data_dir}/config.toml`. A missing file is `ConfigError::Missing`.
pub async fn load_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::Missing(path.display().to_string()));
        }
        Err(err) => return Err(ConfigError::Io(err)),
    };

    toml::from_str::<AppConfig>(&content)
        .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))
}

/// Load the config, falling back to defaults when it is missing or malformed.
pub async fn load_config_or_default(data_dir: &Path) -> AppConfig {
    match load_config(data_dir).await {
        Ok(config) => config,
        Err(ConfigError::Missing(path)) => {
            tracing::debug!("No config.toml found at {path}, using defaults");
            AppConfig::default()
        }
        Err(err) => {
            tracing::warn!("{err}, using defaults");
            AppConfig::default()
        }
    }
}

/// Write the config, creating the data directory. The file is owner-only on unix
/// because it may hold an API key.
pub async fn save_config(data_dir: &Path, config: &AppConfig) -> Result<PathBuf, ConfigError> {
    tokio::fs::create_dir_all(data_dir).await?;

    let content = toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))?;
    let path = config_path(data_dir);
    tokio::fs::write(&path, content).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).await?;
    }

    tracing::debug!(path = %path.display(), "config saved");
    Ok(path)
}

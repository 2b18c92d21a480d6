//! Data directory layout for botmem.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "BOTMEM_DATA_DIR";

const DB_FILE: &str = "botmem.db";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `BOTMEM_DATA_DIR` environment variable
/// 2. `~/.botmem`
/// 3. `.botmem` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
}

fn data_dir_from(override_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.as_os_str().is_empty()) {
        return dir;
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".botmem");
    }
    PathBuf::from(".botmem")
}

/// Default database file inside `data_dir`.
pub fn default_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dir = data_dir_from(Some(PathBuf::from("/tmp/botmem-test")));
        assert_eq!(dir, PathBuf::from("/tmp/botmem-test"));
    }

    #[test]
    fn test_empty_override_falls_back() {
        let dir = data_dir_from(Some(PathBuf::new()));
        assert!(dir.ends_with(".botmem"));
    }

    #[test]
    fn test_default_db_path() {
        let path = default_db_path(Path::new("/data"));
        assert_eq!(path, PathBuf::from("/data/botmem.db"));
    }
}

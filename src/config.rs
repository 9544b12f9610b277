//! Configuration loading.
//!
//! Settings live in `<data dir>/config.toml`. Every key is optional; a
//! missing file means defaults, and a file that fails to parse is reported
//! as a warning so startup is never blocked by it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Owner recorded on tasks, projects and tags created from this machine.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Snapshot name; the file is `<storage_name>.json` in the data dir.
    #[serde(default = "default_storage_name")]
    pub storage_name: String,

    /// Overrides where the snapshot is kept.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            storage_name: default_storage_name(),
            data_dir: None,
        }
    }
}

fn default_user_id() -> String {
    "user1".to_string()
}

fn default_storage_name() -> String {
    "taskflow-storage".to_string()
}

impl Config {
    /// Parse `path`; `Ok(None)` when the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Config>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).map(Some).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load `config.toml` from `dir`, falling back to defaults on any problem.
    pub fn load_or_default(dir: &Path) -> Config {
        let path = dir.join(CONFIG_FILE);
        match Config::read(&path) {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                warn!(error = %e, "ignoring config file");
                Config::default()
            }
        }
    }

    /// Full path of the snapshot file for a given home data dir.
    pub fn storage_path(&self, home_dir: &Path) -> PathBuf {
        self.data_dir
            .as_deref()
            .unwrap_or(home_dir)
            .join(format!("{}.json", self.storage_name))
    }
}

/// `$HOME/.taskflow`, or `./.taskflow` when `HOME` is unset.
pub fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".taskflow")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(dir.path());
        assert_eq!(config, Config::default());
        assert_eq!(
            config.storage_path(dir.path()),
            dir.path().join("taskflow-storage.json")
        );
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "user_id = \"ana\"\n").unwrap();
        let config = Config::load_or_default(dir.path());
        assert_eq!(config.user_id, "ana");
        assert_eq!(config.storage_name, "taskflow-storage");
    }

    #[test]
    fn data_dir_overrides_location() {
        let config = Config {
            data_dir: Some(PathBuf::from("/srv/tasks")),
            storage_name: "mine".into(),
            ..Default::default()
        };
        assert_eq!(
            config.storage_path(Path::new("/home/x/.taskflow")),
            PathBuf::from("/srv/tasks/mine.json")
        );
    }

    #[test]
    fn invalid_file_is_an_error_but_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "user_id = [").unwrap();
        assert!(matches!(Config::read(&path), Err(Error::Config { .. })));
        assert_eq!(Config::load_or_default(dir.path()), Config::default());
    }
}

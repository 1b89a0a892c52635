use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::store::{CharacterStore, FileStorage, DEFAULT_STORAGE_KEY};

pub const DEFAULT_CONFIG_FILE: &str = "charsheet.yaml";
pub const DATA_DIR_ENV: &str = "CHARSHEET_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "snake_case")]
pub struct StoreConfig {
    /// Directory holding `<storage_key>.json`.
    pub data_dir: PathBuf,
    pub storage_key: String,
    /// Indent the stored JSON.
    pub pretty: bool,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".charsheet"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            pretty: false,
            log_level: "warn".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        // An empty file is a valid, all-default config.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("failed to parse config YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("invalid config: {}", path.display()))
    }

    /// Explicit path must exist; otherwise use `charsheet.yaml` in `cwd` when
    /// present, or defaults.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let candidate = cwd.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    Self::load(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply `CHARSHEET_DATA_DIR` when set and non-empty.
    pub fn with_env_override(mut self, data_dir: Option<String>) -> Self {
        if let Some(dir) = data_dir.filter(|d| !d.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn open_store(&self) -> CharacterStore<FileStorage> {
        CharacterStore::open_with_key(FileStorage::new(&self.data_dir), self.storage_key.clone())
            .with_pretty(self.pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = StoreConfig::from_yaml_str("data_dir: /tmp/sheets\npretty: true\n").unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/sheets"));
        assert!(cfg.pretty);
        assert_eq!(cfg.storage_key, "characters");
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(StoreConfig::from_yaml_str("\n").unwrap(), StoreConfig::default());
    }

    #[test]
    fn unknown_config_keys_fail() {
        assert!(StoreConfig::from_yaml_str("colour: blue\n").is_err());
    }

    #[test]
    fn env_override_replaces_data_dir() {
        let cfg = StoreConfig::default().with_env_override(Some("/srv/chars".into()));
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/chars"));
        let cfg = StoreConfig::default().with_env_override(Some("  ".into()));
        assert_eq!(cfg.data_dir, PathBuf::from(".charsheet"));
    }

    #[test]
    fn discover_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = StoreConfig::discover(None, dir.path()).unwrap();
        assert_eq!(cfg, StoreConfig::default());
        assert!(StoreConfig::discover(Some(&dir.path().join("missing.yaml")), dir.path()).is_err());
    }
}

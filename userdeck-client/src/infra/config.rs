use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infra::constants::defaults;

pub const SERVER_URL_ENV: &str = "USERDECK_SERVER_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub default_page_size: u32,
    pub search_debounce_ms: u64,
    pub stale_after_secs: u64,
    pub evict_after_secs: u64,
    pub view_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".to_string(),
            default_page_size: defaults::PAGE_SIZE,
            search_debounce_ms: defaults::SEARCH_DEBOUNCE_MS,
            stale_after_secs: defaults::STALE_AFTER_SECS,
            evict_after_secs: defaults::EVICT_AFTER_SECS,
            view_id: defaults::VIEW_ID.to_string(),
        }
    }
}

impl Config {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Never below [`defaults::MIN_STALE_AFTER_SECS`], even for a config
    /// that skipped [`Config::load`].
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(
            self.stale_after_secs.max(defaults::MIN_STALE_AFTER_SECS),
        )
    }

    /// Never shorter than the stale window.
    pub fn evict_after(&self) -> Duration {
        Duration::from_secs(self.evict_after_secs).max(self.stale_after())
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "userdeck", "userdeck")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load from the platform config file, then let the environment
    /// override the server URL.
    pub fn load() -> Self {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => {
                Self::load_from(&path).unwrap_or_else(|e| {
                    log::warn!("[Config] Ignoring {}: {:#}", path.display(), e);
                    Self::default()
                })
            }
            _ => Self::default(),
        };

        if let Ok(server_url) = std::env::var(SERVER_URL_ENV) {
            config.server_url = server_url;
        }

        config.sanitize()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config.sanitize())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn sanitize(mut self) -> Self {
        if self.default_page_size == 0 {
            self.default_page_size = defaults::PAGE_SIZE;
        }
        if self.view_id.trim().is_empty() {
            self.view_id = defaults::VIEW_ID.to_string();
        }
        self.stale_after_secs =
            self.stale_after_secs.max(defaults::MIN_STALE_AFTER_SECS);
        self.evict_after_secs = self.evict_after_secs.max(self.stale_after_secs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server_url":"http://10.0.0.5:8080","default_page_size":0}"#)
            .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server_url, "http://10.0.0.5:8080");
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.view_id, "users");
    }

    #[test]
    fn zero_windows_are_raised_to_the_minimum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"stale_after_secs":0,"evict_after_secs":0}"#)
            .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.stale_after_secs, 1);
        assert_eq!(config.evict_after_secs, 1);

        let unsanitized = Config {
            stale_after_secs: 0,
            evict_after_secs: 0,
            ..Config::default()
        };
        assert_eq!(unsanitized.stale_after(), Duration::from_secs(1));
        assert_eq!(unsanitized.evict_after(), Duration::from_secs(1));
    }

    #[test]
    fn save_then_load_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            default_page_size: 25,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}

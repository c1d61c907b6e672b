use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

/// Which storage backend the session opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Local,
    Remote,
}

/// Application configuration loaded from TOML config file.
/// All fields have sensible defaults — the config file is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Custom database path (overrides XDG default).
    pub db_path: Option<PathBuf>,
    /// Storage backend. The remote backend needs `[remote]` filled in.
    pub backend: Backend,
    /// Search behavior.
    pub search: SearchConfig,
    /// Remote document store settings (remote backend only).
    pub remote: RemoteConfig,
    /// iTunes catalog lookup settings.
    pub itunes: ItunesConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiescence window before a typed query is applied, in ms.
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: crate::search::DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the document store API.
    pub base_url: String,
    /// Per-user namespace under the store.
    pub user_id: String,
    /// Live snapshot poll interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            user_id: String::new(),
            poll_interval_ms: 2000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ItunesConfig {
    /// Store country for catalog lookups.
    pub country: String,
    /// Candidates per lookup (capped at 10).
    pub limit: usize,
}

impl Default for ItunesConfig {
    fn default() -> Self {
        Self {
            country: "JP".to_string(),
            limit: crate::suggest::MAX_RESULTS,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/ohako/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match config_path {
            Some(path) if path.exists() => {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => {
                        match toml::from_str::<AppConfig>(&contents) {
                            Ok(config) => {
                                log::info!("Loaded config from {}", path.display());
                                config
                            }
                            Err(e) => {
                                log::warn!(
                                    "Failed to parse {}: {}. Using defaults.",
                                    path.display(),
                                    e
                                );
                                Self::default()
                            }
                        }
                    }
                    Err(e) => {
                        log::warn!(
                            "Failed to read {}: {}. Using defaults.",
                            path.display(),
                            e
                        );
                        Self::default()
                    }
                }
            }
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Resolve the default database path using XDG data directory.
pub fn default_db_path() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", crate::APP_NAME) {
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).ok();
        data_dir.join("ohako.db")
    } else {
        // Fallback: current directory
        PathBuf::from("ohako.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.backend, Backend::Local);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.remote.poll_interval_ms, 2000);
        assert_eq!(config.itunes.country, "JP");
        assert_eq!(config.itunes.limit, 10);
    }

    #[test]
    fn test_partial_config_parses_with_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            backend = "remote"

            [remote]
            base_url = "https://repertoire.example.com/api"
            user_id = "u-1"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, Backend::Remote);
        assert_eq!(config.remote.base_url, "https://repertoire.example.com/api");
        // Unset sections and fields fall back.
        assert_eq!(config.remote.poll_interval_ms, 2000);
        assert_eq!(config.search.debounce_ms, 300);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.backend, Backend::Local);
        assert!(config.db_path.is_none());
    }
}

//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/readlist/config.toml)
//! 3. Environment variables (READLIST_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::merge::MergeMode;

/// Environment variable prefix
const ENV_PREFIX: &str = "READLIST";

/// Name of the collection file inside the data directory
const COLLECTION_FILE: &str = "reading_list.json";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (the reading list file)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Where exports are written when no directory is given
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// Merge mode used by `import` when none is given
    #[serde(default)]
    pub default_import_mode: MergeMode,

    /// Fetch the page title when saving a URL without one
    #[serde(default = "default_fetch_titles")]
    pub fetch_titles: bool,

    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            export_dir: None,
            default_import_mode: MergeMode::default(),
            fetch_titles: default_fetch_titles(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (READLIST_DATA_DIR, READLIST_EXPORT_DIR, ...)
    /// 2. Config file (~/.config/readlist/config.toml or READLIST_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, using `path` instead of the default location when given
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_EXPORT_DIR", ENV_PREFIX)) {
            self.export_dir = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        if let Ok(val) = std::env::var(format!("{}_IMPORT_MODE", ENV_PREFIX)) {
            match val.parse() {
                Ok(mode) => self.default_import_mode = mode,
                Err(e) => warn!("Ignoring {}_IMPORT_MODE: {}", ENV_PREFIX, e),
            }
        }

        if let Ok(val) = std::env::var(format!("{}_FETCH_TITLES", ENV_PREFIX)) {
            self.fetch_titles = val.eq_ignore_ascii_case("true") || val == "1";
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with READLIST_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("readlist")
            .join("config.toml")
    }

    /// Get the path to the reading list file
    pub fn collection_path(&self) -> PathBuf {
        self.data_dir.join(COLLECTION_FILE)
    }

    /// Directory exports go to: the configured one, else the current directory
    pub fn export_dir_or_cwd(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("readlist")
}

fn default_fetch_titles() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "READLIST_DATA_DIR",
        "READLIST_EXPORT_DIR",
        "READLIST_IMPORT_MODE",
        "READLIST_FETCH_TITLES",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.export_dir.is_none());
        assert_eq!(config.default_import_mode, MergeMode::Append);
        assert!(config.fetch_titles);
        assert!(config.data_dir.ends_with("readlist"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();
        assert!(config.collection_path().ends_with("reading_list.json"));
        assert_eq!(config.export_dir_or_cwd(), PathBuf::from("."));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("READLIST_DATA_DIR", "/tmp/readlist-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/readlist-test"));
    }

    #[test]
    fn test_env_override_import_mode() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("READLIST_IMPORT_MODE", "overwrite");
        config.apply_env_overrides();
        assert_eq!(config.default_import_mode, MergeMode::Overwrite);

        // Invalid values are ignored
        env::set_var("READLIST_IMPORT_MODE", "merge");
        config.apply_env_overrides();
        assert_eq!(config.default_import_mode, MergeMode::Overwrite);
    }

    #[test]
    fn test_env_override_export_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("READLIST_EXPORT_DIR", "/tmp/exports");
        config.apply_env_overrides();
        assert_eq!(config.export_dir, Some(PathBuf::from("/tmp/exports")));

        // Empty string clears it
        env::set_var("READLIST_EXPORT_DIR", "");
        config.apply_env_overrides();
        assert!(config.export_dir.is_none());
    }

    #[test]
    fn test_env_override_fetch_titles() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("READLIST_FETCH_TITLES", "false");
        config.apply_env_overrides();
        assert!(!config.fetch_titles);

        env::set_var("READLIST_FETCH_TITLES", "1");
        config.apply_env_overrides();
        assert!(config.fetch_titles);
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/readlist"),
            export_dir: Some(PathBuf::from("/exports")),
            default_import_mode: MergeMode::Overwrite,
            fetch_titles: false,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("default_import_mode = \"overwrite\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.export_dir, config.export_dir);
        assert_eq!(parsed.default_import_mode, MergeMode::Overwrite);
        assert!(!parsed.fetch_titles);
    }

    #[test]
    fn test_load_partial_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let data_dir = temp_dir.path().join("custom");

        let toml = format!(
            "data_dir = {:?}\ndefault_import_mode = \"overwrite\"\n",
            data_dir.display().to_string()
        );
        std::fs::write(&config_path, toml).unwrap();

        let config = Config::load_from_path(&config_path).unwrap();
        assert_eq!(config.data_dir, data_dir);
        assert_eq!(config.default_import_mode, MergeMode::Overwrite);
        // Unset keys fall back to defaults
        assert!(config.fetch_titles);
        assert!(config.export_dir.is_none());
    }

    #[test]
    fn test_load_from_path_and_save() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            ..Config::default()
        };
        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(loaded.data_dir, temp_dir.path().join("data"));
        assert!(loaded.data_dir.exists());
    }
}

//! # Pharmacy Configuration
//!
//! Configuration management for the orchestration layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     PHARMACY_DB_PATH=/var/lib/pharmacy/pharmacy.db                      │
//! │     PHARMACY_LOW_STOCK_THRESHOLD=5                                      │
//! │     PHARMACY_LOOKUP_MODE=linear                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/pharmacy-catalog/pharmacy.toml (Linux)                    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     binary lookup, threshold 10, sort by name                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pharmacy.toml
//! database_path = "/var/lib/pharmacy/pharmacy.db"
//! low_stock_threshold = 10
//! lookup = "binary"       # linear | binary
//! default_sort = "name"   # name | id | price
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{SystemError, SystemResult};
use pharmacy_core::ordering::SortKey;
use pharmacy_db::DbConfig;

pub const ENV_DB_PATH: &str = "PHARMACY_DB_PATH";
pub const ENV_LOW_STOCK_THRESHOLD: &str = "PHARMACY_LOW_STOCK_THRESHOLD";
pub const ENV_LOOKUP_MODE: &str = "PHARMACY_LOOKUP_MODE";

// =============================================================================
// Lookup Mode
// =============================================================================

/// How `Pharmacy::find_drug` locates a drug by key.
///
/// ```text
/// LINEAR   scans the catalog in its current order, O(n)
/// BINARY   halves the catalog's key-ordered index, O(log n)
/// ```
///
/// Both modes return the same drug for the same catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    Linear,
    #[default]
    Binary,
}

impl std::fmt::Display for LookupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupMode::Linear => write!(f, "linear"),
            LookupMode::Binary => write!(f, "binary"),
        }
    }
}

impl std::str::FromStr for LookupMode {
    type Err = SystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(LookupMode::Linear),
            "binary" => Ok(LookupMode::Binary),
            other => Err(SystemError::InvalidConfig(format!(
                "Unknown lookup mode: '{}'. Valid options: linear, binary",
                other
            ))),
        }
    }
}

// =============================================================================
// Pharmacy Configuration
// =============================================================================

/// Complete orchestration configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyConfig {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Drugs with stock strictly below this count as low stock.
    /// Default: 10
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u32,

    /// Key lookup strategy.
    #[serde(default)]
    pub lookup: LookupMode,

    /// Ordering applied by `Pharmacy::sort_default`.
    #[serde(default)]
    pub default_sort: SortKey,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "pharmacy", "pharmacy-catalog")
        .map(|dirs| dirs.data_dir().join("pharmacy.db"))
        .unwrap_or_else(|| PathBuf::from("pharmacy.db"))
}

fn default_low_stock_threshold() -> u32 {
    10
}

impl Default for PharmacyConfig {
    fn default() -> Self {
        PharmacyConfig {
            database_path: default_database_path(),
            low_stock_threshold: default_low_stock_threshold(),
            lookup: LookupMode::default(),
            default_sort: SortKey::default(),
        }
    }
}

impl PharmacyConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pharmacy.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SystemResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading pharmacy config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load pharmacy config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SystemResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SystemError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SystemError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SystemError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Pharmacy config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SystemResult<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(SystemError::InvalidConfig(
                "database_path must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Database settings derived from this config.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
    }

    /// Applies `PHARMACY_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key/value source. Unparseable values are
    /// logged and ignored.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var(ENV_DB_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = PathBuf::from(path);
        }

        if let Some(threshold) = var(ENV_LOW_STOCK_THRESHOLD) {
            match threshold.trim().parse::<u32>() {
                Ok(t) => self.low_stock_threshold = t,
                Err(_) => warn!(value = %threshold, "Invalid low stock threshold in environment"),
            }
        }

        if let Some(mode) = var(ENV_LOOKUP_MODE) {
            match mode.parse::<LookupMode>() {
                Ok(parsed) => {
                    debug!(mode = %parsed, "Overriding lookup mode from environment");
                    self.lookup = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring lookup mode from environment"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pharmacy", "pharmacy-catalog")
            .map(|dirs| dirs.config_dir().join("pharmacy.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_lookup_mode_parsing() {
        assert_eq!("linear".parse::<LookupMode>().unwrap(), LookupMode::Linear);
        assert_eq!("BINARY".parse::<LookupMode>().unwrap(), LookupMode::Binary);
        assert!("scan".parse::<LookupMode>().is_err());
        assert!("bisect".parse::<LookupMode>().is_err());
        assert!("hash".parse::<LookupMode>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = PharmacyConfig::default();
        assert_eq!(config.low_stock_threshold, 10);
        assert_eq!(config.lookup, LookupMode::Binary);
        assert_eq!(config.default_sort, SortKey::Name);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PharmacyConfig = toml::from_str(
            r#"
            lookup = "linear"
            default_sort = "price"
            "#,
        )
        .unwrap();

        assert_eq!(config.lookup, LookupMode::Linear);
        assert_eq!(config.default_sort, SortKey::Price);
        assert_eq!(config.low_stock_threshold, 10);
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = PharmacyConfig::default();
        config.apply_overrides(env(&[
            (ENV_DB_PATH, "/tmp/override.db"),
            (ENV_LOW_STOCK_THRESHOLD, "3"),
            (ENV_LOOKUP_MODE, "linear"),
        ]));

        assert_eq!(config.database_path, PathBuf::from("/tmp/override.db"));
        assert_eq!(config.low_stock_threshold, 3);
        assert_eq!(config.lookup, LookupMode::Linear);
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = PharmacyConfig::default();
        config.apply_overrides(env(&[
            (ENV_LOW_STOCK_THRESHOLD, "-1"),
            (ENV_LOOKUP_MODE, "hash"),
        ]));

        assert_eq!(config.low_stock_threshold, 10);
        assert_eq!(config.lookup, LookupMode::Binary);
    }

    #[test]
    fn test_empty_database_path_is_invalid() {
        let config = PharmacyConfig {
            database_path: PathBuf::new(),
            ..PharmacyConfig::default()
        };
        assert!(matches!(config.validate(), Err(SystemError::InvalidConfig(_))));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "pharmacy-config-test-{}.toml",
            std::process::id()
        ));
        let config = PharmacyConfig {
            database_path: PathBuf::from("/tmp/pharmacy.db"),
            low_stock_threshold: 4,
            lookup: LookupMode::Linear,
            default_sort: SortKey::Id,
        };

        config.save(Some(path.clone())).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: PharmacyConfig = toml::from_str(&contents).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }
}

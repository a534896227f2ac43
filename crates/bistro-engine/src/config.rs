//! # Floor Configuration
//!
//! Configuration for the floor engine and the server wrapping it.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BISTROS_TABLE_COUNT=20                                             │
//! │     BISTROS_USAGE_SOURCE=live                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/bistros/bistros.toml (Linux)                             │
//! │     ~/Library/Application Support/com.bistros.floor/bistros.toml       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     12 tables, demo seed, lazy tables, port 8080                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [floor]
//! table_count = 12
//! seed_demo = true
//! lazy_tables = true
//!
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [recommendation]
//! free_ratio_threshold = 0.8
//! slots = 3
//! usage_source = "static"   # static | live
//!
//! [[history]]
//! tableId = "4"
//! revenue = 450000
//! occupancyCount = 100
//! ```

use std::path::PathBuf;

use bistro_core::recommendation::AllocationParams;
use bistro_core::{seed, TablePerformance, DEFAULT_TABLE_COUNT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Usage Source
// =============================================================================

/// Where table usage counts for recommendations come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageSource {
    /// Configured `[[history]]` only.
    #[default]
    Static,
    /// Configured history plus tables closed since startup.
    Live,
}

impl std::fmt::Display for UsageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsageSource::Static => write!(f, "static"),
            UsageSource::Live => write!(f, "live"),
        }
    }
}

impl std::str::FromStr for UsageSource {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" => Ok(UsageSource::Static),
            "live" | "events" => Ok(UsageSource::Live),
            other => Err(EngineError::InvalidConfig(format!(
                "Unknown usage source: '{}'. Valid options: static, live",
                other
            ))),
        }
    }
}

// =============================================================================
// Floor Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorSettings {
    /// Tables `1..=table_count` created at startup.
    #[serde(default = "default_table_count")]
    pub table_count: u32,

    /// Preload the demo sessions on tables 2, 3 and 4.
    #[serde(default = "default_true")]
    pub seed_demo: bool,

    /// Create unknown table ids on first reference instead of failing.
    #[serde(default = "default_true")]
    pub lazy_tables: bool,
}

fn default_table_count() -> u32 {
    DEFAULT_TABLE_COUNT
}

fn default_true() -> bool {
    true
}

impl Default for FloorSettings {
    fn default() -> Self {
        FloorSettings {
            table_count: default_table_count(),
            seed_demo: true,
            lazy_tables: true,
        }
    }
}

// =============================================================================
// Server Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Recommendation Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSettings {
    /// Free-table share above which a medium-rotation table is mixed in.
    #[serde(default = "default_free_ratio_threshold")]
    pub free_ratio_threshold: f64,

    #[serde(default = "default_slots")]
    pub slots: usize,

    #[serde(default)]
    pub usage_source: UsageSource,
}

fn default_free_ratio_threshold() -> f64 {
    0.8
}

fn default_slots() -> usize {
    3
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        RecommendationSettings {
            free_ratio_threshold: default_free_ratio_threshold(),
            slots: default_slots(),
            usage_source: UsageSource::default(),
        }
    }
}

impl RecommendationSettings {
    pub fn params(&self) -> AllocationParams {
        AllocationParams {
            free_ratio_threshold: self.free_ratio_threshold,
            slots: self.slots,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete configuration for a BistrOS floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BistroConfig {
    #[serde(default)]
    pub floor: FloorSettings,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub recommendation: RecommendationSettings,

    /// Historical performance per table.
    #[serde(default = "seed::demo_history")]
    pub history: Vec<TablePerformance>,
}

impl Default for BistroConfig {
    fn default() -> Self {
        BistroConfig {
            floor: FloorSettings::default(),
            server: ServerSettings::default(),
            recommendation: RecommendationSettings::default(),
            history: seed::demo_history(),
        }
    }
}

impl BistroConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (bistros.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading floor config from file");
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
            warn!("Failed to load floor config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> EngineResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| EngineError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| EngineError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Floor config saved");
        Ok(())
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.floor.table_count == 0 && !self.floor.lazy_tables {
            return Err(EngineError::InvalidConfig(
                "table_count is 0 and lazy_tables is off: no table could ever be used".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.recommendation.free_ratio_threshold) {
            return Err(EngineError::InvalidConfig(format!(
                "free_ratio_threshold must be between 0 and 1, got {}",
                self.recommendation.free_ratio_threshold
            )));
        }

        if self.recommendation.slots == 0 {
            return Err(EngineError::InvalidConfig(
                "slots must be greater than 0".into(),
            ));
        }

        if self.server.port == 0 {
            return Err(EngineError::InvalidConfig("port must not be 0".into()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `BISTROS_*` overrides from any key lookup. Unparseable values
    /// are skipped with a warning.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(count) = lookup("BISTROS_TABLE_COUNT") {
            match count.parse::<u32>() {
                Ok(n) => {
                    debug!(table_count = n, "Overriding table count from environment");
                    self.floor.table_count = n;
                }
                Err(_) => warn!(value = %count, "Ignoring invalid BISTROS_TABLE_COUNT"),
            }
        }

        if let Some(seed) = lookup("BISTROS_SEED_DEMO") {
            match parse_flag(&seed) {
                Some(b) => self.floor.seed_demo = b,
                None => warn!(value = %seed, "Ignoring invalid BISTROS_SEED_DEMO"),
            }
        }

        if let Some(lazy) = lookup("BISTROS_LAZY_TABLES") {
            match parse_flag(&lazy) {
                Some(b) => self.floor.lazy_tables = b,
                None => warn!(value = %lazy, "Ignoring invalid BISTROS_LAZY_TABLES"),
            }
        }

        if let Some(port) = lookup("BISTROS_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                self.server.port = p;
            }
        }

        if let Some(addr) = lookup("BISTROS_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(source) = lookup("BISTROS_USAGE_SOURCE") {
            match source.parse() {
                Ok(parsed) => {
                    debug!(source = %source, "Overriding usage source from environment");
                    self.recommendation.usage_source = parsed;
                }
                Err(e) => warn!("{}", e),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bistros", "floor")
            .map(|dirs| dirs.config_dir().join("bistros.toml"))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = BistroConfig::default();
        assert_eq!(config.floor.table_count, 12);
        assert!(config.floor.seed_demo);
        assert!(config.floor.lazy_tables);
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.recommendation.usage_source, UsageSource::Static);
        assert_eq!(config.history.len(), 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: BistroConfig = toml::from_str(
            r#"
            [floor]
            table_count = 20

            [recommendation]
            usage_source = "live"

            [[history]]
            tableId = "1"
            revenue = 1000
            occupancyCount = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.floor.table_count, 20);
        assert!(config.floor.lazy_tables);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.recommendation.slots, 3);
        assert_eq!(config.recommendation.usage_source, UsageSource::Live);
        assert_eq!(config.history.len(), 1);
        assert_eq!(config.history[0].occupancy_count, 3);
    }

    #[test]
    fn test_config_validation() {
        let mut config = BistroConfig::default();

        config.recommendation.free_ratio_threshold = 1.5;
        assert!(config.validate().is_err());

        config.recommendation.free_ratio_threshold = 0.8;
        config.recommendation.slots = 0;
        assert!(config.validate().is_err());

        config.recommendation.slots = 3;
        config.floor.table_count = 0;
        assert!(config.validate().is_ok());
        config.floor.lazy_tables = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BISTROS_TABLE_COUNT", "30"),
            ("BISTROS_SEED_DEMO", "false"),
            ("BISTROS_LAZY_TABLES", "no"),
            ("BISTROS_PORT", "9000"),
            ("BISTROS_USAGE_SOURCE", "LIVE"),
        ]
        .into_iter()
        .collect();

        let mut config = BistroConfig::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.floor.table_count, 30);
        assert!(!config.floor.seed_demo);
        assert!(!config.floor.lazy_tables);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.recommendation.usage_source, UsageSource::Live);
    }

    #[test]
    fn test_invalid_overrides_are_skipped() {
        let mut config = BistroConfig::default();
        config.apply_overrides(|k| match k {
            "BISTROS_TABLE_COUNT" => Some("many".into()),
            "BISTROS_USAGE_SOURCE" => Some("crystal_ball".into()),
            _ => None,
        });
        assert_eq!(config.floor.table_count, 12);
        assert_eq!(config.recommendation.usage_source, UsageSource::Static);
    }

    #[test]
    fn test_toml_serialization() {
        let config = BistroConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[floor]"));
        assert!(toml_str.contains("[recommendation]"));
        assert!(toml_str.contains("[[history]]"));
    }

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("bistros-test-{}", uuid::Uuid::new_v4().simple()))
            .join("bistros.toml")
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_config_path();
        let mut config = BistroConfig::default();
        config.recommendation.slots = 4;
        config.recommendation.free_ratio_threshold = 0.6;
        config.history.truncate(5);

        config.save(Some(path.clone())).unwrap();
        let loaded = BistroConfig::load(Some(path.clone())).unwrap();

        assert_eq!(loaded.recommendation.slots, 4);
        assert_eq!(loaded.recommendation.free_ratio_threshold, 0.6);
        assert_eq!(loaded.history.len(), 5);
        assert_eq!(loaded.history[0].table_id, config.history[0].table_id);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let path = temp_config_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::write(&path, "[recommendation\nslots = ").unwrap();

        assert!(BistroConfig::load(Some(path.clone())).is_err());
        let config = BistroConfig::load_or_default(Some(path.clone()));
        assert_eq!(config.recommendation.slots, 3);
        assert_eq!(config.floor.table_count, 12);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let config = BistroConfig::load(Some(temp_config_path())).unwrap();
        assert_eq!(config.recommendation.slots, 3);
    }
}

//! Configuration

use crate::strategy::StrategyKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::Path;
use tracing::{info, warn};

/// Default capacity of each key queue
pub const DEFAULT_KEY_CAPACITY: usize = 100;

/// Configuration for the queue manager
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of tasks held by one key queue
    pub key_capacity: usize,

    /// Strategy used to pick a key for new tasks
    pub strategy: StrategyKind,

    /// Keys registered at startup, in order
    pub keys: Vec<String>,

    /// Never pick the source key when rebalancing a task automatically
    pub exclude_source_on_auto_transform: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_capacity: DEFAULT_KEY_CAPACITY,
            strategy: StrategyKind::RoundRobin,
            keys: Vec::new(),
            exclude_source_on_auto_transform: true,
        }
    }
}

impl Config {
    /// Create a new configuration with a custom key capacity
    pub fn new(key_capacity: usize) -> Self {
        Self {
            key_capacity,
            ..Default::default()
        }
    }

    /// Load configuration from file, environment variables, or defaults
    pub fn load() -> crate::Result<Self> {
        // Try to load from config file specified in environment variable
        if let Ok(config_path) = env::var("KEYED_QUEUE_CONFIG") {
            info!("Loading config from KEYED_QUEUE_CONFIG: {}", config_path);
            return Self::from_file(&config_path);
        }

        let default_paths = [
            "config.yaml",
            "config.toml",
            "config/config.yaml",
            "config/config.toml",
        ];

        for path in default_paths {
            if Path::new(path).exists() {
                info!("Loading config from: {}", path);
                return Self::from_file(path);
            }
        }

        match Self::from_env() {
            Ok(config) => {
                info!("Loaded config from environment variables");
                return Ok(config);
            }
            Err(crate::TaskQueueError::ConfigError(msg)) if msg == NO_ENV_VARS => {}
            Err(e) => return Err(e),
        }

        warn!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .map_err(|e| {
                crate::TaskQueueError::ConfigError(format!("Failed to load config file: {}", e))
            })?;

        let config: Config = settings.try_deserialize().map_err(|e| {
            crate::TaskQueueError::ConfigError(format!("Failed to parse config: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Self::default();
        let mut found_any = false;

        if let Ok(val) = env::var("KEYED_QUEUE_KEY_CAPACITY") {
            config.key_capacity = val.parse().map_err(|e| {
                crate::TaskQueueError::ConfigError(format!("Invalid KEY_CAPACITY: {}", e))
            })?;
            found_any = true;
        }

        if let Ok(val) = env::var("KEYED_QUEUE_STRATEGY") {
            config.strategy = val.parse()?;
            found_any = true;
        }

        if let Ok(val) = env::var("KEYED_QUEUE_KEYS") {
            config.keys = val
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(String::from)
                .collect();
            found_any = true;
        }

        if let Ok(val) = env::var("KEYED_QUEUE_EXCLUDE_SOURCE") {
            config.exclude_source_on_auto_transform = val.parse().map_err(|e| {
                crate::TaskQueueError::ConfigError(format!("Invalid EXCLUDE_SOURCE: {}", e))
            })?;
            found_any = true;
        }

        if !found_any {
            return Err(crate::TaskQueueError::ConfigError(NO_ENV_VARS.to_string()));
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.key_capacity == 0 {
            return Err(crate::TaskQueueError::ConfigError(
                "Key capacity must be greater than 0".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for key in &self.keys {
            if !seen.insert(key.as_str()) {
                return Err(crate::TaskQueueError::ConfigError(format!(
                    "Duplicate key in configuration: {}",
                    key
                )));
            }
        }

        Ok(())
    }
}

const NO_ENV_VARS: &str = "No environment variables found";

use crate::error::ConfigError;
use crate::models::config::AppConfig;
use std::fs;
use std::path::PathBuf;

/// Configuration manager for scorer settings.
///
/// Only settings live here (benchmarks, default build, OCR endpoint);
/// equipment readings are never written to disk.
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a manager rooted in the platform config directory
    /// (e.g. `~/.config/gear-grader/config.json` on Linux).
    ///
    /// The directory is created if it doesn't exist.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("gear-grader");

        Self::with_dir(config_dir)
    }

    /// Create a manager rooted in an explicit directory
    pub fn with_dir(config_dir: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&config_dir)?;
        let config_path = config_dir.join("config.json");

        Ok(Self {
            config_dir,
            config_path,
        })
    }

    /// Save configuration to disk as pretty JSON
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir)?;

        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, json)?;

        tracing::debug!("Saved config to {}", self.config_path.display());
        Ok(())
    }

    /// Load configuration from disk
    ///
    /// If config file doesn't exist, returns default configuration
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_exists() {
            tracing::debug!("No config at {}, using defaults", self.config_path.display());
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)?;
        let config: AppConfig = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is unreadable
    pub fn load_or_default(&self) -> AppConfig {
        self.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config from {}: {}. Using defaults.", self.config_path.display(), e);
            AppConfig::default()
        })
    }

    /// Get the config file path
    pub fn config_file_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Check if config file exists
    pub fn config_exists(&self) -> bool {
        self.config_path.exists()
    }
}

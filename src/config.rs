//! Production configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation and type safety

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Analysis configuration
    pub analysis: AnalysisConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Paths configuration
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// `session_state` value marking a completed session
    pub finished_state: String,
    pub top_users_limit: usize,
    pub raw_rows_limit: usize,
    /// Longest day range the peak usage table may span
    #[serde(default = "default_max_peak_days")]
    pub max_peak_days: usize,
}

fn default_max_peak_days() -> usize {
    36_600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub json_pretty: bool,
    pub color: bool,
    pub timestamp_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Default destination for exported tables
    pub data_directory: PathBuf,
    pub log_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "WARN".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
            },
            analysis: AnalysisConfig {
                finished_state: "finished".to_string(),
                top_users_limit: 15,
                raw_rows_limit: 10_000,
                max_peak_days: default_max_peak_days(),
            },
            output: OutputConfig {
                json_pretty: true,
                color: true,
                timestamp_format: "%c".to_string(),
            },
            paths: PathsConfig {
                data_directory: PathBuf::from("data"),
                log_directory: PathBuf::from("logs"),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        let config_paths = [
            PathBuf::from("steam-stats.toml"),
            PathBuf::from(".steam-stats.toml"),
            dirs::config_dir()
                .map(|d| d.join("steam-stats").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in config_paths.iter().filter(|p| !p.as_os_str().is_empty()) {
            if path.exists() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // Analysis overrides
        if let Ok(val) = env::var("STEAM_STATS_FINISHED_STATE") {
            self.analysis.finished_state = val;
        }
        if let Ok(val) = env::var("STEAM_STATS_TOP_USERS") {
            self.analysis.top_users_limit = val.parse().context("Invalid STEAM_STATS_TOP_USERS")?;
        }
        if let Ok(val) = env::var("STEAM_STATS_RAW_ROWS") {
            self.analysis.raw_rows_limit = val.parse().context("Invalid STEAM_STATS_RAW_ROWS")?;
        }
        if let Ok(val) = env::var("STEAM_STATS_MAX_PEAK_DAYS") {
            self.analysis.max_peak_days =
                val.parse().context("Invalid STEAM_STATS_MAX_PEAK_DAYS")?;
        }

        // Output overrides
        if let Ok(val) = env::var("STEAM_STATS_TIMESTAMP_FORMAT") {
            self.output.timestamp_format = val;
        }
        if let Ok(val) = env::var("STEAM_STATS_JSON_PRETTY") {
            self.output.json_pretty = val.parse().context("Invalid STEAM_STATS_JSON_PRETTY")?;
        }

        // Path overrides
        if let Ok(val) = env::var("STEAM_STATS_DATA_DIR") {
            self.paths.data_directory = PathBuf::from(val);
        }
        if let Ok(val) = env::var("STEAM_STATS_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(anyhow::anyhow!(
                "Log format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            ));
        }

        if !matches!(self.logging.output.as_str(), "console" | "file" | "both") {
            return Err(anyhow::anyhow!(
                "Log output must be 'console', 'file' or 'both', got '{}'",
                self.logging.output
            ));
        }

        if self.analysis.finished_state.trim().is_empty() {
            return Err(anyhow::anyhow!("Finished session state cannot be empty"));
        }

        if self.analysis.top_users_limit == 0 {
            return Err(anyhow::anyhow!("Top users limit must be greater than 0"));
        }

        if self.analysis.raw_rows_limit == 0 {
            return Err(anyhow::anyhow!("Raw rows limit must be greater than 0"));
        }

        if self.analysis.max_peak_days == 0 {
            return Err(anyhow::anyhow!("Max peak days must be greater than 0"));
        }

        if StrftimeItems::new(&self.output.timestamp_format).any(|item| item == Item::Error) {
            return Err(anyhow::anyhow!(
                "Invalid timestamp format: {}",
                self.output.timestamp_format
            ));
        }

        if self.analysis.raw_rows_limit > 100_000 {
            warn!(
                raw_rows_limit = self.analysis.raw_rows_limit,
                "Raw rows limit is very high, table output may be slow"
            );
        }

        // Only file logging needs the directory up front
        if self.logging.output != "console" && !self.paths.log_directory.exists() {
            fs::create_dir_all(&self.paths.log_directory)
                .context("Failed to create log directory")?;
        }

        Ok(())
    }

    /// Save current configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load, validate and install the global configuration.
/// Later calls return the already installed instance.
pub fn init_config() -> Result<&'static Config> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    let config = Config::load()?;
    Ok(CONFIG.get_or_init(|| config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "WARN");
        assert_eq!(config.analysis.finished_state, "finished");
        assert_eq!(config.analysis.top_users_limit, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override() {
        env::set_var("STEAM_STATS_TOP_USERS", "20");
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.analysis.top_users_limit, 20);
        env::remove_var("STEAM_STATS_TOP_USERS");
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.analysis.raw_rows_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.timestamp_format = "%Q".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.output = "syslog".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.max_peak_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_peak_days_defaults_when_absent_from_file() {
        let config: Config = toml::from_str(
            r#"
[logging]
level = "INFO"
format = "pretty"
output = "console"

[analysis]
finished_state = "finished"
top_users_limit = 15
raw_rows_limit = 100

[output]
json_pretty = true
color = true
timestamp_format = "%c"

[paths]
data_directory = "data"
log_directory = "logs"
"#,
        )
        .unwrap();
        assert_eq!(config.analysis.max_peak_days, 36_600);
    }
}

//! Configuration for the interview tracking engine and CLI.

use crate::core::history::DEFAULT_HISTORY_LENGTH;
use crate::core::suspicion::DEFAULT_SUSPICIOUS_ATTENTION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Analyzer thresholds and window sizes
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Which perception sources to consume
    #[serde(default)]
    pub sources: SourceConfig,

    /// Time between analysis ticks
    #[serde(with = "duration_serde", default = "default_tick_interval")]
    pub tick_interval: Duration,

    /// Ticks after which the latest observation of a source counts as absent
    #[serde(default = "default_observation_ttl")]
    pub observation_ttl_ticks: u64,

    /// IANA timezone used when rendering report times
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_tick_interval() -> Duration {
    Duration::from_millis(33)
}

fn default_observation_ttl() -> u64 {
    10
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            sources: SourceConfig::default(),
            tick_interval: default_tick_interval(),
            observation_ttl_ticks: default_observation_ttl(),
            timezone: default_timezone(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("interview-tracking")
            .join("config.json")
    }

    /// Check every field for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analyzer.validate()?;
        if self.tick_interval.is_zero() {
            return Err(ConfigError::Invalid("tick_interval must be positive".into()));
        }
        if self.observation_ttl_ticks == 0 {
            return Err(ConfigError::Invalid(
                "observation_ttl_ticks must be at least 1".into(),
            ));
        }
        self.timezone()?;
        Ok(())
    }

    /// Parsed report timezone.
    pub fn timezone(&self) -> Result<chrono_tz::Tz, ConfigError> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| ConfigError::Invalid(format!("unknown timezone: {}", self.timezone)))
    }
}

/// Analyzer thresholds and window sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Number of frames kept in each history buffer
    pub history_length: usize,
    /// Frames a new emotion must dominate before it is reported
    pub emotion_quorum: usize,
    /// Frames a new posture must dominate before it is reported
    pub posture_quorum: usize,
    /// Smoothed attention below this counts as suspicious
    pub suspicious_attention_threshold: f64,
    /// Smoothed attention at or above this counts as attentive
    pub good_attention_threshold: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            history_length: DEFAULT_HISTORY_LENGTH,
            emotion_quorum: 3,
            posture_quorum: 3,
            suspicious_attention_threshold: DEFAULT_SUSPICIOUS_ATTENTION,
            good_attention_threshold: 0.6,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_length == 0 {
            return Err(ConfigError::Invalid("history_length must be at least 1".into()));
        }
        if self.emotion_quorum == 0 || self.posture_quorum == 0 {
            return Err(ConfigError::Invalid("quorum values must be at least 1".into()));
        }
        for (name, value) in [
            ("suspicious_attention_threshold", self.suspicious_attention_threshold),
            ("good_attention_threshold", self.good_attention_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be within [0, 1]")));
            }
        }
        Ok(())
    }
}

/// Configuration for which perception sources to consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub face: bool,
    pub pose: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            face: true,
            pose: true,
        }
    }
}

impl SourceConfig {
    /// Parse source configuration from a comma-separated string.
    pub fn from_csv(s: &str) -> Self {
        let sources: Vec<String> = s.split(',').map(|s| s.trim().to_lowercase()).collect();

        Self {
            face: sources.iter().any(|s| s == "face" || s == "all"),
            pose: sources.iter().any(|s| s == "pose" || s == "all"),
        }
    }

    /// Check if at least one source is enabled.
    pub fn any_enabled(&self) -> bool {
        self.face || self.pose
    }
}

/// Logging output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Serde support for Duration, stored as milliseconds.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

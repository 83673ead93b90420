//! Configuration for Noema.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::NoemaResult;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "noema.toml";

/// Main configuration for Noema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// AtomStore snapshot settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// PatternEngine settings.
    #[serde(default)]
    pub patterns: PatternsConfig,

    /// ReasoningEngine settings.
    #[serde(default)]
    pub reasoning: ReasoningConfig,

    /// LearningEngine settings.
    #[serde(default)]
    pub learning: LearningConfig,

    /// Recognition cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

/// AtomStore snapshot settings.
///
/// The snapshot is the flat export blob; no other persistence exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON snapshot.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Write the snapshot back after every mutation.
    #[serde(default = "default_true")]
    pub autosave: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            autosave: true,
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(".noema/atoms.json")
}

/// PatternEngine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternsConfig {
    /// Results below this confidence are dropped.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Maximum number of results per recognition.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Keep results below `min_confidence`.
    #[serde(default)]
    pub include_low_confidence: bool,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            max_results: default_max_results(),
            include_low_confidence: false,
        }
    }
}

fn default_min_confidence() -> f64 {
    0.1
}

fn default_max_results() -> usize {
    10
}

/// ReasoningEngine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Maximum number of completion candidates returned.
    #[serde(default = "default_max_completions")]
    pub max_completions: usize,

    /// Separator used when hybrid reasoning joins explanations.
    #[serde(default = "default_explanation_separator")]
    pub explanation_separator: String,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            max_completions: default_max_completions(),
            explanation_separator: default_explanation_separator(),
        }
    }
}

fn default_max_completions() -> usize {
    10
}

fn default_explanation_separator() -> String {
    " | ".to_string()
}

/// LearningEngine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Minimum user history before recommendations are derived.
    #[serde(default = "default_min_history")]
    pub min_history_for_recommendations: usize,

    /// Effectiveness nudge applied per feedback.
    #[serde(default = "default_effectiveness_step")]
    pub effectiveness_step: f64,

    /// Confidence increment per recurring behavior.
    #[serde(default = "default_behavior_step")]
    pub behavior_confidence_step: f64,

    /// Minimum context similarity for a prediction.
    #[serde(default = "default_prediction_threshold")]
    pub prediction_threshold: f64,

    /// Maximum number of predictions returned.
    #[serde(default = "default_max_predictions")]
    pub max_predictions: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            min_history_for_recommendations: default_min_history(),
            effectiveness_step: default_effectiveness_step(),
            behavior_confidence_step: default_behavior_step(),
            prediction_threshold: default_prediction_threshold(),
            max_predictions: default_max_predictions(),
        }
    }
}

fn default_min_history() -> usize {
    10
}

fn default_effectiveness_step() -> f64 {
    0.1
}

fn default_behavior_step() -> f64 {
    0.01
}

fn default_prediction_threshold() -> f64 {
    0.5
}

fn default_max_predictions() -> usize {
    5
}

/// Recognition cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum cache capacity (number of entries).
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Entry time to live in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_capacity() -> usize {
    256
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> NoemaResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> NoemaResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            store: StoreConfig::default(),
            patterns: PatternsConfig::default(),
            reasoning: ReasoningConfig::default(),
            learning: LearningConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    /// Path of the per-user configuration file, if a config dir exists.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("noema").join(CONFIG_FILE_NAME))
    }

    /// Tries the current directory, then the user config dir, then defaults.
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::load(CONFIG_FILE_NAME) {
            return config;
        }

        Self::user_config_path()
            .and_then(|path| Self::load(path).ok())
            .unwrap_or_else(Self::default_config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

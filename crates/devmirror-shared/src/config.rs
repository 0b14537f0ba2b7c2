//! Configuration management for DevMirror.rs
//!
//! Every threshold used by the classifier, the scorer and the trend engine
//! lives here. Components receive their section at construction time.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides (`DEVMIRROR_SCORING__DEPTH_WEIGHT=4`)
pub const ENV_PREFIX: &str = "DEVMIRROR";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "devmirror.toml";

/// Main configuration structure for DevMirror.rs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DevMirrorConfig {
    /// Single-snapshot pattern rules
    pub classifier: ClassifierConfig,

    /// Structural score formula
    pub scoring: ScoringConfig,

    /// Longitudinal trend rules
    pub trend: TrendConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// History storage settings
    pub storage: StorageConfig,
}

/// Thresholds for insights and single-snapshot cognitive labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Depth at or above which nesting is reported as deep
    pub deep_nesting_depth: usize,

    /// Average length above which functions are reported as large
    pub large_function_length: f64,

    /// Complexity above which logic is reported as hard to maintain
    pub high_complexity: f64,

    /// Over-structurer: depth at or above this...
    pub over_structurer_depth: usize,

    /// ...and complexity above this
    pub over_structurer_complexity: f64,

    /// Monolithic builder: average length above this
    pub monolithic_length: f64,

    /// Micro-modular thinker: more functions than this...
    pub micro_modular_min_functions: usize,

    /// ...with average length below this
    pub micro_modular_max_length: f64,

    /// Linear thinker: complexity below this...
    pub linear_max_complexity: f64,

    /// ...and depth at most this
    pub linear_max_depth: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            deep_nesting_depth: 3,
            large_function_length: 30.0,
            high_complexity: 10.0,
            over_structurer_depth: 3,
            over_structurer_complexity: 10.0,
            monolithic_length: 40.0,
            micro_modular_min_functions: 5,
            micro_modular_max_length: 15.0,
            linear_max_complexity: 5.0,
            linear_max_depth: 1,
        }
    }
}

/// Penalties and bonuses of the structural score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Starting score before penalties
    pub base_score: f64,

    pub depth_weight: f64,
    pub depth_cap: f64,

    pub complexity_weight: f64,
    pub complexity_cap: f64,

    /// Average length is divided by this before capping
    pub length_divisor: f64,
    pub length_cap: f64,

    /// Bonus tiers, first matching tier wins
    pub modularity_tiers: Vec<ModularityTier>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: 100.0,
            depth_weight: 5.0,
            depth_cap: 30.0,
            complexity_weight: 2.0,
            complexity_cap: 40.0,
            length_divisor: 2.0,
            length_cap: 30.0,
            modularity_tiers: vec![
                ModularityTier {
                    min_functions: 6,
                    max_avg_length: 20.0,
                    bonus: 10.0,
                },
                ModularityTier {
                    min_functions: 3,
                    max_avg_length: 25.0,
                    bonus: 5.0,
                },
            ],
        }
    }
}

/// One modularity bonus tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModularityTier {
    /// Applies when function count is at least this...
    pub min_functions: usize,

    /// ...and average length is strictly below this
    pub max_avg_length: f64,

    pub bonus: f64,
}

/// Rules of the trend engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Entries needed for short/long-term trend
    pub min_trend_entries: usize,

    /// Latest-vs-previous delta beyond which the trend is improving/declining
    pub short_term_band: f64,

    /// Latest-vs-baseline delta beyond which growth/decline is reported
    pub baseline_band: f64,

    /// Entries needed for growth velocity
    pub min_velocity_entries: usize,

    /// Mean delta above which improvement is rapid
    pub rapid_improvement: f64,

    /// Mean delta at or below which regression is significant
    pub significant_regression: f64,

    pub confidence: ConfidenceTiers,

    /// Entries needed for cognitive profile inference
    pub min_profile_entries: usize,

    /// Mean length below which (with growing function count) micro functions dominate
    pub micro_function_length: f64,

    /// Mean depth above which nesting is a habit
    pub deep_nesting_depth: f64,

    /// Mean length above which construction is monolithic
    pub monolithic_length: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_trend_entries: 2,
            short_term_band: 2.0,
            baseline_band: 5.0,
            min_velocity_entries: 3,
            rapid_improvement: 2.0,
            significant_regression: -2.0,
            confidence: ConfidenceTiers::default(),
            min_profile_entries: 3,
            micro_function_length: 5.0,
            deep_nesting_depth: 3.0,
            monolithic_length: 10.0,
        }
    }
}

/// Sample-count boundaries for signal confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceTiers {
    pub low_below: usize,
    pub moderate_below: usize,
    pub high_below: usize,
}

impl Default for ConfidenceTiers {
    fn default() -> Self {
        Self {
            low_below: 3,
            moderate_below: 7,
            high_below: 15,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// History storage settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one history file per subject
    pub history_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured directory, else the platform data dir, else `./.devmirror/history`
    pub fn resolve_history_dir(&self) -> PathBuf {
        if let Some(dir) = &self.history_dir {
            return dir.clone();
        }

        dirs::data_dir()
            .map(|dir| dir.join("devmirror").join("history"))
            .unwrap_or_else(|| PathBuf::from(".devmirror").join("history"))
    }
}

impl DevMirrorConfig {
    /// Load from a TOML file, then apply environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(Some(path.as_ref()), environment())
    }

    /// Defaults with environment overrides only
    pub fn load_with_env() -> Result<Self> {
        Self::build(None, environment())
    }

    /// Explicit path if given, else the first config found on the search path, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        Self::discover_in(explicit, &Self::search_paths())
    }

    /// [`discover`](Self::discover) over a caller-supplied search path
    pub fn discover_in(explicit: Option<&Path>, search_paths: &[PathBuf]) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        match search_paths.iter().find(|path| path.exists()) {
            Some(path) => Self::load_from_file(path),
            None => Self::load_with_env(),
        }
    }

    /// Config file locations in order of preference
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(default_path) = Self::default_config_path() {
            paths.push(default_path);
        }
        paths
    }

    /// Per-user config location
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("devmirror").join("config.toml"))
    }

    /// Write the configuration as TOML
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values that would make the rules meaningless
    pub fn validate(&self) -> Result<()> {
        let scoring = &self.scoring;
        for (key, value) in [
            ("scoring.base_score", scoring.base_score),
            ("scoring.depth_weight", scoring.depth_weight),
            ("scoring.depth_cap", scoring.depth_cap),
            ("scoring.complexity_weight", scoring.complexity_weight),
            ("scoring.complexity_cap", scoring.complexity_cap),
            ("scoring.length_cap", scoring.length_cap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(key, value));
            }
        }

        if !scoring.length_divisor.is_finite() || scoring.length_divisor <= 0.0 {
            return Err(invalid("scoring.length_divisor", scoring.length_divisor));
        }

        for (index, tier) in scoring.modularity_tiers.iter().enumerate() {
            if !tier.bonus.is_finite() || tier.bonus < 0.0 {
                return Err(invalid(
                    &format!("scoring.modularity_tiers[{index}].bonus"),
                    tier.bonus,
                ));
            }
        }

        let trend = &self.trend;
        if trend.min_trend_entries < 2 {
            return Err(invalid("trend.min_trend_entries", trend.min_trend_entries));
        }
        if trend.min_velocity_entries < 2 {
            return Err(invalid("trend.min_velocity_entries", trend.min_velocity_entries));
        }
        if trend.short_term_band <= 0.0 {
            return Err(invalid("trend.short_term_band", trend.short_term_band));
        }
        if trend.baseline_band <= 0.0 {
            return Err(invalid("trend.baseline_band", trend.baseline_band));
        }
        if trend.rapid_improvement <= 0.0 {
            return Err(invalid("trend.rapid_improvement", trend.rapid_improvement));
        }
        if trend.significant_regression >= 0.0 {
            return Err(invalid(
                "trend.significant_regression",
                trend.significant_regression,
            ));
        }

        let tiers = &trend.confidence;
        if !(tiers.low_below < tiers.moderate_below && tiers.moderate_below < tiers.high_below) {
            return Err(ConfigError::InvalidValue {
                key: "trend.confidence".to_string(),
                value: format!(
                    "{} / {} / {} (must be strictly increasing)",
                    tiers.low_below, tiers.moderate_below, tiers.high_below
                ),
            }
            .into());
        }

        Ok(())
    }

    fn build(file: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
        }

        let loaded: Self = builder.add_source(env).build()?.try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }
}

fn invalid(key: &str, value: impl std::fmt::Display) -> crate::error::DevMirrorError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}

/// `DEVMIRROR_<SECTION>__<KEY>` variables, e.g. `DEVMIRROR_SCORING__DEPTH_WEIGHT=4`
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

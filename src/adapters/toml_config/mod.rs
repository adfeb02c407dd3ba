// TOML config adapter - Layered alignment configuration
//
// Precedence, highest first: CLI overrides > TRACKALIGN_* environment
// variables > TOML file (`[alignment]` table) > built-in defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::model::AlignmentConfig;
use crate::domain::rules::ConfigValidator;
use crate::error::{AlignError, AlignResult};

/// Table holding alignment settings in a config file
pub const CONFIG_SECTION: &str = "alignment";

/// Prefix of environment variables overriding config keys
pub const ENV_PREFIX: &str = "TRACKALIGN_";

/// Files probed, in order, when no config file is given explicitly
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["trackalign.toml", "config/trackalign.toml"];

/// Explicit per-key overrides, typically from command-line flags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub alignment_threshold: Option<f64>,
    pub max_stretch_ratio: Option<f64>,
    pub prefer_audio_intact: Option<bool>,
    pub maintain_sync_points: Option<bool>,
    pub max_time_shift: Option<f64>,
    pub max_rate_adjust: Option<f64>,
    pub optimize_scene_cuts: Option<bool>,
    pub min_segment_duration: Option<f64>,
    pub snap_threshold: Option<f64>,
}

impl ConfigOverrides {
    /// Write every set override into `config`, returning how many were applied
    fn apply(&self, config: &mut AlignmentConfig) -> usize {
        let mut applied = 0;
        let mut set_f64 = |target: &mut f64, value: Option<f64>| {
            if let Some(value) = value {
                *target = value;
                applied += 1;
            }
        };
        set_f64(&mut config.alignment_threshold, self.alignment_threshold);
        set_f64(&mut config.max_stretch_ratio, self.max_stretch_ratio);
        set_f64(&mut config.max_time_shift, self.max_time_shift);
        set_f64(&mut config.max_rate_adjust, self.max_rate_adjust);
        set_f64(&mut config.min_segment_duration, self.min_segment_duration);
        set_f64(&mut config.snap_threshold, self.snap_threshold);

        let mut set_bool = |target: &mut bool, value: Option<bool>| {
            if let Some(value) = value {
                *target = value;
                applied += 1;
            }
        };
        set_bool(&mut config.prefer_audio_intact, self.prefer_audio_intact);
        set_bool(&mut config.maintain_sync_points, self.maintain_sync_points);
        set_bool(&mut config.optimize_scene_cuts, self.optimize_scene_cuts);

        applied
    }
}

/// Builds an [`AlignmentConfig`] from defaults, file, environment and overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    search_default_paths: bool,
    env: HashMap<String, String>,
    overrides: ConfigOverrides,
}

impl ConfigLoader {
    /// Create a loader that only yields defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this config file (it must exist)
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Probe [`DEFAULT_CONFIG_PATHS`] when no explicit file is set
    pub fn with_default_search(mut self) -> Self {
        self.search_default_paths = true;
        self
    }

    /// Take environment overrides from the current process
    pub fn with_process_env(self) -> Self {
        self.with_env(std::env::vars())
    }

    /// Take environment overrides from the given variables
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .collect();
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Resolve and validate the configuration
    pub fn load(&self) -> AlignResult<AlignmentConfig> {
        info!("Initializing configuration hierarchy");

        let mut config = match self.config_file() {
            Some(path) => {
                info!("Loading configuration from: {}", path.display());
                load_config_file(&path)?
            }
            None => {
                debug!("No config file loaded, starting from defaults");
                AlignmentConfig::default()
            }
        };

        let env_overrides = self.env_overrides()?;
        let applied = env_overrides.apply(&mut config);
        if applied > 0 {
            info!("Applied {} environment variable overrides", applied);
        }

        let applied = self.overrides.apply(&mut config);
        if applied > 0 {
            info!("Applied {} CLI configuration overrides", applied);
        }

        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    fn config_file(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.file {
            return Some(path.clone());
        }
        if self.search_default_paths {
            return DEFAULT_CONFIG_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists());
        }
        None
    }

    fn env_overrides(&self) -> AlignResult<ConfigOverrides> {
        Ok(ConfigOverrides {
            alignment_threshold: self.env_f64("ALIGNMENT_THRESHOLD")?,
            max_stretch_ratio: self.env_f64("MAX_STRETCH_RATIO")?,
            prefer_audio_intact: self.env_bool("PREFER_AUDIO_INTACT")?,
            maintain_sync_points: self.env_bool("MAINTAIN_SYNC_POINTS")?,
            max_time_shift: self.env_f64("MAX_TIME_SHIFT")?,
            max_rate_adjust: self.env_f64("MAX_RATE_ADJUST")?,
            optimize_scene_cuts: self.env_bool("OPTIMIZE_SCENE_CUTS")?,
            min_segment_duration: self.env_f64("MIN_SEGMENT_DURATION")?,
            snap_threshold: self.env_f64("SNAP_THRESHOLD")?,
        })
    }

    fn env_value(&self, key: &str) -> Option<(String, &str)> {
        let var = format!("{}{}", ENV_PREFIX, key);
        let value = self.env.get(&var)?;
        debug!("Found environment override: {} = {}", var, value);
        Some((var, value.trim()))
    }

    fn env_f64(&self, key: &str) -> AlignResult<Option<f64>> {
        self.env_value(key)
            .map(|(var, value)| {
                value.parse::<f64>().map_err(|e| {
                    AlignError::config(format!("Invalid number for {}: {}", var, e))
                })
            })
            .transpose()
    }

    fn env_bool(&self, key: &str) -> AlignResult<Option<bool>> {
        self.env_value(key)
            .map(|(var, value)| match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(AlignError::config(format!(
                    "Invalid boolean value for {}: {}",
                    var, value
                ))),
            })
            .transpose()
    }
}

/// Parse a config file; settings live in `[alignment]` or at the top level
pub fn load_config_file(path: &Path) -> AlignResult<AlignmentConfig> {
    if !path.exists() {
        return Err(AlignError::config(format!(
            "Config file does not exist: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse TOML text into a config (missing keys keep their defaults)
pub fn parse_config(content: &str) -> AlignResult<AlignmentConfig> {
    let mut parsed: toml::Table = toml::from_str(content)?;
    let config = match parsed.remove(CONFIG_SECTION) {
        Some(section) => section.try_into()?,
        None => toml::Value::Table(parsed).try_into()?,
    };
    Ok(config)
}

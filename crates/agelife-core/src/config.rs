//! Configuration loading and typed config structures for Agelife.
//!
//! The configuration lives in `agelife-config.yaml`. Every field has a
//! default, so an empty document (or no file at all) yields a runnable
//! setup: random seeding, `delay:100` cadence, age cap 12.
//!
//! The cadence may also be chosen from the classic speed menu with the
//! `speed` key. The `AGELIFE_SPEED` and `AGELIFE_CADENCE` environment
//! variables override both, in that order.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cadence::Cadence;
use crate::rules::{DEFAULT_MAX_AGE, Rules};

/// Environment variable that overrides [`SimulationConfig::cadence`].
pub const CADENCE_ENV: &str = "AGELIFE_CADENCE";

/// Environment variable selecting a cadence from the speed menu (1-4).
pub const SPEED_ENV: &str = "AGELIFE_SPEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but its values are inconsistent.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Rule table parameters.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Step pacing: `immediate`, `delay:D` or `manual`.
    #[serde(default)]
    pub cadence: Cadence,

    /// Speed menu choice: 1 = 10 ms, 2 = 100 ms, 3 = 1000 ms, 4 = manual.
    /// Replaces `cadence` when set.
    #[serde(default)]
    pub speed: Option<u8>,

    /// Optional end conditions for a run.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Where the initial generation comes from.
    #[serde(default)]
    pub seed: SeedConfig,

    /// Terminal rendering.
    #[serde(default)]
    pub render: RenderConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation or an environment override
    /// fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation or an environment override
    /// fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_speed_choice()?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// `AGELIFE_SPEED` is applied first, so `AGELIFE_CADENCE` wins when
    /// both are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override does not parse.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let speed = std::env::var(SPEED_ENV).ok();
        self.apply_speed_override(speed.as_deref())?;
        let cadence = std::env::var(CADENCE_ENV).ok();
        self.apply_cadence_override(cadence.as_deref())
    }

    /// Resolve the `speed` key, if set, into the cadence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the choice is not 1-4.
    pub fn apply_speed_choice(&mut self) -> Result<(), ConfigError> {
        if let Some(choice) = self.speed {
            self.cadence = Cadence::from_speed_choice(choice).map_err(|e| ConfigError::Invalid {
                reason: format!("speed: {e}"),
            })?;
        }
        Ok(())
    }

    /// Replace the speed choice, and with it the cadence, when `value` is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `value` is not a choice 1-4.
    pub fn apply_speed_override(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        let Some(raw) = value else {
            return Ok(());
        };
        let choice = raw.trim().parse::<u8>().map_err(|e| ConfigError::Invalid {
            reason: format!("{SPEED_ENV}: {e}"),
        })?;
        self.speed = Some(choice);
        self.apply_speed_choice()
    }

    /// Replace the cadence with `value` when one is given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `value` is not a valid cadence.
    pub fn apply_cadence_override(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        if let Some(raw) = value {
            self.cadence = raw.parse().map_err(|e| ConfigError::Invalid {
                reason: format!("{CADENCE_ENV}: {e}"),
            })?;
        }
        Ok(())
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules()?;
        self.seed.random.validate()
    }

    /// Build the rule set described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `rules.max_age` is 0.
    pub fn rules(&self) -> Result<Rules, ConfigError> {
        Rules::new(self.rules.max_age).map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })
    }
}

/// Rule table configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RulesConfig {
    /// Ages saturate at this value. Must be at least 1.
    #[serde(default = "default_max_age")]
    pub max_age: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_age: default_max_age(),
        }
    }
}

/// Optional end conditions. Both default to off, so a run ends only when
/// cancelled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop after this many generations in one run (0 = unlimited).
    #[serde(default)]
    pub max_generations: u64,

    /// Stop as soon as a generation has no live cells.
    #[serde(default)]
    pub stop_on_extinction: bool,
}

/// Initial generation source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SeedConfig {
    /// Colony file to load. Random seeding is used when absent.
    #[serde(default)]
    pub colony_file: Option<PathBuf>,

    /// Random seeding parameters.
    #[serde(default)]
    pub random: RandomSeedConfig,
}

/// Random seeding parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RandomSeedConfig {
    /// Smallest row count.
    #[serde(default = "default_min_extent")]
    pub min_rows: i32,

    /// Largest row count.
    #[serde(default = "default_max_extent")]
    pub max_rows: i32,

    /// Smallest column count.
    #[serde(default = "default_min_extent")]
    pub min_cols: i32,

    /// Largest column count.
    #[serde(default = "default_max_extent")]
    pub max_cols: i32,

    /// Chance, in percent, that a cell starts alive.
    #[serde(default = "default_alive_percent")]
    pub alive_percent: u8,

    /// Fixed RNG seed for reproducible runs.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for RandomSeedConfig {
    fn default() -> Self {
        Self {
            min_rows: default_min_extent(),
            max_rows: default_max_extent(),
            min_cols: default_min_extent(),
            max_cols: default_max_extent(),
            alive_percent: default_alive_percent(),
            rng_seed: None,
        }
    }
}

impl RandomSeedConfig {
    /// Check that the extents form non-empty, non-negative ranges and the
    /// percentage is at most 100.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_extent("rows", self.min_rows, self.max_rows)?;
        check_extent("cols", self.min_cols, self.max_cols)?;
        if self.alive_percent > 100 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "seed.random.alive_percent must be at most 100, got {}",
                    self.alive_percent
                ),
            });
        }
        Ok(())
    }
}

/// Terminal rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderConfig {
    /// Render from a separate task fed by a watch channel instead of
    /// drawing inline between steps.
    #[serde(default = "default_true")]
    pub decoupled: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            decoupled: default_true(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn check_extent(name: &str, min: i32, max: i32) -> Result<(), ConfigError> {
    if min < 0 || min > max {
        return Err(ConfigError::Invalid {
            reason: format!(
                "seed.random.min_{name} ({min}) must be non-negative and at most max_{name} ({max})"
            ),
        });
    }
    Ok(())
}

const fn default_max_age() -> u32 {
    DEFAULT_MAX_AGE
}

const fn default_min_extent() -> i32 {
    40
}

const fn default_max_extent() -> i32 {
    60
}

const fn default_alive_percent() -> u8 {
    50
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let mut config = SimulationConfig::parse("").unwrap();
        // Neutralize speed and cadence overrides from the test environment.
        config.cadence = Cadence::default();
        config.speed = None;
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.rules.max_age, DEFAULT_MAX_AGE);
        assert_eq!(config.simulation.max_generations, 0);
        assert!(!config.simulation.stop_on_extinction);
        assert!(config.seed.colony_file.is_none());
        assert!(config.render.decoupled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parses_full_document() {
        let yaml = r#"
rules:
  max_age: 5
cadence: "delay:250"
simulation:
  max_generations: 100
  stop_on_extinction: true
seed:
  colony_file: colonies/glider-explosion.txt
  random:
    min_rows: 10
    max_rows: 12
    alive_percent: 30
    rng_seed: 7
render:
  decoupled: false
logging:
  level: debug
"#;
        let config: SimulationConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.rules().unwrap().max_age(), 5);
        assert_eq!(config.cadence, Cadence::Delay(Duration::from_millis(250)));
        assert_eq!(config.simulation.max_generations, 100);
        assert!(config.simulation.stop_on_extinction);
        assert_eq!(
            config.seed.colony_file,
            Some(PathBuf::from("colonies/glider-explosion.txt"))
        );
        assert_eq!(config.seed.random.min_rows, 10);
        assert_eq!(config.seed.random.max_rows, 12);
        assert_eq!(config.seed.random.min_cols, 40);
        assert_eq!(config.seed.random.alive_percent, 30);
        assert_eq!(config.seed.random.rng_seed, Some(7));
        assert!(!config.render.decoupled);
        assert_eq!(config.logging.level, "debug");
        config.validate().unwrap();
    }

    #[test]
    fn unknown_cadence_is_a_yaml_error() {
        let result: Result<SimulationConfig, _> = serde_yml::from_str("cadence: sometimes");
        assert!(result.is_err());
    }

    #[test]
    fn zero_max_age_is_invalid() {
        let config: SimulationConfig = serde_yml::from_str("rules:\n  max_age: 0").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn inverted_extent_is_invalid() {
        let mut config = SimulationConfig::default();
        config.seed.random.min_cols = 9;
        config.seed.random.max_cols = 3;
        assert!(config.validate().is_err());

        config.seed.random.min_cols = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn alive_percent_above_hundred_is_invalid() {
        let mut config = SimulationConfig::default();
        config.seed.random.alive_percent = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn speed_key_selects_cadence() {
        let mut config: SimulationConfig =
            serde_yml::from_str("cadence: immediate\nspeed: 3").unwrap();
        config.apply_speed_choice().unwrap();
        assert_eq!(config.cadence, Cadence::Delay(Duration::from_millis(1000)));

        let mut manual: SimulationConfig = serde_yml::from_str("speed: 4").unwrap();
        manual.apply_speed_choice().unwrap();
        assert_eq!(manual.cadence, Cadence::Manual);
    }

    #[test]
    fn speed_outside_menu_is_invalid() {
        let mut config: SimulationConfig = serde_yml::from_str("speed: 5").unwrap();
        assert!(matches!(
            config.apply_speed_choice(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn speed_override() {
        let mut config = SimulationConfig::default();
        config.apply_speed_override(None).unwrap();
        assert_eq!(config.cadence, Cadence::default());

        config.apply_speed_override(Some(" 1 ")).unwrap();
        assert_eq!(config.speed, Some(1));
        assert_eq!(config.cadence, Cadence::Delay(Duration::from_millis(10)));

        let err = config.apply_speed_override(Some("fast")).unwrap_err();
        assert!(err.to_string().contains(SPEED_ENV));
        assert!(config.apply_speed_override(Some("0")).is_err());
    }

    #[test]
    fn cadence_override() {
        let mut config = SimulationConfig::default();
        config.apply_cadence_override(None).unwrap();
        assert_eq!(config.cadence, Cadence::default());

        config.apply_cadence_override(Some("manual")).unwrap();
        assert_eq!(config.cadence, Cadence::Manual);

        let err = config.apply_cadence_override(Some("warp")).unwrap_err();
        assert!(err.to_string().contains(CADENCE_ENV));
        assert_eq!(config.cadence, Cadence::Manual);
    }
}

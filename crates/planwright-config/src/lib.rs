//! Configuration system for Planwright.
//!
//! Load engine configuration from TOML or YAML files to control assertion
//! modes, constraint match tracking and constraint weights without code
//! changes.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use planwright_config::{EngineConfig, EnvironmentMode};
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     environment_mode = "full_assert"
//!
//!     [score_director]
//!     constraint_match_enabled = true
//!
//!     [score_director.constraint_weights]
//!     "Room conflict" = "-1hard/0soft"
//! "#).unwrap();
//!
//! assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
//! assert!(config.score_director.constraint_match_enabled);
//! assert_eq!(config.constraint_weight("Room conflict"), Some("-1hard/0soft"));
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use planwright_config::EngineConfig;
//!
//! let config = EngineConfig::load("engine.toml").unwrap_or_default();
//! assert!(!config.environment_mode.is_asserted());
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use planwright_core::PlanwrightError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for PlanwrightError {
    fn from(err: ConfigError) -> Self {
        PlanwrightError::Config(err.to_string())
    }
}

/// Main engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Environment mode selecting the assertions run on every score.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Score director configuration.
    #[serde(default)]
    pub score_director: ScoreDirectorConfig,
}

impl EngineConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file, choosing the format by extension
    /// (`.yaml`/`.yml` for YAML, anything else for TOML).
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist or cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the environment mode.
    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    /// Enables or disables constraint match tracking.
    pub fn with_constraint_match_enabled(mut self, enabled: bool) -> Self {
        self.score_director.constraint_match_enabled = enabled;
        self
    }

    /// Sets the weight of a configurable constraint, as a score string such
    /// as `"-1hard/0soft"`.
    pub fn with_constraint_weight(
        mut self,
        constraint: impl Into<String>,
        weight: impl Into<String>,
    ) -> Self {
        self.score_director
            .constraint_weights
            .insert(constraint.into(), weight.into());
        self
    }

    /// Returns the configured weight string of a constraint.
    pub fn constraint_weight(&self, constraint: &str) -> Option<&str> {
        self.score_director
            .constraint_weights
            .get(constraint)
            .map(String::as_str)
    }
}

/// Environment mode affecting engine behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Non-reproducible mode with minimal overhead.
    #[default]
    NonReproducible,

    /// Reproducible mode with deterministic behavior.
    Reproducible,

    /// Recompute every calculated score from scratch and compare.
    FastAssert,

    /// Fast assert plus shadow variable and supply staleness checks.
    FullAssert,
}

impl EnvironmentMode {
    /// Whether score calculations are verified against a rebuild.
    pub fn is_asserted(&self) -> bool {
        matches!(self, EnvironmentMode::FastAssert | EnvironmentMode::FullAssert)
    }

    /// Whether shadow variables and supplies are verified too.
    pub fn is_fully_asserted(&self) -> bool {
        matches!(self, EnvironmentMode::FullAssert)
    }
}

/// Score director configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoreDirectorConfig {
    /// Whether to retain constraint matches for analysis.
    #[serde(default)]
    pub constraint_match_enabled: bool,

    /// Weights of configurable constraints, keyed by constraint name (or
    /// `package/name`), as parseable score strings.
    #[serde(default)]
    pub constraint_weights: BTreeMap<String, String>,
}

//! Configuration types for the change gate, host adapters, usage counting and
//! the rule set.

use crate::error::{Error, Result};
use crate::rules::{RuleSet, RuleSpec};
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default quiescence window in milliseconds.
pub const DEFAULT_QUIESCENCE_MS: u64 = 500;
/// Default minimum prompt length, in characters, worth classifying.
pub const DEFAULT_MIN_PROMPT_CHARS: usize = 15;
/// Default interval between lookups of a missing observer target.
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 1000;

/// Complete tutorlens configuration.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorlensConfig {
    /// Change gate configuration
    pub gate: GateConfig,
    /// Host adapter configuration
    pub host: HostConfig,
    /// Usage counter configuration
    pub usage: UsageConfig,
    /// Replacement rule set; the built-in rules are used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleSpec>>,
}

/// Change gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Idle time after the last change notification before classifying
    pub quiescence_ms: u64,
    /// Prompts shorter than this many characters are not classified
    pub min_prompt_chars: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            quiescence_ms: DEFAULT_QUIESCENCE_MS,
            min_prompt_chars: DEFAULT_MIN_PROMPT_CHARS,
        }
    }
}

impl GateConfig {
    /// Quiescence window as a duration.
    pub const fn quiescence_window(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }
}

/// Host adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Interval between lookups while the observed target does not exist
    pub retry_interval_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
        }
    }
}

impl HostConfig {
    /// Retry interval as a duration.
    pub const fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

/// Usage counter configuration. Counting is off unless enabled here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageConfig {
    /// Whether classification events are counted
    pub enabled: bool,
    /// Counter file; defaults to `~/.tutorlens/usage.json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl UsageConfig {
    /// Counter file location, falling back to the default path.
    ///
    /// # Errors
    /// Returns an error if no path is configured and the home directory cannot
    /// be determined
    pub fn resolved_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(TutorlensConfig::config_dir()?.join("usage.json")),
        }
    }
}

impl TutorlensConfig {
    /// Get the default config directory path (`~/.tutorlens`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_dir() -> Result<PathBuf> {
        use dirs::home_dir;
        let home = home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_owned()))?;
        Ok(home.join(".tutorlens"))
    }

    /// Get the default config file path (`~/.tutorlens/config.toml`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the default location, creating it with default values
    /// if it does not exist yet
    ///
    /// # Errors
    /// Returns an error if the config cannot be read, parsed or created
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let config = Self::default();
            config.save_to_file(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or fails validation
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = self.to_toml()?;
        let header = "# tutorlens configuration file\n\
                      # This file is automatically generated on first run\n\
                      # Edit this file to customize your settings\n\n";

        fs::write(path, format!("{header}{contents}"))?;
        Ok(())
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    /// Returns an error if serialization fails
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check settings that would make the gate or host adapters misbehave.
    ///
    /// # Errors
    /// Returns a configuration error for a zero window or interval, or the
    /// rule error for a malformed rule
    pub fn validate(&self) -> Result<()> {
        if self.gate.quiescence_ms == 0 {
            return Err(Error::Config(
                "gate.quiescence_ms must be greater than zero".to_owned(),
            ));
        }
        if self.host.retry_interval_ms == 0 {
            return Err(Error::Config(
                "host.retry_interval_ms must be greater than zero".to_owned(),
            ));
        }
        self.rule_set().map(|_| ())
    }

    /// Compile the configured rule set, or the built-in one when none is set.
    ///
    /// # Errors
    /// Returns the first rule compilation error
    pub fn rule_set(&self) -> Result<RuleSet> {
        match &self.rules {
            Some(specs) => RuleSet::from_specs(specs),
            None => RuleSet::builtin(),
        }
    }
}

//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/fortnum/fortnum.toml`
//! 3. Local config: `<dir>/.fortnum.toml`
//! 4. Environment variables: `FORTNUM_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Registry;

/// Registry construction settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistrySettings {
    /// Initial arena capacity
    pub capacity: usize,
    /// Regex every registered name must match; unrestricted when absent
    pub name_pattern: Option<String>,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            capacity: 64,
            name_pattern: None,
        }
    }
}

/// Raw registry settings: `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRegistrySettings {
    pub capacity: Option<usize>,
    pub name_pattern: Option<String>,
}

impl RegistrySettings {
    fn merge(&self, overlay: &RawRegistrySettings) -> Self {
        Self {
            capacity: overlay.capacity.unwrap_or(self.capacity),
            name_pattern: overlay
                .name_pattern
                .clone()
                .or_else(|| self.name_pattern.clone()),
        }
    }
}

/// Unified configuration for fortnum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub registry: RegistrySettings,
}

/// Settings as read from one TOML layer.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub registry: RawRegistrySettings,
}

/// Get the XDG config directory for fortnum.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "fortnum").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("fortnum.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".fortnum.toml")
}

fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            registry: self.registry.merge(&overlay.registry),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `dir` - Optional directory holding a local `.fortnum.toml`
    #[instrument(level = "debug")]
    pub fn load(dir: Option<&Path>) -> ApplicationResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!(path = %local_path.display(), "loading local config");
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Apply FORTNUM_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("FORTNUM").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<usize>("registry.capacity") {
            settings.registry.capacity = val;
        }
        if let Ok(val) = config.get_string("registry.name_pattern") {
            settings.registry.name_pattern = Some(val);
        }
        Ok(settings)
    }

    /// Empty registry configured by these settings.
    pub fn build_registry(&self) -> ApplicationResult<Registry> {
        let registry = Registry::with_capacity(self.registry.capacity);
        match &self.registry.name_pattern {
            None => Ok(registry),
            Some(pattern) => {
                let re = Regex::new(pattern).map_err(|e| ApplicationError::Config {
                    message: format!("invalid name_pattern {pattern:?}: {e}"),
                })?;
                Ok(registry.with_name_pattern(re))
            }
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# fortnum configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/fortnum/fortnum.toml
#   Local:  <dir>/.fortnum.toml
#   Env:    FORTNUM_REGISTRY__CAPACITY, FORTNUM_REGISTRY__NAME_PATTERN

[registry]
# Initial number of node slots
# capacity = 64

# Regex every fortnum name must match
# name_pattern = "^[A-Za-z_][A-Za-z0-9_]*$"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

//! Host configuration.
//!
//! Values come from `GUESTBRIDGE_*` environment variables or a YAML
//! document. Anything left unset keeps its default.

use std::collections::BTreeMap;
use std::str::FromStr;

use guestbridge_content::application::context::DEFAULT_STATE_NAME;
use guestbridge_protocol::registry::{DEFAULT_MAX_DEPTH, RegistryOptions};
use serde::Deserialize;

use crate::error::HostError;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(HostError::Config(format!(
                "log format must be json or pretty, got {other:?}"
            ))),
        }
    }
}

/// Settings shared by every guest scope a host creates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Nesting limit for re-entrant request handling.
    pub max_dispatch_depth: usize,
    /// Panic when a registered handler has no behaviour wired.
    pub strict_handlers: bool,
    /// Tracing output format.
    pub log_format: LogFormat,
    /// Prefix of default names for new states.
    pub default_state_name: String,
    /// Outbound request versions to assume before the guest announces any.
    pub version_overrides: BTreeMap<String, u32>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_dispatch_depth: DEFAULT_MAX_DEPTH,
            strict_handlers: false,
            log_format: LogFormat::default(),
            default_state_name: DEFAULT_STATE_NAME.to_owned(),
            version_overrides: BTreeMap::new(),
        }
    }
}

impl HostConfig {
    /// Reads the config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `HostError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, HostError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the config through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns `HostError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HostError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("GUESTBRIDGE_MAX_DISPATCH_DEPTH") {
            config.max_dispatch_depth = raw.trim().parse().map_err(|e| {
                HostError::Config(format!("GUESTBRIDGE_MAX_DISPATCH_DEPTH must be a valid usize: {e}"))
            })?;
        }
        if let Some(raw) = lookup("GUESTBRIDGE_STRICT_HANDLERS") {
            config.strict_handlers = raw.trim().parse().map_err(|e| {
                HostError::Config(format!("GUESTBRIDGE_STRICT_HANDLERS must be true or false: {e}"))
            })?;
        }
        if let Some(raw) = lookup("GUESTBRIDGE_LOG_FORMAT") {
            config.log_format = raw.parse()?;
        }
        if let Some(raw) = lookup("GUESTBRIDGE_DEFAULT_STATE_NAME") {
            config.default_state_name = raw;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns `HostError::Yaml` for malformed YAML or unknown keys, and
    /// `HostError::Config` for out-of-range values.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, HostError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Registry options derived from this config.
    #[must_use]
    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            max_depth: self.max_dispatch_depth,
            strict: self.strict_handlers,
        }
    }

    fn validate(&self) -> Result<(), HostError> {
        if self.max_dispatch_depth == 0 {
            return Err(HostError::Config(
                "max_dispatch_depth must be at least 1".to_owned(),
            ));
        }
        if self.default_state_name.trim().is_empty() {
            return Err(HostError::Config(
                "default_state_name must not be blank".to_owned(),
            ));
        }
        Ok(())
    }
}

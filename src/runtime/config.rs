//! Runtime configuration.
//!
//! Configuration is thread-local like the value graphs it governs. Hosts
//! build a [`RuntimeConfig`] (defaults, JSON, or environment) and
//! [`install`] it on each thread that runs compiled code.

use std::{cell::Cell, env};

use serde::{Deserialize, Serialize};

use crate::runtime::error::RuntimeError;

pub const ENV_TRACK_ALLOCATIONS: &str = "REFC_TRACK_ALLOCATIONS";
pub const ENV_WARN_LOSSY_PARSE: &str = "REFC_WARN_LOSSY_PARSE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Count allocations and reclamations per kind (see `leak_detector`).
    pub track_allocations: bool,
    /// Log a warning when a string-to-number cast discards input.
    pub warn_on_lossy_parse: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            track_allocations: cfg!(debug_assertions),
            warn_on_lossy_parse: false,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, RuntimeError> {
        serde_json::from_str(text).map_err(|err| RuntimeError::Config(err.to_string()))
    }

    /// Reads `REFC_TRACK_ALLOCATIONS` and `REFC_WARN_LOSSY_PARSE` on top of
    /// the defaults. Unset variables keep the default value.
    pub fn from_env() -> Result<Self, RuntimeError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, RuntimeError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_TRACK_ALLOCATIONS) {
            config.track_allocations = parse_flag(ENV_TRACK_ALLOCATIONS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_WARN_LOSSY_PARSE) {
            config.warn_on_lossy_parse = parse_flag(ENV_WARN_LOSSY_PARSE, &raw)?;
        }
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        // A struct of two booleans always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, RuntimeError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(RuntimeError::Config(format!(
            "{} expects a boolean flag, got {:?}",
            name, other
        ))),
    }
}

thread_local! {
    static CURRENT: Cell<RuntimeConfig> = Cell::new(RuntimeConfig::default());
}

/// Installs `config` for the current thread and returns the previous one.
pub fn install(config: RuntimeConfig) -> RuntimeConfig {
    CURRENT.with(|current| current.replace(config))
}

/// Returns the configuration active on the current thread.
pub fn current() -> RuntimeConfig {
    CURRENT.with(Cell::get)
}

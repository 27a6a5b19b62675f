#![forbid(unsafe_code)]

//! Runtime configuration with environment overrides.
//!
//! Environment variables:
//! - `CTRLSTATE_MAX_FLUSH_CYCLES` (usize, > 0)
//! - `CTRLSTATE_TRACE_WRITES` (bool: 1/0/true/false/yes/no/on/off)
//!
//! Malformed values never abort parsing. They are collected as
//! [`ConfigError`] diagnostics and the default is kept for that field.

use std::env;
use std::fmt;

const ENV_MAX_FLUSH_CYCLES: &str = "CTRLSTATE_MAX_FLUSH_CYCLES";
const ENV_TRACE_WRITES: &str = "CTRLSTATE_TRACE_WRITES";

/// Configuration for a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum evaluation passes [`Runtime::flush`](crate::Runtime::flush)
    /// runs before reporting [`RuntimeError::CycleLimit`](crate::RuntimeError::CycleLimit).
    pub max_flush_cycles: usize,
    /// Emit a `trace!` event for every slot write and skipped write.
    pub trace_writes: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_flush_cycles: 100,
            trace_writes: false,
        }
    }
}

impl RuntimeConfig {
    /// Set the flush pass limit (clamped to at least 1).
    #[must_use]
    pub fn with_max_flush_cycles(mut self, cycles: usize) -> Self {
        self.max_flush_cycles = cycles.max(1);
        self
    }

    /// Enable or disable per-write trace events.
    #[must_use]
    pub fn with_trace_writes(mut self, enabled: bool) -> Self {
        self.trace_writes = enabled;
        self
    }

    /// Configuration with no practical flush limit (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_flush_cycles: usize::MAX,
            trace_writes: false,
        }
    }

    /// Parse config from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Parse config using a custom environment lookup, discarding diagnostics.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        Self::from_env_with_diagnostics(get_env).config
    }

    /// Parse config using a custom environment lookup and report every
    /// rejected value.
    #[must_use]
    pub fn from_env_with_diagnostics<F>(mut get_env: F) -> ConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut errors = Vec::new();

        if let Some(value) = get_env(ENV_MAX_FLUSH_CYCLES) {
            match parse_usize(&value) {
                Some(parsed) if parsed > 0 => config.max_flush_cycles = parsed,
                _ => errors.push(ConfigError::new(
                    "max_flush_cycles",
                    value,
                    "expected positive integer",
                )),
            }
        }

        if let Some(value) = get_env(ENV_TRACE_WRITES) {
            match parse_bool(&value) {
                Some(parsed) => config.trace_writes = parsed,
                None => errors.push(ConfigError::new(
                    "trace_writes",
                    value,
                    "expected bool (1/0/true/false)",
                )),
            }
        }

        ConfigParse { config, errors }
    }
}

/// Config plus the diagnostics produced while parsing it.
#[derive(Debug, Clone)]
pub struct ConfigParse {
    pub config: RuntimeConfig,
    pub errors: Vec<ConfigError>,
}

/// A rejected configuration value with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[inline]
fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}

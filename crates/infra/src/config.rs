//! Configuration loading and representation.

use thiserror::Error;

pub const SEQUENCE_PADDING_VAR: &str = "STOCKPACK_SEQUENCE_PADDING";
pub const LOG_FILTER_VAR: &str = "STOCKPACK_LOG";

const DEFAULT_SEQUENCE_PADDING: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings of the packed-picking service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackingConfig {
    /// Width of the zero-padded counter in picking names (`WH/OUT/00001`).
    pub sequence_padding: usize,
    /// Log filter directive handed to observability; `None` falls back to `RUST_LOG`.
    pub log_filter: Option<String>,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            sequence_padding: DEFAULT_SEQUENCE_PADDING,
            log_filter: None,
        }
    }
}

impl PackingConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup (unset variables use defaults).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(SEQUENCE_PADDING_VAR) {
            config.sequence_padding = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    var: SEQUENCE_PADDING_VAR,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        config.log_filter = lookup(LOG_FILTER_VAR).filter(|f| !f.trim().is_empty());

        Ok(config)
    }
}

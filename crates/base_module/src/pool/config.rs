//! Pool sizing and overflow configuration

use crate::config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Initial population used when a pool has no explicit size
pub const DEFAULT_INITIAL_SIZE: usize = 16;

/// What a pool does when an acquire finds no idle item and `max_size` is reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Construct a new item anyway; `max_size` only triggers a warning
    #[default]
    Grow,
    /// Fail the acquire with [`PoolError::Exhausted`](super::PoolError::Exhausted)
    Reject,
}

/// Configuration for a single pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Items constructed eagerly when the pool is created
    pub initial_size: usize,

    /// Soft (`Grow`) or hard (`Reject`) limit on items ever constructed
    pub max_size: Option<usize>,

    /// Behaviour once `max_size` is reached
    pub overflow: OverflowPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_SIZE)
    }
}

impl PoolConfig {
    /// Unbounded pool with the given initial population
    pub fn new(initial_size: usize) -> Self {
        Self {
            initial_size,
            max_size: None,
            overflow: OverflowPolicy::Grow,
        }
    }

    /// Set the item limit
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Set the overflow policy
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(max_size) = self.max_size {
            if max_size == 0 {
                return Err(ConfigError::Invalid("max_size must be at least 1".to_string()));
            }
            if self.initial_size > max_size {
                return Err(ConfigError::Invalid(format!(
                    "initial_size {} exceeds max_size {}",
                    self.initial_size, max_size
                )));
            }
        }
        Ok(())
    }
}

/// Per-key pool settings; fields left out inherit from [`RegistryConfig::defaults`]
///
/// An unset `max_size` also inherits, so a key cannot lift a limit the
/// defaults impose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolOverride {
    /// Items constructed eagerly when the pool is created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_size: Option<usize>,

    /// Soft (`Grow`) or hard (`Reject`) limit on items ever constructed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<usize>,

    /// Behaviour once `max_size` is reached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow: Option<OverflowPolicy>,
}

impl PoolOverride {
    /// Fill unset fields from `defaults`
    pub fn resolve(&self, defaults: &PoolConfig) -> PoolConfig {
        PoolConfig {
            initial_size: self.initial_size.unwrap_or(defaults.initial_size),
            max_size: self.max_size.or(defaults.max_size),
            overflow: self.overflow.unwrap_or(defaults.overflow),
        }
    }
}

impl From<PoolConfig> for PoolOverride {
    fn from(config: PoolConfig) -> Self {
        Self {
            initial_size: Some(config.initial_size),
            max_size: config.max_size,
            overflow: Some(config.overflow),
        }
    }
}

/// Pool configuration for a whole registry, keyed like the registry itself
///
/// Each `[pools.<key>]` table only needs the fields that differ from
/// `[defaults]`:
///
/// ```toml
/// [defaults]
/// initial_size = 8
///
/// [pools.bullet]
/// initial_size = 64
/// max_size = 256
/// overflow = "reject"
///
/// [pools.spark]
/// max_size = 32    # initial_size 8 from [defaults]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Used for keys without their own entry, and for fields an entry leaves out
    pub defaults: PoolConfig,

    /// Per-key overrides
    pub pools: BTreeMap<String, PoolOverride>,
}

impl RegistryConfig {
    /// Add or replace the entry for a key
    pub fn with_pool(mut self, key: impl Into<String>, config: impl Into<PoolOverride>) -> Self {
        self.pools.insert(key.into(), config.into());
        self
    }

    /// Configuration for a key, merged over the defaults
    pub fn pool(&self, key: &str) -> PoolConfig {
        self.pools
            .get(key)
            .map_or_else(|| self.defaults.clone(), |entry| entry.resolve(&self.defaults))
    }

    /// Validate the defaults and every resolved entry
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.defaults
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("defaults: {e}")))?;

        for key in self.pools.keys() {
            self.pool(key)
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("pool '{key}': {e}")))?;
        }
        Ok(())
    }
}

impl Config for RegistryConfig {}

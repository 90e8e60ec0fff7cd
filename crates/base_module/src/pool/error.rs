//! Pool and registry errors

use super::object_pool::{ItemId, PoolId, Pooled};
use super::Poolable;
use thiserror::Error;

/// Errors raised by a single [`ObjectPool`](super::ObjectPool)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// No idle item and the pool may not construct more
    #[error("pool exhausted: all {capacity} items are in use")]
    Exhausted {
        /// The configured `max_size`
        capacity: usize,
    },

    /// The released item was produced by another pool
    #[error("item {item} belongs to {owner}, not {pool}")]
    ForeignItem {
        /// Pool the item was released into
        pool: PoolId,
        /// Pool that produced the item
        owner: PoolId,
        /// The item
        item: ItemId,
    },
}

/// Errors raised by the [`PoolRegistry`](super::PoolRegistry)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// `create_pool` with a key that is already taken; the existing pool is kept
    #[error("a pool is already registered under key '{key}'")]
    DuplicateKey {
        /// The key
        key: String,
    },

    /// `spawn`/`despawn` with a key that was never registered
    #[error("no pool registered under key '{key}'")]
    UnknownKey {
        /// The key
        key: String,
    },

    /// The key exists but pools a different item type
    #[error("pool '{key}' holds {actual}, not {requested}")]
    TypeMismatch {
        /// The key
        key: String,
        /// Item type the caller asked for
        requested: &'static str,
        /// Item type the pool was created with
        actual: &'static str,
    },

    /// Configuration rejected at `create_pool`
    #[error("invalid configuration for pool '{key}': {reason}")]
    InvalidConfig {
        /// The key
        key: String,
        /// Validation message
        reason: String,
    },

    /// The keyed pool refused the operation
    #[error("pool '{key}': {source}")]
    Pool {
        /// The key
        key: String,
        /// Underlying pool error
        source: PoolError,
    },
}

impl RegistryError {
    /// Key the failed operation was addressed to
    pub fn key(&self) -> &str {
        match self {
            Self::DuplicateKey { key }
            | Self::UnknownKey { key }
            | Self::TypeMismatch { key, .. }
            | Self::InvalidConfig { key, .. }
            | Self::Pool { key, .. } => key,
        }
    }
}

/// A failed release: the error plus the item, handed back to the caller
pub struct Rejected<T: Poolable, E> {
    /// Why the item was not taken back
    pub error: E,
    /// The item, still owned by the caller
    pub item: Pooled<T>,
}

impl<T: Poolable, E> Rejected<T, E> {
    /// Pair an error with the item it refused
    pub fn new(error: E, item: Pooled<T>) -> Self {
        Self { error, item }
    }

    /// Take the item back
    pub fn into_item(self) -> Pooled<T> {
        self.item
    }

    /// Convert the error while keeping the item
    pub fn map_error<F, E2>(self, f: F) -> Rejected<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        Rejected {
            error: f(self.error),
            item: self.item,
        }
    }
}

impl<T: Poolable, E: std::fmt::Debug> std::fmt::Debug for Rejected<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .field("item", &self.item.id())
            .field("pool", &self.item.pool_id())
            .finish()
    }
}

impl<T: Poolable, E: std::fmt::Display> std::fmt::Display for Rejected<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl<T: Poolable, E: std::error::Error + 'static> std::error::Error for Rejected<T, E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}

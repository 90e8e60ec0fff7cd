//! Object pooling
//!
//! - [`ObjectPool`]: FIFO reuse of one item type, growing on demand
//! - [`PoolRegistry`]: string-keyed pools of mixed item types
//! - [`Poolable`]: lifecycle hooks a pooled item implements
//! - [`PoolConfig`] / [`RegistryConfig`]: sizing and overflow policy, loadable from TOML or RON

pub mod config;
pub mod error;
pub mod object_pool;
pub mod poolable;
pub mod registry;

pub use config::{OverflowPolicy, PoolConfig, PoolOverride, RegistryConfig, DEFAULT_INITIAL_SIZE};
pub use error::{PoolError, RegistryError, Rejected};
pub use object_pool::{ItemId, ItemState, ObjectPool, PoolId, PoolStats, Pooled};
pub use poolable::{Placement, Poolable};
pub use registry::{PoolRegistry, RegistryStats, SharedPoolRegistry};

//! # Base Module
//!
//! Object pooling core for game projects.
//!
//! ## Features
//!
//! - **Object Pools**: FIFO reuse of pre-constructed items, growing on demand
//! - **Pool Registry**: string-keyed pools of mixed item types with checked downcasts
//! - **Overflow Policy**: optional size limits that either warn or reject
//! - **Configuration**: pool sizing loaded from TOML or RON files
//!
//! ## Quick Start
//!
//! ```rust
//! use base_module::prelude::*;
//!
//! #[derive(Default)]
//! struct Bullet {
//!     active: bool,
//!     position: Vec3,
//! }
//!
//! impl Poolable for Bullet {
//!     fn set_active(&mut self, active: bool) {
//!         self.active = active;
//!     }
//!
//!     fn set_placement(&mut self, placement: &Placement) {
//!         self.position = placement.position;
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut pools = PoolRegistry::new();
//!     pools.create_pool("bullet", Bullet::default, 64, Transform::identity())?;
//!
//!     let bullet: Pooled<Bullet> = pools.spawn("bullet", Placement::at(Vec3::new(0.0, 1.0, 0.0)))?;
//!     assert!(bullet.active);
//!
//!     pools.despawn("bullet", bullet)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod pool;

/// Common imports for pool users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        foundation::math::{Quat, Transform, Vec3},
        pool::{
            ObjectPool, OverflowPolicy, Placement, PoolConfig, PoolError, PoolRegistry,
            Poolable, Pooled, RegistryConfig, RegistryError, SharedPoolRegistry,
        },
    };
}

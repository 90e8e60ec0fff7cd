//! Pool Registry
//!
//! Owns every named pool and routes spawn/despawn calls to the right one by
//! string key. Pools of different item types live side by side behind a
//! type-erased interface; each access downcasts back to `ObjectPool<T>` and
//! reports a [`RegistryError::TypeMismatch`] instead of misbehaving when the
//! caller asks for the wrong type.
//!
//! Misuse (duplicate key, unknown key, wrong type, foreign item) never
//! panics and never changes state: it is logged through the `log` facade and
//! returned to the caller.
//!
//! # Usage
//!
//! ```rust
//! use base_module::pool::{Placement, Poolable, PoolRegistry, Pooled};
//! use base_module::foundation::math::Transform;
//!
//! #[derive(Default)]
//! struct Bullet { active: bool }
//!
//! impl Poolable for Bullet {
//!     fn set_active(&mut self, active: bool) { self.active = active; }
//!     fn set_placement(&mut self, _placement: &Placement) {}
//! }
//!
//! let mut registry = PoolRegistry::new();
//! registry.create_pool("bullet", Bullet::default, 32, Transform::identity()).unwrap();
//!
//! let bullet: Pooled<Bullet> = registry.spawn("bullet", Placement::identity()).unwrap();
//! registry.despawn("bullet", bullet).unwrap();
//! ```

use super::config::{PoolConfig, RegistryConfig};
use super::error::{Rejected, RegistryError};
use super::object_pool::{ObjectPool, PoolId, PoolStats, Pooled};
use super::poolable::{Placement, Poolable};
use crate::foundation::math::Transform;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Registry shared across threads; every operation takes the lock
pub type SharedPoolRegistry = Arc<Mutex<PoolRegistry>>;

/// Object-safe view of an `ObjectPool<T>` for heterogeneous storage
trait ErasedPool: Send {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn item_type_name(&self) -> &'static str;
    fn pool_id(&self) -> PoolId;
    fn stats(&self) -> PoolStats;
}

impl<T: Poolable> ErasedPool for ObjectPool<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn item_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn pool_id(&self) -> PoolId {
        self.id()
    }

    fn stats(&self) -> PoolStats {
        ObjectPool::stats(self)
    }
}

/// Aggregate statistics across every pool in a registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Number of registered pools
    pub pool_count: usize,
    /// Items ever constructed, all pools
    pub total_created: usize,
    /// Idle items, all pools
    pub total_idle: usize,
    /// Items held by callers, all pools
    pub total_in_use: usize,
    /// Successful spawns, all pools
    pub total_spawned: u64,
    /// Successful despawns, all pools
    pub total_despawned: u64,
}

/// String-keyed collection of object pools
///
/// Create one at startup and hand it (or a [`SharedPoolRegistry`]) to the
/// systems that spawn pooled objects.
#[derive(Default)]
pub struct PoolRegistry {
    pools: HashMap<String, Box<dyn ErasedPool>>,
}

impl PoolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the registry for use from several threads
    pub fn into_shared(self) -> SharedPoolRegistry {
        Arc::new(Mutex::new(self))
    }

    /// Register an unbounded pool under `key` with `initial_size` idle items
    ///
    /// If `key` is taken the existing pool is kept, a warning is logged and
    /// [`RegistryError::DuplicateKey`] is returned.
    pub fn create_pool<T, F>(
        &mut self,
        key: impl Into<String>,
        factory: F,
        initial_size: usize,
        anchor: Transform,
    ) -> Result<PoolId, RegistryError>
    where
        T: Poolable,
        F: FnMut() -> T + Send + 'static,
    {
        self.create_pool_with_config(key, factory, PoolConfig::new(initial_size), anchor)
    }

    /// Register a pool under `key` using an explicit configuration
    pub fn create_pool_with_config<T, F>(
        &mut self,
        key: impl Into<String>,
        factory: F,
        config: PoolConfig,
        anchor: Transform,
    ) -> Result<PoolId, RegistryError>
    where
        T: Poolable,
        F: FnMut() -> T + Send + 'static,
    {
        let key = key.into();
        if self.pools.contains_key(&key) {
            return Err(report("create_pool", RegistryError::DuplicateKey { key }));
        }

        let pool = ObjectPool::with_config(factory, config, anchor).map_err(|err| {
            report(
                "create_pool",
                RegistryError::InvalidConfig {
                    key: key.clone(),
                    reason: err.to_string(),
                },
            )
        })?;

        let id = pool.id();
        log::info!(
            "[PoolRegistry] Created pool '{}' ({}) of {} with {} items",
            key,
            id,
            type_name::<T>(),
            pool.created_count()
        );
        self.pools.insert(key, Box::new(pool));
        Ok(id)
    }

    /// Register a pool under `key`, sized from the key's entry in `config`
    pub fn create_pool_from_config<T, F>(
        &mut self,
        key: impl Into<String>,
        factory: F,
        config: &RegistryConfig,
        anchor: Transform,
    ) -> Result<PoolId, RegistryError>
    where
        T: Poolable,
        F: FnMut() -> T + Send + 'static,
    {
        let key = key.into();
        let pool_config = config.pool(&key);
        self.create_pool_with_config(key, factory, pool_config, anchor)
    }

    /// Take an item from the pool registered under `key`
    ///
    /// Unknown keys and item-type mismatches are logged and returned as
    /// errors; no pool is touched.
    #[must_use = "a spawned item that is dropped never returns to the pool"]
    pub fn spawn<T: Poolable>(&mut self, key: &str, placement: Placement) -> Result<Pooled<T>, RegistryError> {
        let pool = self.typed_pool_mut::<T>(key).map_err(|err| report("spawn", err))?;

        pool.acquire(placement).map_err(|source| {
            report(
                "spawn",
                RegistryError::Pool {
                    key: key.to_string(),
                    source,
                },
            )
        })
    }

    /// Return an item to the pool registered under `key`
    ///
    /// On failure the item comes back inside the [`Rejected`] error.
    pub fn despawn<T: Poolable>(&mut self, key: &str, item: Pooled<T>) -> Result<(), Rejected<T, RegistryError>> {
        let pool = match self.typed_pool_mut::<T>(key) {
            Ok(pool) => pool,
            Err(err) => return Err(Rejected::new(report("despawn", err), item)),
        };

        pool.release(item).map_err(|rejected| {
            rejected.map_error(|source| {
                report(
                    "despawn",
                    RegistryError::Pool {
                        key: key.to_string(),
                        source,
                    },
                )
            })
        })
    }

    /// Typed access to a registered pool
    pub fn pool<T: Poolable>(&self, key: &str) -> Result<&ObjectPool<T>, RegistryError> {
        let pool = self.pools.get(key).ok_or_else(|| RegistryError::UnknownKey {
            key: key.to_string(),
        })?;

        let actual = pool.item_type_name();
        pool.as_any()
            .downcast_ref::<ObjectPool<T>>()
            .ok_or_else(|| RegistryError::TypeMismatch {
                key: key.to_string(),
                requested: type_name::<T>(),
                actual,
            })
    }

    /// Typed mutable access to a registered pool
    pub fn pool_mut<T: Poolable>(&mut self, key: &str) -> Result<&mut ObjectPool<T>, RegistryError> {
        self.typed_pool_mut(key)
    }

    fn typed_pool_mut<T: Poolable>(&mut self, key: &str) -> Result<&mut ObjectPool<T>, RegistryError> {
        let pool = self.pools.get_mut(key).ok_or_else(|| RegistryError::UnknownKey {
            key: key.to_string(),
        })?;

        let actual = pool.item_type_name();
        pool.as_any_mut()
            .downcast_mut::<ObjectPool<T>>()
            .ok_or_else(|| RegistryError::TypeMismatch {
                key: key.to_string(),
                requested: type_name::<T>(),
                actual,
            })
    }

    /// Whether a pool is registered under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.pools.contains_key(key)
    }

    /// Number of registered pools
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Whether no pool is registered
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Registered keys, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }

    /// Item type name of the pool under `key`
    pub fn item_type_name(&self, key: &str) -> Option<&'static str> {
        self.pools.get(key).map(|pool| pool.item_type_name())
    }

    /// Identifier of the pool under `key`
    pub fn pool_id(&self, key: &str) -> Option<PoolId> {
        self.pools.get(key).map(|pool| pool.pool_id())
    }

    /// Statistics of the pool under `key`
    pub fn pool_stats(&self, key: &str) -> Option<PoolStats> {
        self.pools.get(key).map(|pool| pool.stats())
    }

    /// Statistics summed over every pool
    pub fn stats(&self) -> RegistryStats {
        self.pools.values().map(|pool| pool.stats()).fold(
            RegistryStats {
                pool_count: self.pools.len(),
                ..RegistryStats::default()
            },
            |mut acc, stats| {
                acc.total_created += stats.created;
                acc.total_idle += stats.idle;
                acc.total_in_use += stats.in_use;
                acc.total_spawned += stats.total_acquired;
                acc.total_despawned += stats.total_released;
                acc
            },
        )
    }
}

impl std::fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (key, pool) in &self.pools {
            map.entry(key, &pool.item_type_name());
        }
        map.finish()
    }
}

/// Write a registry error to the diagnostic channel and pass it on
fn report(operation: &str, err: RegistryError) -> RegistryError {
    match &err {
        RegistryError::DuplicateKey { .. } => log::warn!("[PoolRegistry] {operation}: {err}"),
        _ => log::error!("[PoolRegistry] {operation}: {err}"),
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::pool::test_support::{capture_logs, logged_at, projectile_factory, Pickup, Projectile};
    use crate::pool::{OverflowPolicy, PoolError};
    use log::Level;

    fn registry_with_bullets(size: usize) -> PoolRegistry {
        let mut registry = PoolRegistry::new();
        let (factory, _counter) = projectile_factory();
        registry
            .create_pool("bullet", factory, size, Transform::identity())
            .expect("fresh key");
        registry
    }

    #[test]
    fn test_create_spawn_despawn() {
        let mut registry = registry_with_bullets(2);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("bullet"));

        let bullet: Pooled<Projectile> = registry
            .spawn("bullet", Placement::at(Vec3::new(0.0, 0.0, 5.0)))
            .unwrap();
        assert!(bullet.active);
        assert_eq!(bullet.placement.position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(registry.pool_stats("bullet").unwrap().in_use, 1);

        registry.despawn("bullet", bullet).unwrap();
        assert_eq!(registry.pool_stats("bullet").unwrap().idle, 2);
    }

    #[test]
    fn test_duplicate_key_keeps_original_pool() {
        capture_logs();
        let mut registry = registry_with_bullets(3);
        let original_id = registry.pool_id("bullet").unwrap();
        let held: Pooled<Projectile> = registry.spawn("bullet", Placement::identity()).unwrap();
        let before = registry.pool_stats("bullet").unwrap();

        let (factory, counter) = projectile_factory();
        let err = registry
            .create_pool("bullet", factory, 10, Transform::identity())
            .unwrap_err();

        assert_eq!(err, RegistryError::DuplicateKey { key: "bullet".to_string() });
        assert!(logged_at(Level::Warn, "already registered under key 'bullet'"));
        assert!(!logged_at(Level::Error, "bullet"), "duplicate key is only a warning");
        assert_eq!(counter.get(), 0, "replacement factory never runs");
        assert_eq!(registry.pool_id("bullet"), Some(original_id));
        assert_eq!(registry.pool_stats("bullet"), Some(before));

        registry.despawn("bullet", held).unwrap();
    }

    #[test]
    fn test_duplicate_key_with_other_type_is_rejected() {
        let mut registry = registry_with_bullets(1);

        let err = registry
            .create_pool("bullet", Pickup::default, 1, Transform::identity())
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey { .. }));
        assert_eq!(registry.item_type_name("bullet"), Some(type_name::<Projectile>()));
    }

    #[test]
    fn test_spawn_unknown_key() {
        capture_logs();
        let mut registry = registry_with_bullets(2);
        let before = registry.stats();

        let result = registry.spawn::<Projectile>("missing", Placement::identity());
        assert_eq!(
            result.unwrap_err(),
            RegistryError::UnknownKey { key: "missing".to_string() }
        );
        assert!(logged_at(Level::Error, "spawn: no pool registered under key 'missing'"));
        assert_eq!(registry.stats(), before);
    }

    #[test]
    fn test_despawn_unknown_key_hands_item_back() {
        capture_logs();
        let mut registry = registry_with_bullets(2);
        let bullet: Pooled<Projectile> = registry.spawn("bullet", Placement::identity()).unwrap();
        let before = registry.stats();

        let rejected = registry.despawn("missing", bullet).unwrap_err();
        assert_eq!(rejected.error.key(), "missing");
        assert!(matches!(rejected.error, RegistryError::UnknownKey { .. }));
        assert!(logged_at(Level::Error, "despawn: no pool registered under key 'missing'"));
        assert_eq!(registry.stats(), before);

        registry.despawn("bullet", rejected.into_item()).unwrap();
    }

    #[test]
    fn test_spawn_with_wrong_type_is_checked() {
        let mut registry = registry_with_bullets(2);
        let before = registry.stats();

        let err = registry.spawn::<Pickup>("bullet", Placement::identity()).unwrap_err();
        match err {
            RegistryError::TypeMismatch { key, requested, actual } => {
                assert_eq!(key, "bullet");
                assert_eq!(requested, type_name::<Pickup>());
                assert_eq!(actual, type_name::<Projectile>());
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
        assert_eq!(registry.stats(), before);
    }

    #[test]
    fn test_despawn_with_wrong_type_is_checked() {
        let mut registry = registry_with_bullets(1);
        registry
            .create_pool("pickup", Pickup::default, 1, Transform::identity())
            .unwrap();

        let pickup: Pooled<Pickup> = registry.spawn("pickup", Placement::identity()).unwrap();
        let rejected = registry.despawn("bullet", pickup).unwrap_err();
        assert!(matches!(rejected.error, RegistryError::TypeMismatch { .. }));

        registry.despawn("pickup", rejected.into_item()).unwrap();
        assert_eq!(registry.pool_stats("pickup").unwrap().in_use, 0);
    }

    #[test]
    fn test_despawn_into_sibling_pool_of_same_type() {
        let mut registry = registry_with_bullets(1);
        let (factory, _counter) = projectile_factory();
        registry
            .create_pool("rocket", factory, 1, Transform::identity())
            .unwrap();

        let bullet: Pooled<Projectile> = registry.spawn("bullet", Placement::identity()).unwrap();
        let rejected = registry.despawn("rocket", bullet).unwrap_err();
        assert!(matches!(
            rejected.error,
            RegistryError::Pool {
                source: PoolError::ForeignItem { .. },
                ..
            }
        ));
        assert_eq!(registry.pool_stats("rocket").unwrap().idle, 1);

        registry.despawn("bullet", rejected.into_item()).unwrap();
    }

    #[test]
    fn test_pools_are_partitioned_by_key() {
        let mut registry = registry_with_bullets(0);
        let (factory, _counter) = projectile_factory();
        registry
            .create_pool("rocket", factory, 0, Transform::identity())
            .unwrap();

        let bullet: Pooled<Projectile> = registry.spawn("bullet", Placement::identity()).unwrap();
        registry.despawn("bullet", bullet).unwrap();

        assert_eq!(registry.pool_stats("bullet").unwrap().idle, 1);
        assert_eq!(registry.pool_stats("rocket").unwrap().created, 0);
    }

    #[test]
    fn test_create_pool_from_config() {
        let config = RegistryConfig::default()
            .with_pool(
                "bullet",
                PoolConfig::new(2).with_max_size(2).with_overflow(OverflowPolicy::Reject),
            );

        let mut registry = PoolRegistry::new();
        let (factory, _) = projectile_factory();
        registry
            .create_pool_from_config("bullet", factory, &config, Transform::identity())
            .unwrap();
        registry
            .create_pool_from_config("pickup", Pickup::default, &config, Transform::identity())
            .unwrap();

        assert_eq!(registry.pool_stats("bullet").unwrap().created, 2);
        assert_eq!(
            registry.pool_stats("pickup").unwrap().created,
            config.defaults.initial_size
        );

        let _a: Pooled<Projectile> = registry.spawn("bullet", Placement::identity()).unwrap();
        let _b: Pooled<Projectile> = registry.spawn("bullet", Placement::identity()).unwrap();
        let err = registry.spawn::<Projectile>("bullet", Placement::identity()).unwrap_err();
        assert_eq!(
            err,
            RegistryError::Pool {
                key: "bullet".to_string(),
                source: PoolError::Exhausted { capacity: 2 },
            }
        );
    }

    #[test]
    fn test_invalid_config_registers_nothing() {
        let mut registry = PoolRegistry::new();
        let (factory, counter) = projectile_factory();

        let err = registry
            .create_pool_with_config("bullet", factory, PoolConfig::new(4).with_max_size(1), Transform::identity())
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidConfig { .. }));
        assert!(registry.is_empty());
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_typed_pool_access() {
        let mut registry = registry_with_bullets(3);

        assert_eq!(registry.pool::<Projectile>("bullet").unwrap().idle_count(), 3);
        assert!(registry.pool::<Pickup>("bullet").is_err());
        assert_eq!(registry.pool_mut::<Projectile>("bullet").unwrap().prewarm(2), 2);
        assert_eq!(registry.pool_stats("bullet").unwrap().created, 5);
    }

    #[test]
    fn test_registry_stats_aggregate() {
        let mut registry = registry_with_bullets(2);
        registry
            .create_pool("pickup", Pickup::default, 3, Transform::identity())
            .unwrap();

        let bullet: Pooled<Projectile> = registry.spawn("bullet", Placement::identity()).unwrap();
        let _pickup: Pooled<Pickup> = registry.spawn("pickup", Placement::identity()).unwrap();
        registry.despawn("bullet", bullet).unwrap();

        let stats = registry.stats();
        assert_eq!(stats.pool_count, 2);
        assert_eq!(stats.total_created, 5);
        assert_eq!(stats.total_in_use, 1);
        assert_eq!(stats.total_idle, 4);
        assert_eq!(stats.total_spawned, 2);
        assert_eq!(stats.total_despawned, 1);

        let mut keys: Vec<_> = registry.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, ["bullet", "pickup"]);
    }

    #[test]
    fn test_shared_registry_across_threads() {
        let shared = registry_with_bullets(4).into_shared();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&shared);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let mut guard = registry.lock().expect("registry lock");
                        let bullet: Pooled<Projectile> =
                            guard.spawn("bullet", Placement::identity()).unwrap();
                        guard.despawn("bullet", bullet).unwrap();
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().expect("worker panicked");
        }

        let registry = shared.lock().unwrap();
        let stats = registry.pool_stats("bullet").unwrap();
        assert_eq!(stats.created, 4);
        assert_eq!(stats.total_acquired, 100);
        assert_eq!(stats.total_released, 100);
    }
}

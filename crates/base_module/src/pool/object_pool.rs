//! Generic Object Pool
//!
//! Keeps constructed items around after use so hot paths (projectiles,
//! particles, pickups) do not pay construction cost every frame.
//!
//! # Architecture
//!
//! ```text
//! ObjectPool<T>
//!     ├── factory   (builds initial population and overflow items)
//!     ├── idle      (FIFO: first released is first reused)
//!     └── states    (Idle / InUse per ItemId)
//!                 ↓
//!     acquire() ──► Pooled<T> owned by the caller
//!     release(Pooled<T>) ──► back of idle
//! ```
//!
//! # Usage
//!
//! ```rust
//! use base_module::pool::{ObjectPool, Placement, Poolable};
//! use base_module::foundation::math::{Transform, Vec3};
//!
//! #[derive(Default)]
//! struct Spark { active: bool }
//!
//! impl Poolable for Spark {
//!     fn set_active(&mut self, active: bool) { self.active = active; }
//!     fn set_placement(&mut self, _placement: &Placement) {}
//! }
//!
//! let mut pool = ObjectPool::new(Spark::default, 8, Transform::identity());
//! let spark = pool.acquire(Placement::at(Vec3::new(0.0, 1.0, 0.0))).unwrap();
//! assert!(spark.active);
//! pool.release(spark).unwrap();
//! ```

use super::config::{OverflowPolicy, PoolConfig};
use super::error::{PoolError, Rejected};
use super::poolable::{Placement, Poolable};
use crate::config::ConfigError;
use crate::foundation::math::Transform;
use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique pool identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(u64);

impl PoolId {
    fn next() -> Self {
        Self(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

/// Serial of an item within its pool, assigned in construction order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(usize);

impl ItemId {
    /// Construction order index, starting at 0
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Ownership state of an item relative to its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    /// Waiting in the pool's idle queue
    Idle,
    /// Held by a caller
    InUse,
}

/// An item on loan from a pool
///
/// Dereferences to the item. Hand it back with [`ObjectPool::release`] (or
/// `PoolRegistry::despawn`); dropping it instead leaves the pool counting it
/// as in use forever.
#[must_use = "dropping a pooled item leaves it in use forever; release it"]
pub struct Pooled<T: Poolable> {
    pool: PoolId,
    id: ItemId,
    item: T,
}

impl<T: Poolable> Pooled<T> {
    /// Serial of the item within its pool
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Pool that produced the item
    pub fn pool_id(&self) -> PoolId {
        self.pool
    }
}

impl<T: Poolable> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T: Poolable> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

impl<T: Poolable + fmt::Debug> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pooled")
            .field("pool", &self.pool)
            .field("id", &self.id)
            .field("item", &self.item)
            .finish()
    }
}

/// Statistics for pool usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Items ever constructed (initial population + growth)
    pub created: usize,
    /// Items currently idle
    pub idle: usize,
    /// Items currently held by callers
    pub in_use: usize,
    /// Successful acquires since creation
    pub total_acquired: u64,
    /// Successful releases since creation
    pub total_released: u64,
    /// Maximum number of items in use simultaneously
    pub peak_in_use: usize,
}

type Factory<T> = Box<dyn FnMut() -> T + Send>;

/// Pool of reusable items of one type
pub struct ObjectPool<T: Poolable> {
    id: PoolId,
    factory: Factory<T>,
    anchor: Transform,
    config: PoolConfig,
    idle: VecDeque<(ItemId, T)>,
    states: Vec<ItemState>,
    total_acquired: u64,
    total_released: u64,
    peak_in_use: usize,
    over_budget_reported: bool,
}

impl<T: Poolable> ObjectPool<T> {
    /// Create an unbounded pool and construct `initial_size` idle items
    ///
    /// `anchor` groups the pool's items in the scene; it does not move the
    /// placements passed to [`acquire`](Self::acquire).
    pub fn new<F>(factory: F, initial_size: usize, anchor: Transform) -> Self
    where
        F: FnMut() -> T + Send + 'static,
    {
        Self::build(Box::new(factory), PoolConfig::new(initial_size), anchor)
    }

    /// Create a pool from a validated configuration
    pub fn with_config<F>(factory: F, config: PoolConfig, anchor: Transform) -> Result<Self, ConfigError>
    where
        F: FnMut() -> T + Send + 'static,
    {
        config.validate()?;
        Ok(Self::build(Box::new(factory), config, anchor))
    }

    fn build(factory: Factory<T>, config: PoolConfig, anchor: Transform) -> Self {
        let mut pool = Self {
            id: PoolId::next(),
            factory,
            anchor,
            idle: VecDeque::with_capacity(config.initial_size),
            states: Vec::with_capacity(config.initial_size),
            config,
            total_acquired: 0,
            total_released: 0,
            peak_in_use: 0,
            over_budget_reported: false,
        };

        pool.fill(pool.config.initial_size);

        log::debug!(
            "Created {} of {} with {} idle items",
            pool.id,
            std::any::type_name::<T>(),
            pool.idle.len()
        );
        pool
    }

    /// Take an item out of the pool and place it
    ///
    /// Reuses the longest-idle item, or constructs a new one when none is
    /// idle. The placement is applied exactly as given; use
    /// [`Placement::in_frame`] with [`anchor`](Self::anchor) to spawn relative
    /// to the pool. Only fails under [`OverflowPolicy::Reject`] once
    /// `max_size` items exist.
    #[must_use = "an acquired item that is dropped never returns to the pool"]
    pub fn acquire(&mut self, placement: Placement) -> Result<Pooled<T>, PoolError> {
        let (id, mut item) = match self.idle.pop_front() {
            Some(entry) => entry,
            None => self.grow()?,
        };

        item.set_placement(&placement);
        item.set_active(true);
        item.on_spawn();

        self.states[id.index()] = ItemState::InUse;
        self.total_acquired += 1;
        self.peak_in_use = self.peak_in_use.max(self.in_use_count());

        log::trace!("{} acquired {}", self.id, id);
        Ok(Pooled {
            pool: self.id,
            id,
            item,
        })
    }

    /// Return an item to the back of the idle queue
    ///
    /// Items from another pool are handed back untouched.
    pub fn release(&mut self, pooled: Pooled<T>) -> Result<(), Rejected<T, PoolError>> {
        if pooled.pool != self.id {
            let error = PoolError::ForeignItem {
                pool: self.id,
                owner: pooled.pool,
                item: pooled.id,
            };
            return Err(Rejected::new(error, pooled));
        }

        let Pooled { id, mut item, .. } = pooled;
        item.on_despawn();
        item.set_active(false);

        self.states[id.index()] = ItemState::Idle;
        self.idle.push_back((id, item));
        self.total_released += 1;

        log::trace!("{} released {}", self.id, id);
        Ok(())
    }

    /// Construct up to `count` extra idle items, stopping at `max_size`
    ///
    /// Returns how many were constructed.
    pub fn prewarm(&mut self, count: usize) -> usize {
        let count = match self.config.max_size {
            Some(max_size) => count.min(max_size.saturating_sub(self.created_count())),
            None => count,
        };

        self.fill(count);
        count
    }

    fn fill(&mut self, count: usize) {
        for _ in 0..count {
            let (id, mut item) = self.construct();
            item.set_active(false);
            self.idle.push_back((id, item));
        }
    }

    fn grow(&mut self) -> Result<(ItemId, T), PoolError> {
        if let Some(max_size) = self.config.max_size {
            if self.created_count() >= max_size {
                match self.config.overflow {
                    OverflowPolicy::Reject => {
                        return Err(PoolError::Exhausted { capacity: max_size });
                    }
                    OverflowPolicy::Grow if !self.over_budget_reported => {
                        log::warn!(
                            "{} of {} grew past max_size {}",
                            self.id,
                            std::any::type_name::<T>(),
                            max_size
                        );
                        self.over_budget_reported = true;
                    }
                    OverflowPolicy::Grow => {}
                }
            }
        }

        log::debug!("{} empty, constructing item #{}", self.id, self.states.len());
        Ok(self.construct())
    }

    fn construct(&mut self) -> (ItemId, T) {
        let id = ItemId(self.states.len());
        self.states.push(ItemState::Idle);
        (id, (self.factory)())
    }

    /// Identifier of this pool
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// Frame the pool's items are grouped under
    pub fn anchor(&self) -> &Transform {
        &self.anchor
    }

    /// Configuration the pool was built with
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of idle items
    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    /// Number of items held by callers
    pub fn in_use_count(&self) -> usize {
        self.states.len() - self.idle.len()
    }

    /// Number of items ever constructed
    pub fn created_count(&self) -> usize {
        self.states.len()
    }

    /// Idle items in reuse order
    pub fn idle_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.idle.iter().map(|(id, _)| *id)
    }

    /// State of an item, `None` if this pool never produced it
    pub fn state_of(&self, id: ItemId) -> Option<ItemState> {
        self.states.get(id.index()).copied()
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created_count(),
            idle: self.idle_count(),
            in_use: self.in_use_count(),
            total_acquired: self.total_acquired,
            total_released: self.total_released,
            peak_in_use: self.peak_in_use,
        }
    }
}

impl<T: Poolable> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("id", &self.id)
            .field("item_type", &std::any::type_name::<T>())
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

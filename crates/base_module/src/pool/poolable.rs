//! Contract between pooled items and the pools that recycle them

use crate::foundation::math::{Quat, Transform, Vec3};

/// An item that can live in an [`ObjectPool`](super::ObjectPool)
///
/// The pool drives the item through its lifecycle:
///
/// ```text
/// factory() ─► set_active(false) ─► idle
///                                    │ acquire
///                                    ▼
///       set_placement ─► set_active(true) ─► on_spawn ─► in use
///                                    │ release
///                                    ▼
///            on_despawn ─► set_active(false) ─► idle
/// ```
pub trait Poolable: Send + 'static {
    /// Called after the item has been placed and activated on acquire
    fn on_spawn(&mut self) {}

    /// Called before the item is deactivated on release
    fn on_despawn(&mut self) {}

    /// Toggle whether the item takes part in the simulation
    fn set_active(&mut self, active: bool);

    /// Move the item to a world-space placement
    fn set_placement(&mut self, placement: &Placement);
}

/// Position and orientation applied to an item when it is acquired
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Position in 3D space
    pub position: Vec3,
    /// Orientation
    pub rotation: Quat,
}

impl Default for Placement {
    fn default() -> Self {
        Self::identity()
    }
}

impl Placement {
    /// Create a placement from position and rotation
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Placement at the origin with no rotation
    pub fn identity() -> Self {
        Self::new(Vec3::zeros(), Quat::identity())
    }

    /// Placement at a position with no rotation
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::identity())
    }

    /// Unit-scale transform with this position and rotation
    pub fn to_transform(&self) -> Transform {
        Transform::from_position_rotation(self.position, self.rotation)
    }

    /// Resolve a placement expressed relative to `frame` into world space
    ///
    /// Pools apply placements as given; spawn relative to a pool with
    /// `placement.in_frame(pool.anchor())`.
    pub fn in_frame(&self, frame: &Transform) -> Self {
        if frame.is_identity() {
            return *self;
        }

        let world = frame.combine(&self.to_transform());
        Self::new(world.position, world.rotation)
    }
}

impl From<Transform> for Placement {
    fn from(transform: Transform) -> Self {
        Self::new(transform.position, transform.rotation)
    }
}

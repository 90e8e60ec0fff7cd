//! Pooled demo entities

use base_module::foundation::math::Vec3;
use base_module::pool::{Placement, Poolable};

/// Turret round flying along its spawn orientation
#[derive(Debug, Default)]
pub struct Projectile {
    pub active: bool,
    pub position: Vec3,
    pub velocity: Vec3,
    pub age: f32,
    pub lifetime: f32,
    pub shots_fired: u32,
}

impl Projectile {
    /// Give a freshly spawned projectile its speed and fuse
    pub fn launch(&mut self, speed: f32, lifetime: f32) {
        self.velocity *= speed;
        self.lifetime = lifetime;
    }

    /// Advance one step; returns `true` once the fuse has run out
    pub fn step(&mut self, dt: f32) -> bool {
        self.position += self.velocity * dt;
        self.age += dt;
        self.age >= self.lifetime
    }
}

impl Poolable for Projectile {
    fn on_spawn(&mut self) {
        self.age = 0.0;
        self.shots_fired += 1;
    }

    fn on_despawn(&mut self) {
        self.velocity = Vec3::zeros();
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn set_placement(&mut self, placement: &Placement) {
        self.position = placement.position;
        // Unit heading; `launch` scales it to speed
        self.velocity = placement.rotation * Vec3::z();
    }
}

/// Short-lived debris thrown out by a detonation
#[derive(Debug, Default)]
pub struct Spark {
    pub active: bool,
    pub position: Vec3,
    pub velocity: Vec3,
    pub remaining: f32,
}

impl Spark {
    /// Advance one step; returns `true` once burnt out
    pub fn step(&mut self, dt: f32) -> bool {
        self.position += self.velocity * dt;
        self.velocity *= 0.9;
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

impl Poolable for Spark {
    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn set_placement(&mut self, placement: &Placement) {
        self.position = placement.position;
        self.velocity = placement.rotation * Vec3::y();
    }
}

//! Headless turret demo driving two keyed object pools
//!
//! A turret fires projectiles from the "projectile" pool; when a projectile's
//! fuse runs out it is despawned and a burst of sparks is spawned from the
//! "spark" pool. The spark pool is capped with the `reject` policy, so busy
//! frames drop sparks instead of allocating.
//!
//! Usage: `pool_demo [config.toml|config.ron]`

mod config;
mod entities;

use base_module::foundation::logging;
use base_module::foundation::math::{utils::deg_to_rad, Quat, Transform, Vec3};
use base_module::pool::{
    Placement, PoolError, PoolRegistry, Pooled, Poolable, RegistryError, Rejected,
};
use base_module::config::{Config, ConfigError};
use config::{DemoConfig, PROJECTILE_POOL, SPARK_POOL};
use entities::{Projectile, Spark};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "pool_demo/pool_demo.toml";

/// Demo errors
#[derive(Debug, Error)]
enum DemoError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pool error: {0}")]
    Registry(#[from] RegistryError),
}

impl<T: Poolable> From<Rejected<T, RegistryError>> for DemoError {
    fn from(rejected: Rejected<T, RegistryError>) -> Self {
        Self::Registry(rejected.error)
    }
}

struct Simulation {
    config: DemoConfig,
    turret: Transform,
    pools: PoolRegistry,
    rng: StdRng,
    projectiles: Vec<Pooled<Projectile>>,
    sparks: Vec<Pooled<Spark>>,
    fire_timer: f32,
    detonations: u64,
    dropped_sparks: u64,
}

impl Simulation {
    fn new(config: DemoConfig) -> Result<Self, DemoError> {
        let mut pools = PoolRegistry::new();

        let [x, y, z] = config.turret.position;
        let turret = Transform::from_position(Vec3::new(x, y, z));
        // Projectiles are grouped under the turret and aimed from it
        pools.create_pool_from_config(PROJECTILE_POOL, Projectile::default, &config.pools, turret)?;
        pools.create_pool_from_config(SPARK_POOL, Spark::default, &config.pools, Transform::identity())?;

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            turret,
            pools,
            projectiles: Vec::new(),
            sparks: Vec::new(),
            fire_timer: 0.0,
            detonations: 0,
            dropped_sparks: 0,
        })
    }

    fn run(&mut self) -> Result<(), DemoError> {
        let dt = self.config.frame_time;
        for frame in 0..self.config.frames {
            self.update(dt)?;

            if frame % 120 == 0 {
                let stats = self.pools.stats();
                log::info!(
                    "frame {:>4}: {} projectiles, {} sparks in flight ({} items pooled)",
                    frame,
                    self.projectiles.len(),
                    self.sparks.len(),
                    stats.total_created
                );
            }
        }

        self.shutdown()
    }

    fn update(&mut self, dt: f32) -> Result<(), DemoError> {
        self.fire_timer += dt;
        while self.fire_timer >= self.config.turret.fire_interval {
            self.fire_timer -= self.config.turret.fire_interval;
            self.fire()?;
        }

        let mut impacts = Vec::new();
        for mut projectile in std::mem::take(&mut self.projectiles) {
            if projectile.step(dt) {
                impacts.push(projectile.position);
                self.pools.despawn(PROJECTILE_POOL, projectile)?;
            } else {
                self.projectiles.push(projectile);
            }
        }

        for mut spark in std::mem::take(&mut self.sparks) {
            if spark.step(dt) {
                self.pools.despawn(SPARK_POOL, spark)?;
            } else {
                self.sparks.push(spark);
            }
        }

        for position in impacts {
            self.detonate(position)?;
        }
        Ok(())
    }

    fn fire(&mut self) -> Result<(), DemoError> {
        let spread = deg_to_rad(self.config.turret.spread_degrees);
        let yaw = self.rng.gen_range(-spread..=spread);
        let pitch = self.rng.gen_range(-spread..=spread);

        let aim = Placement::new(Vec3::zeros(), Quat::from_euler_angles(pitch, yaw, 0.0))
            .in_frame(&self.turret);
        let mut projectile: Pooled<Projectile> = self.pools.spawn(PROJECTILE_POOL, aim)?;
        projectile.launch(self.config.turret.muzzle_speed, self.config.turret.projectile_lifetime);

        self.projectiles.push(projectile);
        Ok(())
    }

    fn detonate(&mut self, position: Vec3) -> Result<(), DemoError> {
        self.detonations += 1;

        for _ in 0..self.config.sparks.per_impact {
            let axis = Vec3::new(
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
            );
            let angle = self.rng.gen_range(0.0..std::f32::consts::PI);
            let axis = axis.try_normalize(1.0e-6).unwrap_or_else(Vec3::y);
            let rotation = Quat::from_scaled_axis(axis * angle);
            let placement = Placement::new(position, rotation);

            match self.pools.spawn::<Spark>(SPARK_POOL, placement) {
                Ok(mut spark) => {
                    spark.remaining = self.config.sparks.lifetime;
                    self.sparks.push(spark);
                }
                Err(RegistryError::Pool {
                    source: PoolError::Exhausted { .. },
                    ..
                }) => {
                    self.dropped_sparks += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DemoError> {
        for projectile in std::mem::take(&mut self.projectiles) {
            self.pools.despawn(PROJECTILE_POOL, projectile)?;
        }
        for spark in std::mem::take(&mut self.sparks) {
            self.pools.despawn(SPARK_POOL, spark)?;
        }
        Ok(())
    }

    fn report(&self) {
        for key in [PROJECTILE_POOL, SPARK_POOL] {
            if let Some(stats) = self.pools.pool_stats(key) {
                log::info!(
                    "pool '{}': created {}, peak in use {}, acquired {}, released {}",
                    key,
                    stats.created,
                    stats.peak_in_use,
                    stats.total_acquired,
                    stats.total_released
                );
            }
        }

        let stats = self.pools.stats();
        log::info!(
            "{} detonations, {} sparks dropped at capacity, {} items idle after shutdown",
            self.detonations,
            self.dropped_sparks,
            stats.total_idle
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    logging::init_with_level(logging::LevelFilter::Info);
    let config = DemoConfig::load_or_default(&path)?;
    logging::set_level(logging::parse_level(&config.log_level));

    config.validate()?;
    log::info!("=== Object Pool Demo ({} frames) ===", config.frames);

    let mut simulation = Simulation::new(config)?;
    simulation.run()?;
    simulation.report();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base_module::pool::{OverflowPolicy, PoolConfig};

    fn short_config() -> DemoConfig {
        let mut config = DemoConfig::default();
        config.frames = 240;
        config.sparks.per_impact = 4;
        config.pools = config
            .pools
            .with_pool(SPARK_POOL, PoolConfig::new(4).with_max_size(8).with_overflow(OverflowPolicy::Reject));
        config
    }

    #[test]
    fn test_simulation_returns_everything_to_pools() {
        let mut simulation = Simulation::new(short_config()).unwrap();
        simulation.run().unwrap();

        let stats = simulation.pools.stats();
        assert_eq!(stats.total_in_use, 0);
        assert_eq!(stats.total_idle, stats.total_created);
        assert!(simulation.detonations > 0);
    }

    #[test]
    fn test_capped_spark_pool_never_grows() {
        let mut simulation = Simulation::new(short_config()).unwrap();
        simulation.run().unwrap();

        let sparks = simulation.pools.pool_stats(SPARK_POOL).unwrap();
        assert!(sparks.created <= 8);
        assert!(simulation.dropped_sparks > 0);
    }

    #[test]
    fn test_projectiles_start_at_turret() {
        let mut simulation = Simulation::new(short_config()).unwrap();
        simulation.fire().unwrap();

        let projectile = &simulation.projectiles[0];
        assert_eq!(projectile.position, Vec3::new(0.0, 0.0, -20.0));
        assert!(projectile.active);
    }
}

//! Demo configuration

use base_module::config::{Config, ConfigError};
use base_module::pool::{OverflowPolicy, PoolConfig, RegistryConfig};
use serde::{Deserialize, Serialize};

/// Pool key for turret projectiles
pub const PROJECTILE_POOL: &str = "projectile";

/// Pool key for impact sparks
pub const SPARK_POOL: &str = "spark";

/// Demo configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Log level name ("info", "debug", ...)
    pub log_level: String,

    /// Number of frames to simulate
    pub frames: u32,

    /// Fixed timestep (seconds)
    pub frame_time: f32,

    /// RNG seed so runs are reproducible
    pub seed: u64,

    /// Turret settings
    pub turret: TurretConfig,

    /// Spark settings
    pub sparks: SparkConfig,

    /// Pool sizing, keyed like the registry
    pub pools: RegistryConfig,
}

/// Turret configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretConfig {
    /// Turret position; projectile placements are relative to it
    pub position: [f32; 3],

    /// Seconds between shots
    pub fire_interval: f32,

    /// Projectile speed (units per second)
    pub muzzle_speed: f32,

    /// Maximum random deviation from straight ahead
    pub spread_degrees: f32,

    /// Seconds before a projectile detonates
    pub projectile_lifetime: f32,
}

/// Spark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SparkConfig {
    /// Sparks emitted per detonation
    pub per_impact: u32,

    /// Spark lifetime (seconds)
    pub lifetime: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            frames: 600,
            frame_time: 1.0 / 60.0,
            seed: 7,
            turret: TurretConfig::default(),
            sparks: SparkConfig::default(),
            pools: RegistryConfig::default()
                .with_pool(PROJECTILE_POOL, PoolConfig::new(24).with_max_size(64))
                .with_pool(
                    SPARK_POOL,
                    PoolConfig::new(48)
                        .with_max_size(96)
                        .with_overflow(OverflowPolicy::Reject),
                ),
        }
    }
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, -20.0],
            fire_interval: 0.1,
            muzzle_speed: 40.0,
            spread_degrees: 12.0,
            projectile_lifetime: 1.5,
        }
    }
}

impl Default for SparkConfig {
    fn default() -> Self {
        Self {
            per_impact: 6,
            lifetime: 0.4,
        }
    }
}

impl DemoConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_time <= 0.0 {
            return Err(ConfigError::Invalid("frame_time must be positive".to_string()));
        }
        if self.turret.fire_interval <= 0.0 {
            return Err(ConfigError::Invalid("turret.fire_interval must be positive".to_string()));
        }
        self.pools.validate()
    }
}

impl Config for DemoConfig {}

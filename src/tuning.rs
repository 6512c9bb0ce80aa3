//! Data-driven game balance
//!
//! Every gameplay number the simulation reads lives here. Defaults mirror
//! [`crate::consts`]; a JSON document may override any subset of fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Player ship tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTuning {
    /// Width and height of the hull in pixels
    pub size: f32,
    /// Top speed in speed units
    pub max_speed: f32,
    /// Engine acceleration in speed units per second
    pub acceleration: f32,
    /// Turn rate in revolutions per second
    pub rotation_rate: f32,
    pub max_health: i32,
    pub max_ammo: u32,
    pub max_missiles: u32,
    pub shots_per_second: f32,
    pub missiles_per_second: f32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            size: SHIP_SIZE,
            max_speed: SHIP_MAX_SPEED,
            acceleration: SHIP_ACCELERATION,
            rotation_rate: SHIP_ROTATION_RATE,
            max_health: SHIP_MAX_HEALTH,
            max_ammo: SHIP_MAX_AMMO,
            max_missiles: SHIP_MAX_MISSILES,
            shots_per_second: SHIP_SHOTS_PER_SECOND,
            missiles_per_second: SHIP_MISSILES_PER_SECOND,
        }
    }
}

/// Bullet tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletTuning {
    /// Width and height in pixels
    pub size: f32,
    /// Flight speed in speed units
    pub speed: f32,
    /// Damage dealt to an asteroid on impact
    pub damage: u32,
}

impl Default for BulletTuning {
    fn default() -> Self {
        Self {
            size: BULLET_SIZE,
            speed: BULLET_SPEED,
            damage: BULLET_DAMAGE,
        }
    }
}

/// Missile tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MissileTuning {
    pub size: f32,
    pub speed: f32,
    /// At or above the instant-kill threshold a hit pulverizes the rock
    pub damage: u32,
}

impl Default for MissileTuning {
    fn default() -> Self {
        Self {
            size: MISSILE_SIZE,
            speed: MISSILE_SPEED,
            damage: MISSILE_DAMAGE,
        }
    }
}

/// Asteroid splitting rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidTuning {
    /// Only asteroids strictly larger than this split
    pub split_min_radius: f32,
    /// Child radius = parent radius / split_ratio
    pub split_ratio: f32,
    pub split_count: usize,
    pub child_speed_factor: f32,
    pub child_spin_factor: f32,
    /// Damage at or above this value destroys without splitting
    pub instant_kill_damage: u32,
}

impl Default for AsteroidTuning {
    fn default() -> Self {
        Self {
            split_min_radius: ASTEROID_SPLIT_MIN_RADIUS,
            split_ratio: ASTEROID_SPLIT_RATIO,
            split_count: ASTEROID_SPLIT_COUNT,
            child_speed_factor: ASTEROID_CHILD_SPEED_FACTOR,
            child_spin_factor: ASTEROID_CHILD_SPIN_FACTOR,
            instant_kill_damage: ASTEROID_INSTANT_KILL_DAMAGE,
        }
    }
}

/// Station and docking tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StationTuning {
    pub radius: f32,
    /// Spin in revolutions per second
    pub spin_rate: f32,
    pub max_health: i32,
    pub dock_radius: f32,
    pub ammo_per_second: f32,
    pub missiles_per_second: f32,
    /// Cooldown after a dock or undock, in milliseconds
    pub docking_cooldown_ms: f64,
}

impl Default for StationTuning {
    fn default() -> Self {
        Self {
            radius: STATION_RADIUS,
            spin_rate: STATION_SPIN_RATE,
            max_health: STATION_MAX_HEALTH,
            dock_radius: STATION_DOCK_RADIUS,
            ammo_per_second: STATION_AMMO_PER_SECOND,
            missiles_per_second: STATION_MISSILES_PER_SECOND,
            docking_cooldown_ms: DOCKING_COOLDOWN_MS,
        }
    }
}

/// Collectibles and the resupply policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyTuning {
    pub beacon_radius: f32,
    pub package_radius: f32,
    pub package_ammo: u32,
    /// Seconds a ship must be stranded without ammo before a drop
    pub delay_secs: f64,
    /// Packages per drop
    pub batch: usize,
}

impl Default for SupplyTuning {
    fn default() -> Self {
        Self {
            beacon_radius: BEACON_RADIUS,
            package_radius: SUPPLY_PACKAGE_RADIUS,
            package_ammo: SUPPLY_PACKAGE_AMMO,
            delay_secs: SUPPLY_DELAY_SECS,
            batch: SUPPLY_BATCH,
        }
    }
}

/// Black hole influence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackHoleTuning {
    /// Event horizon as a fraction of the influence radius
    pub destroy_ratio: f32,
    /// Pull speed at the influence rim, pixels per second
    pub rim_pull: f32,
    /// Scales black-hole spin into orbital drift of captured objects
    pub orbit_gain: f32,
}

impl Default for BlackHoleTuning {
    fn default() -> Self {
        Self {
            destroy_ratio: BLACK_HOLE_DESTROY_RATIO,
            rim_pull: BLACK_HOLE_RIM_PULL,
            orbit_gain: BLACK_HOLE_ORBIT_GAIN,
        }
    }
}

/// Complete gameplay tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub ship: ShipTuning,
    pub bullet: BulletTuning,
    pub missile: MissileTuning,
    pub asteroid: AsteroidTuning,
    pub station: StationTuning,
    pub supply: SupplyTuning,
    pub black_hole: BlackHoleTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ship: ShipTuning::default(),
            bullet: BulletTuning::default(),
            missile: MissileTuning::default(),
            asteroid: AsteroidTuning::default(),
            station: StationTuning::default(),
            supply: SupplyTuning::default(),
            black_hole: BlackHoleTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject values that would stall or invert the simulation
    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                })
            }
        }

        positive("ship.size", self.ship.size)?;
        positive("ship.max_speed", self.ship.max_speed)?;
        positive("ship.shots_per_second", self.ship.shots_per_second)?;
        positive("ship.missiles_per_second", self.ship.missiles_per_second)?;
        positive("bullet.size", self.bullet.size)?;
        positive("missile.size", self.missile.size)?;
        positive("station.radius", self.station.radius)?;
        positive("station.ammo_per_second", self.station.ammo_per_second)?;
        positive("station.missiles_per_second", self.station.missiles_per_second)?;

        if self.asteroid.split_ratio <= 1.0 {
            return Err(TuningError::Invalid {
                field: "asteroid.split_ratio",
                reason: format!(
                    "children must be smaller than the parent, got ratio {}",
                    self.asteroid.split_ratio
                ),
            });
        }
        if !(0.0..1.0).contains(&self.black_hole.destroy_ratio) {
            return Err(TuningError::Invalid {
                field: "black_hole.destroy_ratio",
                reason: format!("must be in [0, 1), got {}", self.black_hole.destroy_ratio),
            });
        }
        if self.ship.max_health <= 0 {
            return Err(TuningError::Invalid {
                field: "ship.max_health",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

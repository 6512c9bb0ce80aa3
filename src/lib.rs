//! Space Rocks - simulation core for a 2D space shooter
//!
//! Core modules:
//! - `sim`: Simulation (motion, collisions, interactions, missions, tick driver)
//! - `renderer`: Render sink (draw commands produced from entity snapshots)
//! - `audio`: Audio sink (symbolic cues raised by the simulation)
//! - `assets`: Asset catalog and readiness gate
//! - `input`: Key bindings and held-intent snapshots
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod assets;
pub mod audio;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use assets::AssetCatalog;
pub use settings::{PlayerMode, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Converts abstract speed units into pixels per second
    pub const UNIT_SCALE: f32 = 10.0;
    /// Nominal host tick rate (ticks per second)
    pub const TICK_RATE: u32 = 60;
    /// Nominal tick length in milliseconds
    pub const TICK_MS: f64 = 1000.0 / TICK_RATE as f64;

    /// Ship defaults
    pub const SHIP_SIZE: f32 = 60.0;
    pub const SHIP_MAX_SPEED: f32 = 50.0;
    /// Engine acceleration (speed units per second)
    pub const SHIP_ACCELERATION: f32 = 30.0;
    /// Rotation speed (revolutions per second)
    pub const SHIP_ROTATION_RATE: f32 = 0.25;
    pub const SHIP_MAX_HEALTH: i32 = 100;
    pub const SHIP_MAX_AMMO: u32 = 30;
    pub const SHIP_MAX_MISSILES: u32 = 5;
    pub const SHIP_SHOTS_PER_SECOND: f32 = 5.0;
    pub const SHIP_MISSILES_PER_SECOND: f32 = 1.0;

    /// Projectile defaults
    pub const BULLET_SIZE: f32 = 10.0;
    pub const BULLET_SPEED: f32 = 100.0;
    pub const BULLET_DAMAGE: u32 = 1;
    pub const MISSILE_SIZE: f32 = 10.0;
    pub const MISSILE_SPEED: f32 = 55.0;
    pub const MISSILE_DAMAGE: u32 = 100;

    /// Asteroid rules
    pub const ASTEROID_SPLIT_MIN_RADIUS: f32 = 20.0;
    pub const ASTEROID_SPLIT_RATIO: f32 = 2.0;
    pub const ASTEROID_SPLIT_COUNT: usize = 3;
    pub const ASTEROID_CHILD_SPEED_FACTOR: f32 = 1.5;
    pub const ASTEROID_CHILD_SPIN_FACTOR: f32 = 2.0;
    /// Damage at or above this pulverizes an asteroid without splitting
    pub const ASTEROID_INSTANT_KILL_DAMAGE: u32 = 100;

    /// Station defaults
    pub const STATION_RADIUS: f32 = 120.0;
    pub const STATION_SPIN_RATE: f32 = 0.01;
    pub const STATION_MAX_HEALTH: i32 = 1000;
    pub const STATION_DOCK_RADIUS: f32 = 30.0;
    pub const STATION_AMMO_PER_SECOND: f32 = 2.0;
    pub const STATION_MISSILES_PER_SECOND: f32 = 0.25;
    /// Dock/undock cooldown (milliseconds)
    pub const DOCKING_COOLDOWN_MS: f64 = 2000.0;

    /// Collectibles
    pub const BEACON_RADIUS: f32 = 15.0;
    pub const SUPPLY_PACKAGE_RADIUS: f32 = 20.0;
    pub const SUPPLY_PACKAGE_AMMO: u32 = 10;
    /// Seconds between supply drops
    pub const SUPPLY_DELAY_SECS: f64 = 10.0;
    pub const SUPPLY_BATCH: usize = 3;

    /// Black hole
    pub const BLACK_HOLE_DESTROY_RATIO: f32 = 0.1;
    /// Pull speed at the influence rim (pixels per second)
    pub const BLACK_HOLE_RIM_PULL: f32 = 20.0;
    /// Multiplier turning black-hole spin into orbital drift
    pub const BLACK_HOLE_ORBIT_GAIN: f32 = 40.0;

    /// Animation frame counts
    pub const EXPLOSION_FRAMES: u32 = 81;
    pub const FLASH_FRAMES: u32 = 5;
    pub const BEACON_FRAMES: u32 = 100;
    pub const SUPPLY_PACKAGE_FRAMES: u32 = 250;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `angle`
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Rotate `point` around `center` by `angle` radians
#[inline]
pub fn rotate_about(point: Vec2, center: Vec2, angle: f32) -> Vec2 {
    center + Vec2::from_angle(angle).rotate(point - center)
}

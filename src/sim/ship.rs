//! Player ship: engine, weapons and damage
//!
//! Ship speed is not stored as a plain number. The engine records a signed
//! acceleration and the instant it last changed, and the motion model asks
//! for the speed at the moment it integrates.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::docking::DockState;
use super::entity::{Body, BoundaryPolicy, Entity, EntityKind};
use crate::audio::{AudioCue, SoundEvent};
use crate::tuning::Tuning;

/// Engine acceleration profile
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Thrust {
    /// Speed units per second (negative while coasting to a stop)
    pub accel: f32,
    /// When `accel` last changed
    pub since_ms: f64,
    /// Speed at `since_ms`
    pub base_speed: f32,
}

impl Thrust {
    /// Effective speed at `now_ms`, clamped to `[0, max_speed]`
    pub fn speed_at(&self, now_ms: f64, max_speed: f32) -> f32 {
        let elapsed_secs = ((now_ms - self.since_ms).max(0.0) / 1000.0) as f32;
        (self.base_speed + self.accel * elapsed_secs).clamp(0.0, max_speed)
    }

    /// Change acceleration, carrying the current speed over
    pub fn retarget(&mut self, accel: f32, now_ms: f64, max_speed: f32) {
        self.base_speed = self.speed_at(now_ms, max_speed);
        self.accel = accel;
        self.since_ms = now_ms;
    }

    /// Move the reference instant forward, e.g. past a pause
    pub fn postpone(&mut self, by_ms: f64) {
        self.since_ms += by_ms;
    }

    /// Dead stop
    pub fn halt(&mut self, now_ms: f64) {
        self.base_speed = 0.0;
        self.accel = 0.0;
        self.since_ms = now_ms;
    }
}

/// A player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    /// Index of the owning player
    pub player: usize,
    pub health: i32,
    pub max_health: i32,
    pub ammo: u32,
    pub max_ammo: u32,
    pub missiles: u32,
    pub max_missiles: u32,
    /// Beacons collected so far
    pub beacons: u32,

    pub max_speed: f32,
    pub acceleration: f32,
    /// Turn rate when a rotation intent is held (revolutions per second)
    pub max_rotation_rate: f32,
    pub shot_interval_ms: f64,
    pub missile_interval_ms: f64,

    pub engine_on: bool,
    pub thrust: Thrust,
    pub shot_at: Option<f64>,
    pub missile_at: Option<f64>,
    pub dock: DockState,
}

impl Ship {
    pub fn new(player: usize, tuning: &Tuning) -> Self {
        let cfg = &tuning.ship;
        Self {
            player,
            health: cfg.max_health,
            max_health: cfg.max_health,
            ammo: cfg.max_ammo,
            max_ammo: cfg.max_ammo,
            missiles: cfg.max_missiles,
            max_missiles: cfg.max_missiles,
            beacons: 0,
            max_speed: cfg.max_speed,
            acceleration: cfg.acceleration,
            max_rotation_rate: cfg.rotation_rate,
            shot_interval_ms: 1000.0 / cfg.shots_per_second as f64,
            missile_interval_ms: 1000.0 / cfg.missiles_per_second as f64,
            engine_on: false,
            thrust: Thrust::default(),
            shot_at: None,
            missile_at: None,
            dock: DockState::Undocked,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

impl Entity {
    pub fn ship(player: usize, pos: Vec2, heading: f32, tuning: &Tuning) -> Self {
        let body = Body::new(
            pos,
            Vec2::splat(tuning.ship.size),
            BoundaryPolicy::WrapAround,
        )
        .with_heading(heading);
        Self::new(body, EntityKind::Ship(Ship::new(player, tuning)))
    }
}

/// Cooldown gate: never fired, or the interval has strictly passed
fn ready(last: Option<f64>, interval_ms: f64, now_ms: f64) -> bool {
    last.is_none_or(|at| at + interval_ms < now_ms)
}

/// Fire a bullet. `None` when destroyed, out of ammo or still cooling down.
pub fn fire(
    entity: &mut Entity,
    now_ms: f64,
    tuning: &Tuning,
    sounds: &mut Vec<SoundEvent>,
) -> Option<Entity> {
    let Entity {
        body,
        kind: EntityKind::Ship(ship),
        ..
    } = entity
    else {
        return None;
    };
    if body.is_destroyed() || ship.ammo == 0 {
        return None;
    }
    if !ready(ship.shot_at, ship.shot_interval_ms, now_ms) {
        return None;
    }
    ship.shot_at = Some(now_ms);
    ship.ammo -= 1;
    sounds.push(SoundEvent::play(AudioCue::Shot));
    Some(Entity::bullet(body.pos, body.facing(), tuning))
}

/// Launch a missile. The caller starts its flight cue once it has an id.
pub fn launch_missile(entity: &mut Entity, now_ms: f64, tuning: &Tuning) -> Option<Entity> {
    let Entity {
        body,
        kind: EntityKind::Ship(ship),
        ..
    } = entity
    else {
        return None;
    };
    if body.is_destroyed() || ship.missiles == 0 {
        return None;
    }
    if !ready(ship.missile_at, ship.missile_interval_ms, now_ms) {
        return None;
    }
    ship.missile_at = Some(now_ms);
    ship.missiles -= 1;
    Some(Entity::missile(body.pos, body.facing(), tuning))
}

/// Start accelerating. Ignored while docked.
pub fn engine_on(entity: &mut Entity, now_ms: f64, sounds: &mut Vec<SoundEvent>) {
    let Entity {
        id,
        body,
        kind: EntityKind::Ship(ship),
    } = entity
    else {
        return;
    };
    if body.is_destroyed() || ship.engine_on || ship.dock.is_attached() {
        return;
    }
    ship.engine_on = true;
    ship.thrust
        .retarget(ship.acceleration, now_ms, ship.max_speed);
    sounds.push(SoundEvent::play_from(AudioCue::Engine, *id));
}

/// Cut the engine; the ship coasts down to a stop
pub fn engine_off(entity: &mut Entity, now_ms: f64, sounds: &mut Vec<SoundEvent>) {
    let Entity {
        id,
        body,
        kind: EntityKind::Ship(ship),
    } = entity
    else {
        return;
    };
    if body.is_destroyed() || !ship.engine_on {
        return;
    }
    ship.engine_on = false;
    ship.thrust
        .retarget(-ship.acceleration, now_ms, ship.max_speed);
    sounds.push(SoundEvent::stop(AudioCue::Engine, *id));
}

/// Set rotation from a turn direction in [-1, 1]
pub fn steer(entity: &mut Entity, turn: f32) {
    let Entity {
        body,
        kind: EntityKind::Ship(ship),
        ..
    } = entity
    else {
        return;
    };
    if body.is_destroyed() {
        return;
    }
    body.rotation_rate = turn * ship.max_rotation_rate;
}

/// Apply collision damage. Returns the wreck explosion when this hit kills.
pub fn take_damage(
    entity: &mut Entity,
    damage: i32,
    sounds: &mut Vec<SoundEvent>,
) -> Option<Entity> {
    let Entity {
        id,
        body,
        kind: EntityKind::Ship(ship),
    } = entity
    else {
        return None;
    };
    if body.is_destroyed() {
        return None;
    }
    ship.health -= damage;
    if ship.health > 0 {
        return None;
    }
    ship.health = 0;
    body.destroy();
    if ship.engine_on {
        ship.engine_on = false;
        sounds.push(SoundEvent::stop(AudioCue::Engine, *id));
    }
    sounds.push(SoundEvent::play(AudioCue::Explosion));
    log::debug!("Ship {} destroyed", id);
    Some(Entity::explosion(body.pos, body.radius() * 2.0))
}

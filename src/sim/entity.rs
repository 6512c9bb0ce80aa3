//! Entity data model
//!
//! Every simulated object is an [`Entity`]: a kinematic [`Body`] shared by all
//! variants plus a tagged [`EntityKind`] holding the variant's own state.
//! Category filtering is a match on the tag, never a runtime type test.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ship::Ship;
use crate::tuning::Tuning;

/// Registry-assigned entity handle
pub type EntityId = u32;

/// Id carried by entities that have not been added to a registry yet
pub const UNASSIGNED_ID: EntityId = 0;

/// What happens when an entity leaves the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryPolicy {
    /// Reappear on the opposite edge
    WrapAround,
    /// Flag destroyed
    DestroyOnLeave,
}

/// Kinematic state shared by every variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    /// Direction of travel (radians)
    pub heading: f32,
    /// Visual roll independent of heading (radians)
    pub spin: f32,
    /// Speed units along heading
    pub speed: f32,
    /// Revolutions per second applied to heading
    pub rotation_rate: f32,
    /// Revolutions per second applied to spin
    pub spin_rate: f32,
    /// Bounding box (width, height)
    pub size: Vec2,
    pub boundary: BoundaryPolicy,
    destroyed: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2, boundary: BoundaryPolicy) -> Self {
        Self {
            pos,
            heading: 0.0,
            spin: 0.0,
            speed: 0.0,
            rotation_rate: 0.0,
            spin_rate: 0.0,
            size,
            boundary,
            destroyed: false,
        }
    }

    /// Square body of the given radius
    pub fn round(pos: Vec2, radius: f32, boundary: BoundaryPolicy) -> Self {
        Self::new(pos, Vec2::splat(radius * 2.0), boundary)
    }

    pub fn with_heading(mut self, heading: f32) -> Self {
        self.heading = heading;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_spin_rate(mut self, spin_rate: f32) -> Self {
        self.spin_rate = spin_rate;
        self
    }

    /// Collision radius (entities are treated as circles)
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size.x / 2.0
    }

    /// Direction the nose points (heading plus roll)
    #[inline]
    pub fn facing(&self) -> f32 {
        self.heading + self.spin
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Flag destroyed. Returns false if it already was, so callers can gate
    /// one-time side effects on the transition.
    pub fn destroy(&mut self) -> bool {
        let was_alive = !self.destroyed;
        self.destroyed = true;
        was_alive
    }
}

/// Asteroid state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub radius: f32,
}

impl Asteroid {
    /// Damage dealt to whatever it rams: round(r³/100), at least 1
    pub fn impact_damage(&self) -> i32 {
        let damage = (self.radius.powi(3) / 100.0).round() as i32;
        damage.max(1)
    }
}

/// Space station state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub radius: f32,
    pub health: i32,
    pub max_health: i32,
    /// The one ship currently docked or docking here
    pub docked_ship: Option<EntityId>,
    /// Some ship is within dock range this tick
    pub dock_highlight: bool,
    pub ammo_loaded_at: Option<f64>,
    pub missile_loaded_at: Option<f64>,
}

impl Station {
    /// Push the resupply clocks back, e.g. past a pause
    pub fn postpone(&mut self, by_ms: f64) {
        for at in [&mut self.ammo_loaded_at, &mut self.missile_loaded_at]
            .into_iter()
            .flatten()
        {
            *at += by_ms;
        }
    }
}

/// Collectible beacon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beacon {
    pub radius: f32,
    pub frame: u32,
}

/// Ammo crate dropped by the resupply policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyPackage {
    pub radius: f32,
    pub ammo: u32,
    pub frame: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackHole {
    /// Influence radius
    pub radius: f32,
}

/// One-shot cosmetic animation (explosions, flashes)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animation {
    /// Drawn radius
    pub radius: f32,
    pub frame: u32,
    pub frames: u32,
}

impl Animation {
    pub fn new(radius: f32, frames: u32) -> Self {
        Self {
            radius,
            frame: 0,
            frames,
        }
    }

    /// Advance one frame; true once the last frame has been shown
    pub fn step(&mut self) -> bool {
        self.frame += 1;
        self.frame >= self.frames
    }
}

/// Variant-specific state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityKind {
    Ship(Ship),
    Bullet,
    Missile,
    Asteroid(Asteroid),
    Station(Station),
    Beacon(Beacon),
    SupplyPackage(SupplyPackage),
    BlackHole(BlackHole),
    Explosion(Animation),
    Flash(Animation),
}

/// Filter key used when pairing entities for collision checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Ship,
    Bullet,
    Missile,
    Asteroid,
    Station,
    Beacon,
    SupplyPackage,
    BlackHole,
    Effect,
}

impl EntityKind {
    pub fn category(&self) -> Category {
        match self {
            EntityKind::Ship(_) => Category::Ship,
            EntityKind::Bullet => Category::Bullet,
            EntityKind::Missile => Category::Missile,
            EntityKind::Asteroid(_) => Category::Asteroid,
            EntityKind::Station(_) => Category::Station,
            EntityKind::Beacon(_) => Category::Beacon,
            EntityKind::SupplyPackage(_) => Category::SupplyPackage,
            EntityKind::BlackHole(_) => Category::BlackHole,
            EntityKind::Explosion(_) | EntityKind::Flash(_) => Category::Effect,
        }
    }

    /// Cosmetic effects take no part in collisions
    pub fn is_collidable(&self) -> bool {
        self.category() != Category::Effect
    }
}

/// A simulated object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub body: Body,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(body: Body, kind: EntityKind) -> Self {
        Self {
            id: UNASSIGNED_ID,
            body,
            kind,
        }
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn is_destroyed(&self) -> bool {
        self.body.is_destroyed()
    }

    /// Speed the motion model should use right now
    pub fn effective_speed(&self, now_ms: f64) -> f32 {
        match &self.kind {
            EntityKind::Ship(ship) => ship.thrust.speed_at(now_ms, ship.max_speed),
            _ => self.body.speed,
        }
    }

    /// Rotation rate the motion model should use right now
    pub fn effective_rotation_rate(&self, _now_ms: f64) -> f32 {
        self.body.rotation_rate
    }

    pub fn as_ship(&self) -> Option<&Ship> {
        match &self.kind {
            EntityKind::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_ship_mut(&mut self) -> Option<&mut Ship> {
        match &mut self.kind {
            EntityKind::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_station(&self) -> Option<&Station> {
        match &self.kind {
            EntityKind::Station(station) => Some(station),
            _ => None,
        }
    }

    pub fn as_station_mut(&mut self) -> Option<&mut Station> {
        match &mut self.kind {
            EntityKind::Station(station) => Some(station),
            _ => None,
        }
    }

    // === Constructors ===

    pub fn bullet(pos: Vec2, heading: f32, tuning: &Tuning) -> Self {
        let body = Body::new(
            pos,
            Vec2::splat(tuning.bullet.size),
            BoundaryPolicy::DestroyOnLeave,
        )
        .with_heading(heading)
        .with_speed(tuning.bullet.speed);
        Self::new(body, EntityKind::Bullet)
    }

    pub fn missile(pos: Vec2, heading: f32, tuning: &Tuning) -> Self {
        let body = Body::new(
            pos,
            Vec2::splat(tuning.missile.size),
            BoundaryPolicy::DestroyOnLeave,
        )
        .with_heading(heading)
        .with_speed(tuning.missile.speed);
        Self::new(body, EntityKind::Missile)
    }

    pub fn asteroid(pos: Vec2, heading: f32, radius: f32, speed: f32, spin_rate: f32) -> Self {
        let body = Body::round(pos, radius, BoundaryPolicy::WrapAround)
            .with_heading(heading)
            .with_speed(speed)
            .with_spin_rate(spin_rate);
        Self::new(body, EntityKind::Asteroid(Asteroid { radius }))
    }

    pub fn station(pos: Vec2, tuning: &Tuning) -> Self {
        let cfg = &tuning.station;
        let body = Body::round(pos, cfg.radius, BoundaryPolicy::WrapAround)
            .with_spin_rate(cfg.spin_rate);
        Self::new(
            body,
            EntityKind::Station(Station {
                radius: cfg.radius,
                health: cfg.max_health,
                max_health: cfg.max_health,
                docked_ship: None,
                dock_highlight: false,
                ammo_loaded_at: None,
                missile_loaded_at: None,
            }),
        )
    }

    pub fn beacon(pos: Vec2, heading: f32, speed: f32, start_frame: u32, tuning: &Tuning) -> Self {
        let radius = tuning.supply.beacon_radius;
        let body = Body::round(pos, radius, BoundaryPolicy::WrapAround)
            .with_heading(heading)
            .with_speed(speed);
        Self::new(
            body,
            EntityKind::Beacon(Beacon {
                radius,
                frame: start_frame,
            }),
        )
    }

    pub fn supply_package(
        pos: Vec2,
        heading: f32,
        speed: f32,
        start_frame: u32,
        tuning: &Tuning,
    ) -> Self {
        let radius = tuning.supply.package_radius;
        let body = Body::round(pos, radius, BoundaryPolicy::WrapAround)
            .with_heading(heading)
            .with_speed(speed);
        Self::new(
            body,
            EntityKind::SupplyPackage(SupplyPackage {
                radius,
                ammo: tuning.supply.package_ammo,
                frame: start_frame,
            }),
        )
    }

    pub fn black_hole(pos: Vec2, radius: f32, spin_rate: f32) -> Self {
        let body =
            Body::round(pos, radius, BoundaryPolicy::WrapAround).with_spin_rate(spin_rate);
        Self::new(body, EntityKind::BlackHole(BlackHole { radius }))
    }

    pub fn explosion(pos: Vec2, radius: f32) -> Self {
        let body = Body::round(pos, radius, BoundaryPolicy::WrapAround);
        Self::new(
            body,
            EntityKind::Explosion(Animation::new(radius, crate::consts::EXPLOSION_FRAMES)),
        )
    }

    pub fn flash(pos: Vec2, radius: f32) -> Self {
        let body = Body::round(pos, radius, BoundaryPolicy::WrapAround);
        Self::new(
            body,
            EntityKind::Flash(Animation::new(radius, crate::consts::FLASH_FRAMES)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destroy_is_write_once() {
        let mut body = Body::round(Vec2::ZERO, 5.0, BoundaryPolicy::WrapAround);
        assert!(body.destroy());
        assert!(!body.destroy());
        assert!(body.is_destroyed());
    }

    #[test]
    fn test_asteroid_impact_damage() {
        assert_eq!(Asteroid { radius: 50.0 }.impact_damage(), 1250);
        assert_eq!(Asteroid { radius: 20.0 }.impact_damage(), 80);
        // Tiny rocks still hurt
        assert_eq!(Asteroid { radius: 1.0 }.impact_damage(), 1);
    }

    #[test]
    fn test_effects_are_not_collidable() {
        let explosion = Entity::explosion(Vec2::ZERO, 40.0);
        assert_eq!(explosion.category(), Category::Effect);
        assert!(!explosion.kind.is_collidable());
        assert!(Entity::black_hole(Vec2::ZERO, 100.0, 0.0).kind.is_collidable());
    }

    #[test]
    fn test_animation_finishes() {
        let mut anim = Animation::new(10.0, 3);
        assert!(!anim.step());
        assert!(!anim.step());
        assert!(anim.step());
    }

    #[test]
    fn test_projectiles_leave_viewport() {
        let tuning = Tuning::default();
        let bullet = Entity::bullet(Vec2::ZERO, 0.0, &tuning);
        assert_eq!(bullet.body.boundary, BoundaryPolicy::DestroyOnLeave);
        assert_eq!(bullet.body.speed, tuning.bullet.speed);
        let asteroid = Entity::asteroid(Vec2::ZERO, 0.0, 30.0, 5.0, 0.1);
        assert_eq!(asteroid.body.boundary, BoundaryPolicy::WrapAround);
        assert_eq!(asteroid.body.radius(), 30.0);
    }
}

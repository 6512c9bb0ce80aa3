//! Interaction resolver
//!
//! Applies the effect of each colliding pair found by the sweeps in
//! [`super::collision`] and collects whatever the effects spawn (debris,
//! explosions, flashes). Nothing here touches registry membership; the
//! driver appends the returned entities once the whole pass is done.
//!
//! One-time side effects (debris, explosions, sounds) are gated on the
//! destroyed flag flipping, so a rock hit by two bullets in the same tick
//! shatters once.

use rand::Rng;
use std::f32::consts::TAU;

use super::collision::{INTERACTING_PAIRS, live_indices, pair_mut, sweep};
use super::docking::can_dock;
use super::entity::{Category, Entity, EntityKind};
use super::ship;
use crate::audio::{AudioCue, SoundEvent};
use crate::rotate_about;
use crate::tuning::Tuning;

/// Destroy an asteroid hit with `damage`. Splits into smaller children
/// when the rock is big enough and the hit was not an instant kill.
/// Returns nothing if the rock was already destroyed.
pub fn shatter_asteroid(
    entity: &mut Entity,
    damage: u32,
    tuning: &Tuning,
    rng: &mut impl Rng,
    sounds: &mut Vec<SoundEvent>,
) -> Vec<Entity> {
    let radius = match &entity.kind {
        EntityKind::Asteroid(asteroid) => asteroid.radius,
        _ => return Vec::new(),
    };
    if !entity.body.destroy() {
        return Vec::new();
    }
    sounds.push(SoundEvent::play(AudioCue::Explosion));

    let body = &entity.body;
    let mut debris = vec![Entity::explosion(body.pos, radius * 2.0)];

    let cfg = &tuning.asteroid;
    if damage < cfg.instant_kill_damage && radius > cfg.split_min_radius {
        let child_radius = radius / cfg.split_ratio;
        let child_speed = body.speed * cfg.child_speed_factor;
        let child_spin = body.spin_rate * cfg.child_spin_factor;
        for _ in 0..cfg.split_count {
            let heading = rng.random::<f32>() * TAU;
            debris.push(Entity::asteroid(
                body.pos,
                heading,
                child_radius,
                child_speed,
                child_spin,
            ));
        }
        log::debug!(
            "Asteroid {} split into {} x r={}",
            entity.id,
            cfg.split_count,
            child_radius
        );
    }
    debris
}

/// Apply impact damage to a station. Returns its explosion when the hit
/// brings health to zero. A docked ship is released by the driver once
/// the pass completes.
pub fn damage_station(
    entity: &mut Entity,
    damage: i32,
    sounds: &mut Vec<SoundEvent>,
) -> Option<Entity> {
    let Entity {
        id,
        body,
        kind: EntityKind::Station(station),
    } = entity
    else {
        return None;
    };
    if body.is_destroyed() {
        return None;
    }
    station.health -= damage;
    if station.health > 0 {
        return None;
    }
    station.health = 0;
    body.destroy();
    sounds.push(SoundEvent::play(AudioCue::Explosion));
    log::debug!("Station {} destroyed", id);
    Some(Entity::explosion(body.pos, station.radius * 2.0))
}

/// Ship picks up a beacon
pub fn collect_beacon(ship_entity: &mut Entity, beacon: &mut Entity, sounds: &mut Vec<SoundEvent>) {
    if ship_entity.is_destroyed() {
        return;
    }
    let Some(ship) = ship_entity.as_ship_mut() else {
        return;
    };
    if beacon.body.destroy() {
        ship.beacons += 1;
        sounds.push(SoundEvent::play(AudioCue::PickUp));
    }
}

/// Ship picks up a supply package, but only with room for more ammo
pub fn collect_package(ship_entity: &mut Entity, package: &mut Entity, sounds: &mut Vec<SoundEvent>) {
    if ship_entity.is_destroyed() {
        return;
    }
    let (Some(ship), EntityKind::SupplyPackage(pack)) = (ship_entity.as_ship_mut(), &package.kind)
    else {
        return;
    };
    if ship.ammo >= ship.max_ammo {
        return;
    }
    let load = pack.ammo.min(ship.max_ammo - ship.ammo);
    if package.body.destroy() {
        ship.ammo += load;
        sounds.push(SoundEvent::play(AudioCue::PickAmmo));
    }
}

/// Refresh each station's "can dock" highlight: set while some ship could
/// dock right now, so never on an occupied station
pub fn update_dock_highlights(entities: &mut [Entity], tuning: &Tuning) {
    let ships = live_indices(entities, Category::Ship);
    for si in live_indices(entities, Category::Station) {
        let highlight = ships
            .iter()
            .any(|&i| can_dock(&entities[i], &entities[si], tuning.station.dock_radius));
        if let Some(station) = entities[si].as_station_mut() {
            station.dock_highlight = highlight;
        }
    }
}

/// Pull everything inside a black hole's influence toward its center and
/// drag it around with the hole's spin. Objects at or inside the event
/// horizon are swallowed and leave a flash behind.
pub fn apply_black_holes(
    entities: &mut [Entity],
    delta_ms: f64,
    tuning: &Tuning,
    sounds: &mut Vec<SoundEvent>,
) -> Vec<Entity> {
    let cfg = &tuning.black_hole;
    let secs = (delta_ms.max(0.0) / 1000.0) as f32;
    let mut flashes = Vec::new();

    for h in live_indices(entities, Category::BlackHole) {
        for i in 0..entities.len() {
            if i == h {
                continue;
            }
            let (hole, object) = pair_mut(entities, h, i);
            if object.is_destroyed()
                || !object.kind.is_collidable()
                || object.category() == Category::BlackHole
                || !super::collision::collides(&object.body, &hole.body)
            {
                continue;
            }

            let center = hole.body.pos;
            let radius = hole.body.radius();
            let horizon = radius * cfg.destroy_ratio;
            let mut dist = object.body.pos.distance(center);

            if dist > horizon && secs > 0.0 {
                let pull = cfg.rim_pull * radius / dist.max(f32::EPSILON);
                let step = (pull * secs).min(dist);
                let inward = (center - object.body.pos).normalize_or_zero();
                let pulled = object.body.pos + inward * step;
                let orbit = TAU * hole.body.spin_rate * cfg.orbit_gain * secs;
                object.body.pos = rotate_about(pulled, center, orbit);
                dist = object.body.pos.distance(center);
            }

            if dist <= horizon {
                if let Some(flash) = swallow(object, sounds) {
                    flashes.push(flash);
                }
            }
        }
    }
    flashes
}

fn swallow(object: &mut Entity, sounds: &mut Vec<SoundEvent>) -> Option<Entity> {
    if !object.body.destroy() {
        return None;
    }
    if let Some(ship) = object.as_ship_mut() {
        ship.health = 0;
        sounds.push(SoundEvent::play(AudioCue::Explosion));
    }
    log::debug!("Entity {} swallowed by black hole", object.id);
    Some(Entity::flash(object.body.pos, object.body.radius()))
}

/// Run every interaction for one tick, in a fixed order, and return the
/// spawned entities.
pub fn resolve_collisions(
    entities: &mut [Entity],
    delta_ms: f64,
    tuning: &Tuning,
    rng: &mut impl Rng,
    sounds: &mut Vec<SoundEvent>,
) -> Vec<Entity> {
    let mut spawned = Vec::new();

    for (outer, inner) in INTERACTING_PAIRS {
        match (outer, inner) {
            (Category::Asteroid, Category::Bullet) => {
                sweep(entities, outer, inner, |rock, bullet| {
                    bullet.body.destroy();
                    spawned.extend(shatter_asteroid(rock, tuning.bullet.damage, tuning, rng, sounds));
                });
            }
            (Category::Asteroid, Category::Missile) => {
                sweep(entities, outer, inner, |rock, missile| {
                    missile.body.destroy();
                    spawned.extend(shatter_asteroid(rock, tuning.missile.damage, tuning, rng, sounds));
                });
            }
            (Category::Asteroid, Category::Station) => {
                sweep(entities, outer, inner, |rock, station| {
                    let damage = impact_damage(rock);
                    let pulverize = tuning.asteroid.instant_kill_damage;
                    spawned.extend(shatter_asteroid(rock, pulverize, tuning, rng, sounds));
                    spawned.extend(damage_station(station, damage, sounds));
                });
            }
            (Category::Ship, Category::Asteroid) => {
                sweep(entities, outer, inner, |ship_entity, rock| {
                    let damage = impact_damage(rock);
                    let pulverize = tuning.asteroid.instant_kill_damage;
                    spawned.extend(shatter_asteroid(rock, pulverize, tuning, rng, sounds));
                    spawned.extend(ship::take_damage(ship_entity, damage, sounds));
                });
            }
            (Category::Ship, Category::Beacon) => {
                sweep(entities, outer, inner, |ship_entity, beacon| {
                    collect_beacon(ship_entity, beacon, sounds);
                });
            }
            (Category::Station, Category::Ship) => update_dock_highlights(entities, tuning),
            (Category::Ship, Category::SupplyPackage) => {
                sweep(entities, outer, inner, |ship_entity, package| {
                    collect_package(ship_entity, package, sounds);
                });
            }
            _ => {}
        }
    }

    spawned.extend(apply_black_holes(entities, delta_ms, tuning, sounds));
    spawned
}

fn impact_damage(rock: &Entity) -> i32 {
    match &rock.kind {
        EntityKind::Asteroid(asteroid) => asteroid.impact_damage(),
        _ => 0,
    }
}

//! Ship/station docking and station resupply
//!
//! Docking is exclusive: a station holds at most one ship, and a ship is
//! attached to at most one station. Both sides store the other's id; the
//! driver repairs the link when either side is destroyed.
//!
//! ```text
//! Undocked --dock--> Docking --cooldown--> Docked --undock--> Undocking --cooldown--> Undocked
//! ```

use serde::{Deserialize, Serialize};

use super::collision::within_radius;
use super::entity::{Category, Entity, EntityId, EntityKind, Station};
use super::ship::Ship;
use crate::audio::{AudioCue, SoundEvent};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DockState {
    Undocked,
    /// Attached; dock/undock blocked until the cooldown ends
    Docking { station: EntityId, until_ms: f64 },
    Docked { station: EntityId },
    /// Free again; dock/undock blocked until the cooldown ends
    Undocking { until_ms: f64 },
}

impl DockState {
    /// Station this ship is attached to, if any
    pub fn station(&self) -> Option<EntityId> {
        match *self {
            DockState::Docking { station, .. } | DockState::Docked { station } => Some(station),
            _ => None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.station().is_some()
    }

    pub fn in_transition(&self) -> bool {
        matches!(
            self,
            DockState::Docking { .. } | DockState::Undocking { .. }
        )
    }

    /// Push a pending cooldown deadline back
    pub fn postpone(&mut self, by_ms: f64) {
        match self {
            DockState::Docking { until_ms, .. } | DockState::Undocking { until_ms } => {
                *until_ms += by_ms;
            }
            _ => {}
        }
    }

    /// Finish a transition whose cooldown has elapsed
    pub fn settle(&mut self, now_ms: f64) {
        match *self {
            DockState::Docking { station, until_ms } if now_ms >= until_ms => {
                *self = DockState::Docked { station };
            }
            DockState::Undocking { until_ms } if now_ms >= until_ms => {
                *self = DockState::Undocked;
            }
            _ => {}
        }
    }
}

/// Ship centre within the station's dock radius, and the station is free
pub fn can_dock(ship: &Entity, station: &Entity, dock_radius: f32) -> bool {
    let Some(st) = station.as_station() else {
        return false;
    };
    if st.docked_ship.is_some() || ship.is_destroyed() || station.is_destroyed() {
        return false;
    }
    within_radius(&ship.body, &station.body, dock_radius)
}

/// Index of the first live station `ship` could dock with
pub fn find_dockable_station(entities: &[Entity], ship: &Entity, dock_radius: f32) -> Option<usize> {
    entities
        .iter()
        .position(|e| e.category() == Category::Station && can_dock(ship, e, dock_radius))
}

/// Dock `ship_entity` to `station_entity`. Returns false with no state
/// change when the ship is busy, the station is taken or out of range.
pub fn try_dock(
    ship_entity: &mut Entity,
    station_entity: &mut Entity,
    now_ms: f64,
    tuning: &Tuning,
    sounds: &mut Vec<SoundEvent>,
) -> bool {
    if !can_dock(ship_entity, station_entity, tuning.station.dock_radius) {
        return false;
    }
    let ship_id = ship_entity.id;
    let station_id = station_entity.id;
    let station_pos = station_entity.body.pos;
    let station_spin_rate = station_entity.body.spin_rate;

    let Entity {
        body,
        kind: EntityKind::Ship(ship),
        ..
    } = ship_entity
    else {
        return false;
    };
    if ship.dock != DockState::Undocked {
        return false;
    }
    let Some(station) = station_entity.as_station_mut() else {
        return false;
    };

    station.docked_ship = Some(ship_id);
    ship.dock = DockState::Docking {
        station: station_id,
        until_ms: now_ms + tuning.station.docking_cooldown_ms,
    };
    if ship.engine_on {
        ship.engine_on = false;
        sounds.push(SoundEvent::stop(AudioCue::Engine, ship_id));
    }
    ship.thrust.halt(now_ms);
    body.speed = 0.0;
    body.spin_rate = station_spin_rate;
    body.pos = station_pos;

    sounds.push(SoundEvent::play(AudioCue::Dock));
    log::debug!("Ship {} docked to station {}", ship_id, station_id);
    true
}

/// Detach a ship, folding its roll back into its heading
fn detach(ship_entity: &mut Entity, now_ms: f64, tuning: &Tuning) {
    let Entity {
        body,
        kind: EntityKind::Ship(ship),
        ..
    } = ship_entity
    else {
        return;
    };
    body.heading = crate::normalize_angle(body.heading + body.spin);
    body.spin = 0.0;
    body.spin_rate = 0.0;
    ship.dock = DockState::Undocking {
        until_ms: now_ms + tuning.station.docking_cooldown_ms,
    };
}

fn release_station(station: &mut Station) {
    station.docked_ship = None;
    station.ammo_loaded_at = None;
    station.missile_loaded_at = None;
}

/// Undock a fully docked ship. `station_entity` is the station it is
/// attached to, when still present.
pub fn try_undock(
    ship_entity: &mut Entity,
    station_entity: Option<&mut Entity>,
    now_ms: f64,
    tuning: &Tuning,
    sounds: &mut Vec<SoundEvent>,
) -> bool {
    if ship_entity.is_destroyed() {
        return false;
    }
    let Some(ship) = ship_entity.as_ship() else {
        return false;
    };
    if !matches!(ship.dock, DockState::Docked { .. }) {
        return false;
    }
    if let Some(station) = station_entity.and_then(|e| e.as_station_mut()) {
        release_station(station);
    }
    detach(ship_entity, now_ms, tuning);
    sounds.push(SoundEvent::play(AudioCue::Undock));
    log::debug!("Ship {} undocked", ship_entity.id);
    true
}

/// Repair links broken by destruction: a destroyed station frees its ship,
/// a destroyed ship frees its station.
pub fn release_broken_links(
    entities: &mut [Entity],
    now_ms: f64,
    tuning: &Tuning,
    sounds: &mut Vec<SoundEvent>,
) {
    let mut orphaned_ships = Vec::new();
    let mut orphaned_stations = Vec::new();

    for entity in entities.iter() {
        match &entity.kind {
            EntityKind::Station(station) if entity.is_destroyed() => {
                if let Some(ship_id) = station.docked_ship {
                    orphaned_ships.push(ship_id);
                }
            }
            EntityKind::Ship(ship) if entity.is_destroyed() => {
                if let Some(station_id) = ship.dock.station() {
                    orphaned_stations.push(station_id);
                }
            }
            _ => {}
        }
    }

    for entity in entities.iter_mut() {
        let destroyed = entity.is_destroyed();
        if orphaned_ships.contains(&entity.id) && !destroyed {
            detach(entity, now_ms, tuning);
            sounds.push(SoundEvent::play(AudioCue::Undock));
        } else if destroyed || orphaned_stations.contains(&entity.id) {
            if let Some(station) = entity.as_station_mut() {
                release_station(station);
            }
        }
    }
}

/// One unit per `1000 / rate` ms while below `max`; the first call only
/// starts the clock
fn load_one(loaded_at: &mut Option<f64>, rate: f32, current: &mut u32, max: u32, now_ms: f64) {
    match *loaded_at {
        None => *loaded_at = Some(now_ms),
        Some(at) => {
            let interval = 1000.0 / rate as f64;
            if *current < max && at + interval < now_ms {
                *current += 1;
                *loaded_at = Some(now_ms);
            }
        }
    }
}

/// Periodic station behavior: top up the docked ship's ammo and missiles
pub fn resupply(station: &mut Station, ship: &mut Ship, now_ms: f64, tuning: &Tuning) {
    let cfg = &tuning.station;
    load_one(
        &mut station.ammo_loaded_at,
        cfg.ammo_per_second,
        &mut ship.ammo,
        ship.max_ammo,
        now_ms,
    );
    load_one(
        &mut station.missile_loaded_at,
        cfg.missiles_per_second,
        &mut ship.missiles,
        ship.max_missiles,
        now_ms,
    );
}

/// Periodic docking upkeep: settle cooldowns, keep docked ships on their
/// station, and run station resupply.
pub fn tick_docking(entities: &mut [Entity], now_ms: f64, tuning: &Tuning) {
    for entity in entities.iter_mut() {
        if let Some(ship) = entity.as_ship_mut() {
            ship.dock.settle(now_ms);
        }
    }

    let links: Vec<(usize, usize)> = entities
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.is_destroyed())
        .filter_map(|(si, e)| {
            let ship_id = e.as_station()?.docked_ship?;
            let ship_index = entities
                .iter()
                .position(|s| s.id == ship_id && !s.is_destroyed())?;
            Some((si, ship_index))
        })
        .collect();

    for (station_index, ship_index) in links {
        let (station_entity, ship_entity) = super::collision::pair_mut(entities, station_index, ship_index);
        ship_entity.body.pos = station_entity.body.pos;
        if let (Some(station), Some(ship)) = (station_entity.as_station_mut(), ship_entity.as_ship_mut()) {
            resupply(station, ship, now_ms, tuning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn setup() -> (Entity, Entity, Tuning) {
        let tuning = Tuning::default();
        let mut ship = Entity::ship(0, Vec2::new(410.0, 300.0), 1.0, &tuning);
        ship.id = 1;
        let mut station = Entity::station(Vec2::new(400.0, 300.0), &tuning);
        station.id = 2;
        (ship, station, tuning)
    }

    #[test]
    fn test_dock_matches_station() {
        let (mut ship, mut station, tuning) = setup();
        let mut sounds = Vec::new();
        assert!(try_dock(&mut ship, &mut station, 0.0, &tuning, &mut sounds));

        assert_eq!(ship.body.pos, station.body.pos);
        assert_eq!(ship.body.spin_rate, station.body.spin_rate);
        assert_eq!(ship.effective_speed(500.0), 0.0);
        assert_eq!(station.as_station().unwrap().docked_ship, Some(1));
        assert!(matches!(
            ship.as_ship().unwrap().dock,
            DockState::Docking { station: 2, .. }
        ));
        assert_eq!(sounds, vec![SoundEvent::play(AudioCue::Dock)]);
    }

    #[test]
    fn test_dock_out_of_range() {
        let (mut ship, mut station, tuning) = setup();
        ship.body.pos = Vec2::new(431.0, 300.0);
        assert!(!try_dock(&mut ship, &mut station, 0.0, &tuning, &mut Vec::new()));
        assert_eq!(ship.as_ship().unwrap().dock, DockState::Undocked);
    }

    #[test]
    fn test_second_ship_cannot_dock() {
        let (mut ship, mut station, tuning) = setup();
        let mut other = Entity::ship(1, Vec2::new(395.0, 300.0), 0.0, &tuning);
        other.id = 3;
        let mut sounds = Vec::new();
        assert!(try_dock(&mut ship, &mut station, 0.0, &tuning, &mut sounds));
        assert!(!try_dock(&mut other, &mut station, 10.0, &tuning, &mut sounds));
        assert_eq!(other.as_ship().unwrap().dock, DockState::Undocked);
        assert_eq!(station.as_station().unwrap().docked_ship, Some(1));
    }

    #[test]
    fn test_undock_blocked_during_cooldown() {
        let (mut ship, mut station, tuning) = setup();
        let mut sounds = Vec::new();
        try_dock(&mut ship, &mut station, 0.0, &tuning, &mut sounds);
        assert!(!try_undock(&mut ship, Some(&mut station), 1000.0, &tuning, &mut sounds));

        ship.as_ship_mut().unwrap().dock.settle(2000.0);
        ship.body.spin = 0.5;
        assert!(try_undock(&mut ship, Some(&mut station), 2000.0, &tuning, &mut sounds));
        assert!((ship.body.heading - 1.5).abs() < 1e-6);
        assert_eq!(ship.body.spin, 0.0);
        assert_eq!(ship.body.spin_rate, 0.0);
        assert_eq!(station.as_station().unwrap().docked_ship, None);

        // Undock cooldown blocks an immediate re-dock
        assert!(!try_dock(&mut ship, &mut station, 2500.0, &tuning, &mut sounds));
        ship.as_ship_mut().unwrap().dock.settle(4000.0);
        assert!(try_dock(&mut ship, &mut station, 4000.0, &tuning, &mut sounds));
    }

    #[test]
    fn test_resupply_rates() {
        let (_, station, tuning) = setup();
        let mut station = station.as_station().unwrap().clone();
        let mut ship = Ship::new(0, &tuning);
        ship.ammo = 0;
        ship.missiles = 0;

        resupply(&mut station, &mut ship, 0.0, &tuning);
        assert_eq!(ship.ammo, 0);
        // 2 ammo/s: one every 500ms (strictly after)
        resupply(&mut station, &mut ship, 500.0, &tuning);
        assert_eq!(ship.ammo, 0);
        resupply(&mut station, &mut ship, 501.0, &tuning);
        assert_eq!(ship.ammo, 1);
        assert_eq!(ship.missiles, 0);
        // 0.25 missiles/s: one every 4s
        resupply(&mut station, &mut ship, 4001.0, &tuning);
        assert_eq!(ship.missiles, 1);
        assert_eq!(ship.ammo, 2);
    }

    #[test]
    fn test_resupply_stops_at_max() {
        let (_, station, tuning) = setup();
        let mut station = station.as_station().unwrap().clone();
        let mut ship = Ship::new(0, &tuning);
        resupply(&mut station, &mut ship, 0.0, &tuning);
        resupply(&mut station, &mut ship, 10_000.0, &tuning);
        assert_eq!(ship.ammo, ship.max_ammo);
        assert_eq!(ship.missiles, ship.max_missiles);
    }

    #[test]
    fn test_destroyed_station_frees_ship() {
        let (ship, station, tuning) = setup();
        let mut entities = vec![ship, station];
        let mut sounds = Vec::new();
        let (s, st) = entities.split_at_mut(1);
        try_dock(&mut s[0], &mut st[0], 0.0, &tuning, &mut sounds);

        entities[1].body.destroy();
        release_broken_links(&mut entities, 100.0, &tuning, &mut sounds);
        assert!(matches!(
            entities[0].as_ship().unwrap().dock,
            DockState::Undocking { .. }
        ));
        assert_eq!(entities[1].as_station().unwrap().docked_ship, None);
    }

    #[test]
    fn test_destroyed_ship_frees_station() {
        let (ship, station, tuning) = setup();
        let mut entities = vec![ship, station];
        let mut sounds = Vec::new();
        let (s, st) = entities.split_at_mut(1);
        try_dock(&mut s[0], &mut st[0], 0.0, &tuning, &mut sounds);

        entities[0].body.destroy();
        release_broken_links(&mut entities, 100.0, &tuning, &mut sounds);
        assert_eq!(entities[1].as_station().unwrap().docked_ship, None);
    }
}

//! Simulation driver
//!
//! One call to [`Simulation::advance`] is one tick, run in a fixed order:
//!
//! 1. apply held intents to each player's ship
//! 2. integrate motion over the wall time since the previous tick
//! 3. resolve collisions and interactions
//! 4. append spawned entities
//! 5. drop destroyed entities
//! 6. evaluate the mission; a win or loss stops ticking
//! 7. periodic behavior (docking, station resupply, animations, supply drops)

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::docking::{self, DockState};
use super::entity::{Category, Entity, EntityId, EntityKind};
use super::interaction;
use super::mission::{Mission, MissionPlan, MissionStatus, ShipStats};
use super::motion::{self, Viewport};
use super::registry::Registry;
use super::{collision, generator, ship};
use crate::assets::AssetCatalog;
use crate::audio::{AudioCue, SoundEvent};
use crate::consts::{BEACON_FRAMES, SUPPLY_PACKAGE_FRAMES};
use crate::input::ShipIntents;
use crate::tuning::Tuning;

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    /// Nothing running; a mission may be loaded
    Idle,
    Running,
    Paused,
    /// Mission over; ticks are ignored until reset
    Finished(MissionStatus),
}

/// A participant and the stats of their ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Ship entity, cleared once the wreck is pruned
    pub ship: Option<EntityId>,
    pub stats: ShipStats,
    /// Intents seen last tick, for edge-triggered actions
    last_intents: ShipIntents,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ship: None,
            stats: ShipStats::default(),
            last_intents: ShipIntents::default(),
        }
    }
}

/// The simulation core
pub struct Simulation {
    viewport: Viewport,
    tuning: Tuning,
    seed: u64,
    rng: Pcg32,
    registry: Registry,
    players: Vec<Player>,
    mission: Option<Mission>,
    phase: SimPhase,
    /// Wall clock, advanced by every call to `advance`
    now_ms: f64,
    /// Clock reading at the previous running tick
    last_tick: Option<f64>,
    paused_at: Option<f64>,
    sounds: Vec<SoundEvent>,
}

impl Simulation {
    pub fn new(viewport: Viewport, tuning: Tuning, seed: u64) -> Self {
        Self {
            viewport,
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            registry: Registry::new(),
            players: Vec::new(),
            mission: None,
            phase: SimPhase::Idle,
            now_ms: 0.0,
            last_tick: None,
            paused_at: None,
            sounds: Vec::new(),
        }
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Entities in registry order, for rendering
    pub fn entities(&self) -> &[Entity] {
        self.registry.as_slice()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.registry.get(id)
    }

    pub fn count(&self, category: Category) -> usize {
        self.registry.count(category)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn mission(&self) -> Option<&Mission> {
        self.mission.as_ref()
    }

    /// Take the cues raised since the last drain
    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }

    // === Lifecycle ===

    /// Discard everything and populate a mission with one ship per player.
    /// The simulation is left idle until [`Simulation::start`].
    pub fn load_mission(&mut self, plan: MissionPlan, player_names: &[String]) {
        self.clear();
        let population = plan.populate(&self.viewport, &self.tuning, &mut self.rng);
        self.registry.replace_all(population);

        for (index, name) in player_names.iter().enumerate() {
            let (pos, heading) = generator::ship_start(&self.viewport, &mut self.rng);
            let entity = Entity::ship(index, pos, heading, &self.tuning);
            let mut player = Player::new(name.clone());
            if let Some(ship) = entity.as_ship() {
                player.stats = ShipStats::from_ship(ship, false);
            }
            player.ship = Some(self.registry.append(entity));
            self.players.push(player);
        }

        log::info!(
            "Loaded {} with {} player(s), {} entities",
            plan.name,
            self.players.len(),
            self.registry.len()
        );
        self.mission = Some(Mission::new(plan));
    }

    /// Begin ticking. Refused while assets are still loading, without a
    /// mission, or when not idle.
    pub fn start(&mut self, assets: &AssetCatalog) -> bool {
        if self.phase != SimPhase::Idle {
            return false;
        }
        if !assets.is_ready() {
            log::warn!("Cannot start: waiting for {:?}", assets.pending());
            return false;
        }
        let Some(mission) = &mut self.mission else {
            log::warn!("Cannot start: no mission loaded");
            return false;
        };
        mission.begin(self.now_ms);
        self.phase = SimPhase::Running;
        self.last_tick = None;
        log::info!("Simulation started: {}", mission.name());
        true
    }

    pub fn pause(&mut self) {
        if self.phase != SimPhase::Running {
            return;
        }
        self.phase = SimPhase::Paused;
        self.paused_at = Some(self.now_ms);
        if let Some(mission) = &mut self.mission {
            mission.pause(self.now_ms);
        }
        log::info!("Simulation paused");
    }

    /// Continue after a pause. The next tick sees zero elapsed time and
    /// every running timer (engine, docking, resupply, supply drop) skips
    /// the paused interval.
    pub fn resume(&mut self) {
        if self.phase != SimPhase::Paused {
            return;
        }
        let paused_for = self
            .paused_at
            .take()
            .map_or(0.0, |at| self.now_ms - at);
        for entity in self.registry.iter_mut() {
            match &mut entity.kind {
                EntityKind::Ship(ship) => {
                    ship.thrust.postpone(paused_for);
                    ship.dock.postpone(paused_for);
                }
                EntityKind::Station(station) => station.postpone(paused_for),
                _ => {}
            }
        }
        if let Some(mission) = &mut self.mission {
            mission.resume(self.now_ms);
        }
        self.phase = SimPhase::Running;
        self.last_tick = None;
        log::info!("Simulation resumed after {:.0}ms", paused_for);
    }

    /// Abort the mission in progress
    pub fn interrupt(&mut self) {
        if !matches!(self.phase, SimPhase::Running | SimPhase::Paused) {
            return;
        }
        if let Some(mission) = &mut self.mission {
            mission.interrupt();
        }
        self.silence_loops();
        self.phase = SimPhase::Finished(MissionStatus::Interrupted);
        log::info!("Mission interrupted");
    }

    /// Drop all entities, players and mission state and go idle
    pub fn reset(&mut self) {
        self.silence_loops();
        self.clear();
        log::info!("Simulation reset");
    }

    fn clear(&mut self) {
        self.registry.clear();
        self.players.clear();
        self.mission = None;
        self.phase = SimPhase::Idle;
        self.last_tick = None;
        self.paused_at = None;
    }

    // === Tick ===

    /// Advance the wall clock by `delta_ms` and, when running, run one tick
    /// with each player's held intents (indexed like [`Simulation::players`]).
    pub fn advance(&mut self, delta_ms: f64, intents: &[ShipIntents]) -> SimPhase {
        self.now_ms += delta_ms.max(0.0);
        if self.phase != SimPhase::Running {
            return self.phase;
        }
        let now = self.now_ms;

        self.apply_intents(intents);

        let elapsed = self.last_tick.map_or(0.0, |at| now - at);
        self.last_tick = Some(now);
        motion::advance_all(self.registry.as_mut_slice(), now, elapsed, &self.viewport);

        let spawned = interaction::resolve_collisions(
            self.registry.as_mut_slice(),
            elapsed,
            &self.tuning,
            &mut self.rng,
            &mut self.sounds,
        );

        self.registry.extend(spawned);

        self.retire_destroyed();

        if let Some(mission) = &mut self.mission {
            let stats: Vec<ShipStats> = self.players.iter().map(|p| p.stats).collect();
            let status = mission.check_result(&stats, self.registry.as_slice(), now);
            if matches!(status, MissionStatus::Succeeded | MissionStatus::Failed) {
                self.finish(status);
                return self.phase;
            }
        }

        self.run_periodic();
        self.phase
    }

    fn apply_intents(&mut self, intents: &[ShipIntents]) {
        let now = self.now_ms;
        let mut bullets = Vec::new();
        let mut missiles = Vec::new();

        for (index, player) in self.players.iter_mut().enumerate() {
            let held = intents.get(index).copied().unwrap_or_default();
            let pressed_dock = held.dock && !player.last_intents.dock;
            player.last_intents = held;

            let Some(ship_index) = player.ship.and_then(|id| self.registry.index_of(id)) else {
                continue;
            };
            let entity = &mut self.registry.as_mut_slice()[ship_index];
            if entity.is_destroyed() {
                continue;
            }

            ship::steer(entity, held.turn());
            if held.thrust {
                ship::engine_on(entity, now, &mut self.sounds);
            } else {
                ship::engine_off(entity, now, &mut self.sounds);
            }
            if held.fire {
                bullets.extend(ship::fire(entity, now, &self.tuning, &mut self.sounds));
            }
            if held.launch_secondary {
                missiles.extend(ship::launch_missile(entity, now, &self.tuning));
            }
            if pressed_dock {
                toggle_dock(
                    self.registry.as_mut_slice(),
                    ship_index,
                    now,
                    &self.tuning,
                    &mut self.sounds,
                );
            }
        }

        self.registry.extend(bullets);
        for id in self.registry.extend(missiles) {
            self.sounds
                .push(SoundEvent::play_from(AudioCue::MissileFlight, id));
        }
    }

    /// Repair docking links, stop looped cues of the dead, record player
    /// stats, then prune
    fn retire_destroyed(&mut self) {
        let now = self.now_ms;
        docking::release_broken_links(
            self.registry.as_mut_slice(),
            now,
            &self.tuning,
            &mut self.sounds,
        );

        for entity in self.registry.iter_mut().filter(|e| e.is_destroyed()) {
            let id = entity.id;
            match &mut entity.kind {
                EntityKind::Missile => {
                    self.sounds.push(SoundEvent::stop(AudioCue::MissileFlight, id));
                }
                EntityKind::Ship(ship) if ship.engine_on => {
                    ship.engine_on = false;
                    self.sounds.push(SoundEvent::stop(AudioCue::Engine, id));
                }
                _ => {}
            }
        }

        self.sync_player_stats();
        self.registry.prune();
    }

    fn sync_player_stats(&mut self) {
        for player in &mut self.players {
            let Some(id) = player.ship else {
                continue;
            };
            match self.registry.get(id) {
                Some(entity) => {
                    if let Some(ship) = entity.as_ship() {
                        player.stats = ShipStats::from_ship(ship, entity.is_destroyed());
                    }
                    if entity.is_destroyed() {
                        log::debug!("{} lost their ship", player.name);
                        player.ship = None;
                    }
                }
                None => {
                    player.stats.alive = false;
                    player.ship = None;
                }
            }
        }
    }

    fn run_periodic(&mut self) {
        let now = self.now_ms;
        docking::tick_docking(self.registry.as_mut_slice(), now, &self.tuning);
        step_animations(self.registry.as_mut_slice());

        // Station resupply may have changed ammo counts
        self.sync_player_stats();

        if let Some(mission) = &mut self.mission {
            let stats: Vec<ShipStats> = self.players.iter().map(|p| p.stats).collect();
            let packages = mission.tick(
                now,
                &stats,
                self.registry.as_slice(),
                &self.viewport,
                &self.tuning,
                &mut self.rng,
            );
            self.registry.extend(packages);
        }
    }

    fn finish(&mut self, status: MissionStatus) {
        self.silence_loops();
        self.sounds.push(SoundEvent::play(match status {
            MissionStatus::Succeeded => AudioCue::Victory,
            _ => AudioCue::GameOver,
        }));
        self.phase = SimPhase::Finished(status);
        log::info!("Mission {}", status.as_str());
    }

    /// Stop every looped cue still playing
    fn silence_loops(&mut self) {
        for entity in self.registry.iter_mut() {
            let id = entity.id;
            let destroyed = entity.is_destroyed();
            match &mut entity.kind {
                EntityKind::Missile if !destroyed => {
                    self.sounds.push(SoundEvent::stop(AudioCue::MissileFlight, id));
                }
                EntityKind::Ship(ship) if ship.engine_on => {
                    ship.engine_on = false;
                    self.sounds.push(SoundEvent::stop(AudioCue::Engine, id));
                }
                _ => {}
            }
        }
    }
}

/// Dock when free and a station is in reach, undock when docked
fn toggle_dock(
    entities: &mut [Entity],
    ship_index: usize,
    now_ms: f64,
    tuning: &Tuning,
    sounds: &mut Vec<SoundEvent>,
) {
    let Some(dock) = entities[ship_index].as_ship().map(|s| s.dock) else {
        return;
    };
    // Mid-transition: wait for the cooldown
    if dock.in_transition() {
        return;
    }
    match dock {
        DockState::Docked { station } => {
            match entities.iter().position(|e| e.id == station) {
                Some(station_index) => {
                    let (ship_entity, station_entity) =
                        collision::pair_mut(entities, ship_index, station_index);
                    docking::try_undock(ship_entity, Some(station_entity), now_ms, tuning, sounds);
                }
                None => {
                    docking::try_undock(&mut entities[ship_index], None, now_ms, tuning, sounds);
                }
            }
        }
        DockState::Undocked => {
            let dockable =
                docking::find_dockable_station(entities, &entities[ship_index], tuning.station.dock_radius);
            if let Some(station_index) = dockable {
                let (ship_entity, station_entity) =
                    collision::pair_mut(entities, ship_index, station_index);
                docking::try_dock(ship_entity, station_entity, now_ms, tuning, sounds);
            }
        }
        DockState::Docking { .. } | DockState::Undocking { .. } => {}
    }
}

/// One animation frame per tick. One-shot effects are flagged destroyed
/// on their last frame; collectibles loop.
fn step_animations(entities: &mut [Entity]) {
    for entity in entities.iter_mut().filter(|e| !e.is_destroyed()) {
        let finished = match &mut entity.kind {
            EntityKind::Explosion(anim) | EntityKind::Flash(anim) => anim.step(),
            EntityKind::Beacon(beacon) => {
                beacon.frame = (beacon.frame + 1) % BEACON_FRAMES;
                false
            }
            EntityKind::SupplyPackage(package) => {
                package.frame = (package.frame + 1) % SUPPLY_PACKAGE_FRAMES;
                false
            }
            _ => false,
        };
        if finished {
            entity.body.destroy();
        }
    }
}

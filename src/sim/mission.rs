//! Missions, objectives and the campaign
//!
//! A mission is a [`MissionPlan`] (what to spawn, what counts as a win)
//! plus the runtime state that evaluates it: status, a pause-aware clock
//! and the supply-drop policy.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Category, Entity};
use super::generator::{self, AsteroidField};
use super::motion::Viewport;
use super::ship::Ship;
use crate::tuning::Tuning;

/// Mission outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionStatus {
    InProgress,
    Succeeded,
    Failed,
    /// Aborted by the player; ends the mission without counting as a loss
    Interrupted,
}

impl MissionStatus {
    pub fn is_terminal(&self) -> bool {
        *self != MissionStatus::InProgress
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::InProgress => "in progress",
            MissionStatus::Succeeded => "succeeded",
            MissionStatus::Failed => "failed",
            MissionStatus::Interrupted => "interrupted",
        }
    }
}

/// Win condition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Objective {
    /// No asteroid left in the registry, debris included
    DestroyAllAsteroids,
    /// Beacons collected across all players reach `total`
    CollectAllBeacons { total: u32 },
    /// Unpaused mission time reaches `required_secs`
    Survive { required_secs: f64 },
    /// Sandbox: never succeeds on its own
    OpenEnded,
}

/// Per-player ship stats the objectives are evaluated against. They outlive
/// the ship entity itself, which is pruned once destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShipStats {
    pub health: i32,
    pub ammo: u32,
    pub missiles: u32,
    pub beacons: u32,
    pub alive: bool,
}

impl ShipStats {
    pub fn from_ship(ship: &Ship, destroyed: bool) -> Self {
        Self {
            health: ship.health,
            ammo: ship.ammo,
            missiles: ship.missiles,
            beacons: ship.beacons,
            alive: !destroyed && ship.health > 0,
        }
    }
}

/// Static description of a mission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionPlan {
    pub name: String,
    pub description: Vec<String>,
    pub objective: Objective,
    pub asteroids: Option<AsteroidField>,
    pub stations: bool,
    pub beacons: usize,
    /// Spin rate of a centered black hole, if the mission has one
    pub black_hole: Option<f32>,
}

impl MissionPlan {
    fn new(name: &str, objective: Objective, description: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: description.iter().map(|line| line.to_string()).collect(),
            objective,
            asteroids: None,
            stations: false,
            beacons: 0,
            black_hole: None,
        }
    }

    /// Destroy five asteroids
    pub fn destroy_asteroids() -> Self {
        let mut plan = Self::new(
            "Mission 1",
            Objective::DestroyAllAsteroids,
            &["Your mission is to destroy all the asteroids"],
        );
        plan.asteroids = Some(AsteroidField::new(5));
        plan
    }

    /// Gather three beacons while a station offers resupply
    pub fn gather_beacons() -> Self {
        let mut plan = Self::new(
            "Mission 2",
            Objective::CollectAllBeacons { total: 3 },
            &[
                "Your mission is to gather all the beacons",
                "Asteroids can hit both you and the station",
                "Protect the station - you can get ammo there",
            ],
        );
        plan.asteroids = Some(AsteroidField::new(5));
        plan.stations = true;
        plan.beacons = 3;
        plan
    }

    /// Survive thirty seconds in a swarm of small, fast rocks
    pub fn survive() -> Self {
        let required_secs = 30.0;
        let line = format!("You must survive for {} seconds", required_secs);
        let mut plan = Self::new(
            "Mission 3",
            Objective::Survive { required_secs },
            &[line.as_str()],
        );
        plan.asteroids = Some(
            AsteroidField::new(35)
                .with_radius(10.0, 20.0)
                .with_speed(10.0, 25.0),
        );
        plan
    }

    /// Sandbox around a black hole
    pub fn black_hole() -> Self {
        let mut plan = Self::new("Mission 4", Objective::OpenEnded, &["Just chill out"]);
        plan.black_hole = Some(-0.0025);
        plan
    }

    /// Initial population: asteroids, then station, beacons and black hole
    pub fn populate(&self, viewport: &Viewport, tuning: &Tuning, rng: &mut impl Rng) -> Vec<Entity> {
        let mut entities = Vec::new();
        if let Some(field) = &self.asteroids {
            entities.extend(generator::asteroids(field, viewport, rng));
        }
        if self.stations {
            entities.push(generator::station(viewport, tuning));
        }
        entities.extend(generator::beacons(self.beacons, viewport, tuning, rng));
        if let Some(spin_rate) = self.black_hole {
            entities.push(generator::black_hole(viewport, spin_rate));
        }
        entities
    }
}

/// Mission time that excludes paused intervals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionClock {
    started_at: Option<f64>,
    paused_at: Option<f64>,
    pause_duration: f64,
}

impl MissionClock {
    pub fn start(&mut self, now_ms: f64) {
        *self = Self {
            started_at: Some(now_ms),
            ..Self::default()
        };
    }

    pub fn pause(&mut self, now_ms: f64) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now_ms);
        }
    }

    /// Length of the pause in progress, 0 when running
    pub fn paused_for(&self, now_ms: f64) -> f64 {
        self.paused_at.map_or(0.0, |at| now_ms - at)
    }

    pub fn resume(&mut self, now_ms: f64) {
        if let Some(paused_at) = self.paused_at.take() {
            self.pause_duration += now_ms - paused_at;
        }
    }

    /// Seconds of unpaused time since start
    pub fn elapsed_secs(&self, now_ms: f64) -> f64 {
        let Some(started_at) = self.started_at else {
            return 0.0;
        };
        // While paused, time stops at the pause instant
        let until = self.paused_at.unwrap_or(now_ms);
        ((until - started_at - self.pause_duration) / 1000.0).max(0.0)
    }
}

/// Drops supply packages when every ship is stranded without ammo and
/// nothing in the world can refill it
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplyPolicy {
    /// When the stranded condition was first seen, or the last drop
    armed_at: Option<f64>,
}

impl SupplyPolicy {
    fn stranded(stats: &[ShipStats], entities: &[Entity]) -> bool {
        let mut living = stats.iter().filter(|s| s.alive).peekable();
        if living.peek().is_none() {
            return false;
        }
        let no_source = !entities.iter().any(|e| {
            !e.is_destroyed()
                && matches!(e.category(), Category::SupplyPackage | Category::Station)
        });
        no_source && living.all(|s| s.ammo == 0)
    }

    /// Push a running delay back, e.g. past a pause
    pub fn postpone(&mut self, by_ms: f64) {
        if let Some(armed_at) = &mut self.armed_at {
            *armed_at += by_ms;
        }
    }

    pub fn tick(
        &mut self,
        now_ms: f64,
        stats: &[ShipStats],
        entities: &[Entity],
        viewport: &Viewport,
        tuning: &Tuning,
        rng: &mut impl Rng,
    ) -> Vec<Entity> {
        if !Self::stranded(stats, entities) {
            self.armed_at = None;
            return Vec::new();
        }
        let Some(armed_at) = self.armed_at else {
            self.armed_at = Some(now_ms);
            return Vec::new();
        };
        if now_ms - armed_at < tuning.supply.delay_secs * 1000.0 {
            return Vec::new();
        }
        self.armed_at = Some(now_ms);
        log::debug!("Dropping {} supply packages", tuning.supply.batch);
        generator::supply_packages(tuning.supply.batch, viewport, tuning, rng)
    }
}

/// A mission being played
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub plan: MissionPlan,
    status: MissionStatus,
    clock: MissionClock,
    supply: SupplyPolicy,
}

impl Mission {
    pub fn new(plan: MissionPlan) -> Self {
        Self {
            plan,
            status: MissionStatus::InProgress,
            clock: MissionClock::default(),
            supply: SupplyPolicy::default(),
        }
    }

    pub fn status(&self) -> MissionStatus {
        self.status
    }

    pub fn name(&self) -> &str {
        &self.plan.name
    }

    pub fn description(&self) -> &[String] {
        &self.plan.description
    }

    pub fn begin(&mut self, now_ms: f64) {
        self.clock.start(now_ms);
    }

    pub fn pause(&mut self, now_ms: f64) {
        self.clock.pause(now_ms);
    }

    /// Resume the clock; the supply delay skips the paused interval
    pub fn resume(&mut self, now_ms: f64) {
        self.supply.postpone(self.clock.paused_for(now_ms));
        self.clock.resume(now_ms);
    }

    pub fn elapsed_secs(&self, now_ms: f64) -> f64 {
        self.clock.elapsed_secs(now_ms)
    }

    pub fn interrupt(&mut self) {
        if !self.status.is_terminal() {
            self.status = MissionStatus::Interrupted;
        }
    }

    /// Evaluate the outcome. Terminal results stick; a total loss of ships
    /// is checked before the objective.
    pub fn check_result(&mut self, stats: &[ShipStats], entities: &[Entity], now_ms: f64) -> MissionStatus {
        if self.status.is_terminal() {
            return self.status;
        }
        if !stats.is_empty() && stats.iter().all(|s| !s.alive) {
            self.status = MissionStatus::Failed;
            return self.status;
        }
        let achieved = match self.plan.objective {
            Objective::DestroyAllAsteroids => !entities
                .iter()
                .any(|e| e.category() == Category::Asteroid && !e.is_destroyed()),
            Objective::CollectAllBeacons { total } => {
                stats.iter().map(|s| s.beacons).sum::<u32>() >= total
            }
            Objective::Survive { required_secs } => self.clock.elapsed_secs(now_ms) >= required_secs,
            Objective::OpenEnded => false,
        };
        if achieved {
            self.status = MissionStatus::Succeeded;
        }
        self.status
    }

    /// Periodic mission behavior: the supply-drop policy
    pub fn tick(
        &mut self,
        now_ms: f64,
        stats: &[ShipStats],
        entities: &[Entity],
        viewport: &Viewport,
        tuning: &Tuning,
        rng: &mut impl Rng,
    ) -> Vec<Entity> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        self.supply.tick(now_ms, stats, entities, viewport, tuning, rng)
    }
}

/// Ordered missions played one after another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    missions: Vec<MissionPlan>,
    current: usize,
}

impl Default for Campaign {
    fn default() -> Self {
        Self::new(vec![
            MissionPlan::destroy_asteroids(),
            MissionPlan::gather_beacons(),
            MissionPlan::survive(),
            MissionPlan::black_hole(),
        ])
    }
}

impl Campaign {
    pub fn new(missions: Vec<MissionPlan>) -> Self {
        Self {
            missions,
            current: 0,
        }
    }

    pub fn missions(&self) -> &[MissionPlan] {
        &self.missions
    }

    pub fn index(&self) -> usize {
        self.current
    }

    /// Plan of the mission to play next; `None` once the campaign is done
    pub fn current(&self) -> Option<&MissionPlan> {
        self.missions.get(self.current)
    }

    /// Move on after a won mission. Returns false when that was the last one.
    pub fn advance(&mut self) -> bool {
        if self.current < self.missions.len() {
            self.current += 1;
        }
        let more = self.current < self.missions.len();
        if more {
            log::info!("Campaign advanced to {}", self.missions[self.current].name);
        } else {
            log::info!("Campaign finished");
        }
        more
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.missions.len()
    }

    pub fn restart(&mut self) {
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const VIEW: Viewport = Viewport {
        width: 1024.0,
        height: 768.0,
    };

    fn pilot(ammo: u32) -> ShipStats {
        ShipStats {
            health: 100,
            ammo,
            missiles: 5,
            beacons: 0,
            alive: true,
        }
    }

    #[test]
    fn test_destroy_all_asteroids_succeeds() {
        let mut rng = Pcg32::seed_from_u64(5);
        let tuning = Tuning::default();
        let plan = MissionPlan::destroy_asteroids();
        let mut entities = plan.populate(&VIEW, &tuning, &mut rng);
        assert_eq!(entities.len(), 5);

        let mut mission = Mission::new(plan);
        let stats = [pilot(30)];
        assert_eq!(mission.check_result(&stats, &entities, 0.0), MissionStatus::InProgress);

        for rock in entities.iter_mut().take(4) {
            rock.body.destroy();
        }
        assert_eq!(mission.check_result(&stats, &entities, 0.0), MissionStatus::InProgress);
        entities[4].body.destroy();
        assert_eq!(mission.check_result(&stats, &entities, 0.0), MissionStatus::Succeeded);
    }

    #[test]
    fn test_failure_checked_first_and_sticks() {
        let mut mission = Mission::new(MissionPlan::destroy_asteroids());
        let dead = ShipStats {
            alive: false,
            health: 0,
            ..pilot(0)
        };
        // No asteroids left, but nobody survived
        assert_eq!(mission.check_result(&[dead], &[], 0.0), MissionStatus::Failed);
        assert_eq!(mission.check_result(&[pilot(1)], &[], 0.0), MissionStatus::Failed);
        mission.interrupt();
        assert_eq!(mission.status(), MissionStatus::Failed);
    }

    #[test]
    fn test_one_survivor_keeps_mission_alive() {
        let mut mission = Mission::new(MissionPlan::black_hole());
        let dead = ShipStats {
            alive: false,
            ..pilot(0)
        };
        assert_eq!(
            mission.check_result(&[dead, pilot(3)], &[], 0.0),
            MissionStatus::InProgress
        );
    }

    #[test]
    fn test_beacons_summed_across_players() {
        let mut mission = Mission::new(MissionPlan::gather_beacons());
        let a = ShipStats {
            beacons: 2,
            ..pilot(0)
        };
        let b = ShipStats {
            beacons: 1,
            ..pilot(0)
        };
        assert_eq!(mission.check_result(&[a], &[], 0.0), MissionStatus::InProgress);
        assert_eq!(mission.check_result(&[a, b], &[], 0.0), MissionStatus::Succeeded);
    }

    #[test]
    fn test_survive_excludes_pause() {
        let mut mission = Mission::new(MissionPlan::survive());
        let stats = [pilot(30)];
        mission.begin(1_000.0);
        mission.pause(11_000.0);
        // 100s of wall time pass while paused
        assert_eq!(mission.elapsed_secs(111_000.0), 10.0);
        mission.resume(111_000.0);
        assert_eq!(
            mission.check_result(&stats, &[], 130_000.0),
            MissionStatus::InProgress
        );
        assert_eq!(
            mission.check_result(&stats, &[], 131_000.0),
            MissionStatus::Succeeded
        );
    }

    #[test]
    fn test_supply_drop_after_delay() {
        let mut rng = Pcg32::seed_from_u64(11);
        let tuning = Tuning::default();
        let mut policy = SupplyPolicy::default();
        let stats = [pilot(0)];
        let mut world: Vec<Entity> = Vec::new();

        assert!(policy.tick(0.0, &stats, &world, &VIEW, &tuning, &mut rng).is_empty());
        assert!(policy.tick(9_999.0, &stats, &world, &VIEW, &tuning, &mut rng).is_empty());
        let drop = policy.tick(10_000.0, &stats, &world, &VIEW, &tuning, &mut rng);
        assert_eq!(drop.len(), 3);
        assert!(drop.iter().all(|e| e.category() == Category::SupplyPackage));

        // Packages in the world suppress further drops
        world.extend(drop);
        assert!(policy.tick(25_000.0, &stats, &world, &VIEW, &tuning, &mut rng).is_empty());

        // Once they are gone the delay starts over
        world.clear();
        assert!(policy.tick(26_000.0, &stats, &world, &VIEW, &tuning, &mut rng).is_empty());
        assert!(policy.tick(35_999.0, &stats, &world, &VIEW, &tuning, &mut rng).is_empty());
        assert_eq!(policy.tick(36_000.0, &stats, &world, &VIEW, &tuning, &mut rng).len(), 3);
    }

    #[test]
    fn test_supply_delay_skips_pause() {
        let mut rng = Pcg32::seed_from_u64(11);
        let tuning = Tuning::default();
        let mut mission = Mission::new(MissionPlan::black_hole());
        let stats = [pilot(0)];
        mission.begin(0.0);

        assert!(mission.tick(0.0, &stats, &[], &VIEW, &tuning, &mut rng).is_empty());
        mission.pause(5_000.0);
        mission.resume(25_000.0);
        // 5s of armed time so far, not 25s
        assert!(mission.tick(25_000.0, &stats, &[], &VIEW, &tuning, &mut rng).is_empty());
        assert!(mission.tick(29_999.0, &stats, &[], &VIEW, &tuning, &mut rng).is_empty());
        assert_eq!(mission.tick(30_000.0, &stats, &[], &VIEW, &tuning, &mut rng).len(), 3);
    }

    #[test]
    fn test_no_supply_when_anyone_has_ammo_or_station_exists() {
        let mut rng = Pcg32::seed_from_u64(2);
        let tuning = Tuning::default();
        let mut policy = SupplyPolicy::default();
        let stats = [pilot(0), pilot(4)];
        for t in [0.0, 20_000.0, 40_000.0] {
            assert!(policy.tick(t, &stats, &[], &VIEW, &tuning, &mut rng).is_empty());
        }

        let stations = [Entity::station(Vec2::new(500.0, 400.0), &tuning)];
        let stranded = [pilot(0)];
        for t in [0.0, 20_000.0, 40_000.0] {
            assert!(policy.tick(t, &stranded, &stations, &VIEW, &tuning, &mut rng).is_empty());
        }
    }

    #[test]
    fn test_campaign_order() {
        let mut campaign = Campaign::default();
        assert_eq!(campaign.missions().len(), 4);
        assert_eq!(campaign.current().unwrap().name, "Mission 1");
        assert!(campaign.advance());
        assert!(campaign.advance());
        assert!(matches!(
            campaign.current().unwrap().objective,
            Objective::Survive { .. }
        ));
        assert!(campaign.advance());
        assert!(!campaign.advance());
        assert!(campaign.is_finished());
        assert!(campaign.current().is_none());
    }

    #[test]
    fn test_mission_two_population() {
        let mut rng = Pcg32::seed_from_u64(8);
        let tuning = Tuning::default();
        let entities = MissionPlan::gather_beacons().populate(&VIEW, &tuning, &mut rng);
        let count = |c| entities.iter().filter(|e| e.category() == c).count();
        assert_eq!(count(Category::Asteroid), 5);
        assert_eq!(count(Category::Station), 1);
        assert_eq!(count(Category::Beacon), 3);
    }
}

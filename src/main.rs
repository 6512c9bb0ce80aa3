//! Space Rocks native entry point
//!
//! Runs the campaign headless with a scripted pilot at the nominal tick
//! rate, routing audio to a null sink and logging each mission's outcome.
//!
//! Usage: `space-rocks [seed] [tuning.json]`

use space_rocks::audio::{self, NullAudio};
use space_rocks::consts::{TICK_MS, TICK_RATE};
use space_rocks::input::{ControlState, KeyBindings};
use space_rocks::renderer;
use space_rocks::sim::{Campaign, MissionStatus, Objective, SimPhase, Simulation, Viewport};
use space_rocks::{AssetCatalog, Settings, Tuning};

/// Simulated seconds before a mission that has not ended is abandoned
const MISSION_TIME_LIMIT_SECS: u32 = 90;

/// Tries per mission before the campaign gives up
const ATTEMPTS_PER_MISSION: u32 = 3;

/// Canned key presses: circle while firing, burn the engine in pulses,
/// launch a missile every few seconds and tap dock now and then
struct Pilot {
    controls: ControlState,
    bindings: KeyBindings,
}

impl Pilot {
    fn new(bindings: KeyBindings) -> Self {
        Self {
            controls: ControlState::new(&bindings),
            bindings,
        }
    }

    fn press(&mut self, code: &str, held: bool) {
        if held {
            self.controls.key_down(code);
        } else {
            self.controls.key_up(code);
        }
    }

    fn fly(&mut self, tick: u32) -> space_rocks::input::ShipIntents {
        let secs = tick / TICK_RATE;
        let KeyBindings {
            thrust,
            left,
            fire,
            launch,
            dock,
            ..
        } = self.bindings.clone();

        self.press(&left, true);
        self.press(&fire, true);
        self.press(&thrust, secs % 4 == 0);
        self.press(&launch, secs % 3 == 0);
        self.press(&dock, tick % (TICK_RATE * 10) == 0);
        self.controls.snapshot()
    }
}

fn load_tuning(path: Option<&str>) -> Tuning {
    let Some(path) = path else {
        return Tuning::default();
    };
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path);
            tuning
        }
        Err(e) => {
            log::warn!("Using default tuning, {} is unusable: {}", path, e);
            Tuning::default()
        }
    }
}

/// Play one mission to its end or the time limit
fn play(
    sim: &mut Simulation,
    pilots: &mut [Pilot],
    assets: &AssetCatalog,
    settings: &Settings,
) -> MissionStatus {
    let mut sink = NullAudio;
    for tick in 0..MISSION_TIME_LIMIT_SECS * TICK_RATE {
        let intents: Vec<_> = pilots.iter_mut().map(|p| p.fly(tick)).collect();
        let phase = sim.advance(TICK_MS, &intents);

        audio::dispatch(&sim.drain_sounds(), assets, settings, &mut sink);
        let frame = renderer::render_frame(sim.entities(), sim.viewport(), sim.tuning(), assets);
        if tick % (TICK_RATE * 10) == 0 {
            log::debug!(
                "t={}s entities={} draws={}",
                tick / TICK_RATE,
                sim.entities().len(),
                frame.len()
            );
        }

        if let SimPhase::Finished(status) = phase {
            return status;
        }
    }
    sim.interrupt();
    MissionStatus::Interrupted
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Space Rocks (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = args
        .first()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(1);
    let tuning = load_tuning(args.get(1).map(String::as_str));
    let settings = Settings::default();
    let assets = AssetCatalog::fully_loaded();

    let roster = settings.player_mode.roster();
    let names: Vec<String> = roster.iter().map(|(name, _)| name.clone()).collect();
    log::info!("Seed {}, {}", seed, settings.player_mode.as_str());

    let mut sim = Simulation::new(Viewport::new(1024.0, 768.0), tuning, seed);
    let mut campaign = Campaign::default();

    while let Some(plan) = campaign.current().cloned() {
        // The sandbox never ends on its own, so running out the clock counts
        let open_ended = matches!(plan.objective, Objective::OpenEnded);
        let mut status = MissionStatus::InProgress;
        for attempt in 1..=ATTEMPTS_PER_MISSION {
            let mut pilots: Vec<Pilot> = roster
                .iter()
                .map(|(_, bindings)| Pilot::new(bindings.clone()))
                .collect();
            sim.load_mission(plan.clone(), &names);
            if !sim.start(&assets) {
                log::error!("Could not start {}", plan.name);
                return;
            }
            status = play(&mut sim, &mut pilots, &assets, &settings);
            log::info!("{} attempt {}: {}", plan.name, attempt, status.as_str());
            for player in sim.players() {
                log::info!(
                    "  {}: health {} ammo {} missiles {} beacons {}",
                    player.name,
                    player.stats.health,
                    player.stats.ammo,
                    player.stats.missiles,
                    player.stats.beacons
                );
            }
            sim.reset();
            if status == MissionStatus::Succeeded || open_ended {
                break;
            }
        }

        if status == MissionStatus::Succeeded || (open_ended && status == MissionStatus::Interrupted) {
            campaign.advance();
        } else {
            log::info!("Campaign stopped at {}", plan.name);
            return;
        }
    }
    log::info!("All missions complete");
}

#[cfg(target_arch = "wasm32")]
fn main() {}

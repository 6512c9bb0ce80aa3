//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, tuning and sequence
//! of `(delta, intents)` calls, the simulation produces the same world:
//! - Seeded RNG only
//! - Stable iteration order (registry insertion order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod docking;
pub mod entity;
pub mod generator;
pub mod interaction;
pub mod mission;
pub mod motion;
pub mod registry;
pub mod ship;
pub mod tick;

pub use docking::DockState;
pub use entity::{
    Animation, Asteroid, Beacon, BlackHole, Body, BoundaryPolicy, Category, Entity, EntityId,
    EntityKind, Station, SupplyPackage,
};
pub use generator::AsteroidField;
pub use mission::{Campaign, Mission, MissionPlan, MissionStatus, Objective, ShipStats};
pub use motion::Viewport;
pub use registry::Registry;
pub use ship::{Ship, Thrust};
pub use tick::{Player, SimPhase, Simulation};

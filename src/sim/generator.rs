//! Mission entity generation
//!
//! Rocks, beacons and supply packages enter from a random point on the
//! viewport perimeter. Asteroid size, speed and spin all come from a single
//! draw so that big rocks are slow and small rocks are fast.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::entity::Entity;
use super::motion::Viewport;
use crate::tuning::Tuning;

/// Spin magnitude bound for generated asteroids (revolutions per second)
const MAX_ASTEROID_SPIN: f32 = 0.5;

/// Upper bound for a collectible's random starting animation frame
const MAX_START_FRAME: f32 = 100.0;

/// Ship spawn box around the viewport center
const SHIP_SPAWN_HALF_WIDTH: f32 = 250.0;
const SHIP_SPAWN_HALF_HEIGHT: f32 = 100.0;

/// Parameters of a generated asteroid field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AsteroidField {
    pub count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl AsteroidField {
    /// Field with the default size and speed ranges
    pub fn new(count: usize) -> Self {
        Self {
            count,
            min_radius: 20.0,
            max_radius: 70.0,
            min_speed: 1.0,
            max_speed: 20.0,
        }
    }

    pub fn with_radius(mut self, min: f32, max: f32) -> Self {
        self.min_radius = min;
        self.max_radius = max;
        self
    }

    pub fn with_speed(mut self, min: f32, max: f32) -> Self {
        self.min_speed = min;
        self.max_speed = max;
        self
    }
}

/// Random point on the viewport perimeter, walking clockwise from the
/// top-left corner
pub fn perimeter_position(viewport: &Viewport, rng: &mut impl Rng) -> Vec2 {
    let (w, h) = (viewport.width, viewport.height);
    let linear = (2.0 * (w + h) * rng.random::<f32>()).trunc();

    if linear < w {
        Vec2::new(linear, 0.0)
    } else if linear < w + h {
        Vec2::new(w, linear - w)
    } else if linear < 2.0 * w + h {
        Vec2::new(linear - w - h, h)
    } else {
        Vec2::new(0.0, linear - 2.0 * w - h)
    }
}

fn random_heading(rng: &mut impl Rng) -> f32 {
    rng.random::<f32>() * TAU
}

/// Speed in `[min, max]`, inversely tied to the draw `r`
fn inverse_lerp_speed(r: f32, min: f32, max: f32) -> f32 {
    (max - min) * (1.0 - r) + min
}

fn start_frame(rng: &mut impl Rng) -> u32 {
    (rng.random::<f32>() * MAX_START_FRAME).round() as u32
}

pub fn asteroids(field: &AsteroidField, viewport: &Viewport, rng: &mut impl Rng) -> Vec<Entity> {
    (0..field.count)
        .map(|_| {
            let r = rng.random::<f32>();
            let radius = (r * (field.max_radius - field.min_radius) + field.min_radius).trunc();
            let speed = inverse_lerp_speed(r, field.min_speed, field.max_speed);
            let spin = (1.0 - r) * MAX_ASTEROID_SPIN * 2.0 - MAX_ASTEROID_SPIN;
            let pos = perimeter_position(viewport, rng);
            let heading = random_heading(rng);
            Entity::asteroid(pos, heading, radius, speed, spin)
        })
        .collect()
}

pub fn beacons(count: usize, viewport: &Viewport, tuning: &Tuning, rng: &mut impl Rng) -> Vec<Entity> {
    (0..count)
        .map(|_| {
            let speed = inverse_lerp_speed(rng.random::<f32>(), 1.0, 20.0);
            let pos = perimeter_position(viewport, rng);
            let heading = random_heading(rng);
            Entity::beacon(pos, heading, speed, start_frame(rng), tuning)
        })
        .collect()
}

pub fn supply_packages(
    count: usize,
    viewport: &Viewport,
    tuning: &Tuning,
    rng: &mut impl Rng,
) -> Vec<Entity> {
    (0..count)
        .map(|_| {
            let speed = inverse_lerp_speed(rng.random::<f32>(), 1.0, 5.0);
            let pos = perimeter_position(viewport, rng);
            let heading = random_heading(rng);
            Entity::supply_package(pos, heading, speed, start_frame(rng), tuning)
        })
        .collect()
}

/// One station parked at the viewport center
pub fn station(viewport: &Viewport, tuning: &Tuning) -> Entity {
    Entity::station(viewport.center(), tuning)
}

/// Black hole filling most of the viewport
pub fn black_hole(viewport: &Viewport, spin_rate: f32) -> Entity {
    let radius = viewport.width.min(viewport.height) / 2.1;
    Entity::black_hole(viewport.center(), radius, spin_rate)
}

/// Ship spawn point near the center with a random heading
pub fn ship_start(viewport: &Viewport, rng: &mut impl Rng) -> (Vec2, f32) {
    let center = viewport.center();
    let x = rng
        .random_range(center.x - SHIP_SPAWN_HALF_WIDTH..=center.x + SHIP_SPAWN_HALF_WIDTH)
        .round();
    let y = rng
        .random_range(center.y - SHIP_SPAWN_HALF_HEIGHT..=center.y + SHIP_SPAWN_HALF_HEIGHT)
        .round();
    (Vec2::new(x, y), random_heading(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const VIEW: Viewport = Viewport {
        width: 1024.0,
        height: 768.0,
    };

    #[test]
    fn test_asteroid_field_ranges() {
        let mut rng = Pcg32::seed_from_u64(1);
        let field = AsteroidField::new(50);
        let rocks = asteroids(&field, &VIEW, &mut rng);
        assert_eq!(rocks.len(), 50);
        for rock in &rocks {
            let EntityKind::Asteroid(asteroid) = &rock.kind else {
                panic!("expected an asteroid");
            };
            assert!(asteroid.radius >= 20.0 && asteroid.radius < 70.0);
            assert!(rock.body.speed >= 1.0 && rock.body.speed <= 20.0);
            assert!(rock.body.spin_rate.abs() <= 0.5);
        }
    }

    #[test]
    fn test_big_rocks_are_slow() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut rocks = asteroids(&AsteroidField::new(40), &VIEW, &mut rng);
        rocks.sort_by(|a, b| a.body.radius().total_cmp(&b.body.radius()));
        let smallest = rocks.first().unwrap();
        let biggest = rocks.last().unwrap();
        assert!(smallest.body.speed > biggest.body.speed);
    }

    #[test]
    fn test_black_hole_fits_viewport() {
        let hole = black_hole(&VIEW, -0.0025);
        assert!((hole.body.radius() - 768.0 / 2.1).abs() < 1e-3);
        assert_eq!(hole.body.pos, VIEW.center());
    }

    #[test]
    fn test_ship_start_near_center() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let (pos, heading) = ship_start(&VIEW, &mut rng);
            assert!((pos.x - 512.0).abs() <= 250.0);
            assert!((pos.y - 384.0).abs() <= 100.0);
            assert!((0.0..TAU).contains(&heading));
        }
    }

    proptest! {
        #[test]
        fn perimeter_positions_lie_on_edges(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let p = perimeter_position(&VIEW, &mut rng);
            let on_edge = p.x == 0.0 || p.y == 0.0 || p.x == VIEW.width || p.y == VIEW.height;
            prop_assert!(on_edge);
            prop_assert!(p.x >= 0.0 && p.x <= VIEW.width);
            prop_assert!(p.y >= 0.0 && p.y <= VIEW.height);
        }
    }
}

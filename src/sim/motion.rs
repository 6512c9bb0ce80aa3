//! Kinematic integration and viewport boundaries
//!
//! Motion is driven by elapsed wall time rather than a fixed step. A zero
//! delta (first tick after start or resume) leaves every body untouched.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::entity::{Body, BoundaryPolicy, Entity};
use crate::consts::UNIT_SCALE;
use crate::direction;

/// Fixed playfield size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn dims(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Bounding box fully past the viewport, expanded by half the body size
    pub fn is_outside(&self, pos: Vec2, size: Vec2) -> bool {
        let half = size / 2.0;
        pos.x < -half.x
            || pos.x > self.width + half.x
            || pos.y < -half.y
            || pos.y > self.height + half.y
    }

    /// Move an out-of-bounds position to the opposite edge, each axis
    /// independently. Positions already in range are returned unchanged.
    pub fn wrap(&self, pos: Vec2, size: Vec2) -> Vec2 {
        fn wrap_axis(v: f32, extent: f32, size: f32) -> f32 {
            let half = size / 2.0;
            if v < -half || v > extent + half {
                (v + half).rem_euclid(extent + size) - half
            } else {
                v
            }
        }
        Vec2::new(
            wrap_axis(pos.x, self.width, size.x),
            wrap_axis(pos.y, self.height, size.y),
        )
    }
}

/// Integrate one body over `delta_ms` using the given effective rates.
/// Returns false if the body left the viewport and was destroyed.
pub fn advance_body(
    body: &mut Body,
    speed: f32,
    rotation_rate: f32,
    delta_ms: f64,
    viewport: &Viewport,
) -> bool {
    if delta_ms <= 0.0 || body.is_destroyed() {
        return !body.is_destroyed();
    }
    let secs = (delta_ms / 1000.0) as f32;

    let distance = UNIT_SCALE * speed * secs;
    if distance != 0.0 {
        body.pos += direction(body.heading) * distance;
    }
    if rotation_rate != 0.0 {
        body.heading += TAU * rotation_rate * secs;
    }
    if body.spin_rate != 0.0 {
        body.spin += TAU * body.spin_rate * secs;
    }

    if viewport.is_outside(body.pos, body.size) {
        match body.boundary {
            BoundaryPolicy::DestroyOnLeave => {
                body.destroy();
                return false;
            }
            BoundaryPolicy::WrapAround => {
                body.pos = viewport.wrap(body.pos, body.size);
            }
        }
    }
    true
}

/// Integrate one entity, sampling its effective speed at `now_ms`
pub fn advance_entity(entity: &mut Entity, now_ms: f64, delta_ms: f64, viewport: &Viewport) {
    let speed = entity.effective_speed(now_ms);
    let rotation_rate = entity.effective_rotation_rate(now_ms);
    // Keep the stored speed in step with the engine for snapshots
    entity.body.speed = speed;
    advance_body(&mut entity.body, speed, rotation_rate, delta_ms, viewport);
}

/// Integrate every live entity
pub fn advance_all(entities: &mut [Entity], now_ms: f64, delta_ms: f64, viewport: &Viewport) {
    if delta_ms <= 0.0 {
        return;
    }
    for entity in entities.iter_mut().filter(|e| !e.is_destroyed()) {
        advance_entity(entity, now_ms, delta_ms, viewport);
    }
}

//! Visual adapters, one per entity variant

use glam::Vec2;

use super::{DrawCommand, Drawable};
use crate::consts::{BEACON_FRAMES, SUPPLY_PACKAGE_FRAMES};
use crate::sim::{Animation, Body, Entity, EntityKind, Ship, Station};
use crate::tuning::Tuning;

/// Labels sit just below the sprite
fn label_below(body: &Body) -> Vec2 {
    body.pos + Vec2::new(0.0, body.size.y / 2.0 + 12.0)
}

fn sprite(image: &'static str, body: &Body) -> DrawCommand {
    DrawCommand::Sprite {
        image,
        pos: body.pos,
        size: body.size,
        rotation: body.facing(),
    }
}

pub struct ShipView<'a> {
    pub body: &'a Body,
    pub ship: &'a Ship,
}

impl Drawable for ShipView<'_> {
    fn draw(&self, out: &mut Vec<DrawCommand>) {
        let image = if self.ship.engine_on { "shipFire" } else { "ship" };
        out.push(sprite(image, self.body));
    }
}

/// Bullets and missiles
pub struct ProjectileView<'a> {
    pub body: &'a Body,
    pub missile: bool,
}

impl Drawable for ProjectileView<'_> {
    fn draw(&self, out: &mut Vec<DrawCommand>) {
        out.push(sprite(if self.missile { "missileFire" } else { "bullet" }, self.body));
    }
}

pub struct AsteroidView<'a> {
    pub body: &'a Body,
    pub damage: i32,
}

impl Drawable for AsteroidView<'_> {
    fn draw(&self, out: &mut Vec<DrawCommand>) {
        out.push(sprite("asteroid", self.body));
        out.push(DrawCommand::Label {
            text: self.damage.to_string(),
            pos: label_below(self.body),
        });
    }
}

pub struct StationView<'a> {
    pub body: &'a Body,
    pub station: &'a Station,
    pub dock_radius: f32,
}

impl Drawable for StationView<'_> {
    fn draw(&self, out: &mut Vec<DrawCommand>) {
        out.push(sprite("station", self.body));
        if self.station.dock_highlight {
            out.push(DrawCommand::Ring {
                pos: self.body.pos,
                radius: self.dock_radius,
            });
        }
        out.push(DrawCommand::Label {
            text: format!("{}/{}", self.station.health, self.station.max_health),
            pos: label_below(self.body),
        });
    }
}

/// Beacons and supply packages
pub struct CollectibleView<'a> {
    pub body: &'a Body,
    pub image: &'static str,
    pub frame: u32,
    pub frames: u32,
    /// Ammo carried, shown for packages
    pub ammo: Option<u32>,
}

impl Drawable for CollectibleView<'_> {
    fn draw(&self, out: &mut Vec<DrawCommand>) {
        out.push(DrawCommand::AnimatedSprite {
            image: self.image,
            pos: self.body.pos,
            size: self.body.size,
            rotation: 0.0,
            frame: self.frame,
            frames: self.frames,
        });
        if let Some(ammo) = self.ammo {
            out.push(DrawCommand::Label {
                text: ammo.to_string(),
                pos: label_below(self.body),
            });
        }
    }
}

pub struct BlackHoleView<'a> {
    pub body: &'a Body,
}

impl Drawable for BlackHoleView<'_> {
    fn draw(&self, out: &mut Vec<DrawCommand>) {
        out.push(sprite("blackHole", self.body));
    }
}

/// Explosions and flashes
pub struct EffectView<'a> {
    pub body: &'a Body,
    pub image: &'static str,
    pub animation: &'a Animation,
}

impl Drawable for EffectView<'_> {
    fn draw(&self, out: &mut Vec<DrawCommand>) {
        let size = Vec2::splat(self.animation.radius * 2.0);
        out.push(DrawCommand::AnimatedSprite {
            image: self.image,
            pos: self.body.pos,
            size,
            rotation: 0.0,
            frame: self.animation.frame.min(self.animation.frames.saturating_sub(1)),
            frames: self.animation.frames,
        });
    }
}

/// Adapter for one entity
pub fn view<'a>(entity: &'a Entity, tuning: &Tuning) -> Box<dyn Drawable + 'a> {
    let body = &entity.body;
    match &entity.kind {
        EntityKind::Ship(ship) => Box::new(ShipView { body, ship }),
        EntityKind::Bullet => Box::new(ProjectileView { body, missile: false }),
        EntityKind::Missile => Box::new(ProjectileView { body, missile: true }),
        EntityKind::Asteroid(asteroid) => Box::new(AsteroidView {
            body,
            damage: asteroid.impact_damage(),
        }),
        EntityKind::Station(station) => Box::new(StationView {
            body,
            station,
            dock_radius: tuning.station.dock_radius,
        }),
        EntityKind::Beacon(beacon) => Box::new(CollectibleView {
            body,
            image: "beacon",
            frame: beacon.frame,
            frames: BEACON_FRAMES,
            ammo: None,
        }),
        EntityKind::SupplyPackage(package) => Box::new(CollectibleView {
            body,
            image: "supplyPackage",
            frame: package.frame,
            frames: SUPPLY_PACKAGE_FRAMES,
            ammo: Some(package.ammo),
        }),
        EntityKind::BlackHole(_) => Box::new(BlackHoleView { body }),
        EntityKind::Explosion(animation) => Box::new(EffectView {
            body,
            image: "explosion",
            animation,
        }),
        EntityKind::Flash(animation) => Box::new(EffectView {
            body,
            image: "flash",
            animation,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(entity: &Entity) -> Vec<DrawCommand> {
        draw_tuned(entity, &Tuning::default())
    }

    fn draw_tuned(entity: &Entity, tuning: &Tuning) -> Vec<DrawCommand> {
        let mut out = Vec::new();
        view(entity, tuning).draw(&mut out);
        out
    }

    #[test]
    fn test_ship_shows_engine_flame() {
        let mut ship = Entity::ship(0, Vec2::new(100.0, 100.0), 0.5, &Tuning::default());
        assert_eq!(draw(&ship)[0].image(), Some("ship"));
        ship.as_ship_mut().unwrap().engine_on = true;
        assert_eq!(draw(&ship)[0].image(), Some("shipFire"));
    }

    #[test]
    fn test_sprite_uses_facing() {
        let mut rock = Entity::asteroid(Vec2::ZERO, 1.0, 50.0, 1.0, 0.0);
        rock.body.spin = 0.5;
        let DrawCommand::Sprite { rotation, .. } = draw(&rock)[0] else {
            panic!("expected a sprite");
        };
        assert!((rotation - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_asteroid_damage_label() {
        let rock = Entity::asteroid(Vec2::ZERO, 0.0, 50.0, 1.0, 0.0);
        let commands = draw(&rock);
        assert!(matches!(&commands[1], DrawCommand::Label { text, .. } if text == "1250"));
    }

    #[test]
    fn test_station_ring_when_highlighted() {
        let mut station = Entity::station(Vec2::new(400.0, 300.0), &Tuning::default());
        assert_eq!(draw(&station).len(), 2);

        station.as_station_mut().unwrap().dock_highlight = true;
        let commands = draw(&station);
        assert!(commands.contains(&DrawCommand::Ring {
            pos: Vec2::new(400.0, 300.0),
            radius: 30.0,
        }));
        assert!(matches!(&commands[2], DrawCommand::Label { text, .. } if text == "1000/1000"));
    }

    #[test]
    fn test_ring_follows_tuned_dock_radius() {
        let mut tuning = Tuning::default();
        tuning.station.dock_radius = 55.0;
        let mut station = Entity::station(Vec2::ZERO, &tuning);
        station.as_station_mut().unwrap().dock_highlight = true;
        assert!(draw_tuned(&station, &tuning).contains(&DrawCommand::Ring {
            pos: Vec2::ZERO,
            radius: 55.0,
        }));
    }

    #[test]
    fn test_package_frame_and_label() {
        let package = Entity::supply_package(Vec2::ZERO, 0.0, 1.0, 42, &Tuning::default());
        let commands = draw(&package);
        assert!(matches!(
            commands[0],
            DrawCommand::AnimatedSprite { frame: 42, frames: 250, .. }
        ));
        assert!(matches!(&commands[1], DrawCommand::Label { text, .. } if text == "10"));
    }

    #[test]
    fn test_effect_frame_clamped() {
        let mut flash = Entity::flash(Vec2::ZERO, 10.0);
        if let EntityKind::Flash(anim) = &mut flash.kind {
            anim.frame = 9;
        }
        assert!(matches!(
            draw(&flash)[0],
            DrawCommand::AnimatedSprite { frame: 4, frames: 5, .. }
        ));
    }
}

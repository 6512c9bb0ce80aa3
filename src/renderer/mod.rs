//! Render sink
//!
//! The simulation never draws. After a tick the host samples the entity
//! list and turns it into [`DrawCommand`]s through per-variant visual
//! adapters, then hands the commands to whatever backend it has.

pub mod visuals;

use glam::Vec2;
use serde::Serialize;

use crate::assets::AssetCatalog;
use crate::sim::{Entity, Viewport};
use crate::tuning::Tuning;

pub use visuals::{
    AsteroidView, BlackHoleView, CollectibleView, EffectView, ProjectileView, ShipView, StationView,
    view,
};

/// One backend-agnostic draw instruction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    /// Full-viewport backdrop
    Background { image: &'static str, size: Vec2 },
    /// Image centered on `pos`, rotated by `rotation` radians
    Sprite {
        image: &'static str,
        pos: Vec2,
        size: Vec2,
        rotation: f32,
    },
    /// One frame of a horizontal sprite strip
    AnimatedSprite {
        image: &'static str,
        pos: Vec2,
        size: Vec2,
        rotation: f32,
        frame: u32,
        frames: u32,
    },
    /// Outline circle (dock range highlight)
    Ring { pos: Vec2, radius: f32 },
    /// Text centered on `pos`
    Label { text: String, pos: Vec2 },
}

impl DrawCommand {
    /// Backing image, if this command samples one
    pub fn image(&self) -> Option<&'static str> {
        match self {
            DrawCommand::Background { image, .. }
            | DrawCommand::Sprite { image, .. }
            | DrawCommand::AnimatedSprite { image, .. } => Some(image),
            DrawCommand::Ring { .. } | DrawCommand::Label { .. } => None,
        }
    }
}

/// Something that can describe itself as draw commands
pub trait Drawable {
    fn draw(&self, out: &mut Vec<DrawCommand>);
}

/// Build the command list for one frame: background, then live entities in
/// registry order. Commands whose image never loaded are skipped.
pub fn render_frame(
    entities: &[Entity],
    viewport: &Viewport,
    tuning: &Tuning,
    assets: &AssetCatalog,
) -> Vec<DrawCommand> {
    let mut commands = vec![DrawCommand::Background {
        image: "space",
        size: viewport.dims(),
    }];
    for entity in entities.iter().filter(|e| !e.is_destroyed()) {
        view(entity, tuning).draw(&mut commands);
    }

    let before = commands.len();
    commands.retain(|cmd| cmd.image().is_none_or(|name| assets.has_image(name)));
    if commands.len() < before {
        log::trace!("Skipped {} draw(s) with missing images", before - commands.len());
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetKind;

    const VIEW: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    #[test]
    fn test_background_first() {
        let commands = render_frame(&[], &VIEW, &Tuning::default(), &AssetCatalog::fully_loaded());
        assert_eq!(
            commands,
            vec![DrawCommand::Background {
                image: "space",
                size: Vec2::new(800.0, 600.0),
            }]
        );
    }

    #[test]
    fn test_missing_images_skipped() {
        let tuning = Tuning::default();
        let entities = vec![
            Entity::asteroid(Vec2::new(10.0, 10.0), 0.0, 30.0, 1.0, 0.0),
            Entity::bullet(Vec2::new(50.0, 50.0), 0.0, &tuning),
        ];
        let mut assets = AssetCatalog::new();
        assets.mark_loaded(AssetKind::Image, "bullet");

        let commands = render_frame(&entities, &VIEW, &tuning, &assets);
        let images: Vec<_> = commands.iter().filter_map(DrawCommand::image).collect();
        assert_eq!(images, vec!["bullet"]);
        // The asteroid's damage label has no image and survives
        assert!(commands.iter().any(|c| matches!(c, DrawCommand::Label { .. })));
    }

    #[test]
    fn test_destroyed_not_drawn() {
        let mut rock = Entity::asteroid(Vec2::ZERO, 0.0, 30.0, 1.0, 0.0);
        rock.body.destroy();
        let commands = render_frame(&[rock], &VIEW, &Tuning::default(), &AssetCatalog::fully_loaded());
        assert_eq!(commands.len(), 1);
    }
}

//! Asset catalog and readiness gate
//!
//! Loading happens outside the simulation. The host reports each image and
//! sound as it settles; the simulation refuses to start ticking until
//! [`AssetCatalog::is_ready`] holds.

use std::collections::HashSet;

/// Images the renderer samples
pub const IMAGES: &[&str] = &[
    "space",
    "ship",
    "shipFire",
    "bullet",
    "asteroid",
    "explosion",
    "flash",
    "station",
    "missile",
    "missileFire",
    "beacon",
    "supplyPackage",
    "blackHole",
];

/// Sounds behind the audio cues
pub const SOUNDS: &[&str] = &[
    "victory",
    "gameover",
    "explosion",
    "shot",
    "missile",
    "jet",
    "dock",
    "undock",
    "pickUp",
    "pickAmmo",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Sound,
}

/// Tracks which assets are usable and which have settled
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    images: HashSet<String>,
    sounds: HashSet<String>,
    /// Sounds that failed to load. They count as settled but stay silent.
    failed_sounds: HashSet<String>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every known asset marked loaded (headless hosts, tests)
    pub fn fully_loaded() -> Self {
        let mut catalog = Self::new();
        for name in IMAGES {
            catalog.mark_loaded(AssetKind::Image, name);
        }
        for name in SOUNDS {
            catalog.mark_loaded(AssetKind::Sound, name);
        }
        catalog
    }

    pub fn mark_loaded(&mut self, kind: AssetKind, name: &str) {
        match kind {
            AssetKind::Image => {
                self.images.insert(name.to_string());
            }
            AssetKind::Sound => {
                self.failed_sounds.remove(name);
                self.sounds.insert(name.to_string());
            }
        }
    }

    /// Record a sound that could not be fetched or decoded
    pub fn mark_sound_failed(&mut self, name: &str) {
        log::warn!("Failed to load sound: {}", name);
        self.failed_sounds.insert(name.to_string());
    }

    pub fn has_image(&self, name: &str) -> bool {
        self.images.contains(name)
    }

    pub fn has_sound(&self, name: &str) -> bool {
        self.sounds.contains(name)
    }

    /// All images loaded and every sound settled (loaded or failed)
    pub fn is_ready(&self) -> bool {
        IMAGES.iter().all(|name| self.images.contains(*name))
            && SOUNDS
                .iter()
                .all(|name| self.sounds.contains(*name) || self.failed_sounds.contains(*name))
    }

    /// Names still outstanding, images first
    pub fn pending(&self) -> Vec<&'static str> {
        let images = IMAGES.iter().filter(|name| !self.images.contains(**name));
        let sounds = SOUNDS.iter().filter(|name| {
            !self.sounds.contains(**name) && !self.failed_sounds.contains(**name)
        });
        images.chain(sounds).copied().collect()
    }
}

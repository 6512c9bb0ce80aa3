//! Key bindings and held-intent snapshots
//!
//! The platform delivers key-down/key-up events by key code; each player's
//! [`ControlState`] folds them into the [`ShipIntents`] the simulation polls.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Named boolean intents a player can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Thrust,
    RotateLeft,
    RotateRight,
    Fire,
    LaunchSecondary,
    Dock,
}

/// Snapshot of held intents for one ship, polled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipIntents {
    pub thrust: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub fire: bool,
    pub launch_secondary: bool,
    pub dock: bool,
}

impl ShipIntents {
    pub fn set(&mut self, intent: Intent, held: bool) {
        match intent {
            Intent::Thrust => self.thrust = held,
            Intent::RotateLeft => self.rotate_left = held,
            Intent::RotateRight => self.rotate_right = held,
            Intent::Fire => self.fire = held,
            Intent::LaunchSecondary => self.launch_secondary = held,
            Intent::Dock => self.dock = held,
        }
    }

    /// Turn direction: -1 left, +1 right, 0 when neither or both are held
    pub fn turn(&self) -> f32 {
        match (self.rotate_left, self.rotate_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Key code for each intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub thrust: String,
    pub left: String,
    pub right: String,
    pub dock: String,
    pub fire: String,
    pub launch: String,
}

impl KeyBindings {
    fn from_codes(codes: [&str; 6]) -> Self {
        let [thrust, left, right, dock, fire, launch] = codes.map(str::to_string);
        Self {
            thrust,
            left,
            right,
            dock,
            fire,
            launch,
        }
    }

    /// Layout for a single player
    pub fn single_player() -> Self {
        Self::from_codes(["ArrowUp", "ArrowLeft", "ArrowRight", "ArrowDown", "KeyX", "KeyZ"])
    }

    /// Right-hand layout when two players share a keyboard
    pub fn player_one() -> Self {
        Self::from_codes(["ArrowUp", "ArrowLeft", "ArrowRight", "ArrowDown", "KeyM", "KeyN"])
    }

    /// Left-hand layout when two players share a keyboard
    pub fn player_two() -> Self {
        Self::from_codes(["KeyW", "KeyA", "KeyD", "KeyS", "KeyX", "KeyZ"])
    }

    fn pairs(&self) -> [(&str, Intent); 6] {
        [
            (self.thrust.as_str(), Intent::Thrust),
            (self.left.as_str(), Intent::RotateLeft),
            (self.right.as_str(), Intent::RotateRight),
            (self.dock.as_str(), Intent::Dock),
            (self.fire.as_str(), Intent::Fire),
            (self.launch.as_str(), Intent::LaunchSecondary),
        ]
    }
}

/// Held-key state for one player
#[derive(Debug, Clone)]
pub struct ControlState {
    key_map: HashMap<String, Intent>,
    held: ShipIntents,
}

impl ControlState {
    pub fn new(bindings: &KeyBindings) -> Self {
        let key_map = bindings
            .pairs()
            .into_iter()
            .map(|(code, intent)| (code.to_string(), intent))
            .collect();
        Self {
            key_map,
            held: ShipIntents::default(),
        }
    }

    /// Returns true if the key is bound for this player
    pub fn key_down(&mut self, code: &str) -> bool {
        self.apply(code, true)
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.apply(code, false)
    }

    /// Release everything (focus loss, pause)
    pub fn release_all(&mut self) {
        self.held = ShipIntents::default();
    }

    pub fn snapshot(&self) -> ShipIntents {
        self.held
    }

    fn apply(&mut self, code: &str, held: bool) -> bool {
        match self.key_map.get(code) {
            Some(&intent) => {
                self.held.set(intent, held);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_up() {
        let mut controls = ControlState::new(&KeyBindings::single_player());
        assert!(controls.key_down("ArrowUp"));
        assert!(controls.key_down("KeyX"));
        assert!(controls.snapshot().thrust);
        assert!(controls.snapshot().fire);

        controls.key_up("ArrowUp");
        assert!(!controls.snapshot().thrust);
        assert!(controls.snapshot().fire);
    }

    #[test]
    fn test_unbound_key_ignored() {
        let mut controls = ControlState::new(&KeyBindings::player_two());
        assert!(!controls.key_down("ArrowUp"));
        assert_eq!(controls.snapshot(), ShipIntents::default());
    }

    #[test]
    fn test_turn_cancels_when_both_held() {
        let mut intents = ShipIntents::default();
        intents.set(Intent::RotateLeft, true);
        assert_eq!(intents.turn(), -1.0);
        intents.set(Intent::RotateRight, true);
        assert_eq!(intents.turn(), 0.0);
        intents.set(Intent::RotateLeft, false);
        assert_eq!(intents.turn(), 1.0);
    }

    #[test]
    fn test_two_player_layouts_do_not_overlap() {
        let one = KeyBindings::player_one();
        let two = KeyBindings::player_two();
        for (code, _) in one.pairs() {
            assert!(two.pairs().iter().all(|(other, _)| *other != code));
        }
    }
}

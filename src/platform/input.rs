//! Logical input actions
//!
//! Keyboard, touch or gamepad glue lives outside the crate and only has to
//! answer whether an [`Action`] is currently held.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::sim::Steering;

/// Device-agnostic actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Fire,
    Confirm,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Left,
        Action::Right,
        Action::Up,
        Action::Down,
        Action::Fire,
        Action::Confirm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Left => "left",
            Action::Right => "right",
            Action::Up => "up",
            Action::Down => "down",
            Action::Fire => "fire",
            Action::Confirm => "confirm",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == s)
    }
}

/// Input capability queried once per frame
pub trait InputSource {
    fn is_held(&self, action: Action) -> bool;

    /// Held directions as simulation steering
    fn steering(&self) -> Steering {
        Steering {
            left: self.is_held(Action::Left),
            right: self.is_held(Action::Right),
            up: self.is_held(Action::Up),
            down: self.is_held(Action::Down),
        }
    }
}

/// Plain set of held actions, fed by event handlers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldActions {
    held: HashSet<Action>,
}

impl HeldActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action) {
        self.held.insert(action);
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    pub fn set(&mut self, action: Action, held: bool) {
        if held {
            self.press(action);
        } else {
            self.release(action);
        }
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl InputSource for HeldActions {
    fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }
}

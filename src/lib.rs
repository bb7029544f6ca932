//! River Strike - A vertically-scrolling river combat arcade game
//!
//! Core modules:
//! - `sim`: Simulation (entities, pools, collisions, game state machine)
//! - `renderer`: Read-only draw lists for an external renderer
//! - `platform`: Input and audio capabilities
//! - `tuning`: Data-driven game balance
//! - `game`: Frame driver tying the capabilities to the simulation

pub mod error;
pub mod game;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use error::TuningError;
pub use game::Game;
pub use tuning::{DifficultyPreset, Tuning};

/// Game configuration constants
pub mod consts {
    /// Default playfield dimensions (pixels)
    pub const PLAYFIELD_WIDTH: f32 = 480.0;
    pub const PLAYFIELD_HEIGHT: f32 = 640.0;

    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Navigable channel, as fractions of playfield width
    pub const CHANNEL_LEFT_FRACTION: f32 = 0.25;
    pub const CHANNEL_RIGHT_FRACTION: f32 = 0.75;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 30.0;
    pub const PLAYER_SPEED: f32 = 200.0;
    /// Seconds between automatic shots
    pub const PLAYER_FIRE_RATE: f32 = 0.15;
    /// Player spawns this far above the bottom edge
    pub const PLAYER_BOTTOM_OFFSET: f32 = 50.0;

    /// Bullets
    pub const BULLET_WIDTH: f32 = 5.0;
    pub const BULLET_HEIGHT: f32 = 15.0;
    pub const BULLET_SPEED: f32 = 300.0;
    /// Bullets survive this far past either playfield edge
    pub const BULLET_EDGE_MARGIN: f32 = 10.0;

    /// Enemies leave play this far below the bottom edge
    pub const ENEMY_EXIT_MARGIN: f32 = 30.0;
    pub const ENEMY_SPAWN_Y: f32 = -30.0;

    /// Fuel pickups
    pub const FUEL_ITEM_SIZE: f32 = 20.0;
    pub const FUEL_ITEM_SPEED: f32 = 50.0;
    pub const FUEL_ITEM_EXIT_MARGIN: f32 = 20.0;
    pub const FUEL_MAX: f32 = 100.0;

    /// Bridges
    pub const BRIDGE_HEIGHT: f32 = 20.0;
    pub const BRIDGE_GAP_WIDTH: f32 = 60.0;
    pub const BRIDGE_SECTIONS: usize = 3;
    pub const BRIDGE_EXIT_MARGIN: f32 = 30.0;
    pub const BRIDGE_SPAWN_Y: f32 = -20.0;

    /// Starting values for a run
    pub const START_LIVES: u32 = 3;
    pub const START_SCROLL_SPEED: f32 = 100.0;

    /// Transient visuals (seconds)
    pub const EFFECT_DURATION: f32 = 0.3;
    pub const SECTION_BANNER_DURATION: f32 = 2.0;
}

/// Clamp a fuel value into `[0, FUEL_MAX]`
#[inline]
pub fn clamp_fuel(fuel: f32) -> f32 {
    fuel.clamp(0.0, consts::FUEL_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn fuel_always_in_range(fuel in -1.0e6f32..1.0e6) {
            let clamped = clamp_fuel(fuel);
            prop_assert!((0.0..=consts::FUEL_MAX).contains(&clamped));
        }
    }
}

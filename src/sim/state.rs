//! Game state and core simulation types
//!
//! Everything a frontend needs to draw a frame lives here and is
//! serializable, so a snapshot can be shipped to an external UI.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{CollisionManager, EffectKind};
use super::entities::{Bridge, Bullet, Enemy, Entity, FuelItem, Player, WorldView};
use super::pool::Pool;
use crate::consts::*;
use crate::tuning::Tuning;

/// Top-level game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Attract screen, waiting for confirm
    Menu,
    /// Active gameplay
    Playing,
    /// Run ended, waiting for confirm to restart
    GameOver,
}

/// Named audio cues; playback is up to the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Pickup,
    BackgroundLoopStart,
    Explosion,
    PlayerHit,
    GameOver,
}

impl SoundCue {
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::Pickup => "pickup",
            SoundCue::BackgroundLoopStart => "background-loop-start",
            SoundCue::Explosion => "explosion",
            SoundCue::PlayerHit => "player-hit",
            SoundCue::GameOver => "game-over",
        }
    }

    /// Mix level before master volume (0.0 - 1.0)
    pub fn base_volume(&self) -> f32 {
        match self {
            SoundCue::Pickup => 0.6,
            SoundCue::BackgroundLoopStart => 0.4,
            SoundCue::Explosion => 0.8,
            SoundCue::PlayerHit => 0.7,
            SoundCue::GameOver => 0.9,
        }
    }
}

/// Things that happened during a tick, drained by the frame driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundCue),
    PhaseChanged { from: GamePhase, to: GamePhase },
    /// A bridge crossed the midpoint; `section` is the new section index
    SectionPassed { section: u32 },
    Effect(EffectKind),
}

/// Reference to one live entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityHandle {
    Player,
    PlayerBullet(usize),
    EnemyBullet(usize),
    Enemy(usize),
    Fuel(usize),
    Bridge(usize),
}

/// Countdown timers for each spawner (seconds)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimers {
    pub enemy: f32,
    pub fuel: f32,
    pub bridge: f32,
}

/// "Section N complete" overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionBanner {
    /// The section just completed
    pub section: u32,
    pub remaining: f32,
}

/// Counters for the current run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub score: u64,
    /// 0-100
    pub fuel: f32,
    pub lives: u32,
    pub scroll_speed: f32,
    /// Starts at 1, +1 per bridge passed
    pub section: u32,
    /// Shortens enemy spawn intervals
    pub difficulty: f32,
    /// Seconds spent playing this run
    pub elapsed: f32,
}

impl RunStats {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            fuel: FUEL_MAX,
            lives: tuning.start_lives,
            scroll_speed: tuning.start_scroll_speed,
            section: 1,
            difficulty: 1.0,
            elapsed: 0.0,
        }
    }

    /// Add fuel, clamped to the tank size
    pub fn refuel(&mut self, amount: f32) {
        self.fuel = crate::clamp_fuel(self.fuel + amount);
    }
}

/// Every entity plus the roster of live ones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub player: Player,
    pub player_bullets: Pool<Bullet>,
    pub enemy_bullets: Pool<Bullet>,
    pub enemies: Pool<Enemy>,
    pub fuel_items: Pool<FuelItem>,
    pub bridges: Pool<Bridge>,
    /// Live entities, each listed once
    pub roster: Vec<EntityHandle>,
}

impl World {
    pub fn new(width: f32, height: f32, tuning: &Tuning) -> Self {
        let start = Vec2::new(
            width / 2.0 - PLAYER_WIDTH / 2.0,
            height - PLAYER_BOTTOM_OFFSET,
        );
        Self {
            width,
            height,
            player: Player::new(start, tuning.player_speed, tuning.player_fire_rate),
            player_bullets: Pool::new(),
            enemy_bullets: Pool::new(),
            enemies: Pool::new(),
            fuel_items: Pool::new(),
            bridges: Pool::new(),
            roster: vec![EntityHandle::Player],
        }
    }

    /// Look up a handle as a generic entity
    pub fn entity(&self, handle: EntityHandle) -> Option<&dyn Entity> {
        match handle {
            EntityHandle::Player => Some(&self.player as &dyn Entity),
            EntityHandle::PlayerBullet(i) => self.player_bullets.get(i).map(|e| e as &dyn Entity),
            EntityHandle::EnemyBullet(i) => self.enemy_bullets.get(i).map(|e| e as &dyn Entity),
            EntityHandle::Enemy(i) => self.enemies.get(i).map(|e| e as &dyn Entity),
            EntityHandle::Fuel(i) => self.fuel_items.get(i).map(|e| e as &dyn Entity),
            EntityHandle::Bridge(i) => self.bridges.get(i).map(|e| e as &dyn Entity),
        }
    }

    pub fn is_active(&self, handle: EntityHandle) -> bool {
        self.entity(handle).is_some_and(|e| e.is_active())
    }

    /// Drop handles whose entity has left play
    pub fn prune_roster(&mut self) {
        let mut roster = std::mem::take(&mut self.roster);
        roster.retain(|&handle| self.is_active(handle));
        self.roster = roster;
    }

    /// Make sure every active pooled entity is listed exactly once
    pub fn sync_roster(&mut self) {
        let live: Vec<EntityHandle> = self
            .player_bullets
            .active_indices()
            .map(EntityHandle::PlayerBullet)
            .chain(self.enemy_bullets.active_indices().map(EntityHandle::EnemyBullet))
            .chain(self.enemies.active_indices().map(EntityHandle::Enemy))
            .chain(self.fuel_items.active_indices().map(EntityHandle::Fuel))
            .chain(self.bridges.active_indices().map(EntityHandle::Bridge))
            .collect();

        for handle in live {
            self.insert(handle);
        }
    }

    /// Idempotent roster insertion
    pub fn insert(&mut self, handle: EntityHandle) {
        if !self.roster.contains(&handle) {
            self.roster.push(handle);
        }
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub run: RunStats,
    pub world: World,
    pub collisions: CollisionManager,
    pub timers: SpawnTimers,
    pub banner: Option<SectionBanner>,
    /// Pending events for the frame driver
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game sitting on the menu
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::with_playfield(seed, tuning, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT)
    }

    /// Tuning that fails validation is replaced by the defaults
    pub fn with_playfield(seed: u64, tuning: Tuning, width: f32, height: f32) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("{}; falling back to default tuning", e);
                Tuning::default()
            }
        };
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            run: RunStats::new(&tuning),
            world: World::new(width, height, &tuning),
            collisions: CollisionManager::new(width),
            timers: SpawnTimers::default(),
            banner: None,
            events: Vec::new(),
            phase: GamePhase::Menu,
            tuning,
        };
        state.timers = state.roll_timers();
        state
    }

    /// Throw away the current run and build a fresh one
    ///
    /// Keeps the playfield size, tuning and RNG stream.
    pub fn reset_run(&mut self) {
        let (width, height) = (self.world.width, self.world.height);
        self.run = RunStats::new(&self.tuning);
        self.world = World::new(width, height, &self.tuning);
        self.collisions = CollisionManager::new(width);
        self.banner = None;
        self.timers = self.roll_timers();
    }

    /// Switch phase, queueing the matching events
    pub fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        log::info!(
            "Phase {:?} -> {:?} (score {}, section {})",
            from,
            to,
            self.run.score,
            self.run.section
        );
        self.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });
        match to {
            GamePhase::Playing => self.events.push(GameEvent::Sound(SoundCue::BackgroundLoopStart)),
            GamePhase::GameOver => self.events.push(GameEvent::Sound(SoundCue::GameOver)),
            GamePhase::Menu => {}
        }
    }

    /// Accept a new playfield size; recomputes the channel
    pub fn resize(&mut self, width: f32, height: f32) {
        log::info!("Playfield resized to {}x{}", width, height);
        self.world.width = width;
        self.world.height = height;
        self.collisions.resize(width);
    }

    /// Read-only context handed to entity updates
    pub fn world_view(&self) -> WorldView {
        WorldView {
            width: self.world.width,
            height: self.world.height,
            scroll_speed: self.run.scroll_speed,
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn enemy_interval(&mut self) -> f32 {
        let t = &self.tuning;
        let (min, max) = (t.enemy_spawn_min, t.enemy_spawn_max);
        self.rng.random_range(min..=max) / self.run.difficulty.max(f32::EPSILON)
    }

    pub fn fuel_interval(&mut self) -> f32 {
        let (min, max) = (self.tuning.fuel_spawn_min, self.tuning.fuel_spawn_max);
        self.rng.random_range(min..=max)
    }

    pub fn bridge_interval(&mut self) -> f32 {
        let (min, max) = (self.tuning.bridge_spawn_min, self.tuning.bridge_spawn_max);
        self.rng.random_range(min..=max)
    }

    fn roll_timers(&mut self) -> SpawnTimers {
        SpawnTimers {
            enemy: self.enemy_interval(),
            fuel: self.fuel_interval(),
            bridge: self.bridge_interval(),
        }
    }
}

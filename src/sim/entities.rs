//! Simulation entities
//!
//! Every entity owns a position, an active flag and a hitbox. Pooled kinds
//! are reset through their `activate`/`fire` methods rather than rebuilt.

use std::convert::Infallible;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::pool::Poolable;
use crate::consts::*;

/// Read-only slice of world state handed to entities each step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldView {
    pub width: f32,
    pub height: f32,
    pub scroll_speed: f32,
}

impl Default for WorldView {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            scroll_speed: START_SCROLL_SPEED,
        }
    }
}

/// Common surface of everything that collides and renders
pub trait Entity {
    /// Top-left corner
    fn pos(&self) -> Vec2;
    /// Hitbox width and height
    fn size(&self) -> Vec2;
    fn is_active(&self) -> bool;
    fn deactivate(&mut self);

    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos(), self.size())
    }
}

macro_rules! impl_entity {
    ($ty:ty) => {
        impl Entity for $ty {
            fn pos(&self) -> Vec2 {
                self.pos
            }
            fn size(&self) -> Vec2 {
                self.size
            }
            fn is_active(&self) -> bool {
                self.active
            }
            fn deactivate(&mut self) {
                self.active = false;
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Which directions are held this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Steering {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Steering {
    /// Unit-per-axis direction (axes are independent, diagonals are faster)
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// The player's craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub active: bool,
    /// Pixels per second on each axis
    pub speed: f32,
    /// Seconds between shots
    pub fire_rate: f32,
    pub fire_timer: f32,
    /// Fire continuously without holding the fire action
    pub auto_fire: bool,
}

impl Player {
    pub fn new(pos: Vec2, speed: f32, fire_rate: f32) -> Self {
        Self {
            pos,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            active: true,
            speed,
            fire_rate,
            fire_timer: 0.0,
            auto_fire: true,
        }
    }

    /// Move, clamp to the playfield and run the fire cadence
    ///
    /// Returns the muzzle position when a shot is due.
    pub fn update(
        &mut self,
        dt: f32,
        steering: Steering,
        fire_held: bool,
        world: &WorldView,
    ) -> Option<Vec2> {
        self.pos += steering.direction() * self.speed * dt;
        self.pos.x = self.pos.x.clamp(0.0, (world.width - self.size.x).max(0.0));
        self.pos.y = self.pos.y.clamp(0.0, (world.height - self.size.y).max(0.0));

        self.fire_timer -= dt;
        if (self.auto_fire || fire_held) && self.fire_timer <= 0.0 {
            self.fire_timer = self.fire_rate;
            return Some(Vec2::new(
                self.pos.x + (self.size.x - BULLET_WIDTH) / 2.0,
                self.pos.y - 10.0,
            ));
        }
        None
    }
}

impl_entity!(Player);

// ---------------------------------------------------------------------------
// Bullet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub size: Vec2,
    pub active: bool,
    /// Signed vertical velocity (negative travels up)
    pub vel_y: f32,
    pub from_enemy: bool,
}

impl Bullet {
    /// Reset and launch from `pos`; enemy shots travel down
    pub fn fire(&mut self, pos: Vec2, from_enemy: bool) {
        self.pos = pos;
        self.from_enemy = from_enemy;
        self.vel_y = if from_enemy { BULLET_SPEED } else { -BULLET_SPEED };
        self.active = true;
    }
}

impl_entity!(Bullet);

impl Poolable for Bullet {
    type Output = Infallible;

    fn create() -> Self {
        Self {
            pos: Vec2::ZERO,
            size: Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
            active: false,
            vel_y: -BULLET_SPEED,
            from_enemy: false,
        }
    }

    fn step(&mut self, dt: f32, world: &WorldView) -> Option<Infallible> {
        self.pos.y += self.vel_y * dt;
        if self.pos.y < -BULLET_EDGE_MARGIN || self.pos.y > world.height + BULLET_EDGE_MARGIN {
            self.active = false;
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Enemy
// ---------------------------------------------------------------------------

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    #[default]
    Boat,
    Helicopter,
    FastBoat,
    HeavyBoat,
    ShooterBoat,
}

/// Lateral movement, fixed for an instance's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MovementPattern {
    Straight,
    /// x = origin + sin((y - y0) / 50 * frequency) * amplitude
    Sine { amplitude: f32, frequency: f32 },
    /// Drift sideways, reversing every `flip_interval` seconds
    Zigzag { lateral_speed: f32, flip_interval: f32 },
}

/// Per-kind data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub speed: f32,
    pub hp: i32,
    pub points: u64,
    pub size: Vec2,
    pub pattern: MovementPattern,
    /// Seconds between shots, for kinds that fire
    pub fire_rate: Option<f32>,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Boat,
        EnemyKind::Helicopter,
        EnemyKind::FastBoat,
        EnemyKind::HeavyBoat,
        EnemyKind::ShooterBoat,
    ];

    pub fn stats(&self) -> EnemyStats {
        match self {
            EnemyKind::Boat => EnemyStats {
                speed: 100.0,
                hp: 1,
                points: 100,
                size: Vec2::new(40.0, 20.0),
                pattern: MovementPattern::Straight,
                fire_rate: None,
            },
            EnemyKind::Helicopter => EnemyStats {
                speed: 120.0,
                hp: 1,
                points: 150,
                size: Vec2::new(30.0, 30.0),
                pattern: MovementPattern::Sine {
                    amplitude: 80.0,
                    frequency: 2.0,
                },
                fire_rate: None,
            },
            EnemyKind::FastBoat => EnemyStats {
                speed: 180.0,
                hp: 1,
                points: 200,
                size: Vec2::new(35.0, 18.0),
                pattern: MovementPattern::Zigzag {
                    lateral_speed: 60.0,
                    flip_interval: 1.0,
                },
                fire_rate: None,
            },
            EnemyKind::HeavyBoat => EnemyStats {
                speed: 70.0,
                hp: 3,
                points: 300,
                size: Vec2::new(45.0, 25.0),
                pattern: MovementPattern::Straight,
                fire_rate: None,
            },
            EnemyKind::ShooterBoat => EnemyStats {
                speed: 90.0,
                hp: 2,
                points: 250,
                size: Vec2::new(40.0, 20.0),
                pattern: MovementPattern::Straight,
                fire_rate: Some(2.0),
            },
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            EnemyKind::Boat => "boat",
            EnemyKind::Helicopter => "helicopter",
            EnemyKind::FastBoat => "fastBoat",
            EnemyKind::HeavyBoat => "heavyBoat",
            EnemyKind::ShooterBoat => "shooterBoat",
        }
    }

    /// Parse a tag, falling back to a plain boat for anything unknown
    pub fn from_tag(tag: &str) -> Self {
        match Self::ALL.iter().find(|kind| kind.tag().eq_ignore_ascii_case(tag)) {
            Some(kind) => *kind,
            None => {
                log::warn!("Unknown enemy tag {tag:?}, spawning a boat instead");
                EnemyKind::Boat
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub active: bool,
    pub speed: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub points: u64,
    pub pattern: MovementPattern,
    /// Spawn position, anchor for the sine pattern
    pub origin: Vec2,
    pub zigzag_timer: f32,
    /// +1.0 or -1.0
    pub zigzag_dir: f32,
    pub fire_rate: Option<f32>,
    pub fire_timer: f32,
}

impl Enemy {
    /// Reset to a fresh instance of `kind` at `pos`
    pub fn activate(&mut self, kind: EnemyKind, pos: Vec2) {
        let stats = kind.stats();
        *self = Self {
            kind,
            pos,
            size: stats.size,
            active: true,
            speed: stats.speed,
            hp: stats.hp,
            max_hp: stats.hp,
            points: stats.points,
            pattern: stats.pattern,
            origin: pos,
            zigzag_timer: 0.0,
            zigzag_dir: 1.0,
            fire_rate: stats.fire_rate,
            fire_timer: 0.0,
        };
    }

    /// Apply one hit; returns true exactly once, on the hit that destroys it
    pub fn take_hit(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.hp -= 1;
        if self.hp <= 0 {
            self.active = false;
            return true;
        }
        false
    }
}

impl_entity!(Enemy);

impl Poolable for Enemy {
    /// Muzzle position of a shot
    type Output = Vec2;

    fn create() -> Self {
        let stats = EnemyKind::Boat.stats();
        Self {
            kind: EnemyKind::Boat,
            pos: Vec2::ZERO,
            size: stats.size,
            active: false,
            speed: stats.speed,
            hp: stats.hp,
            max_hp: stats.hp,
            points: stats.points,
            pattern: stats.pattern,
            origin: Vec2::ZERO,
            zigzag_timer: 0.0,
            zigzag_dir: 1.0,
            fire_rate: None,
            fire_timer: 0.0,
        }
    }

    fn step(&mut self, dt: f32, world: &WorldView) -> Option<Vec2> {
        self.pos.y += self.speed * dt;

        match self.pattern {
            MovementPattern::Straight => {}
            MovementPattern::Sine {
                amplitude,
                frequency,
            } => {
                let travelled = self.pos.y - self.origin.y;
                self.pos.x = self.origin.x + (travelled / 50.0 * frequency).sin() * amplitude;
            }
            MovementPattern::Zigzag {
                lateral_speed,
                flip_interval,
            } => {
                self.zigzag_timer += dt;
                if self.zigzag_timer > flip_interval {
                    self.zigzag_dir = -self.zigzag_dir;
                    self.zigzag_timer = 0.0;
                }
                self.pos.x += lateral_speed * self.zigzag_dir * dt;
            }
        }

        if self.pos.y > world.height + ENEMY_EXIT_MARGIN {
            self.active = false;
            return None;
        }

        let rate = self.fire_rate?;
        self.fire_timer -= dt;
        if self.fire_timer <= 0.0 {
            self.fire_timer = rate;
            return Some(Vec2::new(
                self.pos.x + (self.size.x - BULLET_WIDTH) / 2.0,
                self.pos.y + self.size.y,
            ));
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Fuel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelItem {
    pub pos: Vec2,
    pub size: Vec2,
    pub active: bool,
    pub speed: f32,
}

impl FuelItem {
    pub fn activate(&mut self, pos: Vec2) {
        self.pos = pos;
        self.active = true;
    }
}

impl_entity!(FuelItem);

impl Poolable for FuelItem {
    type Output = Infallible;

    fn create() -> Self {
        Self {
            pos: Vec2::ZERO,
            size: Vec2::splat(FUEL_ITEM_SIZE),
            active: false,
            speed: FUEL_ITEM_SPEED,
        }
    }

    fn step(&mut self, dt: f32, world: &WorldView) -> Option<Infallible> {
        self.pos.y += self.speed * dt;
        if self.pos.y > world.height + FUEL_ITEM_EXIT_MARGIN {
            self.active = false;
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

/// Emitted once per bridge when it crosses the playfield midpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgePassed;

/// A gate across the channel with one gap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bridge {
    pub pos: Vec2,
    pub size: Vec2,
    pub active: bool,
    /// Which third holds the gap (0 = left, 1 = middle, 2 = right)
    pub gap_index: usize,
    pub gap_width: f32,
    /// Solid pieces, in world coordinates
    pub sections: Vec<Aabb>,
    pub speed: f32,
    /// Section-passed already fired for this instance
    pub passed: bool,
    /// Current contact with the player already cost a life
    pub struck: bool,
}

impl Bridge {
    /// Reset across `width` starting at `pos`, with the gap in third `gap_index`
    pub fn activate(&mut self, pos: Vec2, width: f32, gap_index: usize) {
        self.pos = pos;
        self.size = Vec2::new(width, BRIDGE_HEIGHT);
        self.gap_index = gap_index.min(BRIDGE_SECTIONS - 1);
        self.gap_width = BRIDGE_GAP_WIDTH;
        self.passed = false;
        self.struck = false;
        self.active = true;
        self.rebuild_sections();
    }

    fn rebuild_sections(&mut self) {
        self.sections.clear();
        let section_width = self.size.x / BRIDGE_SECTIONS as f32;
        let flank = (section_width - self.gap_width) / 2.0;

        for i in 0..BRIDGE_SECTIONS {
            let x = self.pos.x + i as f32 * section_width;
            if i != self.gap_index {
                self.sections
                    .push(Aabb::from_xywh(x, self.pos.y, section_width, self.size.y));
            } else if flank > 0.0 {
                self.sections.push(Aabb::from_xywh(x, self.pos.y, flank, self.size.y));
                self.sections.push(Aabb::from_xywh(
                    x + flank + self.gap_width,
                    self.pos.y,
                    flank,
                    self.size.y,
                ));
            }
        }
    }

    /// Horizontal extent of the gap
    pub fn gap_span(&self) -> (f32, f32) {
        let section_width = self.size.x / BRIDGE_SECTIONS as f32;
        let start = self.pos.x
            + self.gap_index as f32 * section_width
            + (section_width - self.gap_width).max(0.0) / 2.0;
        (start, start + self.gap_width.min(section_width))
    }
}

impl_entity!(Bridge);

impl Poolable for Bridge {
    type Output = BridgePassed;

    fn create() -> Self {
        Self {
            pos: Vec2::ZERO,
            size: Vec2::new(0.0, BRIDGE_HEIGHT),
            active: false,
            gap_index: 0,
            gap_width: BRIDGE_GAP_WIDTH,
            sections: Vec::with_capacity(BRIDGE_SECTIONS + 1),
            speed: START_SCROLL_SPEED,
            passed: false,
            struck: false,
        }
    }

    fn step(&mut self, dt: f32, world: &WorldView) -> Option<BridgePassed> {
        self.speed = world.scroll_speed;
        self.pos.y += self.speed * dt;
        for section in &mut self.sections {
            section.pos.y = self.pos.y;
        }

        if self.pos.y > world.height + BRIDGE_EXIT_MARGIN {
            self.active = false;
        }

        if !self.passed && self.pos.y > world.height / 2.0 {
            self.passed = true;
            return Some(BridgePassed);
        }
        None
    }
}

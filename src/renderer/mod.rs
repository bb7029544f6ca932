//! Render capability
//!
//! The core never draws. Each frame it flattens the live roster into a
//! [`DrawList`] and hands it to whatever [`Renderer`] the host provides.

pub mod text;

use serde::{Deserialize, Serialize};

use crate::sim::{
    Aabb, CollisionEffect, EffectKind, EnemyKind, Entity, EntityHandle, GamePhase, GameState,
    SectionBanner,
};

pub use text::TextRenderer;

/// Something that can put a frame on screen
pub trait Renderer {
    fn draw(&mut self, frame: &DrawList);

    /// Playfield size changed
    fn resize(&mut self, _width: f32, _height: f32) {}
}

/// What a sprite depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKind {
    Player,
    PlayerBullet,
    EnemyBullet,
    Enemy(EnemyKind),
    Fuel,
    BridgeSection,
}

impl SpriteKind {
    /// Flat RGBA fill for hosts without art
    pub fn color(&self) -> [f32; 4] {
        match self {
            SpriteKind::Player => [1.0, 0.85, 0.2, 1.0],
            SpriteKind::PlayerBullet => [1.0, 1.0, 0.6, 1.0],
            SpriteKind::EnemyBullet => [1.0, 0.3, 0.3, 1.0],
            SpriteKind::Enemy(EnemyKind::Boat) => [0.6, 0.6, 0.65, 1.0],
            SpriteKind::Enemy(EnemyKind::Helicopter) => [0.3, 0.8, 0.3, 1.0],
            SpriteKind::Enemy(EnemyKind::FastBoat) => [0.2, 0.7, 1.0, 1.0],
            SpriteKind::Enemy(EnemyKind::HeavyBoat) => [0.45, 0.35, 0.3, 1.0],
            SpriteKind::Enemy(EnemyKind::ShooterBoat) => [0.9, 0.2, 0.6, 1.0],
            SpriteKind::Fuel => [0.95, 0.1, 0.1, 1.0],
            SpriteKind::BridgeSection => [0.55, 0.4, 0.25, 1.0],
        }
    }
}

/// One rectangle to draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub rect: Aabb,
    /// Remaining and maximum hit points, enemies only
    pub hp: Option<(i32, i32)>,
}

/// Numbers the host shows around the playfield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub score: u64,
    pub fuel: f32,
    pub lives: u32,
    pub section: u32,
    pub difficulty: f32,
    pub phase: GamePhase,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawList {
    pub width: f32,
    pub height: f32,
    /// Navigable channel; everything outside it is bank
    pub channel: (f32, f32),
    pub sprites: Vec<Sprite>,
    pub hud: Hud,
    pub effect: Option<CollisionEffect>,
    pub banner: Option<SectionBanner>,
}

impl DrawList {
    /// Snapshot the renderable parts of `state`, in roster order
    pub fn build(state: &GameState) -> Self {
        let world = &state.world;
        let mut sprites = Vec::with_capacity(world.roster.len());

        for &handle in &world.roster {
            match handle {
                EntityHandle::Player => push(&mut sprites, SpriteKind::Player, &world.player),
                EntityHandle::PlayerBullet(i) => {
                    if let Some(bullet) = world.player_bullets.get(i) {
                        push(&mut sprites, SpriteKind::PlayerBullet, bullet);
                    }
                }
                EntityHandle::EnemyBullet(i) => {
                    if let Some(bullet) = world.enemy_bullets.get(i) {
                        push(&mut sprites, SpriteKind::EnemyBullet, bullet);
                    }
                }
                EntityHandle::Enemy(i) => {
                    if let Some(enemy) = world.enemies.get(i).filter(|e| e.is_active()) {
                        sprites.push(Sprite {
                            kind: SpriteKind::Enemy(enemy.kind),
                            rect: enemy.bounds(),
                            hp: Some((enemy.hp, enemy.max_hp)),
                        });
                    }
                }
                EntityHandle::Fuel(i) => {
                    if let Some(item) = world.fuel_items.get(i) {
                        push(&mut sprites, SpriteKind::Fuel, item);
                    }
                }
                EntityHandle::Bridge(i) => {
                    if let Some(bridge) = world.bridges.get(i).filter(|b| b.is_active()) {
                        sprites.extend(bridge.sections.iter().map(|rect| Sprite {
                            kind: SpriteKind::BridgeSection,
                            rect: *rect,
                            hp: None,
                        }));
                    }
                }
            }
        }

        let channel = state.collisions.channel;
        Self {
            width: world.width,
            height: world.height,
            channel: (channel.left, channel.right),
            sprites,
            hud: Hud {
                score: state.run.score,
                fuel: state.run.fuel,
                lives: state.run.lives,
                section: state.run.section,
                difficulty: state.run.difficulty,
                phase: state.phase,
            },
            effect: state.collisions.effect,
            banner: state.banner,
        }
    }

    pub fn count(&self, kind: SpriteKind) -> usize {
        self.sprites.iter().filter(|s| s.kind == kind).count()
    }

    /// Effect fade (1.0 fresh, 0.0 gone)
    pub fn effect_alpha(&self) -> f32 {
        self.effect
            .map(|e| (e.remaining / crate::consts::EFFECT_DURATION).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }

    pub fn effect_kind(&self) -> Option<EffectKind> {
        self.effect.map(|e| e.kind)
    }
}

fn push(sprites: &mut Vec<Sprite>, kind: SpriteKind, entity: &impl Entity) {
    if entity.is_active() {
        sprites.push(Sprite {
            kind,
            rect: entity.bounds(),
            hp: None,
        });
    }
}

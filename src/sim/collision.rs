//! Collision detection and resolution
//!
//! Each tick the live roster is split by role and every interaction is
//! resolved in a fixed order. Later rules rely on earlier ones having
//! already deactivated what they consumed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::Entity;
use super::state::{EntityHandle, GameEvent, RunStats, SoundCue, World};
use crate::consts::*;
use crate::tuning::Tuning;

/// Visual effect tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Enemy destroyed
    Explosion,
    /// Enemy damaged but still afloat
    Hit,
    PlayerHit,
    FuelPickup,
    /// Player ran into the river bank
    Crash,
    BridgeHit,
}

/// The single on-screen collision effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEffect {
    pub kind: EffectKind,
    /// Center of the effect
    pub pos: Vec2,
    /// Seconds left on screen
    pub remaining: f32,
}

/// Horizontal strip the player must stay inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub left: f32,
    pub right: f32,
}

impl Channel {
    pub fn for_width(width: f32) -> Self {
        Self {
            left: width * CHANNEL_LEFT_FRACTION,
            right: width * CHANNEL_RIGHT_FRACTION,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn center(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    /// True if `[x, x + w]` lies inside the channel
    pub fn contains_span(&self, x: f32, w: f32) -> bool {
        x >= self.left && x + w <= self.right
    }
}

/// Outcome of one resolution pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Continue,
    /// Lives ran out; nothing after the fatal rule was evaluated
    GameOver,
}

/// Live entities split by role
#[derive(Debug, Default)]
struct Partition {
    player_bullets: Vec<usize>,
    enemy_bullets: Vec<usize>,
    enemies: Vec<usize>,
    fuel_items: Vec<usize>,
    bridges: Vec<usize>,
}

impl Partition {
    fn of(world: &World) -> Self {
        let mut partition = Self::default();
        for &handle in world.roster.iter().filter(|&&h| world.is_active(h)) {
            match handle {
                EntityHandle::Player => {}
                EntityHandle::PlayerBullet(i) => partition.player_bullets.push(i),
                EntityHandle::EnemyBullet(i) => partition.enemy_bullets.push(i),
                EntityHandle::Enemy(i) => partition.enemies.push(i),
                EntityHandle::Fuel(i) => partition.fuel_items.push(i),
                EntityHandle::Bridge(i) => partition.bridges.push(i),
            }
        }
        partition
    }
}

type Rule = fn(
    &mut CollisionManager,
    &mut World,
    &mut RunStats,
    &Tuning,
    &Partition,
    &mut Vec<GameEvent>,
) -> Resolution;

/// Resolves interactions and owns the transient effect record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionManager {
    pub channel: Channel,
    pub effect: Option<CollisionEffect>,
}

impl CollisionManager {
    pub fn new(width: f32) -> Self {
        Self {
            channel: Channel::for_width(width),
            effect: None,
        }
    }

    pub fn resize(&mut self, width: f32) {
        self.channel = Channel::for_width(width);
    }

    /// Replace the current effect (only one is shown at a time)
    pub fn trigger(&mut self, kind: EffectKind, pos: Vec2, events: &mut Vec<GameEvent>) {
        self.effect = Some(CollisionEffect {
            kind,
            pos,
            remaining: EFFECT_DURATION,
        });
        events.push(GameEvent::Effect(kind));
    }

    /// Age the effect, clearing it once it runs out
    pub fn update_effects(&mut self, dt: f32) {
        if let Some(effect) = &mut self.effect {
            effect.remaining -= dt;
            if effect.remaining <= 0.0 {
                self.effect = None;
            }
        }
    }

    /// Run every collision rule once, in order
    pub fn resolve(
        &mut self,
        world: &mut World,
        run: &mut RunStats,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> Resolution {
        let partition = Partition::of(world);

        self.player_bullets_vs_enemies(world, run, &partition, events);

        let rules: [Rule; 5] = [
            Self::enemy_bullets_vs_player,
            Self::player_vs_enemies,
            Self::player_vs_fuel,
            Self::player_vs_terrain,
            Self::player_vs_bridges,
        ];
        for rule in rules {
            if rule(self, world, run, tuning, &partition, events) == Resolution::GameOver {
                return Resolution::GameOver;
            }
        }
        Resolution::Continue
    }

    fn player_bullets_vs_enemies(
        &mut self,
        world: &mut World,
        run: &mut RunStats,
        partition: &Partition,
        events: &mut Vec<GameEvent>,
    ) {
        for &bi in &partition.player_bullets {
            let Some(bullet) = world.player_bullets.get_mut(bi) else {
                continue;
            };
            for &ei in &partition.enemies {
                if !bullet.is_active() {
                    break;
                }
                let Some(enemy) = world.enemies.get_mut(ei) else {
                    continue;
                };
                if !enemy.is_active() || !bullet.bounds().overlaps(&enemy.bounds()) {
                    continue;
                }

                bullet.deactivate();
                let center = enemy.bounds().center();
                if enemy.take_hit() {
                    run.score += enemy.points;
                    log::debug!("{:?} destroyed (+{})", enemy.kind, enemy.points);
                    self.trigger(EffectKind::Explosion, center, events);
                    events.push(GameEvent::Sound(SoundCue::Explosion));
                } else {
                    self.trigger(EffectKind::Hit, center, events);
                }
            }
        }
    }

    fn enemy_bullets_vs_player(
        &mut self,
        world: &mut World,
        run: &mut RunStats,
        _tuning: &Tuning,
        partition: &Partition,
        events: &mut Vec<GameEvent>,
    ) -> Resolution {
        for &bi in &partition.enemy_bullets {
            let Some(bullet) = world.enemy_bullets.get_mut(bi) else {
                continue;
            };
            if bullet.is_active() && bullet.bounds().overlaps(&world.player.bounds()) {
                bullet.deactivate();
                let at = world.player.bounds().center();
                if self.lose_life(run, EffectKind::PlayerHit, at, events) == Resolution::GameOver {
                    return Resolution::GameOver;
                }
            }
        }
        Resolution::Continue
    }

    fn player_vs_enemies(
        &mut self,
        world: &mut World,
        run: &mut RunStats,
        _tuning: &Tuning,
        partition: &Partition,
        events: &mut Vec<GameEvent>,
    ) -> Resolution {
        for &ei in &partition.enemies {
            let Some(enemy) = world.enemies.get_mut(ei) else {
                continue;
            };
            if enemy.is_active() && enemy.bounds().overlaps(&world.player.bounds()) {
                enemy.deactivate();
                let at = world.player.bounds().center();
                if self.lose_life(run, EffectKind::PlayerHit, at, events) == Resolution::GameOver {
                    return Resolution::GameOver;
                }
            }
        }
        Resolution::Continue
    }

    fn player_vs_fuel(
        &mut self,
        world: &mut World,
        run: &mut RunStats,
        tuning: &Tuning,
        partition: &Partition,
        events: &mut Vec<GameEvent>,
    ) -> Resolution {
        for &fi in &partition.fuel_items {
            let Some(fuel) = world.fuel_items.get_mut(fi) else {
                continue;
            };
            if fuel.is_active() && fuel.bounds().overlaps(&world.player.bounds()) {
                fuel.deactivate();
                run.refuel(tuning.fuel_pickup_amount);
                self.trigger(EffectKind::FuelPickup, fuel.bounds().center(), events);
                events.push(GameEvent::Sound(SoundCue::Pickup));
            }
        }
        Resolution::Continue
    }

    fn player_vs_terrain(
        &mut self,
        world: &mut World,
        run: &mut RunStats,
        _tuning: &Tuning,
        _partition: &Partition,
        events: &mut Vec<GameEvent>,
    ) -> Resolution {
        let player = &mut world.player;
        if self.channel.contains_span(player.pos.x, player.size.x) {
            return Resolution::Continue;
        }

        let at = player.bounds().center();
        player.pos.x = self.channel.center() - player.size.x / 2.0;
        self.lose_life(run, EffectKind::Crash, at, events)
    }

    fn player_vs_bridges(
        &mut self,
        world: &mut World,
        run: &mut RunStats,
        _tuning: &Tuning,
        partition: &Partition,
        events: &mut Vec<GameEvent>,
    ) -> Resolution {
        for &bi in &partition.bridges {
            let Some(bridge) = world.bridges.get_mut(bi) else {
                continue;
            };
            if !bridge.is_active() {
                continue;
            }

            let player = world.player.bounds();
            let Some(section) = bridge.sections.iter().copied().find(|s| s.overlaps(&player)) else {
                // Contact over; the next overlap is a fresh hit
                bridge.struck = false;
                continue;
            };
            if bridge.struck {
                continue;
            }

            bridge.struck = true;
            world.player.pos.y = section.bottom();
            if self.lose_life(run, EffectKind::BridgeHit, player.center(), events)
                == Resolution::GameOver
            {
                return Resolution::GameOver;
            }
        }
        Resolution::Continue
    }

    fn lose_life(
        &mut self,
        run: &mut RunStats,
        kind: EffectKind,
        at: Vec2,
        events: &mut Vec<GameEvent>,
    ) -> Resolution {
        run.lives = run.lives.saturating_sub(1);
        log::debug!("Life lost to {:?}, {} left", kind, run.lives);
        self.trigger(kind, at, events);
        events.push(GameEvent::Sound(SoundCue::PlayerHit));
        if run.lives == 0 {
            Resolution::GameOver
        } else {
            Resolution::Continue
        }
    }
}

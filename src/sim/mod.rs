//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (pool order, roster order)
//! - No rendering, audio or platform dependencies; side effects leave as
//!   queued [`GameEvent`]s

pub mod aabb;
pub mod collision;
pub mod entities;
pub mod pool;
pub mod state;
pub mod tick;

pub use aabb::Aabb;
pub use collision::{Channel, CollisionEffect, CollisionManager, EffectKind, Resolution};
pub use entities::{
    Bridge, Bullet, Enemy, EnemyKind, Entity, FuelItem, MovementPattern, Player, Steering,
    WorldView,
};
pub use pool::{Pool, Poolable};
pub use state::{
    EntityHandle, GameEvent, GamePhase, GameState, RunStats, SectionBanner, SoundCue, World,
};
pub use tick::{TickInput, sanitize_dt, tick};

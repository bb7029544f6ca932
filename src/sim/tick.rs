//! Per-frame simulation tick
//!
//! Variable timestep: every rate is per second and scaled by `dt`, so the
//! tick must hold up under irregular frame deltas.

use glam::Vec2;
use rand::Rng;

use super::collision::Resolution;
use super::entities::{EnemyKind, Steering};
use super::state::{EntityHandle, GameEvent, GamePhase, GameState, SectionBanner};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held directions
    pub steering: Steering,
    /// Fire held (only matters when auto-fire is off)
    pub fire: bool,
    /// Start/restart pressed this frame
    pub confirm: bool,
}

/// Turn whatever the frame clock reported into a usable delta
///
/// Non-finite or negative deltas become zero; long stalls are capped.
pub fn sanitize_dt(dt: f32) -> f32 {
    if !dt.is_finite() || dt < 0.0 {
        log::warn!("Ignoring bad frame delta {}", dt);
        0.0
    } else {
        dt.min(MAX_FRAME_DT)
    }
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = sanitize_dt(dt);

    match state.phase {
        GamePhase::Menu => {
            if input.confirm {
                start_run(state);
            }
        }
        GamePhase::GameOver => {
            if input.confirm {
                start_run(state);
            }
        }
        GamePhase::Playing => tick_playing(state, input, dt),
    }
}

/// Fresh run straight into play
pub fn start_run(state: &mut GameState) {
    state.reset_run();
    state.set_phase(GamePhase::Playing);
}

fn tick_playing(state: &mut GameState, input: &TickInput, dt: f32) {
    // Fuel burns first; running dry ends the tick right here
    state.run.fuel = crate::clamp_fuel(state.run.fuel - state.tuning.fuel_drain_rate * dt);
    if state.run.fuel <= 0.0 {
        log::info!("Out of fuel");
        state.set_phase(GamePhase::GameOver);
        return;
    }

    let world = state.world_view();

    // The player is the only roster entity no pool steps
    state.world.prune_roster();
    if let Some(muzzle) = state.world.player.update(dt, input.steering, input.fire, &world) {
        let (_, bullet) = state.world.player_bullets.acquire();
        bullet.fire(muzzle, false);
    }

    // Pools
    let w = &mut state.world;
    w.player_bullets.step_all(dt, &world, |never| match never {});
    w.enemy_bullets.step_all(dt, &world, |never| match never {});

    let mut enemy_shots = Vec::new();
    w.enemies.step_all(dt, &world, |muzzle| enemy_shots.push(muzzle));
    for muzzle in enemy_shots {
        let (_, bullet) = w.enemy_bullets.acquire();
        bullet.fire(muzzle, true);
    }

    w.fuel_items.step_all(dt, &world, |never| match never {});

    let mut bridges_passed = 0;
    w.bridges.step_all(dt, &world, |_| bridges_passed += 1);
    for _ in 0..bridges_passed {
        section_passed(state);
    }

    run_spawners(state, dt);
    state.world.sync_roster();

    let resolution = state.collisions.resolve(
        &mut state.world,
        &mut state.run,
        &state.tuning,
        &mut state.events,
    );
    if resolution == Resolution::GameOver {
        state.set_phase(GamePhase::GameOver);
        return;
    }

    state.collisions.update_effects(dt);
    if let Some(banner) = &mut state.banner {
        banner.remaining -= dt;
        if banner.remaining <= 0.0 {
            state.banner = None;
        }
    }

    state.run.scroll_speed += state.tuning.scroll_ramp * dt;
    state.run.elapsed += dt;
}

/// A bridge crossed the midpoint: next section, harder, with a reward
pub fn section_passed(state: &mut GameState) {
    let completed = state.run.section;
    let run = &mut state.run;
    run.section += 1;
    run.difficulty += state.tuning.section_difficulty_step;
    run.score += state.tuning.section_score_bonus;
    run.refuel(state.tuning.section_fuel_bonus);

    log::info!(
        "Section {} complete, entering section {} (difficulty {:.1})",
        completed,
        run.section,
        run.difficulty
    );
    state.banner = Some(SectionBanner {
        section: completed,
        remaining: SECTION_BANNER_DURATION,
    });
    state.events.push(GameEvent::SectionPassed {
        section: state.run.section,
    });
}

fn run_spawners(state: &mut GameState, dt: f32) {
    state.timers.enemy -= dt;
    if state.timers.enemy <= 0.0 {
        spawn_enemy(state);
        state.timers.enemy = state.enemy_interval();
    }

    state.timers.fuel -= dt;
    if state.timers.fuel <= 0.0 {
        spawn_fuel(state);
        state.timers.fuel = state.fuel_interval();
    }

    state.timers.bridge -= dt;
    if state.timers.bridge <= 0.0 {
        spawn_bridge(state);
        state.timers.bridge = state.bridge_interval();
    }
}

/// Random x so that a `width`-wide hitbox sits fully inside the channel
fn channel_x(state: &mut GameState, width: f32) -> f32 {
    let channel = state.collisions.channel;
    let max = channel.right - width;
    if max <= channel.left {
        return channel.left;
    }
    state.rng.random_range(channel.left..=max)
}

pub fn spawn_enemy(state: &mut GameState) {
    let roll = state.rng.random_range(0..100);
    let kind = enemy_kind_for_roll(state.run.section, roll);
    let x = channel_x(state, kind.stats().size.x);

    let (index, enemy) = state.world.enemies.acquire();
    enemy.activate(kind, Vec2::new(x, ENEMY_SPAWN_Y));
    state.world.insert(EntityHandle::Enemy(index));
    log::debug!("Spawned {:?} at x={:.0}", kind, x);
}

pub fn spawn_fuel(state: &mut GameState) {
    let x = channel_x(state, FUEL_ITEM_SIZE);
    let (index, item) = state.world.fuel_items.acquire();
    item.activate(Vec2::new(x, -FUEL_ITEM_SIZE));
    state.world.insert(EntityHandle::Fuel(index));
    log::debug!("Spawned fuel at x={:.0}", x);
}

pub fn spawn_bridge(state: &mut GameState) {
    let channel = state.collisions.channel;
    let gap_index = state.rng.random_range(0..BRIDGE_SECTIONS);
    let (index, bridge) = state.world.bridges.acquire();
    bridge.activate(Vec2::new(channel.left, BRIDGE_SPAWN_Y), channel.width(), gap_index);
    state.world.insert(EntityHandle::Bridge(index));
    log::debug!("Spawned bridge, gap in third {}", gap_index);
}

/// Spawn weights (boat, helicopter, fast, heavy, shooter) for a section
pub fn enemy_weights(section: u32) -> [u32; 5] {
    match section {
        0 | 1 => [100, 0, 0, 0, 0],
        2 => [60, 25, 15, 0, 0],
        3 => [40, 25, 20, 15, 0],
        4 => [30, 20, 20, 15, 15],
        _ => [20, 20, 20, 20, 20],
    }
}

/// Pick an enemy kind from a roll in `0..100`
pub fn enemy_kind_for_roll(section: u32, roll: u32) -> EnemyKind {
    let mut acc = 0;
    for (kind, weight) in EnemyKind::ALL.iter().zip(enemy_weights(section)) {
        acc += weight;
        if roll < acc {
            return *kind;
        }
    }
    EnemyKind::Boat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::EffectKind;
    use crate::sim::entities::Entity;
    use crate::sim::state::{SoundCue, SpawnTimers};
    use crate::tuning::Tuning;

    const DT: f32 = 1.0 / 60.0;

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Tuning::default());
        tick(
            &mut state,
            &TickInput {
                confirm: true,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.phase, GamePhase::Playing);
        state
    }

    #[test]
    fn test_menu_waits_for_confirm() {
        let mut state = GameState::new(1, Tuning::default());
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Menu);

        let state = playing(1);
        assert!(state.events.contains(&GameEvent::Sound(SoundCue::BackgroundLoopStart)));
    }

    #[test]
    fn test_weights_sum_to_hundred() {
        for section in 0..10 {
            assert_eq!(enemy_weights(section).iter().sum::<u32>(), 100);
        }
    }

    #[test]
    fn test_early_sections_only_spawn_boats() {
        for roll in 0..100 {
            assert_eq!(enemy_kind_for_roll(1, roll), EnemyKind::Boat);
        }
        let late: Vec<_> = (0..100).map(|roll| enemy_kind_for_roll(5, roll)).collect();
        for kind in EnemyKind::ALL {
            assert!(late.contains(&kind));
        }
        assert!(!(0..100).any(|roll| enemy_kind_for_roll(3, roll) == EnemyKind::ShooterBoat));
    }

    #[test]
    fn test_fuel_drains_over_time() {
        let mut state = playing(2);
        tick(&mut state, &TickInput::default(), 0.1);
        assert!((state.run.fuel - (FUEL_MAX - 1.0)).abs() < 0.001);
    }

    #[test]
    fn test_fuel_exhaustion_ends_tick_early() {
        let mut state = playing(3);
        state.run.fuel = 0.5;
        let player_before = state.world.player.pos;
        let scroll_before = state.run.scroll_speed;
        let timers_before = state.timers;

        let input = TickInput {
            steering: Steering {
                left: true,
                ..Default::default()
            },
            ..Default::default()
        };
        tick(&mut state, &input, 0.1);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.run.fuel, 0.0);
        assert_eq!(state.world.player.pos, player_before);
        assert_eq!(state.run.scroll_speed, scroll_before);
        assert_eq!(state.timers, timers_before);
        assert!(state.events.contains(&GameEvent::Sound(SoundCue::GameOver)));
    }

    #[test]
    fn test_last_life_skips_rest_of_tick() {
        let mut state = playing(4);
        state.run.lives = 1;
        state.world.player.pos.x = 0.0;
        let scroll_before = state.run.scroll_speed;

        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.run.lives, 0);
        assert_eq!(state.run.scroll_speed, scroll_before);
        assert_eq!(state.collisions.effect.unwrap().kind, EffectKind::Crash);

        // Game over freezes the simulation
        let frozen = state.world.player.pos;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.world.player.pos, frozen);
    }

    #[test]
    fn test_player_auto_fires_into_roster() {
        let mut state = playing(5);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.world.player_bullets.active_count(), 1);
        assert!(state.world.roster.contains(&EntityHandle::PlayerBullet(0)));
    }

    #[test]
    fn test_roster_lists_each_entity_once() {
        let mut state = playing(6);
        for _ in 0..600 {
            tick(&mut state, &TickInput::default(), DT);
            if state.phase != GamePhase::Playing {
                break;
            }
            let mut seen = std::collections::HashSet::new();
            for handle in &state.world.roster {
                assert!(seen.insert(*handle), "duplicate {handle:?}");
            }
        }
    }

    #[test]
    fn test_pools_reach_steady_state() {
        let mut state = playing(7);
        state.run.lives = 1000;
        for _ in 0..1200 {
            state.run.fuel = FUEL_MAX;
            tick(&mut state, &TickInput::default(), DT);
        }
        // Bullets live ~2s at 0.15s cadence: capacity tracks peak concurrency
        let capacity = state.world.player_bullets.capacity();
        assert!(capacity < 20, "pool grew to {capacity}");
    }

    #[test]
    fn test_spawners_fire_on_timers() {
        let mut state = playing(8);
        state.timers.enemy = 0.0;
        state.timers.fuel = 0.0;
        state.timers.bridge = 0.0;
        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.world.enemies.active_count(), 1);
        assert_eq!(state.world.fuel_items.active_count(), 1);
        assert_eq!(state.world.bridges.active_count(), 1);
        assert!(state.timers.enemy > 0.0);
        assert!(state.timers.fuel >= state.tuning.fuel_spawn_min - DT);
        assert!(state.world.roster.contains(&EntityHandle::Bridge(0)));

        let channel = state.collisions.channel;
        for enemy in state.world.enemies.iter_active() {
            assert!(channel.contains_span(enemy.pos.x, enemy.size.x));
        }
    }

    #[test]
    fn test_section_passed_rewards() {
        let mut state = playing(9);
        state.run.fuel = 50.0;
        section_passed(&mut state);

        assert_eq!(state.run.section, 2);
        assert!((state.run.difficulty - 1.2).abs() < 1e-6);
        assert_eq!(state.run.score, 500);
        assert_eq!(state.run.fuel, 80.0);
        assert_eq!(state.banner.unwrap().section, 1);
        assert!(state.events.contains(&GameEvent::SectionPassed { section: 2 }));

        state.run.fuel = 95.0;
        section_passed(&mut state);
        assert_eq!(state.run.fuel, FUEL_MAX);
    }

    #[test]
    fn test_bridge_advances_section_once() {
        let mut state = playing(10);
        state.run.lives = 1000;
        spawn_bridge(&mut state);

        for _ in 0..600 {
            state.run.fuel = FUEL_MAX;
            state.timers.bridge = 100.0;
            tick(&mut state, &TickInput::default(), DT);
            if state.world.bridges.active_count() == 0 {
                break;
            }
        }
        assert_eq!(state.world.bridges.active_count(), 0);
        assert_eq!(state.run.section, 2);
    }

    #[test]
    fn test_shooter_bullet_reaches_player() {
        let mut state = playing(14);
        state.timers = SpawnTimers {
            enemy: 100.0,
            fuel: 100.0,
            bridge: 100.0,
        };
        let player = state.world.player.pos;
        let (_, shooter) = state.world.enemies.acquire();
        shooter.activate(EnemyKind::ShooterBoat, Vec2::new(player.x - 5.0, player.y - 150.0));

        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), DT);
            if state.run.lives < START_LIVES {
                break;
            }
        }

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.run.lives, START_LIVES - 1);
        assert_eq!(state.world.enemy_bullets.capacity(), 1);
        assert_eq!(state.world.enemy_bullets.active_count(), 0);
        assert_eq!(state.collisions.effect.unwrap().kind, EffectKind::PlayerHit);
    }

    #[test]
    fn test_scroll_speed_ramps() {
        let mut state = playing(11);
        let before = state.run.scroll_speed;
        tick(&mut state, &TickInput::default(), 0.05);
        assert!(state.run.scroll_speed > before);
    }

    #[test]
    fn test_bad_deltas_are_harmless() {
        assert_eq!(sanitize_dt(f32::NAN), 0.0);
        assert_eq!(sanitize_dt(-1.0), 0.0);
        assert_eq!(sanitize_dt(f32::INFINITY), 0.0);
        assert_eq!(sanitize_dt(5.0), MAX_FRAME_DT);

        let mut state = playing(12);
        let fuel = state.run.fuel;
        tick(&mut state, &TickInput::default(), f32::NAN);
        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.run.fuel, fuel);

        tick(&mut state, &TickInput::default(), 30.0);
        assert!((state.run.fuel - (fuel - MAX_FRAME_DT * 10.0)).abs() < 0.001);
    }

    #[test]
    fn test_restart_resets_run() {
        let mut state = playing(13);
        state.run.score = 1234;
        state.run.fuel = 12.0;
        state.run.section = 4;
        state.run.difficulty = 1.6;
        state.timers.enemy = 0.0;
        tick(&mut state, &TickInput::default(), DT);
        state.run.lives = 0;
        state.set_phase(GamePhase::GameOver);

        tick(
            &mut state,
            &TickInput {
                confirm: true,
                ..Default::default()
            },
            DT,
        );

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.run.score, 0);
        assert_eq!(state.run.fuel, FUEL_MAX);
        assert_eq!(state.run.lives, 3);
        assert_eq!(state.run.section, 1);
        assert_eq!(state.run.difficulty, 1.0);
        assert_eq!(state.world.roster, vec![EntityHandle::Player]);
        assert_eq!(state.world.enemies.capacity(), 0);
        assert!(state.world.player.is_active());
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = playing(99);
        let mut b = playing(99);
        let input = TickInput {
            steering: Steering {
                right: true,
                ..Default::default()
            },
            ..Default::default()
        };
        for _ in 0..300 {
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
        }
        assert_eq!(a.run, b.run);
        assert_eq!(a.world.roster, b.world.roster);
    }
}

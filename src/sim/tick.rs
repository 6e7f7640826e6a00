//! Per-frame simulation tick
//!
//! One tick runs per animation frame with a single sampled `now`. Motion is
//! per frame; every timer compares against `now`.

use serde::{Deserialize, Serialize};

use super::collision;
use super::entities::PowerUpKind;
use super::physics;
use super::player::{Controls, ShieldTick};
use super::state::{GamePhase, GameState, SoundCue};

/// Input commands for a single tick
///
/// `shoot`, `start`, `restart` and `spawn_asteroid` are one-shot requests the
/// host clears after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    pub controls: Controls,
    /// Fire (still subject to the cooldown)
    pub shoot: bool,
    /// Player preference: direct acceleration and weaker gravity
    pub zero_gravity: bool,
    /// Leave attract mode
    pub start: bool,
    /// New session after game over
    pub restart: bool,
    /// Spawn one asteroid now (debug/testing)
    pub spawn_asteroid: bool,
}

/// Advance the game by one frame
pub fn tick(state: &mut GameState, input: &TickInput, now: f64) {
    // Nothing moves while paused; resume shifts the clock instead
    if state.is_paused() {
        return;
    }

    if input.start {
        state.start(now);
    }
    if input.restart {
        state.restart(now);
    }
    if input.spawn_asteroid {
        state.spawn_asteroid(now);
    }

    state.effects.expire(now);

    if state.phase == GamePhase::Playing {
        update_player(state, input, now);
    }

    physics::apply_gravity(state, input.zero_gravity);
    if physics::advance_all(state, now) {
        log::info!("Black hole expired");
        if state.phase == GamePhase::Playing {
            state
                .spawner
                .rearm_black_hole(&mut state.rng, now, &state.tuning);
        }
    }

    if state.phase == GamePhase::Playing {
        collision::resolve_combat(state, now);
        spawn_due(state, now);
    } else {
        // Rocks keep bouncing off each other between sessions
        collision::resolve_asteroid_collisions(&mut state.asteroids);
    }

    compact(state);
}

fn update_player(state: &mut GameState, input: &TickInput, now: f64) {
    if state.player.exploded {
        if state.player.advance_pieces() {
            state.finish(now);
        }
        return;
    }

    let was_propelling = state.player.propelling;
    state
        .player
        .steer(input.controls, input.zero_gravity, &state.tuning);
    if state.player.propelling && !was_propelling {
        state.sound(SoundCue::Thrust);
    }

    match state.player.update_shield(now, state.tuning.shield_duration_ms) {
        ShieldTick::Expiring => state.sound(SoundCue::ShieldExpiring),
        ShieldTick::Expired => log::debug!("Shield expired"),
        ShieldTick::Inactive | ShieldTick::Holding => {}
    }

    if input.shoot
        && let Some(bullet) = state.player.try_shoot(now, state.tuning.shoot_cooldown_ms)
    {
        state.bullets.push(bullet);
        state.stats.shots += 1;
        state.sound(SoundCue::Shoot);
    }
}

/// Materialize whatever the scheduler says is due. No catch-up.
fn spawn_due(state: &mut GameState, now: f64) {
    let due = state.spawner.take_due_asteroids(now);
    for _ in 0..due {
        state.spawn_asteroid(now);
    }

    if state.spawner.star_due(&mut state.rng, now, &state.tuning) {
        state.spawn_power_up(PowerUpKind::Star, now);
    }

    let session = state.stats.elapsed_ms(now);
    if state
        .spawner
        .shield_due(&mut state.rng, now, session, &state.tuning)
    {
        state.spawn_power_up(PowerUpKind::Shield, now);
    }

    let present = state.black_hole.as_ref().is_some_and(|h| !h.gone);
    if state.spawner.black_hole_due(now, present) {
        state.spawn_black_hole(now);
    }
}

/// Drop everything that died this tick
fn compact(state: &mut GameState) {
    state.bullets.retain(|b| b.alive);
    state.asteroids.retain(|a| !a.is_gone());
    state.power_ups.retain(|p| !p.gone);
    if state.black_hole.as_ref().is_some_and(|h| h.gone) {
        state.black_hole = None;
    }
    state.point_texts.retain(|t| t.is_alive());
}

/// Pause helper for hosts that toggle with one key
pub fn toggle_pause(state: &mut GameState, now: f64) {
    if state.is_paused() {
        state.resume(now);
    } else {
        state.pause(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::sim::entities::{Asteroid, PowerUp};
    use crate::sim::geometry::Field;
    use crate::sim::spawner::PendingSpawn;
    use crate::sim::state::GameEvent;
    use glam::Vec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn field() -> Field {
        Field::new(800.0, 600.0)
    }

    fn started(seed: u64) -> GameState {
        let mut state = GameState::new(seed, field(), 0.0);
        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
            0.0,
        );
        state.drain_events();
        state
    }

    fn rock(id: u32, pos: Vec2, size: f32, now: f64) -> Asteroid {
        let mut rng = Pcg32::seed_from_u64(id as u64);
        Asteroid::with_shape(id, &mut rng, pos, Vec2::ZERO, size, "#A0A0A0", now)
    }

    /// Timer-derived flags the pause round trip must preserve
    fn timer_view(state: &GameState, now: f64) -> Vec<f64> {
        let mut view = Vec::new();
        for a in &state.asteroids {
            view.push(a.fade_level(now) as f64);
            view.push(a.can_collide(now) as u8 as f64);
        }
        for p in &state.power_ups {
            view.push(p.fade_level(now) as f64);
            view.push(p.is_expired(now) as u8 as f64);
        }
        if let Some(h) = &state.black_hole {
            view.push(h.fade_level(now) as f64);
            view.push(h.past_grace(now) as u8 as f64);
            view.push(h.is_expired(now) as u8 as f64);
        }
        view.push(state.stats.elapsed_ms(now));
        view.push(state.player_vulnerable(now) as u8 as f64);
        if state.player.has_shield() {
            view.push(now - state.player.shield.start_time);
        }
        for p in &state.spawner.pending_asteroids {
            view.push(p.at - now);
        }
        for t in [
            state.spawner.next_star,
            state.spawner.next_shield,
            state.spawner.next_black_hole,
        ]
        .into_iter()
        .flatten()
        {
            view.push(t - now);
        }
        view.push(state.effects.flash_opacity(now) as f64);
        view.push(state.effects.shake_intensity(now) as f64);
        view
    }

    fn shoot() -> TickInput {
        TickInput {
            shoot: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_attract_mode_drifts_without_scheduling() {
        let mut state = GameState::new(7, field(), 0.0);
        let before: Vec<Vec2> = state.asteroids.iter().map(|a| a.pos).collect();
        tick(&mut state, &shoot(), FRAME_MS);
        assert_eq!(state.phase, GamePhase::Attract);
        assert!(state.bullets.is_empty());
        assert_eq!(state.spawner.next_star, None);
        let after: Vec<Vec2> = state.asteroids.iter().map(|a| a.pos).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_shoot_respects_cooldown() {
        let mut state = started(3);
        tick(&mut state, &shoot(), 1000.0);
        tick(&mut state, &shoot(), 1000.0 + FRAME_MS);
        assert_eq!(state.stats.shots, 1);
        tick(&mut state, &shoot(), 1250.0);
        assert_eq!(state.stats.shots, 2);
        let shots = state
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::Sound { cue: SoundCue::Shoot })
            .count();
        assert_eq!(shots, 2);
    }

    #[test]
    fn test_bullet_kill_end_to_end() {
        let mut state = started(5);
        state.asteroids.clear();
        let target_pos = state.player.pos + Vec2::new(120.0, 0.0);
        state.asteroids.push(rock(900, target_pos, 30.0, 0.0));
        let points = state.asteroids[0].points();

        let mut now = 1000.0;
        tick(&mut state, &shoot(), now);
        assert_eq!(state.bullets.len(), 1);

        let mut kill_time = None;
        for _ in 0..30 {
            now += FRAME_MS;
            tick(&mut state, &TickInput::default(), now);
            if kill_time.is_none() && state.asteroids.iter().all(|a| !a.is_active()) {
                kill_time = Some(now);
                break;
            }
        }

        let kill_time = kill_time.expect("bullet should reach the asteroid");
        assert!(state.bullets.is_empty());
        assert_eq!(state.stats.score, points);
        assert_eq!(state.stats.hits, 1);
        assert_eq!(state.spawner.pending_asteroids.len(), 1);
        assert!(
            state
                .tuning
                .asteroid_spawn
                .contains(kill_time, state.spawner.pending_asteroids[0].at)
        );
    }

    #[test]
    fn test_game_over_once_fragments_expire() {
        let mut state = started(9);
        state.asteroids.clear();
        let pos = state.player.pos;
        state.asteroids.push(rock(901, pos, 30.0, 0.0));

        let mut now = 5000.0;
        tick(&mut state, &TickInput::default(), now);
        assert!(state.player.exploded);
        assert_eq!(state.phase, GamePhase::Playing);

        for _ in 0..80 {
            now += FRAME_MS;
            tick(&mut state, &TickInput::default(), now);
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        let overs = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);

        // Timer is frozen
        let elapsed = state.stats.elapsed_ms(now);
        assert_eq!(state.stats.elapsed_ms(now + 10_000.0), elapsed);

        tick(
            &mut state,
            &TickInput {
                restart: true,
                ..Default::default()
            },
            now,
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.player.exploded);
        assert_eq!(state.stats.score, 0);
    }

    #[test]
    fn test_thrust_cue_on_rising_edge() {
        let mut state = started(11);
        let thrust = TickInput {
            controls: Controls::Keys {
                left: false,
                right: false,
                thrust: true,
                reverse: false,
            },
            ..Default::default()
        };
        for i in 0..5 {
            tick(&mut state, &thrust, 100.0 + i as f64 * FRAME_MS);
        }
        tick(&mut state, &TickInput::default(), 200.0);
        tick(&mut state, &thrust, 220.0);
        let cues = state
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::Sound { cue: SoundCue::Thrust })
            .count();
        assert_eq!(cues, 2);
    }

    #[test]
    fn test_turning_alone_is_silent() {
        let mut state = started(12);
        let turn = TickInput {
            controls: Controls::Keys {
                left: true,
                right: false,
                thrust: false,
                reverse: false,
            },
            ..Default::default()
        };
        for i in 0..5 {
            tick(&mut state, &turn, 100.0 + i as f64 * FRAME_MS);
        }
        assert!(state.player.thrusting);
        assert!(
            !state
                .drain_events()
                .contains(&GameEvent::Sound { cue: SoundCue::Thrust })
        );
    }

    #[test]
    fn test_pending_spawn_materializes() {
        let mut state = started(13);
        let count = state.asteroids.len();
        state.spawner.pending_asteroids.push(PendingSpawn { at: 500.0 });
        tick(&mut state, &TickInput::default(), 499.0);
        assert_eq!(state.asteroids.len(), count);
        tick(&mut state, &TickInput::default(), 500.0);
        assert_eq!(state.asteroids.len(), count + 1);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::Sound { cue: SoundCue::AsteroidSpawn })
        );
    }

    #[test]
    fn test_black_hole_spawns_then_expires_and_rearms() {
        let mut state = started(17);
        state.asteroids.clear();
        // Keep the player well clear of the core
        state.player.pos = Vec2::new(30.0, 30.0);
        state.spawner.next_black_hole = Some(100.0);
        tick(&mut state, &TickInput::default(), 100.0);
        assert!(state.black_hole.is_some());
        assert_eq!(state.spawner.next_black_hole, None);

        let expiry = 100.0 + state.tuning.black_hole_lifetime_ms;
        tick(&mut state, &TickInput::default(), expiry);
        assert!(state.black_hole.is_none());
        assert!(
            state
                .tuning
                .black_hole_spawn
                .contains(expiry, state.spawner.next_black_hole.unwrap())
        );
    }

    #[test]
    fn test_paused_tick_is_a_no_op() {
        let mut state = started(19);
        let before: Vec<Vec2> = state.asteroids.iter().map(|a| a.pos).collect();
        toggle_pause(&mut state, 1000.0);
        tick(&mut state, &shoot(), 1100.0);
        let after: Vec<Vec2> = state.asteroids.iter().map(|a| a.pos).collect();
        assert_eq!(before, after);
        assert_eq!(state.stats.shots, 0);
        toggle_pause(&mut state, 2000.0);
        assert!(!state.is_paused());
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = started(23);
        let mut b = started(23);
        let inputs = [
            shoot(),
            TickInput {
                controls: Controls::Joystick {
                    dir: Vec2::new(0.3, -0.8),
                },
                ..Default::default()
            },
            TickInput::default(),
        ];
        for i in 0..120 {
            let input = &inputs[i % inputs.len()];
            let now = i as f64 * FRAME_MS;
            tick(&mut a, input, now);
            tick(&mut b, input, now);
        }
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.stats.score, b.stats.score);
        assert_eq!(a.asteroids.len(), b.asteroids.len());
    }

    proptest! {
        #[test]
        fn prop_pause_round_trip_preserves_timers(
            pause_at in 0u32..60_000,
            pause_for in 0u32..10_000_000,
            seed in 0u64..1000,
        ) {
            let mut state = started(seed);
            let mut rng = Pcg32::seed_from_u64(seed);
            state.spawn_black_hole(500.0);
            state.power_ups.push(PowerUp::spawn(990, PowerUpKind::Shield, &mut rng, field(), 700.0, 10_000.0));
            state.spawner.pending_asteroids.push(PendingSpawn { at: 2500.0 });
            state.player.grant_shield(900.0);
            state.effects.flash(pause_at as f64 - 30.0);
            state.effects.shake(pause_at as f64 - 100.0, 10.0);
            state.spawner.next_star = Some(41_000.0);
            state.spawner.next_shield = Some(25_000.0);
            state.spawner.next_black_hole = Some(33_000.0);

            let t = pause_at as f64;
            let d = pause_for as f64;
            let before = timer_view(&state, t);
            state.pause(t);
            state.resume(t + d);
            let after = timer_view(&state, t + d);
            prop_assert_eq!(before, after);
        }

        #[test]
        fn prop_score_never_decreases(seed in 0u64..200) {
            let mut state = started(seed);
            let mut last = 0;
            for i in 0..300 {
                let input = TickInput {
                    shoot: true,
                    controls: Controls::Keys { left: false, right: i % 7 < 3, thrust: i % 5 == 0, reverse: false },
                    ..Default::default()
                };
                tick(&mut state, &input, 4000.0 + i as f64 * FRAME_MS);
                prop_assert!(state.stats.score >= last);
                last = state.stats.score;
            }
        }
    }
}

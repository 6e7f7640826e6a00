//! Collision detection and combat resolution
//!
//! Everything is a circle. Checks run once per tick in a fixed order:
//! bullets vs asteroids, player vs black hole core, player vs asteroids,
//! player vs power-ups, asteroids vs black hole core, asteroid pairs.
//! Exploding or removed entities never take part in a later check.

use glam::Vec2;

use super::entities::{Asteroid, PowerUpKind};
use super::geometry::circles_overlap;
use super::state::{GameState, SoundCue};

/// Resolve an elastic collision between two asteroids, using size² as mass.
///
/// Pairs that do not overlap, share a center, or are already separating are
/// left alone. Returns true if velocities changed.
pub fn elastic_collision(a: &mut Asteroid, b: &mut Asteroid) -> bool {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let reach = a.hit_radius() + b.hit_radius();
    if dist <= 0.0 || dist >= reach {
        return false;
    }

    let normal = delta / dist;
    let closing = (a.vel - b.vel).dot(normal);
    if closing <= 0.0 {
        return false;
    }

    let (m1, m2) = (a.mass(), b.mass());
    let impulse = 2.0 * closing / (m1 + m2);
    a.vel -= normal * (impulse * m2);
    b.vel += normal * (impulse * m1);

    // Push apart so the pair doesn't stick
    let overlap = reach - dist;
    a.pos -= normal * (overlap / 2.0);
    b.pos += normal * (overlap / 2.0);
    true
}

/// Bounce every overlapping pair of active asteroids
pub fn resolve_asteroid_collisions(asteroids: &mut [Asteroid]) {
    for i in 0..asteroids.len() {
        let (head, tail) = asteroids.split_at_mut(i + 1);
        let a = &mut head[i];
        if !a.is_active() {
            continue;
        }
        for b in tail.iter_mut().filter(|b| b.is_active()) {
            elastic_collision(a, b);
        }
    }
}

/// Run every combat check for this tick
pub fn resolve_combat(state: &mut GameState, now: f64) {
    bullets_vs_asteroids(state, now);
    player_vs_black_hole(state, now);
    player_vs_asteroids(state, now);
    player_vs_power_ups(state, now);
    asteroids_vs_black_hole(state, now);
    resolve_asteroid_collisions(&mut state.asteroids);
}

/// Destroy asteroid `i` on the player's behalf: debris, score, respawn bookkeeping
fn credit_kill(state: &mut GameState, i: usize, now: f64) {
    state.asteroids[i].explode(&mut state.rng);
    let (pos, points) = (state.asteroids[i].pos, state.asteroids[i].points());

    state.stats.hits += 1;
    state.stats.destroyed += 1;
    state.award(points, pos);
    state
        .spawner
        .record_destruction(&mut state.rng, now, &state.tuning);
    state.sound(SoundCue::AsteroidExplode);
}

fn bullets_vs_asteroids(state: &mut GameState, now: f64) {
    let factor = state.tuning.bullet_collision_factor;
    for b in 0..state.bullets.len() {
        let bullet = &state.bullets[b];
        if !bullet.alive {
            continue;
        }
        let (pos, radius) = (bullet.pos, bullet.radius());
        let target = state
            .asteroids
            .iter()
            .position(|a| a.is_active() && circles_overlap(pos, radius, a.pos, a.hit_radius() * factor));

        if let Some(i) = target {
            state.bullets[b].alive = false;
            credit_kill(state, i, now);
        }
    }
}

/// The ship blows up; every bullet in flight goes with it
fn kill_player(state: &mut GameState, now: f64, flash: bool) {
    state.player.explode(&mut state.rng);
    state.bullets.clear();
    state.sound(SoundCue::GameOver);
    state.trigger_shake(now);
    if flash {
        state.trigger_flash(now);
    }
    log::info!(
        "Player destroyed at ({:.0}, {:.0}) with score {}",
        state.player.pos.x,
        state.player.pos.y,
        state.stats.score
    );
}

/// The core is lethal even through a shield
fn player_vs_black_hole(state: &mut GameState, now: f64) {
    if state.player.exploded || !state.player_vulnerable(now) {
        return;
    }
    let Some(hole) = state.black_hole.as_ref().filter(|h| !h.gone && h.past_grace(now)) else {
        return;
    };
    if circles_overlap(state.player.pos, state.player.hit_radius(), hole.pos, hole.core_radius()) {
        kill_player(state, now, true);
    }
}

fn player_vs_asteroids(state: &mut GameState, now: f64) {
    if state.player.exploded {
        return;
    }
    let (pos, radius) = (state.player.pos, state.player.hit_radius());

    for i in 0..state.asteroids.len() {
        let asteroid = &state.asteroids[i];
        if !asteroid.is_active()
            || !asteroid.can_collide(now)
            || !circles_overlap(pos, radius, asteroid.pos, asteroid.hit_radius())
        {
            continue;
        }

        if state.player.has_shield() {
            // Shield is not consumed by a bump
            credit_kill(state, i, now);
            state.sound(SoundCue::Bump);
        } else if state.player_vulnerable(now) {
            kill_player(state, now, false);
            return;
        }
    }
}

fn player_vs_power_ups(state: &mut GameState, now: f64) {
    if state.player.exploded {
        return;
    }
    let (pos, radius) = (state.player.pos, state.player.hit_radius());

    for i in 0..state.power_ups.len() {
        let power_up = &state.power_ups[i];
        if power_up.gone || !circles_overlap(pos, radius, power_up.pos, power_up.hit_radius()) {
            continue;
        }
        let (kind, at) = (power_up.kind, power_up.pos);
        state.power_ups[i].gone = true;
        state.sound(SoundCue::PowerUp);

        match kind {
            PowerUpKind::Shield => {
                state.player.grant_shield(now);
                state.award(state.tuning.shield_pickup_points, at);
            }
            PowerUpKind::Star => supernova(state, now),
        }
    }
}

/// Clear the field: every rock, any black hole, pending spawns; then refill
pub fn supernova(state: &mut GameState, now: f64) {
    state.sound(SoundCue::Supernova);

    let mut cleared = 0;
    for i in 0..state.asteroids.len() {
        if !state.asteroids[i].is_active() {
            continue;
        }
        state.asteroids[i].explode(&mut state.rng);
        let (pos, points) = (state.asteroids[i].pos, state.asteroids[i].points());
        state.stats.hits += 1;
        state.stats.destroyed += 1;
        state.award(points, pos);
        cleared += 1;
    }
    if cleared > 0 {
        state.sound(SoundCue::AsteroidExplode);
    }

    let origin: Vec2 = state.player.pos;
    state.award(state.tuning.supernova_bonus, origin);

    if let Some(hole) = state.black_hole.as_mut().filter(|h| !h.gone) {
        hole.gone = true;
        let at = hole.pos;
        state.award(state.tuning.black_hole_bonus, at);
        state
            .spawner
            .rearm_black_hole(&mut state.rng, now, &state.tuning);
        log::info!("Supernova swallowed the black hole");
    }

    state.spawner.clear_pending_asteroids();
    for _ in 0..state.tuning.starting_asteroids {
        state.spawn_asteroid(now);
    }

    state.trigger_flash(now);
    state.trigger_shake(now);
    log::info!("Supernova cleared {} asteroids", cleared);
}

/// Rocks that touch the core vanish outright; no score, but they still count
/// toward the respawn schedule
fn asteroids_vs_black_hole(state: &mut GameState, now: f64) {
    let Some(hole) = state.black_hole.as_ref().filter(|h| !h.gone) else {
        return;
    };
    let (core, core_radius) = (hole.pos, hole.core_radius());

    for i in 0..state.asteroids.len() {
        let asteroid = &state.asteroids[i];
        if asteroid.is_active() && circles_overlap(asteroid.pos, asteroid.hit_radius(), core, core_radius) {
            state.asteroids[i].consume();
            state
                .spawner
                .record_destruction(&mut state.rng, now, &state.tuning);
        }
    }
}

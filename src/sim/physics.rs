//! Motion integration and the black hole's gravity well
//!
//! Gravity is an inverse-distance pull toward the black hole, applied to
//! anything inside its gravity radius. Coincident centers get no force.

use glam::Vec2;

use super::entities::BlackHole;
use super::geometry::Field;
use super::state::GameState;

/// Pull exerted on a body at `target` by a well at `well`.
/// `None` outside the reach or at zero distance.
pub fn gravity_force(well: Vec2, reach: f32, strength: f32, target: Vec2) -> Option<Vec2> {
    let offset = well - target;
    let dist = offset.length();
    if dist <= 0.0 || dist >= reach {
        return None;
    }
    Some(offset / dist * (strength / dist))
}

/// Apply one frame of gravity from the live black hole to every other body
pub fn apply_gravity(state: &mut GameState, zero_gravity: bool) {
    let Some(hole) = state.black_hole.as_ref().filter(|h| !h.gone) else {
        return;
    };
    let well = hole.pos;
    let reach = hole.gravity_radius();
    let strength = state.tuning.gravity_for(zero_gravity);
    let bullet_strength = strength * state.tuning.bullet_gravity_multiplier;

    if state.ship_in_play()
        && let Some(force) = gravity_force(well, reach, strength, state.player.pos)
    {
        state.player.vel += force;
    }

    for asteroid in state.asteroids.iter_mut().filter(|a| a.is_active()) {
        if let Some(force) = gravity_force(well, reach, strength, asteroid.pos) {
            asteroid.vel += force;
        }
    }

    for power_up in state.power_ups.iter_mut().filter(|p| !p.gone) {
        if let Some(force) = gravity_force(well, reach, strength, power_up.pos) {
            power_up.vel += force;
        }
    }

    for bullet in state.bullets.iter_mut().filter(|b| b.alive) {
        if let Some(force) = gravity_force(well, reach, bullet_strength, bullet.pos) {
            bullet.apply_force(force);
        }
    }
}

/// Move everything one frame. Returns true if the black hole expired.
pub fn advance_all(state: &mut GameState, now: f64) -> bool {
    let field: Field = state.field;

    if state.ship_in_play() {
        state.player.integrate(field);
    }

    for bullet in state.bullets.iter_mut().filter(|b| b.alive) {
        bullet.advance(field);
    }
    for asteroid in state.asteroids.iter_mut() {
        asteroid.advance(field);
    }
    for power_up in state.power_ups.iter_mut() {
        power_up.advance(field, now);
    }
    for text in state.point_texts.iter_mut() {
        text.advance();
    }

    advance_black_hole(state.black_hole.as_mut(), field, now)
}

fn advance_black_hole(hole: Option<&mut BlackHole>, field: Field, now: f64) -> bool {
    let Some(hole) = hole else {
        return false;
    };
    if hole.gone {
        return false;
    }
    hole.advance(field);
    if hole.is_expired(now) {
        hole.gone = true;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::{Bullet, PowerUp, PowerUpKind};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn field() -> Field {
        Field::new(800.0, 600.0)
    }

    fn state_with_hole(at: Vec2) -> GameState {
        let mut state = GameState::new(4, field(), 0.0);
        state.asteroids.clear();
        state.start(0.0);
        state.spawn_black_hole(0.0);
        if let Some(hole) = state.black_hole.as_mut() {
            hole.pos = at;
        }
        state
    }

    #[test]
    fn test_gravity_is_inverse_distance() {
        let near = gravity_force(Vec2::ZERO, 200.0, 15.0, Vec2::new(10.0, 0.0)).unwrap();
        let far = gravity_force(Vec2::ZERO, 200.0, 15.0, Vec2::new(20.0, 0.0)).unwrap();
        assert!(near.x < 0.0);
        assert!((near.length() - 2.0 * far.length()).abs() < 1e-5);
    }

    #[test]
    fn test_gravity_skips_coincident_and_out_of_reach() {
        assert_eq!(gravity_force(Vec2::ONE, 100.0, 15.0, Vec2::ONE), None);
        assert_eq!(gravity_force(Vec2::ZERO, 100.0, 15.0, Vec2::new(150.0, 0.0)), None);
    }

    #[test]
    fn test_bullets_bend_harder_than_bodies() {
        let mut state = state_with_hole(Vec2::new(400.0, 300.0));
        state.player.pos = Vec2::new(400.0, 250.0);
        state.bullets.push(Bullet::new(Vec2::new(400.0, 350.0), 0.0));
        let bullet_vel = state.bullets[0].velocity();

        apply_gravity(&mut state, false);

        let player_pull = state.player.vel.length();
        let bullet_pull = (state.bullets[0].velocity() - bullet_vel).length();
        assert!(player_pull > 0.0);
        assert!(bullet_pull > player_pull * 2.5);
        // Pulled toward the hole (up for the bullet below it)
        assert!(state.bullets[0].velocity().y < 0.0);
    }

    #[test]
    fn test_zero_gravity_weakens_pull() {
        let mut strong = state_with_hole(Vec2::new(400.0, 300.0));
        let mut weak = strong.clone();
        let mut rng = Pcg32::seed_from_u64(8);
        let p = PowerUp::spawn(99, PowerUpKind::Star, &mut rng, field(), 0.0, 10_000.0);
        for s in [&mut strong, &mut weak] {
            let mut p = p.clone();
            p.pos = Vec2::new(450.0, 300.0);
            p.vel = Vec2::ZERO;
            s.power_ups.push(p);
        }
        apply_gravity(&mut strong, false);
        apply_gravity(&mut weak, true);
        assert!(weak.power_ups[0].vel.length() < strong.power_ups[0].vel.length());
    }

    #[test]
    fn test_black_hole_expires() {
        let mut state = state_with_hole(Vec2::new(400.0, 300.0));
        let lifetime = state.tuning.black_hole_lifetime_ms;
        assert!(!advance_all(&mut state, lifetime - 1.0));
        assert!(advance_all(&mut state, lifetime));
        assert!(state.black_hole.as_ref().is_some_and(|h| h.gone));
        // Reported once
        assert!(!advance_all(&mut state, lifetime + 1.0));
    }
}

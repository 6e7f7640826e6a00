//! Data-driven game balance
//!
//! Every field defaults to the matching constant in [`crate::consts`]. A JSON
//! document can override any subset of them; missing keys keep their defaults.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A randomized delay window, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnWindow {
    pub min_ms: f64,
    pub max_ms: f64,
}

impl SpawnWindow {
    pub const fn new(min_ms: f64, max_ms: f64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Pick a timestamp uniformly in `[now + min, now + max)`
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R, now: f64) -> f64 {
        if self.max_ms <= self.min_ms {
            return now + self.min_ms;
        }
        now + rng.random_range(self.min_ms..self.max_ms)
    }

    /// Whether `at` could have been produced by `roll(_, now)`
    pub fn contains(&self, now: f64, at: f64) -> bool {
        at >= now + self.min_ms && at <= now + self.max_ms
    }
}

/// Gameplay balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Scheduler ===
    pub starting_asteroids: usize,
    pub difficulty_step: u32,
    pub asteroid_spawn: SpawnWindow,
    pub star_spawn: SpawnWindow,
    pub shield_spawn: SpawnWindow,
    pub black_hole_spawn: SpawnWindow,

    // === Lifetimes ===
    pub shield_duration_ms: f64,
    pub powerup_lifetime_ms: f64,
    pub black_hole_lifetime_ms: f64,
    pub player_grace_ms: f64,

    // === Player ===
    pub player_max_speed: f32,
    pub player_acceleration: f32,
    pub shoot_cooldown_ms: f64,

    // === Combat ===
    pub bullet_collision_factor: f32,
    pub shield_pickup_points: u64,
    pub supernova_bonus: u64,
    pub black_hole_bonus: u64,

    // === Gravity ===
    pub gravity_strength: f32,
    pub zero_gravity_scale: f32,
    pub bullet_gravity_multiplier: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_asteroids: STARTING_ASTEROIDS,
            difficulty_step: DIFFICULTY_STEP,
            asteroid_spawn: SpawnWindow::new(ASTEROID_SPAWN_MIN_MS, ASTEROID_SPAWN_MAX_MS),
            star_spawn: SpawnWindow::new(STAR_SPAWN_MIN_MS, STAR_SPAWN_MAX_MS),
            shield_spawn: SpawnWindow::new(SHIELD_SPAWN_MIN_MS, SHIELD_SPAWN_MAX_MS),
            black_hole_spawn: SpawnWindow::new(BLACK_HOLE_SPAWN_MIN_MS, BLACK_HOLE_SPAWN_MAX_MS),

            shield_duration_ms: SHIELD_DURATION_MS,
            powerup_lifetime_ms: POWERUP_LIFETIME_MS,
            black_hole_lifetime_ms: BLACK_HOLE_LIFETIME_MS,
            player_grace_ms: PLAYER_GRACE_MS,

            player_max_speed: PLAYER_MAX_SPEED,
            player_acceleration: PLAYER_ACCELERATION,
            shoot_cooldown_ms: SHOOT_COOLDOWN_MS,

            bullet_collision_factor: BULLET_COLLISION_FACTOR,
            shield_pickup_points: SHIELD_PICKUP_POINTS,
            supernova_bonus: SUPERNOVA_BONUS,
            black_hole_bonus: BLACK_HOLE_BONUS,

            gravity_strength: GRAVITY_STRENGTH,
            zero_gravity_scale: ZERO_GRAVITY_SCALE,
            bullet_gravity_multiplier: BULLET_GRAVITY_MULTIPLIER,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        log::info!(
            "Loaded tuning: {} starting asteroids, difficulty step {}",
            tuning.starting_asteroids,
            tuning.difficulty_step
        );
        Ok(tuning)
    }

    /// Effective gravity strength for the current preference
    pub fn gravity_for(&self, zero_gravity: bool) -> f32 {
        if zero_gravity {
            self.gravity_strength * self.zero_gravity_scale
        } else {
            self.gravity_strength
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "difficulty_step": 3 }"#).unwrap();
        assert_eq!(tuning.difficulty_step, 3);
        assert_eq!(tuning.starting_asteroids, STARTING_ASTEROIDS);
        assert_eq!(tuning.asteroid_spawn, Tuning::default().asteroid_spawn);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_spawn_window_roll_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        let window = SpawnWindow::new(1000.0, 4000.0);
        for _ in 0..200 {
            let at = window.roll(&mut rng, 500.0);
            assert!(window.contains(500.0, at));
        }
    }

    #[test]
    fn test_zero_gravity_weakens_pull() {
        let tuning = Tuning::default();
        assert!(tuning.gravity_for(true) < tuning.gravity_for(false));
        assert!((tuning.gravity_for(true) - GRAVITY_STRENGTH * ZERO_GRAVITY_SCALE).abs() < 1e-6);
    }
}

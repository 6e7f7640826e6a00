//! Astro Drift - An Asteroids-style arcade shooter
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (entities, physics, collisions, spawning, pause clock)
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Key-value storage for preferences and the high score
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScore;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
///
/// Distances are pixels, speeds are pixels per frame, times are milliseconds
/// of wall-clock time unless the name says `FRAMES`.
pub mod consts {
    /// Nominal frame duration used by headless runners (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    // === Player ===
    pub const PLAYER_MAX_SPEED: f32 = 3.0;
    pub const PLAYER_ACCELERATION: f32 = 0.1;
    pub const PLAYER_HIT_RADIUS: f32 = 25.0;
    /// Distance from ship center to the nose, where bullets appear
    pub const PLAYER_NOSE_OFFSET: f32 = 26.0;
    pub const SHOOT_COOLDOWN_MS: f64 = 250.0;
    pub const MAX_ROTATION_SPEED: f32 = 0.075;
    pub const ROTATION_EASING: f32 = 0.2;
    /// Rotation speeds below this snap to zero (prevents drift)
    pub const ROTATION_DEAD_ZONE: f32 = 0.001;
    pub const FRICTION: f32 = 0.98;
    pub const FRICTION_STOP: f32 = 0.01;
    pub const VELOCITY_EASING: f32 = 0.1;
    pub const JOYSTICK_TURN_EASING: f32 = 0.2;
    pub const JOYSTICK_DEAD_ZONE: f32 = 0.1;
    /// Asteroids and black holes cannot kill the player this soon after start
    pub const PLAYER_GRACE_MS: f64 = 3000.0;
    pub const PLAYER_EXPLOSION_PIECES: usize = 20;

    // === Bullets ===
    pub const BULLET_SPEED: f32 = 10.0;
    pub const BULLET_RADIUS: f32 = 5.0;
    /// Shrinks the asteroid hit radius for bullet hits
    pub const BULLET_COLLISION_FACTOR: f32 = 0.8;

    // === Asteroids ===
    pub const ASTEROID_MIN_SIZE: f32 = 20.0;
    pub const ASTEROID_MAX_SIZE: f32 = 45.0;
    pub const ASTEROID_HIT_SCALE: f32 = 1.2;
    pub const ASTEROID_GRACE_MS: f64 = 1000.0;
    pub const ASTEROID_FADE_IN_MS: f64 = 1000.0;
    pub const ASTEROID_OUTLINE_POINTS: usize = 10;
    pub const ASTEROID_EXPLOSION_FRAMES: u32 = 30;
    pub const ASTEROID_EXPLOSION_PIECES: usize = 8;
    /// How far outside the field new asteroids and power-ups appear
    pub const SPAWN_EDGE_OFFSET: f32 = 10.0;
    pub const ASTEROID_COLORS: [&str; 6] =
        ["#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEEAD", "#A100A1"];

    /// Point tiers: (minimum size, points). Larger rocks are worth less.
    pub const POINT_TIERS: [(f32, u64); 3] = [(37.0, 25), (29.0, 50), (0.0, 100)];

    // === Explosion debris ===
    pub const PIECE_LIFE_FRAMES: u32 = 60;

    // === Spawn scheduling ===
    pub const STARTING_ASTEROIDS: usize = 3;
    pub const ASTEROID_SPAWN_MIN_MS: f64 = 1000.0;
    pub const ASTEROID_SPAWN_MAX_MS: f64 = 4000.0;
    /// Every Nth destruction enqueues one extra asteroid
    pub const DIFFICULTY_STEP: u32 = 5;
    pub const STAR_SPAWN_MIN_MS: f64 = 40_000.0;
    pub const STAR_SPAWN_MAX_MS: f64 = 70_000.0;
    pub const SHIELD_SPAWN_MIN_MS: f64 = 20_000.0;
    pub const SHIELD_SPAWN_MAX_MS: f64 = 50_000.0;
    pub const BLACK_HOLE_SPAWN_MIN_MS: f64 = 30_000.0;
    pub const BLACK_HOLE_SPAWN_MAX_MS: f64 = 60_000.0;

    // === Power-ups ===
    pub const POWERUP_SIZE: f32 = 30.0;
    pub const POWERUP_LIFETIME_MS: f64 = 10_000.0;
    pub const POWERUP_FADE_MS: f64 = 1000.0;
    pub const SHIELD_PICKUP_POINTS: u64 = 100;
    pub const SUPERNOVA_BONUS: u64 = 1000;
    pub const BLACK_HOLE_BONUS: u64 = 500;

    // === Shield ===
    pub const SHIELD_DURATION_MS: f64 = 8000.0;
    pub const SHIELD_BLINK_MS: f64 = 2000.0;
    pub const SHIELD_BLINK_PERIOD_MS: f64 = 250.0;
    /// One full ring turn per this many milliseconds (at 16 ms frames)
    pub const SHIELD_ROTATION_MS: f32 = 2500.0;

    // === Black hole ===
    pub const BLACK_HOLE_SIZE: f32 = 40.0;
    pub const BLACK_HOLE_CORE_FRACTION: f32 = 0.1;
    pub const BLACK_HOLE_GRAVITY_REACH: f32 = 3.0;
    pub const BLACK_HOLE_LIFETIME_MS: f64 = 15_000.0;
    pub const BLACK_HOLE_GRACE_MS: f64 = 3000.0;
    pub const BLACK_HOLE_FADE_MS: f64 = 1000.0;
    pub const BLACK_HOLE_SPEED: f32 = 0.5;
    pub const BLACK_HOLE_SPIN: f32 = 0.03;
    pub const GRAVITY_STRENGTH: f32 = 15.0;
    pub const ZERO_GRAVITY_SCALE: f32 = 0.2;
    pub const BULLET_GRAVITY_MULTIPLIER: f32 = 3.0;

    // === Cosmetics ===
    pub const POINT_TEXT_FRAMES: u32 = 60;
    pub const POINT_TEXT_DRIFT: f32 = 0.5;
    pub const FLASH_FADE_IN_MS: f64 = 25.0;
    pub const FLASH_HOLD_MS: f64 = 25.0;
    pub const FLASH_FADE_OUT_MS: f64 = 25.0;
    pub const SHAKE_DURATION_MS: f64 = 500.0;
    pub const SHAKE_INTENSITY: f32 = 10.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit heading vector for an angle
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a vector (radians, atan2 convention)
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

//! Field entities: bullets, asteroids, debris, power-ups, black holes, score popups
//!
//! Hit radii are always derived from visual size, never stored.
//! An exploding entity only animates its debris; it never collides again.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;
use std::f32::consts::{PI, TAU};

use super::clock::TimeShift;
use super::geometry::{self, Field};
use crate::consts::*;
use crate::heading;

/// Player ship color (also used for its explosion fragments)
pub const PLAYER_COLOR: &str = "#00B7FF";
/// Bullet color
pub const BULLET_COLOR: &str = "#FFBF00";

/// Fade-in / fade-out envelope as a pure function of elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fade {
    pub fade_in_ms: f64,
    pub fade_out_ms: f64,
    /// Total lifetime for time-boxed entities
    pub lifetime_ms: Option<f64>,
}

impl Fade {
    pub const fn fade_in(fade_in_ms: f64) -> Self {
        Self {
            fade_in_ms,
            fade_out_ms: 0.0,
            lifetime_ms: None,
        }
    }

    pub const fn boxed(fade_in_ms: f64, fade_out_ms: f64, lifetime_ms: f64) -> Self {
        Self {
            fade_in_ms,
            fade_out_ms,
            lifetime_ms: Some(lifetime_ms),
        }
    }

    /// Scale/opacity level in [0, 1]
    pub fn level(&self, elapsed_ms: f64) -> f32 {
        let elapsed = elapsed_ms.max(0.0);
        if self.fade_in_ms > 0.0 && elapsed < self.fade_in_ms {
            return (elapsed / self.fade_in_ms).clamp(0.0, 1.0) as f32;
        }
        if let Some(lifetime) = self.lifetime_ms {
            let fade_start = lifetime - self.fade_out_ms;
            if elapsed > fade_start {
                if self.fade_out_ms <= 0.0 {
                    return 0.0;
                }
                let t = (elapsed - fade_start) / self.fade_out_ms;
                return (1.0 - t).clamp(0.0, 1.0) as f32;
            }
        }
        1.0
    }
}

/// Pick a spawn point just outside a random edge, heading into the field
pub fn edge_spawn<R: Rng + ?Sized>(rng: &mut R, field: Field) -> (Vec2, f32) {
    let off = SPAWN_EDGE_OFFSET;
    let spread = rng.random::<f32>() * PI;
    match rng.random_range(0..4) {
        // Top edge, heading down
        0 => (Vec2::new(rng.random::<f32>() * field.width, -off), spread),
        // Right edge, heading left
        1 => (
            Vec2::new(field.width + off, rng.random::<f32>() * field.height),
            spread + PI / 2.0,
        ),
        // Bottom edge, heading up
        2 => (
            Vec2::new(rng.random::<f32>() * field.width, field.height + off),
            spread + PI,
        ),
        // Left edge, heading right
        _ => (
            Vec2::new(-off, rng.random::<f32>() * field.height),
            spread - PI / 2.0,
        ),
    }
}

/// Drift speed shared by asteroids and power-ups
fn drift_speed<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    (rng.random::<f32>() * 2.0 + 1.0) * 0.9
}

// ---------------------------------------------------------------------------
// Bullet
// ---------------------------------------------------------------------------

/// A bullet. Angle + speed model; leaves the field instead of bouncing.
#[derive(Debug, Clone, Serialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub alive: bool,
}

impl Bullet {
    pub fn new(pos: Vec2, angle: f32) -> Self {
        Self {
            pos,
            angle,
            speed: BULLET_SPEED,
            alive: true,
        }
    }

    pub fn radius(&self) -> f32 {
        BULLET_RADIUS
    }

    pub fn velocity(&self) -> Vec2 {
        geometry::velocity_from_angle(self.angle, self.speed)
    }

    /// Bend the flight path: rebuild the velocity, add the force, re-derive speed/angle
    pub fn apply_force(&mut self, force: Vec2) {
        let (speed, angle) = geometry::speed_and_angle(self.velocity() + force);
        self.speed = speed;
        self.angle = angle;
    }

    /// Move one frame; returns false once the bullet has left the field
    pub fn advance(&mut self, field: Field) -> bool {
        self.pos += self.velocity();
        if !field.contains(self.pos) {
            self.alive = false;
        }
        self.alive
    }
}

// ---------------------------------------------------------------------------
// Explosion debris
// ---------------------------------------------------------------------------

/// A fragment flying away from a destroyed asteroid or ship
#[derive(Debug, Clone, Serialize)]
pub struct ExplosionPiece {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub size: f32,
    pub color: &'static str,
    pub life: u32,
}

impl ExplosionPiece {
    /// A burst of `count` fragments with sizes in `[min_size, max_size)`
    pub fn burst<R: Rng + ?Sized>(
        rng: &mut R,
        origin: Vec2,
        count: usize,
        min_size: f32,
        max_size: f32,
        color: &'static str,
    ) -> Vec<ExplosionPiece> {
        (0..count)
            .map(|_| ExplosionPiece {
                pos: origin,
                angle: rng.random::<f32>() * TAU,
                speed: rng.random::<f32>() * 5.0 + 2.0,
                size: min_size + rng.random::<f32>() * (max_size - min_size),
                color,
                life: PIECE_LIFE_FRAMES,
            })
            .collect()
    }

    pub fn advance(&mut self) {
        self.pos += heading(self.angle) * self.speed;
        self.life = self.life.saturating_sub(1);
    }

    pub fn opacity(&self) -> f32 {
        self.life as f32 / PIECE_LIFE_FRAMES as f32
    }
}

// ---------------------------------------------------------------------------
// Asteroid
// ---------------------------------------------------------------------------

/// Surface decoration, relative to the asteroid center
#[derive(Debug, Clone, Serialize)]
pub struct Crater {
    pub offset: Vec2,
    pub radius: f32,
    pub depth: f32,
    pub rim_width: f32,
    pub rim_light: f32,
}

/// Asteroid lifecycle. The variants are mutually exclusive by construction.
#[derive(Debug, Clone, Serialize)]
pub enum AsteroidState {
    /// Drifting and collidable
    Active,
    /// Destroyed; only the debris cloud animates
    Exploding {
        debris: Vec<ExplosionPiece>,
        frames_left: u32,
    },
    /// Swallowed by a black hole or fully dissipated; dropped at end of tick
    Gone,
}

#[derive(Debug, Clone, Serialize)]
pub struct Asteroid {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub rotation: f32,
    pub spin: f32,
    pub color: &'static str,
    /// Closed outline, relative to center
    pub outline: Vec<Vec2>,
    pub craters: Vec<Crater>,
    pub spawn_time: f64,
    pub state: AsteroidState,
}

impl Asteroid {
    /// A new asteroid entering from a random edge
    pub fn spawn<R: Rng + ?Sized>(id: u32, rng: &mut R, field: Field, now: f64) -> Self {
        let (pos, angle) = edge_spawn(rng, field);
        let size = ASTEROID_MIN_SIZE + rng.random::<f32>() * (ASTEROID_MAX_SIZE - ASTEROID_MIN_SIZE);
        let vel = geometry::velocity_from_angle(angle, drift_speed(rng));
        let color = ASTEROID_COLORS[rng.random_range(0..ASTEROID_COLORS.len())];
        Self::with_shape(id, rng, pos, vel, size, color, now)
    }

    /// Build an asteroid at an explicit position (shape still randomized)
    pub fn with_shape<R: Rng + ?Sized>(
        id: u32,
        rng: &mut R,
        pos: Vec2,
        vel: Vec2,
        size: f32,
        color: &'static str,
        now: f64,
    ) -> Self {
        let outline = (0..ASTEROID_OUTLINE_POINTS)
            .map(|i| {
                let a = i as f32 / ASTEROID_OUTLINE_POINTS as f32 * TAU;
                let r = size * (0.7 + rng.random::<f32>() * 0.6);
                heading(a) * r
            })
            .collect();
        let craters = generate_craters(rng, size);

        Self {
            id,
            pos,
            vel,
            size,
            rotation: 0.0,
            spin: rng.random::<f32>() * 0.02 - 0.01,
            color,
            outline,
            craters,
            spawn_time: now,
            state: AsteroidState::Active,
        }
    }

    pub fn hit_radius(&self) -> f32 {
        self.size * ASTEROID_HIT_SCALE
    }

    /// Mass proxy for elastic collisions
    pub fn mass(&self) -> f32 {
        self.size * self.size
    }

    pub fn points(&self) -> u64 {
        points_for_size(self.size)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, AsteroidState::Active)
    }

    pub fn is_gone(&self) -> bool {
        matches!(self.state, AsteroidState::Gone)
    }

    /// Past the spawn grace period (may now hurt the player)
    pub fn can_collide(&self, now: f64) -> bool {
        now - self.spawn_time >= ASTEROID_GRACE_MS
    }

    pub fn fade_level(&self, now: f64) -> f32 {
        Fade::fade_in(ASTEROID_FADE_IN_MS).level(now - self.spawn_time)
    }

    /// Switch to the debris cloud. No-op unless active.
    pub fn explode<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.is_active() {
            return;
        }
        let debris = ExplosionPiece::burst(
            rng,
            self.pos,
            ASTEROID_EXPLOSION_PIECES,
            1.0,
            4.0,
            self.color,
        );
        self.state = AsteroidState::Exploding {
            debris,
            frames_left: ASTEROID_EXPLOSION_FRAMES,
        };
    }

    /// Removed outright, no debris
    pub fn consume(&mut self) {
        self.state = AsteroidState::Gone;
    }

    /// One frame of motion, wall bounce and spin (or debris animation)
    pub fn advance(&mut self, field: Field) {
        let radius = self.hit_radius();
        let dissipated = match &mut self.state {
            AsteroidState::Active => {
                self.pos += self.vel;
                geometry::bounce_velocity(&mut self.pos, &mut self.vel, radius, field);
                self.rotation += self.spin;
                false
            }
            AsteroidState::Exploding {
                debris,
                frames_left,
            } => {
                for piece in debris.iter_mut() {
                    piece.advance();
                }
                *frames_left = frames_left.saturating_sub(1);
                *frames_left == 0
            }
            AsteroidState::Gone => false,
        };
        if dissipated {
            self.state = AsteroidState::Gone;
        }
    }
}

impl TimeShift for Asteroid {
    fn shift_time(&mut self, delta_ms: f64) {
        self.spawn_time += delta_ms;
    }
}

/// Points awarded for destroying an asteroid of `size`.
/// Non-increasing step function: bigger rocks are easier to hit.
pub fn points_for_size(size: f32) -> u64 {
    POINT_TIERS
        .iter()
        .find(|(min_size, _)| size >= *min_size)
        .map(|(_, points)| *points)
        .unwrap_or(POINT_TIERS[POINT_TIERS.len() - 1].1)
}

/// 5-7 craters, rejected when they crowd an existing one (20 attempts each)
fn generate_craters<R: Rng + ?Sized>(rng: &mut R, size: f32) -> Vec<Crater> {
    let count = rng.random_range(5..=7);
    let min_gap = size * 0.3;
    let mut craters: Vec<Crater> = Vec::with_capacity(count);

    for _ in 0..count {
        for _attempt in 0..20 {
            let offset = heading(rng.random::<f32>() * TAU) * (rng.random::<f32>() * size * 0.7);
            let radius = rng.random::<f32>() * size * 0.2 + size * 0.08;
            let crowded = craters
                .iter()
                .any(|c| c.offset.distance(offset) < min_gap + c.radius + radius);
            if !crowded {
                craters.push(Crater {
                    offset,
                    radius,
                    depth: rng.random::<f32>() * 0.6 + 0.2,
                    rim_width: rng.random::<f32>() * 0.3 + 0.1,
                    rim_light: rng.random::<f32>() * 0.4 + 0.3,
                });
                break;
            }
        }
    }
    craters
}

// ---------------------------------------------------------------------------
// Power-ups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PowerUpKind {
    /// Supernova: clears the field
    Star,
    /// Temporary invulnerability
    Shield,
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub spin: f32,
    pub pulse_phase: f32,
    pub spawn_time: f64,
    pub lifetime_ms: f64,
    /// Picked up or timed out; dropped at end of tick
    pub gone: bool,
}

impl PowerUp {
    pub fn spawn<R: Rng + ?Sized>(
        id: u32,
        kind: PowerUpKind,
        rng: &mut R,
        field: Field,
        now: f64,
        lifetime_ms: f64,
    ) -> Self {
        let (pos, angle) = edge_spawn(rng, field);
        let spin = match kind {
            PowerUpKind::Star => rng.random::<f32>() * 0.05 - 0.025,
            PowerUpKind::Shield => rng.random::<f32>() * 0.02 - 0.01,
        };
        Self {
            id,
            kind,
            pos,
            vel: geometry::velocity_from_angle(angle, drift_speed(rng)),
            rotation: 0.0,
            spin,
            pulse_phase: rng.random::<f32>() * TAU,
            spawn_time: now,
            lifetime_ms,
            gone: false,
        }
    }

    pub fn size(&self) -> f32 {
        POWERUP_SIZE
    }

    pub fn hit_radius(&self) -> f32 {
        self.size() * ASTEROID_HIT_SCALE
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now - self.spawn_time > self.lifetime_ms
    }

    pub fn fade_level(&self, now: f64) -> f32 {
        Fade::boxed(POWERUP_FADE_MS, POWERUP_FADE_MS, self.lifetime_ms).level(now - self.spawn_time)
    }

    /// Gentle breathing scale around 1.0
    pub fn pulse(&self, now: f64) -> f32 {
        1.0 + ((now * 0.01) as f32 + self.pulse_phase).sin() * 0.05
    }

    pub fn advance(&mut self, field: Field, now: f64) {
        if self.gone {
            return;
        }
        self.pos += self.vel;
        let radius = self.hit_radius();
        geometry::bounce_velocity(&mut self.pos, &mut self.vel, radius, field);
        self.rotation += self.spin;
        if self.is_expired(now) {
            self.gone = true;
        }
    }
}

impl TimeShift for PowerUp {
    fn shift_time(&mut self, delta_ms: f64) {
        self.spawn_time += delta_ms;
    }
}

// ---------------------------------------------------------------------------
// Black hole
// ---------------------------------------------------------------------------

/// Singleton hazard with a small lethal core and a wide gravity well.
/// Angle + speed model: walls mirror its heading.
#[derive(Debug, Clone, Serialize)]
pub struct BlackHole {
    pub id: u32,
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub spin_angle: f32,
    pub spawn_time: f64,
    pub lifetime_ms: f64,
    /// Expired or destroyed; dropped at end of tick
    pub gone: bool,
}

impl BlackHole {
    /// Spawn somewhere inside the field, away from the edges
    pub fn spawn<R: Rng + ?Sized>(id: u32, rng: &mut R, field: Field, now: f64, lifetime_ms: f64) -> Self {
        let margin = BLACK_HOLE_SIZE * ASTEROID_HIT_SCALE;
        let span_x = (field.width - 2.0 * margin).max(0.0);
        let span_y = (field.height - 2.0 * margin).max(0.0);
        Self {
            id,
            pos: Vec2::new(
                margin + rng.random::<f32>() * span_x,
                margin + rng.random::<f32>() * span_y,
            ),
            angle: rng.random::<f32>() * TAU,
            speed: BLACK_HOLE_SPEED,
            spin_angle: 0.0,
            spawn_time: now,
            lifetime_ms,
            gone: false,
        }
    }

    pub fn size(&self) -> f32 {
        BLACK_HOLE_SIZE
    }

    /// Visual hit radius
    pub fn hit_radius(&self) -> f32 {
        self.size() * ASTEROID_HIT_SCALE
    }

    /// Lethal core: anything overlapping it is destroyed
    pub fn core_radius(&self) -> f32 {
        self.hit_radius() * BLACK_HOLE_CORE_FRACTION
    }

    /// Gravity applies to anything within this distance
    pub fn gravity_radius(&self) -> f32 {
        self.hit_radius() * BLACK_HOLE_GRAVITY_REACH
    }

    pub fn past_grace(&self, now: f64) -> bool {
        now - self.spawn_time >= BLACK_HOLE_GRACE_MS
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now - self.spawn_time >= self.lifetime_ms
    }

    pub fn fade_level(&self, now: f64) -> f32 {
        Fade::boxed(BLACK_HOLE_FADE_MS, BLACK_HOLE_FADE_MS, self.lifetime_ms).level(now - self.spawn_time)
    }

    pub fn advance(&mut self, field: Field) {
        if self.gone {
            return;
        }
        self.pos += heading(self.angle) * self.speed;
        let radius = self.hit_radius();
        geometry::bounce_angle(&mut self.pos, &mut self.angle, radius, field);
        self.spin_angle = crate::normalize_angle(self.spin_angle + BLACK_HOLE_SPIN);
    }
}

impl TimeShift for BlackHole {
    fn shift_time(&mut self, delta_ms: f64) {
        self.spawn_time += delta_ms;
    }
}

// ---------------------------------------------------------------------------
// Score popup
// ---------------------------------------------------------------------------

/// Floating "+50" text. Purely cosmetic.
#[derive(Debug, Clone, Serialize)]
pub struct PointText {
    pub pos: Vec2,
    pub value: u64,
    pub frames_left: u32,
}

impl PointText {
    pub fn new(pos: Vec2, value: u64) -> Self {
        Self {
            pos,
            value,
            frames_left: POINT_TEXT_FRAMES,
        }
    }

    pub fn advance(&mut self) {
        self.pos.y -= POINT_TEXT_DRIFT;
        self.frames_left = self.frames_left.saturating_sub(1);
    }

    pub fn is_alive(&self) -> bool {
        self.frames_left > 0
    }

    pub fn opacity(&self) -> f32 {
        self.frames_left as f32 / POINT_TEXT_FRAMES as f32
    }

    pub fn label(&self) -> String {
        format!("+{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FIELD: Field = Field {
        width: 800.0,
        height: 600.0,
    };

    #[test]
    fn test_fade_in_then_full() {
        let fade = Fade::fade_in(1000.0);
        assert_eq!(fade.level(0.0), 0.0);
        assert!((fade.level(500.0) - 0.5).abs() < 1e-6);
        assert_eq!(fade.level(5000.0), 1.0);
        assert_eq!(fade.level(-10.0), 0.0);
    }

    #[test]
    fn test_boxed_fade_out() {
        let fade = Fade::boxed(1000.0, 1000.0, 10_000.0);
        assert_eq!(fade.level(5000.0), 1.0);
        assert!((fade.level(9500.0) - 0.5).abs() < 1e-6);
        assert_eq!(fade.level(12_000.0), 0.0);
    }

    #[test]
    fn test_edge_spawn_heads_inward() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            let (pos, angle) = edge_spawn(&mut rng, FIELD);
            let dir = heading(angle);
            if pos.y < 0.0 {
                assert!(dir.y >= -1e-5);
            } else if pos.y > FIELD.height {
                assert!(dir.y <= 1e-5);
            } else if pos.x < 0.0 {
                assert!(dir.x >= -1e-5);
            } else {
                assert!(pos.x > FIELD.width);
                assert!(dir.x <= 1e-5);
            }
        }
    }

    #[test]
    fn test_asteroid_explodes_then_dissipates() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut a = Asteroid::spawn(1, &mut rng, FIELD, 0.0);
        assert!(a.is_active());
        a.explode(&mut rng);
        match &a.state {
            AsteroidState::Exploding { debris, frames_left } => {
                assert_eq!(debris.len(), ASTEROID_EXPLOSION_PIECES);
                assert_eq!(*frames_left, ASTEROID_EXPLOSION_FRAMES);
            }
            other => panic!("expected Exploding, got {:?}", other),
        }
        for _ in 0..ASTEROID_EXPLOSION_FRAMES {
            a.advance(FIELD);
        }
        assert!(a.is_gone());
    }

    #[test]
    fn test_asteroid_shape_generated_up_front() {
        let mut rng = Pcg32::seed_from_u64(5);
        let a = Asteroid::spawn(1, &mut rng, FIELD, 0.0);
        assert_eq!(a.outline.len(), ASTEROID_OUTLINE_POINTS);
        assert!(a.craters.len() <= 7);
        assert!((a.hit_radius() - a.size * 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_asteroid_grace_period() {
        let mut rng = Pcg32::seed_from_u64(5);
        let a = Asteroid::spawn(1, &mut rng, FIELD, 10_000.0);
        assert!(!a.can_collide(10_500.0));
        assert!(a.can_collide(11_000.0));
    }

    #[test]
    fn test_point_tiers() {
        assert_eq!(points_for_size(44.0), 25);
        assert_eq!(points_for_size(30.0), 50);
        assert_eq!(points_for_size(21.0), 100);
    }

    #[test]
    fn test_bullet_leaves_field() {
        let mut b = Bullet::new(Vec2::new(795.0, 300.0), 0.0);
        assert!(!b.advance(FIELD));
        assert!(!b.alive);
    }

    #[test]
    fn test_bullet_force_rederives_angle() {
        let mut b = Bullet::new(Vec2::new(100.0, 100.0), 0.0);
        b.apply_force(Vec2::new(0.0, 10.0));
        assert!((b.angle - std::f32::consts::FRAC_PI_4).abs() < 1e-5);
        assert!((b.speed - 200.0f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_black_hole_radii() {
        let mut rng = Pcg32::seed_from_u64(9);
        let bh = BlackHole::spawn(1, &mut rng, FIELD, 0.0, BLACK_HOLE_LIFETIME_MS);
        assert!((bh.core_radius() - bh.hit_radius() * 0.1).abs() < 1e-5);
        assert!((bh.gravity_radius() - bh.hit_radius() * 3.0).abs() < 1e-5);
        assert!(FIELD.contains(bh.pos));
        assert!(!bh.past_grace(1000.0));
        assert!(bh.past_grace(BLACK_HOLE_GRACE_MS));
    }

    #[test]
    fn test_powerup_expires() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut p = PowerUp::spawn(1, PowerUpKind::Shield, &mut rng, FIELD, 0.0, 10_000.0);
        p.advance(FIELD, 5000.0);
        assert!(!p.gone);
        p.advance(FIELD, 10_001.0);
        assert!(p.gone);
    }

    #[test]
    fn test_point_text_fades_out() {
        let mut t = PointText::new(Vec2::new(10.0, 10.0), 50);
        assert_eq!(t.label(), "+50");
        for _ in 0..POINT_TEXT_FRAMES {
            t.advance();
        }
        assert!(!t.is_alive());
        assert!(t.pos.y < 10.0);
    }

    proptest! {
        #[test]
        fn prop_points_non_increasing_in_size(a in 20.0f32..45.0, b in 20.0f32..45.0) {
            let (large, small) = if a >= b { (a, b) } else { (b, a) };
            prop_assert!(points_for_size(large) <= points_for_size(small));
        }

        #[test]
        fn prop_fade_level_clamped(elapsed in -5000.0f64..20_000.0) {
            let level = Fade::boxed(1000.0, 1000.0, 10_000.0).level(elapsed);
            prop_assert!((0.0..=1.0).contains(&level));
        }
    }
}

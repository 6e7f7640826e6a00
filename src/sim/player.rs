//! The player's ship and its controller
//!
//! Two mutually exclusive control schemes:
//! - `Keys`: left/right ease a turn rate, up/down thrust or reverse
//! - `Joystick`: the ship turns toward the stick and thrusts along it,
//!   proportionally to how far the stick is pushed

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::clock::TimeShift;
use super::entities::{Bullet, ExplosionPiece, PLAYER_COLOR};
use super::geometry::{self, Field};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{angle_of, heading, normalize_angle};

/// Movement controls sampled for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Controls {
    Keys {
        left: bool,
        right: bool,
        thrust: bool,
        reverse: bool,
    },
    /// Stick deflection; length 1.0 is full throttle
    Joystick { dir: Vec2 },
}

impl Default for Controls {
    fn default() -> Self {
        Controls::Keys {
            left: false,
            right: false,
            thrust: false,
            reverse: false,
        }
    }
}

/// Shield power-up state carried by the ship
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShieldState {
    pub active: bool,
    pub start_time: f64,
    /// Cosmetic ring rotation
    pub ring_angle: f32,
    /// False during the "off" half of the expiry blink
    pub visible: bool,
    /// Set once the expiry warning has been emitted for this shield
    pub warned: bool,
}

/// What happened to the shield this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShieldTick {
    Inactive,
    Holding,
    /// Just entered the blink window
    Expiring,
    /// Just ran out
    Expired,
}

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing (radians)
    pub angle: f32,
    /// Eased turn rate (keys scheme)
    pub rotation_speed: f32,
    pub exploded: bool,
    /// Owned explosion fragments; the ship is gone once these expire
    pub pieces: Vec<ExplosionPiece>,
    pub shield: ShieldState,
    pub last_shot_time: Option<f64>,
    /// Flame animation: thrusting or turning
    pub thrusting: bool,
    /// Actually under power (thrust/reverse keys or a deflected stick)
    pub propelling: bool,
    pub thrust_frame: u32,
    /// Frames left on the recoil pulse after a shot
    pub recoil_frames: u32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            rotation_speed: 0.0,
            exploded: false,
            pieces: Vec::new(),
            shield: ShieldState {
                visible: true,
                ..Default::default()
            },
            last_shot_time: None,
            thrusting: false,
            propelling: false,
            thrust_frame: 0,
            recoil_frames: 0,
        }
    }

    /// Back to a fresh ship at `pos` (reset in place, not recreated)
    pub fn reset(&mut self, pos: Vec2) {
        *self = Self::new(pos);
    }

    pub fn hit_radius(&self) -> f32 {
        PLAYER_HIT_RADIUS
    }

    pub fn has_shield(&self) -> bool {
        self.shield.active
    }

    /// Bullet origin
    pub fn nose(&self) -> Vec2 {
        self.pos + heading(self.angle) * PLAYER_NOSE_OFFSET
    }

    /// Map controls to rotation and velocity, then cap the speed.
    /// Returns whether the ship is visibly thrusting or turning; `propelling`
    /// records whether it is under power.
    pub fn steer(&mut self, controls: Controls, zero_gravity: bool, tuning: &Tuning) -> bool {
        let max_speed = tuning.player_max_speed;
        let accel = tuning.player_acceleration;

        let (active, propelling) = match controls {
            Controls::Keys {
                left,
                right,
                thrust,
                reverse,
            } => {
                let mut target = 0.0;
                if left {
                    target = -MAX_ROTATION_SPEED;
                }
                if right {
                    target = MAX_ROTATION_SPEED;
                }
                self.rotation_speed += (target - self.rotation_speed) * ROTATION_EASING;
                if self.rotation_speed.abs() > ROTATION_DEAD_ZONE {
                    self.angle = normalize_angle(self.angle + self.rotation_speed);
                } else {
                    self.rotation_speed = 0.0;
                }

                let facing = heading(self.angle);
                if zero_gravity {
                    if thrust {
                        self.vel += facing * accel;
                    }
                    if reverse {
                        self.vel -= facing * accel;
                    }
                } else if thrust || reverse {
                    let target_speed = if thrust { max_speed } else { -max_speed };
                    self.ease_velocity(facing * target_speed);
                } else {
                    self.apply_friction();
                }

                (left || right || thrust || reverse, thrust || reverse)
            }
            Controls::Joystick { dir } => {
                let magnitude = dir.length().min(1.0);
                if magnitude > JOYSTICK_DEAD_ZONE {
                    let diff = normalize_angle(angle_of(dir) - self.angle);
                    self.rotation_speed = diff * JOYSTICK_TURN_EASING;
                    self.angle = normalize_angle(self.angle + self.rotation_speed);

                    let thrust = dir.normalize_or_zero() * magnitude;
                    if zero_gravity {
                        self.vel += thrust * accel;
                    } else {
                        self.ease_velocity(thrust * max_speed);
                    }
                    (true, true)
                } else {
                    self.rotation_speed = 0.0;
                    if !zero_gravity {
                        self.apply_friction();
                    }
                    (false, false)
                }
            }
        };

        self.vel = geometry::cap_speed(self.vel, max_speed);

        self.thrusting = active;
        self.propelling = propelling;
        if active {
            self.thrust_frame = self.thrust_frame.wrapping_add(1);
        }
        active
    }

    fn ease_velocity(&mut self, target: Vec2) {
        self.vel += (target - self.vel) * VELOCITY_EASING;
    }

    fn apply_friction(&mut self) {
        self.vel *= FRICTION;
        if self.vel.x.abs() < FRICTION_STOP {
            self.vel.x = 0.0;
        }
        if self.vel.y.abs() < FRICTION_STOP {
            self.vel.y = 0.0;
        }
    }

    /// Move one frame and bounce off the field edges
    pub fn integrate(&mut self, field: Field) {
        self.pos += self.vel;
        let radius = self.hit_radius();
        geometry::bounce_velocity(&mut self.pos, &mut self.vel, radius, field);
        self.recoil_frames = self.recoil_frames.saturating_sub(1);
    }

    /// Fire if the cooldown has elapsed
    pub fn try_shoot(&mut self, now: f64, cooldown_ms: f64) -> Option<Bullet> {
        if self.exploded {
            return None;
        }
        if let Some(last) = self.last_shot_time
            && now - last < cooldown_ms
        {
            return None;
        }
        self.last_shot_time = Some(now);
        self.recoil_frames = 10;
        Some(Bullet::new(self.nose(), self.angle))
    }

    /// Cosmetic scale bump right after firing
    pub fn recoil_scale(&self) -> f32 {
        1.0 + 0.15 * (self.recoil_frames as f32 / 10.0)
    }

    pub fn grant_shield(&mut self, now: f64) {
        self.shield.active = true;
        self.shield.start_time = now;
        self.shield.visible = true;
        self.shield.warned = false;
    }

    /// Spin the ring, blink near the end, and drop the shield when it runs out
    pub fn update_shield(&mut self, now: f64, duration_ms: f64) -> ShieldTick {
        if !self.shield.active {
            return ShieldTick::Inactive;
        }
        self.shield.ring_angle = (self.shield.ring_angle + TAU / (SHIELD_ROTATION_MS / 16.0)) % TAU;

        let elapsed = now - self.shield.start_time;
        if elapsed >= duration_ms {
            self.shield.active = false;
            self.shield.visible = true;
            return ShieldTick::Expired;
        }

        let time_left = duration_ms - elapsed;
        if time_left <= SHIELD_BLINK_MS {
            self.shield.visible = ((elapsed / SHIELD_BLINK_PERIOD_MS).floor() as i64) % 2 == 0;
            if !self.shield.warned {
                self.shield.warned = true;
                return ShieldTick::Expiring;
            }
        } else {
            self.shield.visible = true;
        }
        ShieldTick::Holding
    }

    /// Blow up into fragments. Shield, thrust and motion stop.
    pub fn explode<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.exploded {
            return;
        }
        self.exploded = true;
        self.thrusting = false;
        self.propelling = false;
        self.vel = Vec2::ZERO;
        self.shield.active = false;
        self.pieces = ExplosionPiece::burst(rng, self.pos, PLAYER_EXPLOSION_PIECES, 2.0, 7.0, PLAYER_COLOR);
    }

    /// Animate fragments; returns true once every fragment has expired
    pub fn advance_pieces(&mut self) -> bool {
        for piece in self.pieces.iter_mut() {
            piece.advance();
        }
        self.pieces.retain(|p| p.life > 0);
        self.pieces.is_empty()
    }
}

impl TimeShift for Player {
    fn shift_time(&mut self, delta_ms: f64) {
        if self.shield.active {
            self.shield.start_time += delta_ms;
        }
        self.last_shot_time.shift_time(delta_ms);
    }
}

//! Geometry helpers: circle tests, wall bounces, speed caps
//!
//! Everything collides as a circle. Walls are the edges of the play field.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{angle_of, heading};

/// The visible play field. Origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether a point lies inside the field (edges included)
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

/// Circle-circle overlap: `distance(centers) < sum(radii)`
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}

/// Velocity vector for a heading and speed
#[inline]
pub fn velocity_from_angle(angle: f32, speed: f32) -> Vec2 {
    heading(angle) * speed
}

/// Split a velocity back into `(speed, angle)`
#[inline]
pub fn speed_and_angle(vel: Vec2) -> (f32, f32) {
    (vel.length(), angle_of(vel))
}

/// Rescale `vel` so its length never exceeds `max`
#[inline]
pub fn cap_speed(vel: Vec2, max: f32) -> Vec2 {
    let speed = vel.length();
    if speed > max && speed > 0.0 {
        vel * (max / speed)
    } else {
        vel
    }
}

/// Clamp a circle into the field and reflect the velocity component that
/// crossed the wall so it points back inside. Returns true on a bounce.
pub fn bounce_velocity(pos: &mut Vec2, vel: &mut Vec2, radius: f32, field: Field) -> bool {
    let mut bounced = false;

    if pos.x < radius {
        pos.x = radius;
        vel.x = vel.x.abs();
        bounced = true;
    } else if pos.x > field.width - radius {
        pos.x = field.width - radius;
        vel.x = -vel.x.abs();
        bounced = true;
    }

    if pos.y < radius {
        pos.y = radius;
        vel.y = vel.y.abs();
        bounced = true;
    } else if pos.y > field.height - radius {
        pos.y = field.height - radius;
        vel.y = -vel.y.abs();
        bounced = true;
    }

    bounced
}

/// Angle-model variant of [`bounce_velocity`]: the heading is mirrored
/// (`π - a` for side walls, `-a` for top/bottom) when it still points outward.
pub fn bounce_angle(pos: &mut Vec2, angle: &mut f32, radius: f32, field: Field) -> bool {
    let mut bounced = false;

    if pos.x < radius {
        pos.x = radius;
        if angle.cos() < 0.0 {
            *angle = std::f32::consts::PI - *angle;
        }
        bounced = true;
    } else if pos.x > field.width - radius {
        pos.x = field.width - radius;
        if angle.cos() > 0.0 {
            *angle = std::f32::consts::PI - *angle;
        }
        bounced = true;
    }

    if pos.y < radius {
        pos.y = radius;
        if angle.sin() < 0.0 {
            *angle = -*angle;
        }
        bounced = true;
    } else if pos.y > field.height - radius {
        pos.y = field.height - radius;
        if angle.sin() > 0.0 {
            *angle = -*angle;
        }
        bounced = true;
    }

    if bounced {
        *angle = crate::normalize_angle(*angle);
    }
    bounced
}

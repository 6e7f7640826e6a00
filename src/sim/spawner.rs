//! Spawn scheduling
//!
//! Decides *when* asteroids, power-ups and the black hole appear; the game
//! state decides *what* appears. Missed frames simply defer materialization
//! to the next tick (no catch-up).

use rand::Rng;
use serde::Serialize;

use super::clock::TimeShift;
use crate::tuning::Tuning;

/// A scheduled future asteroid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendingSpawn {
    pub at: f64,
}

impl TimeShift for PendingSpawn {
    fn shift_time(&mut self, delta_ms: f64) {
        self.at += delta_ms;
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Spawner {
    pub pending_asteroids: Vec<PendingSpawn>,
    pub next_star: Option<f64>,
    pub next_shield: Option<f64>,
    /// Armed only while no black hole exists
    pub next_black_hole: Option<f64>,
    /// Cumulative asteroid destructions (drives the difficulty ratchet)
    pub destroyed: u32,
}

impl Spawner {
    /// Arm every timer for a fresh session
    pub fn arm<R: Rng + ?Sized>(&mut self, rng: &mut R, now: f64, tuning: &Tuning) {
        self.pending_asteroids.clear();
        self.destroyed = 0;
        self.next_star = Some(tuning.star_spawn.roll(rng, now));
        self.next_shield = Some(tuning.shield_spawn.roll(rng, now));
        self.next_black_hole = Some(tuning.black_hole_spawn.roll(rng, now));
    }

    /// Disarm everything (attract mode)
    pub fn disarm(&mut self) {
        *self = Self::default();
    }

    /// Book one asteroid destruction: one replacement, plus one extra on
    /// every `difficulty_step`-th destruction. Returns how many were queued.
    pub fn record_destruction<R: Rng + ?Sized>(&mut self, rng: &mut R, now: f64, tuning: &Tuning) -> usize {
        self.destroyed += 1;
        let mut queued = 1;
        self.pending_asteroids.push(PendingSpawn {
            at: tuning.asteroid_spawn.roll(rng, now),
        });

        if tuning.difficulty_step > 0 && self.destroyed % tuning.difficulty_step == 0 {
            self.pending_asteroids.push(PendingSpawn {
                at: tuning.asteroid_spawn.roll(rng, now),
            });
            queued += 1;
        }
        queued
    }

    /// Drop all queued asteroids (supernova)
    pub fn clear_pending_asteroids(&mut self) {
        self.pending_asteroids.clear();
    }

    /// Remove and count the asteroids whose time has come
    pub fn take_due_asteroids(&mut self, now: f64) -> usize {
        let before = self.pending_asteroids.len();
        self.pending_asteroids.retain(|p| now < p.at);
        before - self.pending_asteroids.len()
    }

    /// Fires at most once per call and re-rolls the next star time
    pub fn star_due<R: Rng + ?Sized>(&mut self, rng: &mut R, now: f64, tuning: &Tuning) -> bool {
        match self.next_star {
            Some(at) if now >= at => {
                self.next_star = Some(tuning.star_spawn.roll(rng, now));
                true
            }
            _ => false,
        }
    }

    /// Like [`Self::star_due`], but never within the first minimum window of a session
    pub fn shield_due<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: f64,
        session_elapsed: f64,
        tuning: &Tuning,
    ) -> bool {
        match self.next_shield {
            Some(at) if now >= at && session_elapsed >= tuning.shield_spawn.min_ms => {
                self.next_shield = Some(tuning.shield_spawn.roll(rng, now));
                true
            }
            _ => false,
        }
    }

    /// Fires once and disarms; re-armed by [`Self::rearm_black_hole`]
    pub fn black_hole_due(&mut self, now: f64, present: bool) -> bool {
        match self.next_black_hole {
            Some(at) if !present && now >= at => {
                self.next_black_hole = None;
                true
            }
            _ => false,
        }
    }

    pub fn rearm_black_hole<R: Rng + ?Sized>(&mut self, rng: &mut R, now: f64, tuning: &Tuning) {
        self.next_black_hole = Some(tuning.black_hole_spawn.roll(rng, now));
    }
}

impl TimeShift for Spawner {
    fn shift_time(&mut self, delta_ms: f64) {
        self.pending_asteroids.shift_time(delta_ms);
        self.next_star.shift_time(delta_ms);
        self.next_shield.shift_time(delta_ms);
        self.next_black_hole.shift_time(delta_ms);
    }
}

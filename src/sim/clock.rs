//! Pause/resume time accounting
//!
//! Every stored timestamp is wall-clock milliseconds. While paused no tick
//! runs, so on resume every timestamp is pushed forward by exactly the time
//! spent paused and no timer observes the gap.

use serde::{Deserialize, Serialize};

/// Anything holding wall-clock timestamps that must survive a pause
pub trait TimeShift {
    /// Move every stored timestamp forward by `delta_ms`
    fn shift_time(&mut self, delta_ms: f64);
}

impl TimeShift for f64 {
    fn shift_time(&mut self, delta_ms: f64) {
        *self += delta_ms;
    }
}

impl<T: TimeShift> TimeShift for Option<T> {
    fn shift_time(&mut self, delta_ms: f64) {
        if let Some(inner) = self {
            inner.shift_time(delta_ms);
        }
    }
}

impl<T: TimeShift> TimeShift for Vec<T> {
    fn shift_time(&mut self, delta_ms: f64) {
        for item in self.iter_mut() {
            item.shift_time(delta_ms);
        }
    }
}

/// Running/Paused state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum ClockState {
    #[default]
    Running,
    Paused {
        since: f64,
    },
}

/// Tracks pauses and reports how long each one lasted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PauseClock {
    state: ClockState,
    /// Sum of all completed pauses (diagnostics only)
    total_paused_ms: f64,
}

impl PauseClock {
    pub fn is_paused(&self) -> bool {
        matches!(self.state, ClockState::Paused { .. })
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn total_paused_ms(&self) -> f64 {
        self.total_paused_ms
    }

    /// Enter the paused state. Returns false if already paused.
    pub fn pause(&mut self, now: f64) -> bool {
        if self.is_paused() {
            return false;
        }
        self.state = ClockState::Paused { since: now };
        true
    }

    /// Leave the paused state, returning the pause duration to shift by.
    /// Returns `None` if the clock was not paused.
    pub fn resume(&mut self, now: f64) -> Option<f64> {
        let ClockState::Paused { since } = self.state else {
            return None;
        };
        self.state = ClockState::Running;
        // A clock that went backwards never un-shifts timers
        let duration = (now - since).max(0.0);
        self.total_paused_ms += duration;
        Some(duration)
    }
}

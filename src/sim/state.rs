//! Game state and session bookkeeping
//!
//! Everything one session owns lives here. Collections only grow during a
//! tick; dead entities are compacted away at its end.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::{PauseClock, TimeShift};
use super::entities::{Asteroid, BlackHole, Bullet, PointText, PowerUp, PowerUpKind};
use super::geometry::Field;
use super::player::Player;
use super::spawner::Spawner;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Before the first start: rocks drift, nothing is scheduled
    Attract,
    /// Active gameplay
    Playing,
    /// The ship is gone; waiting for restart
    GameOver,
}

/// Sound requests. The host decides whether (and how) to play them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoundCue {
    GameStart,
    Shoot,
    AsteroidSpawn,
    AsteroidExplode,
    GameOver,
    PowerUpSpawn,
    PowerUp,
    Supernova,
    BlackHoleSpawn,
    Thrust,
    Bump,
    ShieldExpiring,
}

impl SoundCue {
    /// Asset name used by the browser host
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::GameStart => "game-start",
            SoundCue::Shoot => "shoot",
            SoundCue::AsteroidSpawn => "asteroid-spawn",
            SoundCue::AsteroidExplode => "asteroid-explode",
            SoundCue::GameOver => "game-over",
            SoundCue::PowerUpSpawn => "power-up-spawn",
            SoundCue::PowerUp => "power-up",
            SoundCue::Supernova => "supernova",
            SoundCue::BlackHoleSpawn => "black-hole-spawn",
            SoundCue::Thrust => "thrust",
            SoundCue::Bump => "bump",
            SoundCue::ShieldExpiring => "shield-expiring",
        }
    }
}

/// Discrete notifications for the host (audio, HUD, camera)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Sound { cue: SoundCue },
    ScoreChanged { score: u64, delta: u64 },
    /// First time this session the score passed the stored high score
    HighScoreBeaten { score: u64 },
    ScreenShake { duration_ms: f64, intensity: f32 },
    Flash { fade_in_ms: f64, hold_ms: f64, fade_out_ms: f64 },
    GameOver { score: u64, high_score: u64 },
}

/// HUD counters for one session
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStats {
    pub score: u64,
    pub shots: u32,
    pub hits: u32,
    /// Asteroids destroyed by the player (bullets, shield bumps, supernova)
    pub destroyed: u32,
    pub start_time: Option<f64>,
    /// Frozen at game over so the timer stops
    pub end_time: Option<f64>,
}

impl SessionStats {
    /// Hit percentage, 0 before the first shot
    pub fn accuracy(&self) -> f32 {
        if self.shots == 0 {
            0.0
        } else {
            self.hits as f32 / self.shots as f32 * 100.0
        }
    }

    pub fn elapsed_ms(&self, now: f64) -> f64 {
        match self.start_time {
            Some(start) => (self.end_time.unwrap_or(now) - start).max(0.0),
            None => 0.0,
        }
    }
}

impl TimeShift for SessionStats {
    fn shift_time(&mut self, delta_ms: f64) {
        self.start_time.shift_time(delta_ms);
        self.end_time.shift_time(delta_ms);
    }
}

/// Full-screen flash and camera shake, both pure functions of time
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScreenEffects {
    pub flash_start: Option<f64>,
    pub shake_start: Option<f64>,
    pub shake_peak: f32,
}

impl ScreenEffects {
    fn flash_total() -> f64 {
        FLASH_FADE_IN_MS + FLASH_HOLD_MS + FLASH_FADE_OUT_MS
    }

    pub fn flash(&mut self, now: f64) {
        self.flash_start = Some(now);
    }

    pub fn shake(&mut self, now: f64, intensity: f32) {
        self.shake_start = Some(now);
        self.shake_peak = intensity;
    }

    pub fn flash_opacity(&self, now: f64) -> f32 {
        let Some(start) = self.flash_start else {
            return 0.0;
        };
        let t = (now - start).max(0.0);
        let level = if t < FLASH_FADE_IN_MS {
            t / FLASH_FADE_IN_MS
        } else if t < FLASH_FADE_IN_MS + FLASH_HOLD_MS {
            1.0
        } else if t < Self::flash_total() {
            1.0 - (t - FLASH_FADE_IN_MS - FLASH_HOLD_MS) / FLASH_FADE_OUT_MS
        } else {
            0.0
        };
        level.clamp(0.0, 1.0) as f32
    }

    /// Linearly decaying shake magnitude in pixels
    pub fn shake_intensity(&self, now: f64) -> f32 {
        let Some(start) = self.shake_start else {
            return 0.0;
        };
        let t = (now - start).max(0.0);
        if t >= SHAKE_DURATION_MS {
            return 0.0;
        }
        self.shake_peak * (1.0 - (t / SHAKE_DURATION_MS) as f32)
    }

    /// Forget finished effects
    pub fn expire(&mut self, now: f64) {
        if let Some(start) = self.flash_start
            && now - start >= Self::flash_total()
        {
            self.flash_start = None;
        }
        if let Some(start) = self.shake_start
            && now - start >= SHAKE_DURATION_MS
        {
            self.shake_start = None;
        }
    }
}

impl TimeShift for ScreenEffects {
    fn shift_time(&mut self, delta_ms: f64) {
        self.flash_start.shift_time(delta_ms);
        self.shake_start.shift_time(delta_ms);
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub rng: Pcg32,
    pub seed: u64,
    pub field: Field,
    pub tuning: Tuning,
    pub phase: GamePhase,

    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub asteroids: Vec<Asteroid>,
    pub power_ups: Vec<PowerUp>,
    pub black_hole: Option<BlackHole>,
    pub point_texts: Vec<PointText>,

    pub spawner: Spawner,
    pub clock: PauseClock,
    pub stats: SessionStats,
    pub effects: ScreenEffects,

    /// Best score known to the host, raised live as the session beats it
    pub high_score: u64,
    pub high_score_beaten: bool,

    /// Collected during a tick, drained by the host
    pub events: Vec<GameEvent>,

    next_id: u32,
}

impl GameState {
    /// A field in attract mode with the starting asteroids drifting
    pub fn new(seed: u64, field: Field, now: f64) -> Self {
        Self::with_tuning(seed, field, Tuning::default(), now)
    }

    pub fn with_tuning(seed: u64, field: Field, tuning: Tuning, now: f64) -> Self {
        let mut state = Self {
            rng: Pcg32::seed_from_u64(seed),
            seed,
            field,
            tuning,
            phase: GamePhase::Attract,
            player: Player::new(field.center()),
            bullets: Vec::new(),
            asteroids: Vec::new(),
            power_ups: Vec::new(),
            black_hole: None,
            point_texts: Vec::new(),
            spawner: Spawner::default(),
            clock: PauseClock::default(),
            stats: SessionStats::default(),
            effects: ScreenEffects::default(),
            high_score: 0,
            high_score_beaten: false,
            events: Vec::new(),
            next_id: 1,
        };
        state.seed_asteroids(now);
        state
    }

    /// Get next unique entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn sound(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound { cue });
    }

    /// Hand the collected events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Seed from the host's stored best score
    pub fn set_high_score(&mut self, high_score: u64) {
        self.high_score = self.high_score.max(high_score);
    }

    /// Canvas resized. Entities in flight keep their positions; only future
    /// boundary checks use the new size.
    pub fn set_field_size(&mut self, width: f32, height: f32) {
        self.field = Field::new(width, height);
    }

    fn seed_asteroids(&mut self, now: f64) {
        for _ in 0..self.tuning.starting_asteroids {
            self.push_asteroid(now);
        }
    }

    fn push_asteroid(&mut self, now: f64) {
        let id = self.next_entity_id();
        let asteroid = Asteroid::spawn(id, &mut self.rng, self.field, now);
        self.asteroids.push(asteroid);
    }

    /// Materialize one asteroid at the field edge
    pub fn spawn_asteroid(&mut self, now: f64) {
        self.push_asteroid(now);
        self.sound(SoundCue::AsteroidSpawn);
    }

    pub fn spawn_power_up(&mut self, kind: PowerUpKind, now: f64) {
        let id = self.next_entity_id();
        let lifetime = self.tuning.powerup_lifetime_ms;
        let power_up = PowerUp::spawn(id, kind, &mut self.rng, self.field, now, lifetime);
        self.power_ups.push(power_up);
        self.sound(SoundCue::PowerUpSpawn);
    }

    pub fn spawn_black_hole(&mut self, now: f64) {
        let id = self.next_entity_id();
        let lifetime = self.tuning.black_hole_lifetime_ms;
        let black_hole = BlackHole::spawn(id, &mut self.rng, self.field, now, lifetime);
        log::info!("Black hole {} spawned at ({:.0}, {:.0})", id, black_hole.pos.x, black_hole.pos.y);
        self.black_hole = Some(black_hole);
        self.sound(SoundCue::BlackHoleSpawn);
    }

    /// Whether the player may be killed yet this session
    pub fn player_vulnerable(&self, now: f64) -> bool {
        match self.stats.start_time {
            Some(start) => now - start > self.tuning.player_grace_ms,
            None => false,
        }
    }

    /// Credit points, float a popup at `at`, and track the high score
    pub fn award(&mut self, points: u64, at: Vec2) {
        if points == 0 {
            return;
        }
        self.stats.score += points;
        self.point_texts.push(PointText::new(at, points));
        self.emit(GameEvent::ScoreChanged {
            score: self.stats.score,
            delta: points,
        });

        if self.stats.score > self.high_score {
            self.high_score = self.stats.score;
            if !self.high_score_beaten {
                self.high_score_beaten = true;
                self.emit(GameEvent::HighScoreBeaten {
                    score: self.stats.score,
                });
            }
        }
    }

    pub fn trigger_shake(&mut self, now: f64) {
        self.effects.shake(now, SHAKE_INTENSITY);
        self.emit(GameEvent::ScreenShake {
            duration_ms: SHAKE_DURATION_MS,
            intensity: SHAKE_INTENSITY,
        });
    }

    pub fn trigger_flash(&mut self, now: f64) {
        self.effects.flash(now);
        self.emit(GameEvent::Flash {
            fade_in_ms: FLASH_FADE_IN_MS,
            hold_ms: FLASH_HOLD_MS,
            fade_out_ms: FLASH_FADE_OUT_MS,
        });
    }

    /// The ship is on the field and intact
    pub fn ship_in_play(&self) -> bool {
        self.phase == GamePhase::Playing && !self.player.exploded
    }

    /// Leave attract mode. Drifting rocks stay in play.
    pub fn start(&mut self, now: f64) {
        if self.phase != GamePhase::Attract {
            return;
        }
        self.begin_session(now);
        log::info!("Game started (seed {})", self.seed);
    }

    /// Reset in place after game over
    pub fn restart(&mut self, now: f64) {
        if self.phase != GamePhase::GameOver {
            return;
        }
        self.bullets.clear();
        self.power_ups.clear();
        self.black_hole = None;
        self.point_texts.clear();
        self.asteroids.clear();
        self.seed_asteroids(now);
        self.begin_session(now);
        log::info!("Game restarted");
    }

    fn begin_session(&mut self, now: f64) {
        self.player.reset(self.field.center());
        self.stats = SessionStats {
            start_time: Some(now),
            ..Default::default()
        };
        self.effects = ScreenEffects::default();
        self.high_score_beaten = false;
        self.spawner.arm(&mut self.rng, now, &self.tuning);
        self.phase = GamePhase::Playing;
        self.sound(SoundCue::GameStart);
    }

    /// The ship's fragments are gone: freeze the timer and report
    pub fn finish(&mut self, now: f64) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.stats.end_time = Some(now);
        self.spawner.disarm();
        log::info!(
            "Game over: score {}, accuracy {:.1}%, {} destroyed, high score {}",
            self.stats.score,
            self.stats.accuracy(),
            self.stats.destroyed,
            self.high_score
        );
        self.emit(GameEvent::GameOver {
            score: self.stats.score,
            high_score: self.high_score,
        });
    }

    /// Freeze the simulation. Returns false if already paused.
    pub fn pause(&mut self, now: f64) -> bool {
        let paused = self.clock.pause(now);
        if paused {
            log::info!("Paused");
        }
        paused
    }

    /// Resume and shift every stored timestamp by the pause duration
    pub fn resume(&mut self, now: f64) -> bool {
        let Some(delta) = self.clock.resume(now) else {
            return false;
        };
        self.shift_time(delta);
        log::info!("Resumed after {:.0} ms", delta);
        true
    }
}

impl TimeShift for GameState {
    fn shift_time(&mut self, delta_ms: f64) {
        self.player.shift_time(delta_ms);
        self.asteroids.shift_time(delta_ms);
        self.power_ups.shift_time(delta_ms);
        self.black_hole.shift_time(delta_ms);
        self.spawner.shift_time(delta_ms);
        self.stats.shift_time(delta_ms);
        self.effects.shift_time(delta_ms);
    }
}

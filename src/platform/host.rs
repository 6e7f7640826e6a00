//! Host session: owns the game, the latched input and the stores
//!
//! Browser and native front ends both drive the game through this type.
//! Held controls persist between frames; start/restart/shoot/spawn requests
//! fire once and are cleared after the tick that consumes them.

use crate::highscores::HighScore;
use crate::persistence::{KeyValueStore, StoreError};
use crate::settings::Settings;
use crate::sim::{Controls, Field, FrameSnapshot, GameEvent, GameState, SoundCue, TickInput, tick};
use crate::tuning::Tuning;

pub struct Host<S: KeyValueStore> {
    state: GameState,
    input: TickInput,
    settings: Settings,
    high_score: HighScore,
    store: S,
}

impl<S: KeyValueStore> Host<S> {
    pub fn new(store: S, seed: u64, field: Field, now: f64) -> Self {
        Self::with_tuning(store, seed, field, Tuning::default(), now)
    }

    pub fn with_tuning(store: S, seed: u64, field: Field, tuning: Tuning, now: f64) -> Self {
        let settings = Settings::load(&store);
        let high_score = HighScore::load(&store);
        let mut state = GameState::with_tuning(seed, field, tuning, now);
        state.set_high_score(high_score.best());
        log::info!(
            "Session ready: seed {}, field {}x{}, high score {}",
            seed,
            field.width,
            field.height,
            high_score.best()
        );
        Self {
            state,
            input: TickInput::default(),
            settings,
            high_score,
            store,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // === Input ===

    pub fn set_controls(&mut self, controls: Controls) {
        self.input.controls = controls;
    }

    pub fn request_shoot(&mut self) {
        self.input.shoot = true;
    }

    pub fn request_start(&mut self) {
        self.input.start = true;
    }

    pub fn request_restart(&mut self) {
        self.input.restart = true;
    }

    pub fn request_asteroid(&mut self) {
        self.input.spawn_asteroid = true;
    }

    /// Run one tick and return the events it produced
    ///
    /// The score is written to the store as soon as it beats the stored best
    /// and again whenever a record run grows; game over flushes it once more.
    pub fn frame(&mut self, now: f64) -> Vec<GameEvent> {
        self.input.zero_gravity = self.settings.zero_gravity;
        tick(&mut self.state, &self.input, now);

        // Paused ticks consume nothing, so keep the requests for later
        if !self.state.is_paused() {
            self.input.shoot = false;
            self.input.start = false;
            self.input.restart = false;
            self.input.spawn_asteroid = false;
        }

        let events = self.state.drain_events();
        for event in &events {
            let score = match event {
                GameEvent::HighScoreBeaten { score } | GameEvent::GameOver { score, .. } => *score,
                GameEvent::ScoreChanged { score, .. } if self.state.high_score_beaten => *score,
                _ => continue,
            };
            self.persist_high_score(score);
        }
        events
    }

    fn persist_high_score(&mut self, score: u64) {
        if let Err(e) = self.high_score.record_if_higher(&mut self.store, score) {
            log::warn!("Failed to store high score: {}", e);
        }
    }

    /// Sound cues from `events` that should actually play
    pub fn audible(&self, events: &[GameEvent]) -> Vec<SoundCue> {
        events.iter().filter_map(|e| self.settings.audible(e)).collect()
    }

    /// Frame snapshot with the ship drawn in the player's chosen color
    pub fn snapshot(&self, now: f64) -> FrameSnapshot {
        let mut snapshot = FrameSnapshot::capture(&self.state, now);
        if let Some(player) = snapshot.player.as_mut() {
            player.color.clone_from(&self.settings.player_color);
        }
        snapshot
    }

    // === Pause ===

    pub fn pause(&mut self, now: f64) -> bool {
        self.state.pause(now)
    }

    pub fn resume(&mut self, now: f64) -> bool {
        self.state.resume(now)
    }

    /// Page hidden pauses, page shown resumes
    pub fn visibility_changed(&mut self, hidden: bool, now: f64) {
        if hidden {
            self.pause(now);
        } else {
            self.resume(now);
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.set_field_size(width, height);
    }

    // === Settings ===

    pub fn set_zero_gravity(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.settings.zero_gravity = enabled;
        self.settings.save(&mut self.store)
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.settings.sound_enabled = enabled;
        self.settings.save(&mut self.store)
    }

    pub fn set_player_color(&mut self, color: &str) -> Result<(), StoreError> {
        self.settings.player_color = color.to_string();
        self.settings.save(&mut self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::GamePhase;
    use glam::Vec2;

    fn host() -> Host<MemoryStore> {
        Host::new(MemoryStore::new(), 11, Field::new(800.0, 600.0), 0.0)
    }

    #[test]
    fn test_start_is_one_shot() {
        let mut host = host();
        host.request_start();
        let events = host.frame(16.0);
        assert_eq!(host.state().phase, GamePhase::Playing);
        assert!(
            host.audible(&events).contains(&SoundCue::GameStart),
            "start should be audible by default"
        );

        // Consumed by the first tick
        host.frame(32.0);
        assert_eq!(host.state().phase, GamePhase::Playing);
        assert!(!host.input.start);
    }

    #[test]
    fn test_requests_survive_pause() {
        let mut host = host();
        host.pause(10.0);
        host.request_start();
        host.frame(20.0);
        assert_eq!(host.state().phase, GamePhase::Attract);

        host.resume(30.0);
        host.frame(40.0);
        assert_eq!(host.state().phase, GamePhase::Playing);
    }

    #[test]
    fn test_game_over_records_high_score() {
        let mut host = host();
        host.request_start();
        host.frame(16.0);

        host.state_mut().stats.score = 1234;
        host.state_mut().finish(5000.0);
        host.frame(5016.0);

        assert_eq!(host.high_score(), 1234);
        assert_eq!(HighScore::read(host.store()).unwrap(), 1234);
    }

    #[test]
    fn test_record_run_is_stored_mid_session() {
        let mut store = MemoryStore::new();
        store.set("highScore", "100").unwrap();
        let mut host = Host::new(store, 3, Field::new(800.0, 600.0), 0.0);
        host.request_start();
        host.frame(0.0);

        host.state_mut().award(250, Vec2::ZERO);
        host.frame(16.0);
        assert!(host.state().high_score_beaten);
        assert_eq!(HighScore::read(host.store()).unwrap(), 250);

        // Later points keep the stored record current
        host.state_mut().award(50, Vec2::ZERO);
        host.frame(32.0);
        assert_eq!(HighScore::read(host.store()).unwrap(), 300);
        assert_eq!(host.high_score(), 300);
    }

    #[test]
    fn test_stored_high_score_seeds_state() {
        let mut store = MemoryStore::new();
        store.set("highScore", "900").unwrap();
        let host = Host::new(store, 1, Field::new(800.0, 600.0), 0.0);
        assert_eq!(host.high_score(), 900);
        assert_eq!(host.state().high_score, 900);
    }

    #[test]
    fn test_settings_persist_and_mute() {
        let mut host = host();
        host.set_zero_gravity(true).unwrap();
        host.set_sound_enabled(false).unwrap();
        host.set_player_color("#ff00ff").unwrap();

        host.request_start();
        let events = host.frame(16.0);
        assert!(host.input.zero_gravity);
        assert!(host.audible(&events).is_empty());

        let reloaded = Settings::load(host.store());
        assert!(reloaded.zero_gravity);
        assert!(!reloaded.sound_enabled);
        assert_eq!(reloaded.player_color, "#ff00ff");
    }

    #[test]
    fn test_snapshot_uses_chosen_color() {
        let mut host = host();
        host.set_player_color("#12ab34").unwrap();
        host.request_start();
        host.frame(16.0);

        let snapshot = host.snapshot(32.0);
        let player = snapshot.player.as_ref().unwrap();
        assert_eq!(player.color, "#12ab34");
    }

    #[test]
    fn test_visibility_pauses_and_shifts() {
        let mut host = host();
        host.request_start();
        host.frame(0.0);
        let start = host.state().stats.start_time;

        host.visibility_changed(true, 1000.0);
        assert!(host.state().is_paused());
        host.visibility_changed(false, 4000.0);
        assert!(!host.state().is_paused());
        assert_eq!(host.state().stats.start_time, start.map(|t| t + 3000.0));
    }
}

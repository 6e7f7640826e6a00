//! Browser bindings
//!
//! JS owns the canvas, audio and animation loop. It calls `frame()` once per
//! `requestAnimationFrame`, then reads the snapshot and the queued events.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::persistence::{KeyValueStore, LocalStorageStore, MemoryStore, StoreError};
use crate::sim::{Controls, Field, GameEvent, SoundCue};

use super::host::Host;
use super::time::now_ms;

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
    }
    log::info!("Astro Drift starting...");
}

/// LocalStorage when the browser allows it, memory otherwise (private mode)
enum BrowserStore {
    Local(LocalStorageStore),
    Memory(MemoryStore),
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            BrowserStore::Local(store) => store.get(key),
            BrowserStore::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            BrowserStore::Local(store) => store.set(key, value),
            BrowserStore::Memory(store) => store.set(key, value),
        }
    }
}

struct Session {
    host: Host<BrowserStore>,
    events: Vec<GameEvent>,
    sounds: Vec<SoundCue>,
}

#[wasm_bindgen]
pub struct WebGame {
    session: Rc<RefCell<Session>>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebGame {
        let store = match LocalStorageStore::open() {
            Ok(store) => BrowserStore::Local(store),
            Err(e) => {
                log::warn!("Storage unavailable, nothing will persist: {}", e);
                BrowserStore::Memory(MemoryStore::new())
            }
        };
        let now = now_ms();
        let seed = now as u64;
        let session = Session {
            host: Host::new(store, seed, Field::new(width, height), now),
            events: Vec::new(),
            sounds: Vec::new(),
        };
        let game = WebGame {
            session: Rc::new(RefCell::new(session)),
        };
        game.install_auto_pause();
        game
    }

    /// Advance one frame; events and sounds queue until drained
    pub fn frame(&self) {
        let mut s = self.session.borrow_mut();
        let events = s.host.frame(now_ms());
        let sounds = s.host.audible(&events);
        s.sounds.extend(sounds);
        s.events.extend(
            events
                .into_iter()
                .filter(|e| !matches!(e, GameEvent::Sound { .. })),
        );
    }

    pub fn set_keys(&self, left: bool, right: bool, thrust: bool, reverse: bool) {
        self.session.borrow_mut().host.set_controls(Controls::Keys {
            left,
            right,
            thrust,
            reverse,
        });
    }

    /// Stick deflection in -1..1 on both axes
    pub fn set_joystick(&self, x: f32, y: f32) {
        self.session.borrow_mut().host.set_controls(Controls::Joystick {
            dir: Vec2::new(x, y),
        });
    }

    pub fn shoot(&self) {
        self.session.borrow_mut().host.request_shoot();
    }

    pub fn start_game(&self) {
        self.session.borrow_mut().host.request_start();
    }

    pub fn restart(&self) {
        self.session.borrow_mut().host.request_restart();
    }

    pub fn spawn_asteroid(&self) {
        self.session.borrow_mut().host.request_asteroid();
    }

    pub fn pause(&self) {
        self.session.borrow_mut().host.pause(now_ms());
    }

    pub fn resume(&self) {
        self.session.borrow_mut().host.resume(now_ms());
    }

    pub fn toggle_pause(&self) {
        let mut s = self.session.borrow_mut();
        crate::sim::toggle_pause(s.host.state_mut(), now_ms());
    }

    pub fn is_paused(&self) -> bool {
        self.session.borrow().host.state().is_paused()
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.session.borrow_mut().host.resize(width, height);
    }

    pub fn high_score(&self) -> f64 {
        self.session.borrow().host.high_score() as f64
    }

    // === Settings ===

    pub fn set_zero_gravity(&self, enabled: bool) {
        if let Err(e) = self.session.borrow_mut().host.set_zero_gravity(enabled) {
            log::error!("Failed to save settings: {}", e);
        }
    }

    pub fn set_sound_enabled(&self, enabled: bool) {
        if let Err(e) = self.session.borrow_mut().host.set_sound_enabled(enabled) {
            log::error!("Failed to save settings: {}", e);
        }
    }

    pub fn set_player_color(&self, color: &str) {
        if let Err(e) = self.session.borrow_mut().host.set_player_color(color) {
            log::error!("Failed to save settings: {}", e);
        }
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.borrow().host.settings())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // === Output ===

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.session
            .borrow()
            .host
            .snapshot(now_ms())
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Non-sound events since the last drain, as a JSON array
    pub fn drain_events_json(&self) -> Result<String, JsValue> {
        let events = std::mem::take(&mut self.session.borrow_mut().events);
        serde_json::to_string(&events).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Cue names to play, already filtered by the sound setting
    pub fn drain_sounds(&self) -> js_sys::Array {
        let sounds = std::mem::take(&mut self.session.borrow_mut().sounds);
        sounds
            .into_iter()
            .map(|cue| JsValue::from_str(cue.name()))
            .collect()
    }
}

impl WebGame {
    /// Pause when the tab is hidden, resume (shifting timers) when shown
    fn install_auto_pause(&self) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::warn!("No document; auto-pause disabled");
            return;
        };

        let session = self.session.clone();
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let hidden = doc.visibility_state() == web_sys::VisibilityState::Hidden;
            session.borrow_mut().host.visibility_changed(hidden, now_ms());
        });
        if let Err(e) = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())
        {
            log::error!("Failed to install visibility handler: {:?}", e);
        }
        closure.forget();
    }
}

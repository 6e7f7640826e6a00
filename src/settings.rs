//! Player preferences
//!
//! Persisted as one JSON document, separately from the high score.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StoreError};
use crate::sim::entities::PLAYER_COLOR;
use crate::sim::{GameEvent, SoundCue};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Direct-acceleration controls and a weaker black hole
    pub zero_gravity: bool,
    /// Whether sound cues are played at all
    pub sound_enabled: bool,
    /// Ship color picked by the player (CSS color string)
    pub player_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zero_gravity: false,
            sound_enabled: true,
            player_color: PLAYER_COLOR.to_string(),
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "astro_drift_settings";

    /// Read stored settings; `None` if nothing was saved yet
    pub fn try_load(store: &impl KeyValueStore) -> Result<Option<Self>, StoreError> {
        match store.get(Self::STORAGE_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Stored settings, or defaults when missing or unreadable
    pub fn load(store: &impl KeyValueStore) -> Self {
        match Self::try_load(store) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// The cue to play for `event`, if sound is on
    pub fn audible(&self, event: &GameEvent) -> Option<SoundCue> {
        match event {
            GameEvent::Sound { cue } if self.sound_enabled => Some(*cue),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_missing_settings_use_defaults() {
        let store = MemoryStore::new();
        assert_eq!(Settings::try_load(&store).unwrap(), None);
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            zero_gravity: true,
            sound_enabled: false,
            player_color: "#FF00FF".into(),
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_corrupt_settings_fall_back() {
        let mut store = MemoryStore::new();
        store.set("astro_drift_settings", "{ nope").unwrap();
        assert!(Settings::try_load(&store).is_err());
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let mut store = MemoryStore::new();
        store.set("astro_drift_settings", r#"{"zero_gravity":true}"#).unwrap();
        let settings = Settings::load(&store);
        assert!(settings.zero_gravity);
        assert!(settings.sound_enabled);
    }

    #[test]
    fn test_muted_settings_drop_cues() {
        let shoot = GameEvent::Sound { cue: SoundCue::Shoot };
        let muted = Settings {
            sound_enabled: false,
            ..Default::default()
        };
        assert_eq!(Settings::default().audible(&shoot), Some(SoundCue::Shoot));
        assert_eq!(muted.audible(&shoot), None);
        assert_eq!(
            Settings::default().audible(&GameEvent::ScoreChanged { score: 1, delta: 1 }),
            None
        );
    }
}

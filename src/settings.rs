//! Game settings and preferences
//!
//! Stored as JSON: a file on native, LocalStorage on the web.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;

/// Durations for every timed transition, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Goblin motion period
    pub goblin_tick_ms: u64,
    /// Goblin proximity audio sampling period
    pub proximity_sample_ms: u64,
    /// Death cue length before the level restarts
    pub death_restart_ms: u64,
    /// Win cue length before the next level
    pub win_continue_ms: u64,
    /// Hear cue length; further hear requests are ignored meanwhile
    pub hear_cue_ms: u64,
    /// Trap countdown tick period
    pub trap_tick_ms: u64,
    /// Maximum gap between the two taps of a backstab
    pub double_tap_window_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            goblin_tick_ms: GOBLIN_TICK_MS,
            proximity_sample_ms: PROXIMITY_SAMPLE_MS,
            death_restart_ms: DEATH_RESTART_MS,
            win_continue_ms: WIN_CONTINUE_MS,
            hear_cue_ms: HEAR_CUE_MS,
            trap_tick_ms: TRAP_TICK_MS,
            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Mute all cues
    pub muted: bool,

    // === Haptics ===
    /// Vibrate alongside cues
    pub haptics: bool,

    // === Gameplay ===
    /// Traps per level
    pub trap_count: usize,
    /// Generate the next level automatically after a win
    pub auto_advance: bool,

    pub timing: Timing,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            muted: false,
            haptics: true,
            trap_count: DEFAULT_TRAP_COUNT,
            auto_advance: true,
            timing: Timing::default(),
        }
    }
}

impl Settings {
    /// Reject values the runtime cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(SettingsError::Invalid(format!(
                "master_volume {} outside [0, 1]",
                self.master_volume
            )));
        }
        let t = &self.timing;
        let periods = [
            ("goblin_tick_ms", t.goblin_tick_ms),
            ("proximity_sample_ms", t.proximity_sample_ms),
            ("trap_tick_ms", t.trap_tick_ms),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, ms)| *ms == 0) {
            return Err(SettingsError::Invalid(format!("{name} must be non-zero")));
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Effective cue gain (respects mute)
    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Default settings file name (native)
    pub const FILE_NAME: &'static str = "settings.json";

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "echo_maze_settings";

    /// Load settings from a file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save settings to a file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load `settings.json` from the working directory, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let path = std::path::Path::new(Self::FILE_NAME);
        if !path.exists() {
            log::info!("Using default settings");
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }
}

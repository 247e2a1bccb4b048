//! Browser entry points
//!
//! The page's gesture layer classifies touches and calls into `WebGame`;
//! the page's `requestAnimationFrame` loop calls `frame` with its timestamp.

use wasm_bindgen::prelude::*;

use crate::audio::WebFeedback;
use crate::runtime::GameRuntime;
use crate::settings::Settings;
use crate::sim::{Direction, FingerCount, GameStatus, Gesture, Input};

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Echo Maze starting...");
}

/// Game instance owned by the page
#[wasm_bindgen]
pub struct WebGame {
    runtime: GameRuntime<WebFeedback>,
    /// Last frame timestamp (ms), None before the first frame
    last_time: Option<f64>,
    /// Sub-millisecond remainder carried between frames
    carry: f64,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let settings = Settings::load();
        let mut feedback = WebFeedback::new();
        feedback.configure(&settings);

        let seed = js_sys::Date::now() as u64;
        log::info!("Game initialized with seed: {}", seed);
        WebGame {
            runtime: GameRuntime::new(seed, settings, feedback),
            last_time: None,
            carry: 0.0,
        }
    }

    /// Swipe with one (hear) or two (move) fingers
    pub fn swipe(&mut self, direction: &str, fingers: u8) {
        let (Some(direction), Some(fingers)) =
            (Direction::from_str(direction), FingerCount::from_count(fingers))
        else {
            log::debug!("Unrecognised swipe {} x{}", direction, fingers);
            return;
        };
        self.runtime.feedback().resume();
        self.runtime
            .handle(Input::from(Gesture::Swipe { direction, fingers }));
    }

    pub fn tap(&mut self) {
        self.runtime.feedback().resume();
        self.runtime.handle(Input::from(Gesture::Tap));
    }

    /// Advance to the page's animation-frame timestamp
    pub fn frame(&mut self, time: f64) {
        let Some(last) = self.last_time.replace(time) else {
            return;
        };
        // Cap long gaps (tab in background) so timers don't all fire at once
        let elapsed = (time - last).clamp(0.0, 250.0) + self.carry;
        let whole = elapsed.floor();
        self.carry = elapsed - whole;
        self.runtime.update(whole as u64);
    }

    pub fn restart(&mut self) {
        self.runtime.restart_level();
    }

    /// Continue after a win when auto-advance is off
    #[wasm_bindgen(js_name = nextLevel)]
    pub fn next_level(&mut self) -> bool {
        self.runtime.continue_to_next_level()
    }

    pub fn level(&self) -> u32 {
        self.runtime.state().level
    }

    pub fn status(&self) -> String {
        match self.runtime.state().status {
            GameStatus::Playing => "playing",
            GameStatus::Dead => "dead",
            GameStatus::Won => "won",
        }
        .to_string()
    }

    /// Session stats as JSON
    pub fn stats(&self) -> String {
        serde_json::to_string(&self.runtime.stats()).unwrap_or_default()
    }

    /// Toggle mute and persist it
    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&mut self, muted: bool) {
        let mut settings = self.runtime.settings().clone();
        settings.muted = muted;
        settings.save();
        self.runtime.feedback_mut().configure(&settings);
        self.runtime.update_settings(settings);
    }

    pub fn shutdown(&mut self) {
        self.runtime.shutdown();
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}

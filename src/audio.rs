//! Audio system using Web Audio API
//!
//! Procedurally generated cues - no external files needed! Haptics go
//! through `navigator.vibrate`.

use std::collections::HashMap;

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::error::FeedbackError;
use crate::feedback::{Cue, Feedback, Haptic, Volume};

/// A looping tone whose gain can be changed while it plays
struct Loop {
    osc: OscillatorNode,
    gain: GainNode,
}

impl Loop {
    fn stop(self) {
        self.osc.stop().ok();
        self.osc.disconnect().ok();
        self.gain.disconnect().ok();
    }
}

/// Web Audio + vibration feedback for the browser build
pub struct WebFeedback {
    ctx: Option<AudioContext>,
    /// Master gain after mute
    volume: f32,
    haptics: bool,
    /// Per-goblin growl loops
    goblins: HashMap<u32, Loop>,
    /// Trap alarm loop
    trap: Option<Loop>,
}

impl Default for WebFeedback {
    fn default() -> Self {
        Self::new()
    }
}

impl WebFeedback {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: 0.8,
            haptics: true,
            goblins: HashMap::new(),
            trap: None,
        }
    }

    /// Apply user settings
    pub fn configure(&mut self, settings: &crate::Settings) {
        self.volume = settings.effective_volume().clamp(0.0, 1.0);
        self.haptics = settings.haptics;
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    fn context(&self) -> Result<&AudioContext, FeedbackError> {
        let ctx = self.ctx.as_ref().ok_or(FeedbackError::Unavailable)?;
        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Ok(ctx)
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Short enveloped tone starting `delay` seconds from now
    fn blip(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
        vol: f32,
        delay: f64,
        len: f64,
    ) {
        let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
            return;
        };
        let t = ctx.current_time() + delay;
        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + len)
            .ok();
        osc.start_with_when(t).ok();
        osc.stop_with_when(t + len + 0.05).ok();
    }

    /// Frequency sweep from `from` to `to` over `len` seconds
    fn sweep(
        &self,
        ctx: &AudioContext,
        from: f32,
        to: f32,
        osc_type: OscillatorType,
        vol: f32,
        len: f64,
    ) {
        let Some((osc, gain)) = self.create_osc(ctx, from, osc_type) else {
            return;
        };
        let t = ctx.current_time();
        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + len)
            .ok();
        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(to, t + len)
            .ok();
        osc.start().ok();
        osc.stop_with_when(t + len + 0.05).ok();
    }

    fn start_loop(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
        vol: f32,
    ) -> Option<Loop> {
        let (osc, gain) = self.create_osc(ctx, freq, osc_type)?;
        gain.gain().set_value(vol);
        osc.start().ok()?;
        Some(Loop { osc, gain })
    }

    // === Cue generators ===

    fn play_with(&mut self, ctx: &AudioContext, cue: Cue, vol: f32) {
        match cue {
            // Soft inhale before the answer
            Cue::HearAmbient => {
                self.sweep(ctx, 200.0, 320.0, OscillatorType::Sine, vol * 0.15, 0.15)
            }
            // Hollow falling whistle: nothing there
            Cue::Wind => {
                self.sweep(ctx, 900.0, 250.0, OscillatorType::Triangle, vol * 0.2, 0.45)
            }
            // Resonant echo: open path
            Cue::Cave => {
                for i in 0..3 {
                    let fade = 0.3 / (i as f32 + 1.0);
                    self.blip(ctx, 220.0, OscillatorType::Sine, vol * fade, i as f64 * 0.12, 0.2);
                }
            }
            Cue::Step => self.sweep(ctx, 150.0, 60.0, OscillatorType::Sine, vol * 0.5, 0.1),
            Cue::Death => {
                for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
                    self.blip(ctx, *freq, OscillatorType::Sine, vol * 0.3, i as f64 * 0.2, 0.3);
                }
            }
            Cue::Win => {
                for (i, freq) in [400.0, 500.0, 600.0, 800.0].iter().enumerate() {
                    self.blip(ctx, *freq, OscillatorType::Triangle, vol * 0.3, i as f64 * 0.1, 0.4);
                }
            }
            // Higher pitch as time runs out
            Cue::Countdown { remaining } => {
                let freq = 1200.0 - remaining as f32 * 120.0;
                self.blip(ctx, freq, OscillatorType::Square, vol * 0.2, 0.0, 0.08);
            }
            Cue::Attack => {
                self.blip(ctx, 1500.0, OscillatorType::Square, vol * 0.2, 0.0, 0.1);
                self.sweep(ctx, 100.0, 30.0, OscillatorType::Sawtooth, vol * 0.5, 0.4);
            }
            Cue::LevelStart => {
                for (i, freq) in [300.0, 450.0].iter().enumerate() {
                    let delay = i as f64 * 0.12;
                    self.blip(ctx, *freq, OscillatorType::Triangle, vol * 0.25, delay, 0.2);
                }
            }
            Cue::TrapLoopStart => {
                if let Some(old) = self.trap.take() {
                    old.stop();
                }
                self.trap = self.start_loop(ctx, 90.0, OscillatorType::Sawtooth, vol * 0.15);
            }
            Cue::TrapLoopStop => {
                if let Some(old) = self.trap.take() {
                    old.stop();
                }
            }
        }
    }
}

impl Feedback for WebFeedback {
    fn play_cue(&mut self, cue: Cue) -> Result<(), FeedbackError> {
        let vol = self.volume;
        // Loop stops must go through even when silent
        if vol <= 0.0 && cue != Cue::TrapLoopStop {
            return Ok(());
        }
        let ctx = self.context()?.clone();
        self.play_with(&ctx, cue, vol);
        Ok(())
    }

    fn set_goblin_volume(&mut self, goblin_id: u32, volume: Volume) -> Result<(), FeedbackError> {
        let gain = volume.get() * self.volume * 0.3;
        if let Some(growl) = self.goblins.get(&goblin_id) {
            growl.gain.gain().set_value(gain);
            return Ok(());
        }

        let ctx = self.context()?.clone();
        // Each goblin gets a slightly different low growl
        let freq = 70.0 + (goblin_id % 5) as f32 * 9.0;
        let growl = self
            .start_loop(&ctx, freq, OscillatorType::Sawtooth, gain)
            .ok_or_else(|| FeedbackError::Playback("could not start goblin loop".into()))?;
        self.goblins.insert(goblin_id, growl);
        Ok(())
    }

    fn stop_goblin_cue(&mut self, goblin_id: u32) -> Result<(), FeedbackError> {
        if let Some(growl) = self.goblins.remove(&goblin_id) {
            growl.stop();
        }
        Ok(())
    }

    fn haptic(&mut self, kind: Haptic) -> Result<(), FeedbackError> {
        if !self.haptics {
            return Ok(());
        }
        let navigator = web_sys::window()
            .ok_or(FeedbackError::Unavailable)?
            .navigator();
        let ms = match kind {
            Haptic::LightImpact => 15,
            Haptic::Success => 60,
            Haptic::Error => 200,
        };
        navigator.vibrate_with_duration(ms);
        Ok(())
    }
}

//! Audio and haptic feedback interface
//!
//! The game is played without a screen, so every state change the player
//! needs to know about goes out through a `Feedback` implementation. Calls are
//! best-effort: a failing backend never changes the outcome of an action.

use crate::consts::MAX_AUDIBLE_DISTANCE;
use crate::error::FeedbackError;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Start of a hear probe
    HearAmbient,
    /// Hear probe found no way through (wall or edge)
    Wind,
    /// Hear probe found an open path
    Cave,
    /// Player stepped to a new cell
    Step,
    /// Player died (fall, ambush or trap)
    Death,
    /// Player reached the exit
    Win,
    /// Trap countdown tick, `remaining` seconds left
    Countdown { remaining: u32 },
    /// Goblin backstabbed
    Attack,
    /// Level started or restarted
    LevelStart,
    /// Player stepped onto a trap
    TrapLoopStart,
    /// Trap countdown cancelled or run out
    TrapLoopStop,
}

/// Haptic pulse types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haptic {
    LightImpact,
    Success,
    Error,
}

/// Gain in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Volume(f32);

impl Volume {
    pub const SILENT: Volume = Volume(0.0);
    pub const FULL: Volume = Volume(1.0);

    pub fn new(value: f32) -> Result<Self, FeedbackError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(FeedbackError::VolumeOutOfRange(value))
        }
    }

    /// Clamp into range (NaN becomes silent)
    pub fn clamped(value: f32) -> Self {
        if value.is_nan() {
            Self::SILENT
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// Linear fade: full at distance 0, silent at `MAX_AUDIBLE_DISTANCE` and beyond
    pub fn from_distance(distance: u32) -> Self {
        Self::clamped(1.0 - distance as f32 / MAX_AUDIBLE_DISTANCE)
    }

    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }

    #[inline]
    pub fn is_silent(self) -> bool {
        self.0 <= 0.0
    }
}

/// Output collaborator for cues, goblin proximity audio and haptics
pub trait Feedback {
    fn play_cue(&mut self, cue: Cue) -> Result<(), FeedbackError>;

    /// Start or update the looping cue for one goblin
    fn set_goblin_volume(&mut self, goblin_id: u32, volume: Volume) -> Result<(), FeedbackError>;

    fn stop_goblin_cue(&mut self, goblin_id: u32) -> Result<(), FeedbackError>;

    fn haptic(&mut self, kind: Haptic) -> Result<(), FeedbackError>;
}

impl<F: Feedback + ?Sized> Feedback for Box<F> {
    fn play_cue(&mut self, cue: Cue) -> Result<(), FeedbackError> {
        (**self).play_cue(cue)
    }

    fn set_goblin_volume(&mut self, goblin_id: u32, volume: Volume) -> Result<(), FeedbackError> {
        (**self).set_goblin_volume(goblin_id, volume)
    }

    fn stop_goblin_cue(&mut self, goblin_id: u32) -> Result<(), FeedbackError> {
        (**self).stop_goblin_cue(goblin_id)
    }

    fn haptic(&mut self, kind: Haptic) -> Result<(), FeedbackError> {
        (**self).haptic(kind)
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeedback;

impl Feedback for NullFeedback {
    fn play_cue(&mut self, _cue: Cue) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn set_goblin_volume(&mut self, _goblin_id: u32, _volume: Volume) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn stop_goblin_cue(&mut self, _goblin_id: u32) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn haptic(&mut self, _kind: Haptic) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// Writes cues to the log (native console driver)
#[derive(Debug, Default)]
pub struct LogFeedback {
    /// Last volume reported per goblin, to log only changes
    goblin_volumes: Vec<(u32, f32)>,
}

impl LogFeedback {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Feedback for LogFeedback {
    fn play_cue(&mut self, cue: Cue) -> Result<(), FeedbackError> {
        log::info!("[cue] {:?}", cue);
        Ok(())
    }

    fn set_goblin_volume(&mut self, goblin_id: u32, volume: Volume) -> Result<(), FeedbackError> {
        match self.goblin_volumes.iter_mut().find(|(id, _)| *id == goblin_id) {
            Some((_, last)) if (*last - volume.get()).abs() < f32::EPSILON => {}
            Some((_, last)) => {
                *last = volume.get();
                log::info!("[goblin {}] volume {:.2}", goblin_id, volume.get());
            }
            None => {
                self.goblin_volumes.push((goblin_id, volume.get()));
                log::info!("[goblin {}] audible, volume {:.2}", goblin_id, volume.get());
            }
        }
        Ok(())
    }

    fn stop_goblin_cue(&mut self, goblin_id: u32) -> Result<(), FeedbackError> {
        self.goblin_volumes.retain(|(id, _)| *id != goblin_id);
        log::info!("[goblin {}] silent", goblin_id);
        Ok(())
    }

    fn haptic(&mut self, kind: Haptic) -> Result<(), FeedbackError> {
        log::debug!("[haptic] {:?}", kind);
        Ok(())
    }
}

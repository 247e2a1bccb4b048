//! Error types
//!
//! Game rule outcomes (falls, ambushes, traps) are not errors; these cover
//! collaborator and configuration failures only.

/// A cue, volume or haptic request the output backend could not honour.
/// The runtime logs these and carries on.
#[derive(thiserror::Error, Debug)]
pub enum FeedbackError {
    /// No audio/haptic device available
    #[error("feedback backend unavailable")]
    Unavailable,

    /// Volume outside [0, 1] or not finite
    #[error("volume {0} outside [0, 1]")]
    VolumeOutOfRange(f32),

    /// Backend rejected the request
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Settings could not be loaded or are invalid
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Parsed but out of range
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

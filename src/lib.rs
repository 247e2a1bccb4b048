//! Echo Maze - navigate a hidden maze by sound and touch
//!
//! Core modules:
//! - `sim`: Deterministic simulation (maze generation, goblins, action rules)
//! - `runtime`: Session driver (timers, trap countdown, cue dispatch)
//! - `feedback`: Audio/haptic collaborator interface
//! - `settings`: User preferences and timing overrides

pub mod error;
pub mod feedback;
pub mod runtime;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{FeedbackError, SettingsError};
pub use feedback::{Cue, Feedback, Haptic, LogFeedback, NullFeedback, Volume};
pub use runtime::{GameRuntime, SessionStats};
pub use settings::{Settings, Timing};

/// Game configuration constants
pub mod consts {
    /// Maze is always GRID_SIZE x GRID_SIZE cells
    pub const GRID_SIZE: i32 = 10;
    /// Minimum Manhattan distance between start and end
    pub const MIN_START_END_DISTANCE: u32 = 5;

    /// Room carving: at most this many 2x2 rooms per maze
    pub const MAX_ROOMS: u32 = 3;
    /// Room carving: chance per carve step
    pub const ROOM_CHANCE: f64 = 0.12;
    /// Room carving: minimum distance from start (inclusive) and end (exclusive)
    pub const ROOM_MIN_END_DISTANCE: u32 = 5;
    /// Room carving: cells kept free between a room and the grid edge
    pub const ROOM_EDGE_CLEARANCE: i32 = 2;

    /// Turn bias after two straight moves (best turn vs random turn)
    pub const TURN_TOWARD_GOAL_CHANCE: f64 = 0.6;
    /// Greedy bias otherwise (greedy vs fully random)
    pub const GREEDY_CHANCE: f64 = 0.4;

    /// Default number of traps per level
    pub const DEFAULT_TRAP_COUNT: usize = 3;
    /// Maximum goblins per level (count is uniform in 0..=MAX_GOBLINS)
    pub const MAX_GOBLINS: usize = 2;

    /// Trap countdown length in ticks (one tick per second)
    pub const TRAP_COUNTDOWN_TICKS: u32 = 5;
    /// Trap countdown tick period
    pub const TRAP_TICK_MS: u64 = 1000;
    /// Goblin motion period
    pub const GOBLIN_TICK_MS: u64 = 2000;
    /// Goblin proximity audio sampling period
    pub const PROXIMITY_SAMPLE_MS: u64 = 100;
    /// Second tap must land within this window to count as a backstab
    pub const DOUBLE_TAP_WINDOW_MS: u64 = 300;
    /// Goblins farther than this are silent
    pub const MAX_AUDIBLE_DISTANCE: f32 = 3.0;

    /// Death cue length before the level restarts
    pub const DEATH_RESTART_MS: u64 = 1500;
    /// Win cue length before the next level is generated
    pub const WIN_CONTINUE_MS: u64 = 2500;
    /// Hear cue length (hear requests are ignored while it plays)
    pub const HEAR_CUE_MS: u64 = 600;
}

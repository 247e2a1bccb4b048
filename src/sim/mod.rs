//! Deterministic simulation module
//!
//! All gameplay rules live here. This module must be pure and deterministic:
//! - Seeded RNG only, passed in by the caller
//! - No clocks or timers (the runtime owns time)
//! - Stable iteration order (goblins by ID)
//! - No audio or platform dependencies

pub mod actions;
pub mod generate;
pub mod goblin;
pub mod grid;
pub mod input;
pub mod placement;
pub mod state;

pub use actions::{
    BackstabOutcome, DeathCause, MoveOutcome, ambusher, apply_backstab, apply_move,
    resolve_backstab, resolve_hear, resolve_move,
};
pub use generate::{Maze, generate};
pub use goblin::{Goblin, advance};
pub use grid::{Cell, Direction, Grid, Position, Probe};
pub use input::{FingerCount, Gesture, Input};
pub use placement::{place_goblins, place_traps};
pub use state::{GameState, GameStatus};

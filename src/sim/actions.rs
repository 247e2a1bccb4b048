//! Player action rules
//!
//! Each `resolve_*` function reads a state snapshot and decides what the
//! action does without touching it. `apply_*` commits a decision. The runtime
//! resolves and applies back to back, so a goblin tick can never slip in
//! between the decision and the state it was made against.

use serde::{Deserialize, Serialize};

use super::goblin::Goblin;
use super::grid::{Direction, Position, Probe};
use super::state::{GameState, GameStatus};

/// Why the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Walked into a wall or off the edge
    Fall,
    /// Moved or attacked while a goblin was stepping onto them
    Ambush,
    /// Trap countdown ran out
    Trap,
}

/// Result of a move request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Not playing; nothing happens
    Ignored,
    Died(DeathCause),
    Moved {
        to: Position,
        /// Player stood on a trap before the move
        left_trap: bool,
        /// Destination is a trap
        entered_trap: bool,
        /// Destination is the exit
        reached_end: bool,
    },
}

/// Result of a backstab (double tap)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackstabOutcome {
    Ignored,
    Died(DeathCause),
    Killed { goblin_id: u32 },
    /// Nobody to stab
    Missed,
}

/// First goblin (by id) about to step onto the player
pub fn ambusher(state: &GameState) -> Option<&Goblin> {
    state.goblins.iter().find(|g| g.is_ambushing(state.player))
}

/// Classify the cell next to the player. Read-only.
pub fn resolve_hear(state: &GameState, dir: Direction) -> Probe {
    state.grid.probe(state.player, dir)
}

pub fn resolve_move(state: &GameState, dir: Direction) -> MoveOutcome {
    if !state.is_playing() {
        return MoveOutcome::Ignored;
    }

    let to = state.player.step(dir);
    if !state.grid.is_path(to) {
        return MoveOutcome::Died(DeathCause::Fall);
    }
    if let Some(goblin) = ambusher(state) {
        log::debug!("Goblin {} ambushes player at {:?}", goblin.id, state.player);
        return MoveOutcome::Died(DeathCause::Ambush);
    }

    MoveOutcome::Moved {
        to,
        left_trap: state.is_trap(state.player),
        entered_trap: state.is_trap(to),
        reached_end: to == state.end,
    }
}

pub fn resolve_backstab(state: &GameState) -> BackstabOutcome {
    if !state.is_playing() {
        return BackstabOutcome::Ignored;
    }
    if ambusher(state).is_some() {
        return BackstabOutcome::Died(DeathCause::Ambush);
    }

    state
        .goblins
        .iter()
        .find(|g| g.is_walking_away(state.player))
        .map_or(BackstabOutcome::Missed, |g| BackstabOutcome::Killed {
            goblin_id: g.id,
        })
}

/// Commit a move decision
pub fn apply_move(state: &mut GameState, outcome: MoveOutcome) {
    match outcome {
        MoveOutcome::Ignored => {}
        MoveOutcome::Died(_) => state.status = GameStatus::Dead,
        MoveOutcome::Moved {
            to, reached_end, ..
        } => {
            state.player = to;
            if reached_end {
                state.status = GameStatus::Won;
            }
        }
    }
}

/// Commit a backstab decision
pub fn apply_backstab(state: &mut GameState, outcome: BackstabOutcome) {
    match outcome {
        BackstabOutcome::Died(_) => state.status = GameStatus::Dead,
        BackstabOutcome::Killed { goblin_id } => {
            state.remove_goblin(goblin_id);
        }
        BackstabOutcome::Ignored | BackstabOutcome::Missed => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Grid;

    /// Corridor along the top row, exit at the right end
    fn corridor() -> GameState {
        GameState::with_layout(
            Grid::from_rows(&["......"]),
            Position::new(0, 0),
            Position::new(5, 0),
        )
    }

    #[test]
    fn test_move_into_edge_is_fatal() {
        let state = corridor();
        assert_eq!(
            resolve_move(&state, Direction::Up),
            MoveOutcome::Died(DeathCause::Fall)
        );
        assert_eq!(
            resolve_move(&state, Direction::Down),
            MoveOutcome::Died(DeathCause::Fall)
        );
    }

    #[test]
    fn test_move_along_path() {
        let mut state = corridor();
        state.traps.push(Position::new(1, 0));
        let outcome = resolve_move(&state, Direction::Right);
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                to: Position::new(1, 0),
                left_trap: false,
                entered_trap: true,
                reached_end: false,
            }
        );
        apply_move(&mut state, outcome);
        assert_eq!(state.player, Position::new(1, 0));
        assert_eq!(state.status, GameStatus::Playing);
    }

    #[test]
    fn test_ambush_beats_valid_move() {
        let mut state = corridor();
        state.player = Position::new(2, 0);
        state.spawn_goblin(Position::new(3, 0), Direction::Left);
        assert_eq!(
            resolve_move(&state, Direction::Left),
            MoveOutcome::Died(DeathCause::Ambush)
        );
        assert_eq!(
            resolve_backstab(&state),
            BackstabOutcome::Died(DeathCause::Ambush)
        );
    }

    #[test]
    fn test_backstab_retreating_goblin() {
        let mut state = corridor();
        state.player = Position::new(2, 0);
        let id = state.spawn_goblin(Position::new(3, 0), Direction::Right);
        let outcome = resolve_backstab(&state);
        assert_eq!(outcome, BackstabOutcome::Killed { goblin_id: id });
        apply_backstab(&mut state, outcome);
        assert!(state.goblins.is_empty());
        assert!(state.is_playing());
    }

    #[test]
    fn test_backstab_with_nobody_near() {
        let mut state = corridor();
        state.spawn_goblin(Position::new(4, 0), Direction::Right);
        assert_eq!(resolve_backstab(&state), BackstabOutcome::Missed);
    }

    #[test]
    fn test_reaching_end_wins() {
        let mut state = corridor();
        state.player = Position::new(4, 0);
        let outcome = resolve_move(&state, Direction::Right);
        apply_move(&mut state, outcome);
        assert_eq!(state.status, GameStatus::Won);
        assert_eq!(resolve_move(&state, Direction::Left), MoveOutcome::Ignored);
    }

    #[test]
    fn test_hear_does_not_mutate() {
        let state = corridor();
        let before = serde_json::to_string(&state).unwrap();
        assert_eq!(resolve_hear(&state, Direction::Right), Probe::Path);
        assert_eq!(resolve_hear(&state, Direction::Down), Probe::Wall);
        assert_eq!(resolve_hear(&state, Direction::Up), Probe::OutOfBounds);
        assert_eq!(serde_json::to_string(&state).unwrap(), before);
    }
}

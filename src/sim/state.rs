//! Game state and level construction
//!
//! `GameState` is the aggregate root for one level. It is replaced wholesale
//! when a new level is generated and partially reset when the level restarts.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::generate::{Maze, generate};
use super::goblin::Goblin;
use super::grid::{Direction, Grid, Position};
use super::placement::{place_goblins, place_traps};

/// Player lifecycle within a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Accepting player actions
    Playing,
    /// Died; level restarts after the death cue
    Dead,
    /// Reached the exit; next level follows the win cue
    Won,
}

/// Complete state of the current level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Level number (1-based)
    pub level: u32,
    pub grid: Grid,
    pub player: Position,
    pub start: Position,
    pub end: Position,
    /// Trap cells (never start or end)
    pub traps: Vec<Position>,
    /// Live goblins, in ascending id order
    pub goblins: Vec<Goblin>,
    pub status: GameStatus,
    /// Next goblin ID
    next_goblin_id: u32,
}

impl GameState {
    /// Generate a fresh level
    pub fn generate<R: Rng + ?Sized>(level: u32, trap_count: usize, rng: &mut R) -> Self {
        let maze = generate(rng);
        Self::from_maze(level, maze, trap_count, rng)
    }

    /// Populate a given layout with traps and goblins
    pub fn from_maze<R: Rng + ?Sized>(
        level: u32,
        maze: Maze,
        trap_count: usize,
        rng: &mut R,
    ) -> Self {
        let Maze { grid, start, end } = maze;
        let traps = place_traps(&grid, start, end, trap_count, rng);
        let mut next_goblin_id = 1;
        let goblins = place_goblins(&grid, start, end, start, &mut next_goblin_id, rng);

        log::info!(
            "Level {}: start {:?}, end {:?}, {} traps, {} goblins",
            level,
            start,
            end,
            traps.len(),
            goblins.len()
        );

        Self {
            level,
            grid,
            player: start,
            start,
            end,
            traps,
            goblins,
            status: GameStatus::Playing,
            next_goblin_id,
        }
    }

    /// Hand-built level with no entities (for scripted scenarios)
    pub fn with_layout(grid: Grid, start: Position, end: Position) -> Self {
        Self {
            level: 1,
            grid,
            player: start,
            start,
            end,
            traps: Vec::new(),
            goblins: Vec::new(),
            status: GameStatus::Playing,
            next_goblin_id: 1,
        }
    }

    /// Allocate a new goblin ID
    pub fn next_goblin_id(&mut self) -> u32 {
        let id = self.next_goblin_id;
        self.next_goblin_id += 1;
        id
    }

    /// Spawn a goblin with a fresh id
    pub fn spawn_goblin(&mut self, pos: Position, dir: Direction) -> u32 {
        let id = self.next_goblin_id();
        self.goblins.push(Goblin::new(id, pos, dir));
        id
    }

    /// Remove a goblin by id; ids are not reused
    pub fn remove_goblin(&mut self, id: u32) -> Option<Goblin> {
        let idx = self.goblins.iter().position(|g| g.id == id)?;
        Some(self.goblins.remove(idx))
    }

    pub fn is_trap(&self, pos: Position) -> bool {
        self.traps.contains(&pos)
    }

    /// Same level again: player back at start, grid and entities kept
    pub fn restart(&mut self) {
        self.player = self.start;
        self.status = GameStatus::Playing;
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_generate_places_player_at_start() {
        let mut rng = Pcg32::seed_from_u64(2024);
        let state = GameState::generate(1, 3, &mut rng);
        assert_eq!(state.player, state.start);
        assert_eq!(state.status, GameStatus::Playing);
        assert!(!state.is_trap(state.start));
        assert!(!state.is_trap(state.end));
        assert!(state.goblins.iter().all(|g| g.pos != state.start));
    }

    #[test]
    fn test_goblin_ids_not_reused() {
        let mut state = GameState::with_layout(
            Grid::from_rows(&["....."]),
            Position::new(0, 0),
            Position::new(4, 0),
        );
        let a = state.spawn_goblin(Position::new(1, 0), Direction::Left);
        let b = state.spawn_goblin(Position::new(2, 0), Direction::Left);
        assert!(state.remove_goblin(b).is_some());
        let c = state.spawn_goblin(Position::new(3, 0), Direction::Left);
        assert_eq!((a, b, c), (1, 2, 3));
        assert!(state.remove_goblin(b).is_none());
    }

    #[test]
    fn test_restart_keeps_level() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut state = GameState::generate(4, 2, &mut rng);
        let grid = state.grid.clone();
        let traps = state.traps.clone();
        state.player = state.end;
        state.status = GameStatus::Dead;
        state.restart();
        assert_eq!(state.player, state.start);
        assert!(state.is_playing());
        assert_eq!(state.grid, grid);
        assert_eq!(state.traps, traps);
        assert_eq!(state.level, 4);
    }
}

//! Goblin entities: motion and relation to the player
//!
//! Goblins wander with directional persistence. They never pathfind toward
//! the player; danger comes from the player stepping into one that is
//! heading their way.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::grid::{Direction, Grid, Position};

/// A roaming goblin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goblin {
    pub id: u32,
    pub pos: Position,
    pub dir: Direction,
}

impl Goblin {
    pub fn new(id: u32, pos: Position, dir: Direction) -> Self {
        Self { id, pos, dir }
    }

    /// Cell the goblin would enter next if it keeps its heading
    #[inline]
    pub fn next_step(&self) -> Position {
        self.pos.step(self.dir)
    }

    /// Manhattan distance to the player
    #[inline]
    pub fn distance_to(&self, player: Position) -> u32 {
        self.pos.distance(player)
    }

    /// Orthogonally adjacent to the player
    pub fn is_adjacent(&self, player: Position) -> bool {
        self.distance_to(player) == 1
    }

    /// Next step lands exactly on the player
    pub fn is_approaching(&self, player: Position) -> bool {
        self.next_step() == player
    }

    /// Adjacent, and the next step increases the distance
    pub fn is_walking_away(&self, player: Position) -> bool {
        self.is_adjacent(player) && self.next_step().distance(player) > 1
    }

    /// Within striking range and heading for the player
    pub fn is_ambushing(&self, player: Position) -> bool {
        self.distance_to(player) <= 1 && self.is_approaching(player)
    }
}

/// One motion tick. Keeps heading while the next cell is path; when blocked,
/// turns to a random open direction and steps that way. Stays put when boxed in.
pub fn advance<R: Rng + ?Sized>(goblin: &Goblin, grid: &Grid, rng: &mut R) -> Goblin {
    let ahead = goblin.next_step();
    if grid.is_path(ahead) {
        return Goblin {
            pos: ahead,
            ..*goblin
        };
    }

    let open: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&d| grid.is_path(goblin.pos.step(d)))
        .collect();

    match open.choose(rng) {
        Some(&dir) => Goblin {
            id: goblin.id,
            pos: goblin.pos.step(dir),
            dir,
        },
        None => *goblin,
    }
}

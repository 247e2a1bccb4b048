//! Maze grid, positions and directions
//!
//! The grid is addressed `cells[y][x]` with (0, 0) in the top-left corner;
//! `Up` decreases y.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::GRID_SIZE;

/// Cardinal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset (dx, dy)
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" | "n" => Some(Direction::Up),
            "down" | "d" | "s" => Some(Direction::Down),
            "left" | "l" | "w" => Some(Direction::Left),
            "right" | "r" | "e" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Integer grid coordinate. May lie outside the grid while probing neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Adjacent position in `dir` (not bounds-checked)
    #[inline]
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance
    #[inline]
    pub fn distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    #[inline]
    pub fn in_bounds(self) -> bool {
        (0..GRID_SIZE).contains(&self.x) && (0..GRID_SIZE).contains(&self.y)
    }
}

/// Kind of a single maze cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Wall,
    Path,
}

/// What a hear probe finds next to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    OutOfBounds,
    Wall,
    Path,
}

/// The static maze layout for one level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: [[Cell; GRID_SIZE as usize]; GRID_SIZE as usize],
}

impl Default for Grid {
    fn default() -> Self {
        Self::filled(Cell::Wall)
    }
}

impl Grid {
    pub fn filled(cell: Cell) -> Self {
        Self {
            cells: [[cell; GRID_SIZE as usize]; GRID_SIZE as usize],
        }
    }

    /// Build a grid from rows of `#` (wall) and `.` (path). Missing cells are walls.
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut grid = Self::default();
        for (y, row) in rows.iter().enumerate().take(GRID_SIZE as usize) {
            for (x, ch) in row.chars().enumerate().take(GRID_SIZE as usize) {
                if ch != '#' {
                    grid.cells[y][x] = Cell::Path;
                }
            }
        }
        grid
    }

    /// Cell at `pos`, or None if out of bounds
    pub fn get(&self, pos: Position) -> Option<Cell> {
        if pos.in_bounds() {
            Some(self.cells[pos.y as usize][pos.x as usize])
        } else {
            None
        }
    }

    /// Set a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if pos.in_bounds() {
            self.cells[pos.y as usize][pos.x as usize] = cell;
        }
    }

    #[inline]
    pub fn is_path(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Path)
    }

    #[inline]
    pub fn is_wall(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Wall)
    }

    /// Classify the cell next to `from` in `dir`
    pub fn probe(&self, from: Position, dir: Direction) -> Probe {
        match self.get(from.step(dir)) {
            None => Probe::OutOfBounds,
            Some(Cell::Wall) => Probe::Wall,
            Some(Cell::Path) => Probe::Path,
        }
    }

    /// Number of orthogonal neighbours of `pos` that are Path
    pub fn path_neighbors(&self, pos: Position) -> usize {
        Direction::ALL
            .iter()
            .filter(|&&d| self.is_path(pos.step(d)))
            .count()
    }

    /// All Path cells in row-major order
    pub fn path_cells(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                let pos = Position::new(x, y);
                if self.is_path(pos) {
                    cells.push(pos);
                }
            }
        }
        cells
    }

    /// Breadth-first reachability over Path cells
    pub fn is_reachable(&self, from: Position, to: Position) -> bool {
        if !self.is_path(from) || !self.is_path(to) {
            return false;
        }
        let mut seen = [[false; GRID_SIZE as usize]; GRID_SIZE as usize];
        let mut queue = VecDeque::from([from]);
        seen[from.y as usize][from.x as usize] = true;

        while let Some(pos) = queue.pop_front() {
            if pos == to {
                return true;
            }
            for dir in Direction::ALL {
                let next = pos.step(dir);
                if self.is_path(next) && !seen[next.y as usize][next.x as usize] {
                    seen[next.y as usize][next.x as usize] = true;
                    queue.push_back(next);
                }
            }
        }
        false
    }
}

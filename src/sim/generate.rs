//! Procedural maze generation
//!
//! Carves a single winding corridor from a random start to a random end,
//! with the occasional 2x2 room. A carve step only enters a wall cell that
//! touches exactly one existing path cell, which keeps the corridor one cell
//! wide. When carving gets stuck, a direct walk finishes the connection.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, Direction, Grid, Position};
use crate::consts::*;

/// A generated level layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    pub grid: Grid,
    pub start: Position,
    pub end: Position,
}

/// Generate a new maze. Never fails: start and end are always connected.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Maze {
    let (start, end) = pick_endpoints(rng);

    let mut grid = Grid::default();
    grid.set(start, Cell::Path);

    let mut current = start;
    let mut history: Vec<Direction> = Vec::new();
    let mut rooms = 0;

    while current != end {
        let candidates = carve_candidates(&grid, current);
        if candidates.is_empty() {
            log::debug!("Carving stuck at {:?}, walking directly to end", current);
            walk_direct(&mut grid, current, end);
            current = end;
            break;
        }

        let dir = choose_direction(rng, &candidates, &history, current, end);
        current = current.step(dir);
        grid.set(current, Cell::Path);
        history.push(dir);

        if rooms < MAX_ROOMS
            && current != end
            && current.distance(start) >= ROOM_MIN_END_DISTANCE
            && current.distance(end) > ROOM_MIN_END_DISTANCE
            && rng.random_bool(ROOM_CHANCE)
            && try_carve_room(&mut grid, current, rng)
        {
            rooms += 1;
        }
    }

    debug_assert_eq!(current, end);
    log::debug!(
        "Generated maze {:?} -> {:?} ({} carve steps, {} rooms)",
        start,
        end,
        history.len(),
        rooms
    );

    Maze { grid, start, end }
}

/// Reject-and-retry sampling of two distinct, far-enough cells
fn pick_endpoints<R: Rng + ?Sized>(rng: &mut R) -> (Position, Position) {
    loop {
        let start = random_cell(rng);
        let end = random_cell(rng);
        if start != end && start.distance(end) >= MIN_START_END_DISTANCE {
            return (start, end);
        }
    }
}

fn random_cell<R: Rng + ?Sized>(rng: &mut R) -> Position {
    Position::new(rng.random_range(0..GRID_SIZE), rng.random_range(0..GRID_SIZE))
}

/// Directions from `current` into a wall cell that touches exactly one path cell
fn carve_candidates(grid: &Grid, current: Position) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|&dir| {
            let next = current.step(dir);
            grid.is_wall(next) && grid.path_neighbors(next) == 1
        })
        .collect()
}

/// Biased pick: after two identical moves prefer a turn, otherwise mix greedy and random
fn choose_direction<R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &[Direction],
    history: &[Direction],
    current: Position,
    end: Position,
) -> Direction {
    let straight_run = match history {
        [.., a, b] if a == b => Some(*b),
        _ => None,
    };

    if let Some(last) = straight_run {
        let turns: Vec<Direction> = candidates.iter().copied().filter(|&d| d != last).collect();
        if turns.is_empty() {
            return last;
        }
        if rng.random_bool(TURN_TOWARD_GOAL_CHANCE) {
            return closest_to_goal(&turns, current, end);
        }
        return *turns.choose(rng).unwrap_or(&last);
    }

    if rng.random_bool(GREEDY_CHANCE) {
        closest_to_goal(candidates, current, end)
    } else {
        *candidates.choose(rng).unwrap_or(&candidates[0])
    }
}

fn closest_to_goal(options: &[Direction], current: Position, end: Position) -> Direction {
    options
        .iter()
        .copied()
        .min_by_key(|&d| current.step(d).distance(end))
        .unwrap_or(options[0])
}

/// Open a 2x2 room with `current` as one corner, if the other three cells are walls
fn try_carve_room<R: Rng + ?Sized>(grid: &mut Grid, current: Position, rng: &mut R) -> bool {
    let lo = ROOM_EDGE_CLEARANCE;
    let hi = GRID_SIZE - 1 - ROOM_EDGE_CLEARANCE;
    if !(lo..=hi).contains(&current.x) || !(lo..=hi).contains(&current.y) {
        return false;
    }

    let sx = if rng.random_bool(0.5) { 1 } else { -1 };
    let sy = if rng.random_bool(0.5) { 1 } else { -1 };
    let block = [
        Position::new(current.x + sx, current.y),
        Position::new(current.x, current.y + sy),
        Position::new(current.x + sx, current.y + sy),
    ];
    if !block.iter().all(|&p| grid.is_wall(p)) {
        return false;
    }

    for pos in block {
        grid.set(pos, Cell::Path);
    }
    log::debug!("Carved room at {:?} ({}, {})", current, sx, sy);
    true
}

/// Manhattan walk, x first then y
fn walk_direct(grid: &mut Grid, from: Position, to: Position) {
    let mut pos = from;
    while pos.x != to.x {
        pos.x += (to.x - pos.x).signum();
        grid.set(pos, Cell::Path);
    }
    while pos.y != to.y {
        pos.y += (to.y - pos.y).signum();
        grid.set(pos, Cell::Path);
    }
}

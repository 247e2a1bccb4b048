//! Trap and goblin placement on a generated maze

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::goblin::Goblin;
use super::grid::{Direction, Grid, Position};
use crate::consts::MAX_GOBLINS;

/// Path cells other than the excluded ones, uniformly shuffled
fn shuffled_path_cells<R: Rng + ?Sized>(
    grid: &Grid,
    exclude: &[Position],
    rng: &mut R,
) -> Vec<Position> {
    let mut cells: Vec<Position> = grid
        .path_cells()
        .into_iter()
        .filter(|p| !exclude.contains(p))
        .collect();
    cells.shuffle(rng);
    cells
}

/// Up to `count` distinct trap cells, never on start or end
pub fn place_traps<R: Rng + ?Sized>(
    grid: &Grid,
    start: Position,
    end: Position,
    count: usize,
    rng: &mut R,
) -> Vec<Position> {
    let mut cells = shuffled_path_cells(grid, &[start, end], rng);
    cells.truncate(count);
    cells
}

/// Zero to two goblins away from start, end and the player.
/// Ids are assigned from `next_id` upward; it is left pointing past the last one.
pub fn place_goblins<R: Rng + ?Sized>(
    grid: &Grid,
    start: Position,
    end: Position,
    player: Position,
    next_id: &mut u32,
    rng: &mut R,
) -> Vec<Goblin> {
    let cells = shuffled_path_cells(grid, &[start, end, player], rng);
    let count = rng.random_range(0..=MAX_GOBLINS).min(cells.len());

    cells
        .into_iter()
        .take(count)
        .map(|pos| {
            let id = *next_id;
            *next_id += 1;
            let dir = *Direction::ALL.choose(&mut *rng).unwrap_or(&Direction::Up);
            Goblin::new(id, pos, dir)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::generate::generate;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_traps_capped_by_available_cells() {
        let grid = Grid::from_rows(&["...."]);
        let start = Position::new(0, 0);
        let end = Position::new(3, 0);
        let mut rng = Pcg32::seed_from_u64(3);
        let traps = place_traps(&grid, start, end, 10, &mut rng);
        assert_eq!(traps.len(), 2);
        assert!(!traps.contains(&start) && !traps.contains(&end));
    }

    #[test]
    fn test_goblin_ids_ascend() {
        let grid = Grid::filled(crate::sim::grid::Cell::Path);
        let start = Position::new(0, 0);
        let end = Position::new(9, 9);
        let mut rng = Pcg32::seed_from_u64(11);
        let mut next_id = 5;
        for _ in 0..20 {
            let before = next_id;
            let goblins = place_goblins(&grid, start, end, start, &mut next_id, &mut rng);
            assert!(goblins.len() <= MAX_GOBLINS);
            for (i, g) in goblins.iter().enumerate() {
                assert_eq!(g.id, before + i as u32);
            }
            assert_eq!(next_id, before + goblins.len() as u32);
        }
    }

    proptest! {
        #[test]
        fn entities_avoid_reserved_cells(seed in any::<u64>(), count in 0usize..8) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let maze = generate(&mut rng);
            let traps = place_traps(&maze.grid, maze.start, maze.end, count, &mut rng);
            prop_assert!(traps.len() <= count);
            for t in &traps {
                prop_assert!(maze.grid.is_path(*t));
                prop_assert!(*t != maze.start && *t != maze.end);
            }

            let mut next_id = 1;
            let goblins = place_goblins(
                &maze.grid, maze.start, maze.end, maze.start, &mut next_id, &mut rng,
            );
            for g in &goblins {
                prop_assert!(maze.grid.is_path(g.pos));
                prop_assert!(g.pos != maze.start && g.pos != maze.end);
            }
        }
    }
}

use cogkit_core::Direction;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use super::search::{astar, repair_connectivity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CellState {
    Wall,
    Path,
}

/// Grid coordinate, `x` to the right, `y` downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: GridPos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, state: CellState) -> Self {
        Self {
            width,
            height,
            cells: vec![state; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn index(&self, pos: GridPos) -> usize {
        pos.y * self.width + pos.x
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn get(&self, pos: GridPos) -> Option<CellState> {
        self.in_bounds(pos).then(|| self.cells[self.index(pos)])
    }

    pub fn set(&mut self, pos: GridPos, state: CellState) {
        if self.in_bounds(pos) {
            let i = self.index(pos);
            self.cells[i] = state;
        }
    }

    pub fn is_path(&self, pos: GridPos) -> bool {
        self.get(pos) == Some(CellState::Path)
    }

    /// Cell `distance` steps away in `dir`, if it lies inside the grid.
    pub fn offset(&self, pos: GridPos, dir: Direction, distance: usize) -> Option<GridPos> {
        let (dx, dy) = dir.delta();
        let x = pos.x as i64 + dx as i64 * distance as i64;
        let y = pos.y as i64 + dy as i64 * distance as i64;
        if x < 0 || y < 0 {
            return None;
        }
        let next = GridPos::new(x as usize, y as usize);
        self.in_bounds(next).then_some(next)
    }

    /// 4-connected Path neighbours of `pos`.
    pub fn open_neighbors(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.offset(pos, dir, 1))
            .filter(|p| self.is_path(*p))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.cells.chunks(self.width.max(1))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                f.write_str(match cell {
                    CellState::Wall => "#",
                    CellState::Path => ".",
                })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Generated maze plus the fixed entry and exit cells.
#[derive(Debug, Clone)]
pub struct MazeLayout {
    pub grid: Grid,
    pub entry: GridPos,
    pub exit: GridPos,
    /// Carving alone did not connect entry and exit; a corridor was forced.
    pub repaired: bool,
}

/// Largest even number not above `n`.
fn even_floor(n: usize) -> usize {
    n & !1
}

/// Entry is the top-left lattice cell, exit the bottom-right lattice cell.
pub fn endpoints(width: usize, height: usize) -> (GridPos, GridPos) {
    let entry = GridPos::new(0, 0);
    let exit = GridPos::new(
        even_floor(width.saturating_sub(1)),
        even_floor(height.saturating_sub(1)),
    );
    (entry, exit)
}

/// Number of extra open cells punched after carving.
pub fn extra_cell_count(width: usize, height: usize, looseness: f64) -> usize {
    ((1.0 - looseness) * (width * height) as f64 * 0.1).floor().max(0.0) as usize
}

/// Randomized depth-first carving on the even-coordinate lattice, followed
/// by loosening, endpoint forcing and a connectivity check.
pub fn generate<R: Rng>(width: usize, height: usize, looseness: f64, rng: &mut R) -> MazeLayout {
    debug_assert!(width > 0 && height > 0, "maze needs at least one cell");
    let mut grid = Grid::filled(width, height, CellState::Wall);

    let start = GridPos::new(
        2 * rng.random_range(0..=(width - 1) / 2),
        2 * rng.random_range(0..=(height - 1) / 2),
    );
    grid.set(start, CellState::Path);
    let mut stack = vec![start];

    let mut candidates: Vec<(GridPos, GridPos)> = Vec::with_capacity(4);
    while let Some(&top) = stack.last() {
        candidates.clear();
        for dir in Direction::ALL {
            if let (Some(between), Some(target)) =
                (grid.offset(top, dir, 1), grid.offset(top, dir, 2))
            {
                if grid.get(target) == Some(CellState::Wall) {
                    candidates.push((between, target));
                }
            }
        }

        if candidates.is_empty() {
            stack.pop();
            continue;
        }
        let (between, target) = candidates[rng.random_range(0..candidates.len())];
        grid.set(between, CellState::Path);
        grid.set(target, CellState::Path);
        stack.push(target);
    }

    let extra = extra_cell_count(width, height, looseness);
    if width > 2 && height > 2 {
        for _ in 0..extra {
            let pos = GridPos::new(
                rng.random_range(1..width - 1),
                rng.random_range(1..height - 1),
            );
            grid.set(pos, CellState::Path);
        }
    }

    let (entry, exit) = endpoints(width, height);
    grid.set(entry, CellState::Path);
    grid.set(exit, CellState::Path);

    let repaired = match astar(&grid, entry, exit) {
        Some(path) => {
            debug!(width, height, extra, path_len = path.len(), "maze carved");
            false
        }
        None => {
            let carved = repair_connectivity(&mut grid, entry, exit);
            info!(width, height, carved, "maze had no entry-exit path, corridor forced");
            true
        }
    };

    MazeLayout {
        grid,
        entry,
        exit,
        repaired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn offset_respects_bounds() {
        let grid = Grid::filled(3, 3, CellState::Wall);
        let origin = GridPos::new(0, 0);
        assert_eq!(grid.offset(origin, Direction::Left, 1), None);
        assert_eq!(grid.offset(origin, Direction::Up, 1), None);
        assert_eq!(
            grid.offset(origin, Direction::Right, 2),
            Some(GridPos::new(2, 0))
        );
        assert_eq!(grid.offset(origin, Direction::Down, 3), None);
    }

    #[test]
    fn endpoints_sit_on_the_lattice() {
        assert_eq!(endpoints(15, 15), (GridPos::new(0, 0), GridPos::new(14, 14)));
        assert_eq!(endpoints(10, 7), (GridPos::new(0, 0), GridPos::new(8, 6)));
    }

    #[test]
    fn extra_cells_shrink_with_looseness() {
        assert_eq!(extra_cell_count(10, 10, 1.0), 0);
        assert_eq!(extra_cell_count(10, 10, 0.0), 10);
        assert_eq!(extra_cell_count(10, 10, 0.7), 3);
    }

    #[test]
    fn perfect_maze_opens_every_lattice_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let layout = generate(11, 9, 1.0, &mut rng);
        for y in (0..9).step_by(2) {
            for x in (0..11).step_by(2) {
                assert!(layout.grid.is_path(GridPos::new(x, y)), "({x},{y})\n{}", layout.grid);
            }
        }
        assert!(!layout.repaired);
    }

    #[test]
    fn perfect_maze_is_a_tree() {
        // With no loosening, open cells = lattice cells + one connector per tree edge.
        let mut rng = StdRng::seed_from_u64(99);
        let layout = generate(9, 9, 1.0, &mut rng);
        let open = layout
            .grid
            .rows()
            .flatten()
            .filter(|c| **c == CellState::Path)
            .count();
        let lattice = 5 * 5;
        assert_eq!(open, lattice + (lattice - 1));
    }

    #[test]
    fn display_draws_walls_and_paths() {
        let mut grid = Grid::filled(2, 2, CellState::Wall);
        grid.set(GridPos::new(1, 0), CellState::Path);
        assert_eq!(grid.to_string(), "#.\n##\n");
    }
}

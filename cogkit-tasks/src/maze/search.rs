use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use super::grid::{CellState, Grid, GridPos};

/// A* over 4-connected Path cells with unit edge cost and a Manhattan
/// heuristic. Equal `f` scores pop lowest `g` first, then discovery order.
/// Returns the cell sequence from `from` to `to`, both inclusive.
pub fn astar(grid: &Grid, from: GridPos, to: GridPos) -> Option<Vec<GridPos>> {
    if !grid.is_path(from) || !grid.is_path(to) {
        return None;
    }

    let mut g_score = vec![usize::MAX; grid.len()];
    let mut came_from: Vec<Option<GridPos>> = vec![None; grid.len()];
    let mut open = BinaryHeap::new();
    let mut discovered = 0u64;

    g_score[grid.index(from)] = 0;
    open.push(Reverse((from.manhattan(to), 0usize, discovered, from)));

    while let Some(Reverse((_, g, _, pos))) = open.pop() {
        if pos == to {
            let mut path = vec![pos];
            let mut cur = pos;
            while let Some(prev) = came_from[grid.index(cur)] {
                path.push(prev);
                cur = prev;
            }
            path.reverse();
            return Some(path);
        }
        // stale heap entry
        if g > g_score[grid.index(pos)] {
            continue;
        }
        for next in grid.open_neighbors(pos) {
            let tentative = g + 1;
            let ni = grid.index(next);
            if tentative < g_score[ni] {
                g_score[ni] = tentative;
                came_from[ni] = Some(pos);
                discovered += 1;
                open.push(Reverse((
                    tentative + next.manhattan(to),
                    tentative,
                    discovered,
                    next,
                )));
            }
        }
    }
    None
}

/// Flood fill from `from`; `true` marks Path cells reachable from it.
pub fn reachable(grid: &Grid, from: GridPos) -> Vec<bool> {
    let mut seen = vec![false; grid.len()];
    if !grid.is_path(from) {
        return seen;
    }
    let mut queue = VecDeque::from([from]);
    seen[grid.index(from)] = true;
    while let Some(pos) = queue.pop_front() {
        for next in grid.open_neighbors(pos) {
            let i = grid.index(next);
            if !seen[i] {
                seen[i] = true;
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Breadth-first shortest path length in steps.
pub fn bfs_distance(grid: &Grid, from: GridPos, to: GridPos) -> Option<usize> {
    if !grid.is_path(from) || !grid.is_path(to) {
        return None;
    }
    let mut dist = vec![usize::MAX; grid.len()];
    let mut queue = VecDeque::from([from]);
    dist[grid.index(from)] = 0;
    while let Some(pos) = queue.pop_front() {
        let d = dist[grid.index(pos)];
        if pos == to {
            return Some(d);
        }
        for next in grid.open_neighbors(pos) {
            let i = grid.index(next);
            if dist[i] == usize::MAX {
                dist[i] = d + 1;
                queue.push_back(next);
            }
        }
    }
    None
}

/// Carve a stair-step corridor from `exit` towards `entry`, overwriting
/// walls, until the corridor touches the region reachable from `entry`.
/// Returns the number of cells that were turned from Wall into Path.
pub fn repair_connectivity(grid: &mut Grid, entry: GridPos, exit: GridPos) -> usize {
    grid.set(entry, CellState::Path);
    grid.set(exit, CellState::Path);
    let connected = reachable(grid, entry);
    let touches = |grid: &Grid, pos: GridPos| {
        connected[grid.index(pos)] || grid.open_neighbors(pos).any(|n| connected[grid.index(n)])
    };

    let mut carved = 0;
    let mut cur = exit;
    let mut horizontal = true;
    while !touches(grid, cur) && cur != entry {
        let step_x = cur.x != entry.x && (horizontal || cur.y == entry.y);
        if step_x {
            cur.x = if cur.x > entry.x { cur.x - 1 } else { cur.x + 1 };
        } else {
            cur.y = if cur.y > entry.y { cur.y - 1 } else { cur.y + 1 };
        }
        horizontal = !horizontal;
        if !grid.is_path(cur) {
            grid.set(cur, CellState::Path);
            carved += 1;
        }
    }
    carved
}

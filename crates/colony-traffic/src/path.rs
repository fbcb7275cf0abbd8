use core::cmp::Ordering;
use std::collections::BinaryHeap;

use colony_core::{Direction, Position, RegionId, WorldView, REGION_SIZE, ROAD_COST};

const CELLS: usize = (REGION_SIZE * REGION_SIZE) as usize;

#[derive(Debug)]
struct OpenNode {
    f: u32,
    g: u32,
    idx: usize,
    tie: u64,
}

impl OpenNode {
    fn key(&self) -> (u32, u32, u64) {
        (self.f, self.g, self.tie)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.key().cmp(&self.key())
    }
}

fn idx(pos: Position) -> Option<usize> {
    pos.in_bounds()
        .then(|| (pos.y * REGION_SIZE + pos.x) as usize)
}

fn pos_from_idx(region: RegionId, idx: usize) -> Position {
    let idx = idx as i32;
    Position::new(region, idx % REGION_SIZE, idx / REGION_SIZE)
}

/// Cheapest path from `start` until within `range` of `goal`, excluding `start`.
///
/// Eight-connected A* over one region using the world's per-cell move cost.
/// Agents are not obstacles; contention is the arbiter's concern. Returns
/// `None` when the goal is in another region or unreachable, and an empty path
/// when `start` is already in range.
pub fn find_path<W: WorldView + ?Sized>(
    world: &W,
    start: Position,
    goal: Position,
    range: u32,
) -> Option<Vec<Position>> {
    if start.region != goal.region {
        return None;
    }
    if start.in_range_to(goal, range) {
        return Some(Vec::new());
    }
    let region = start.region;
    let start_idx = idx(start)?;
    let heuristic = |pos: Position| pos.range_to(goal).saturating_sub(range) * ROAD_COST;

    let mut open = BinaryHeap::<OpenNode>::new();
    let mut tie: u64 = 0;
    let mut g_score = vec![u32::MAX; CELLS];
    let mut came_from: Vec<Option<usize>> = vec![None; CELLS];

    g_score[start_idx] = 0;
    open.push(OpenNode {
        f: heuristic(start),
        g: 0,
        idx: start_idx,
        tie,
    });
    tie += 1;

    while let Some(node) = open.pop() {
        let pos = pos_from_idx(region, node.idx);
        if pos.in_range_to(goal, range) {
            let mut out = vec![pos];
            let mut current = node.idx;
            while let Some(prev) = came_from[current] {
                current = prev;
                if current != start_idx {
                    out.push(pos_from_idx(region, current));
                }
            }
            out.reverse();
            return Some(out);
        }
        if node.g != g_score[node.idx] {
            // Stale heap entry.
            continue;
        }

        for dir in Direction::ALL {
            let Some(next) = pos.offset(dir) else { continue };
            let Some(next_idx) = idx(next) else { continue };
            let Some(cost) = world.move_cost(next) else {
                continue;
            };
            let tentative_g = node.g.saturating_add(cost);
            if tentative_g >= g_score[next_idx] {
                continue;
            }
            came_from[next_idx] = Some(node.idx);
            g_score[next_idx] = tentative_g;
            open.push(OpenNode {
                f: tentative_g.saturating_add(heuristic(next)),
                g: tentative_g,
                idx: next_idx,
                tie,
            });
            tie += 1;
        }
    }

    None
}

/// Direction of the first step along [`find_path`], if one is needed and exists.
pub fn first_step<W: WorldView + ?Sized>(
    world: &W,
    start: Position,
    goal: Position,
    range: u32,
) -> Option<Direction> {
    let path = find_path(world, start, goal, range)?;
    let next = path.first()?;
    start.direction_to(*next)
}

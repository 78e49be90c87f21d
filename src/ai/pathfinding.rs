//! A* pathfinding on the tile grid
//!
//! 8-directional search with Euclidean step costs and a straight-line
//! heuristic. Search identity is always the integer [`GridCell`]; world
//! coordinates only appear at the boundaries.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use glam::Vec2;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ai::grid::{GridCell, GridMap};

/// Ordered world-space waypoints, consumed front to back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    waypoints: VecDeque<Vec2>,
}

impl Path {
    #[must_use]
    pub fn new(waypoints: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            waypoints: waypoints.into_iter().collect(),
        }
    }

    /// An empty path means "no route" (or already there).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Next checkpoint to steer toward.
    #[must_use]
    pub fn front(&self) -> Option<Vec2> {
        self.waypoints.front().copied()
    }

    /// Mark the front checkpoint as reached.
    pub fn pop_front(&mut self) -> Option<Vec2> {
        self.waypoints.pop_front()
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.waypoints.iter()
    }

    /// Total polyline length through the remaining waypoints
    #[must_use]
    pub fn length(&self) -> f32 {
        self.waypoints
            .iter()
            .zip(self.waypoints.iter().skip(1))
            .map(|(a, b)| a.distance(*b))
            .sum()
    }
}

/// Counters from the most recent search, for logging and tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Cells moved to the closed set
    pub expanded: usize,
    /// Largest open set size observed
    pub peak_open: usize,
    /// Whether the expansion cap cut the search short
    pub capped: bool,
}

/// Open-set entry. Stale entries (superseded by a cheaper route) are
/// skipped when popped.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    cell: GridCell,
    g_cost: f32,
    f_cost: f32,
    h_cost: f32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap: lowest f, then lowest h, then lowest row/column
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.h_cost.total_cmp(&self.h_cost))
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Working set of a single search. Cleared at the start of every call.
#[derive(Debug, Default)]
pub struct SearchFrontier {
    open: BinaryHeap<OpenEntry>,
    open_members: FxHashSet<GridCell>,
    closed: FxHashSet<GridCell>,
    g_score: FxHashMap<GridCell, f32>,
    f_score: FxHashMap<GridCell, f32>,
    came_from: FxHashMap<GridCell, GridCell>,
}

impl SearchFrontier {
    pub fn reset(&mut self) {
        self.open.clear();
        self.open_members.clear();
        self.closed.clear();
        self.g_score.clear();
        self.f_score.clear();
        self.came_from.clear();
    }

    fn open(&mut self, cell: GridCell, g_cost: f32, h_cost: f32) {
        let f_cost = g_cost + h_cost;
        self.open_members.insert(cell);
        self.g_score.insert(cell, g_cost);
        self.f_score.insert(cell, f_cost);
        self.open.push(OpenEntry {
            cell,
            g_cost,
            f_cost,
            h_cost,
        });
    }

    /// Pop the live entry with the lowest f-score.
    fn pop(&mut self) -> Option<GridCell> {
        while let Some(entry) = self.open.pop() {
            if !self.open_members.contains(&entry.cell) {
                continue;
            }
            let best = self.g_score.get(&entry.cell).copied().unwrap_or(f32::MAX);
            if entry.g_cost > best {
                continue;
            }
            return Some(entry.cell);
        }
        None
    }

    fn close(&mut self, cell: GridCell) {
        self.open_members.remove(&cell);
        self.closed.insert(cell);
    }

    #[must_use]
    pub fn is_closed(&self, cell: GridCell) -> bool {
        self.closed.contains(&cell)
    }

    #[must_use]
    pub fn is_open(&self, cell: GridCell) -> bool {
        self.open_members.contains(&cell)
    }

    /// Every scored cell is in the open or the closed set.
    #[must_use]
    pub fn scores_consistent(&self) -> bool {
        self.g_score
            .keys()
            .chain(self.f_score.keys())
            .all(|c| self.open_members.contains(c) || self.closed.contains(c))
    }

    /// Walk predecessors back from `goal`, dropping the start cell.
    fn reconstruct(&self, goal: GridCell) -> Vec<GridCell> {
        let mut cells = Vec::new();
        let mut current = goal;
        while let Some(&previous) = self.came_from.get(&current) {
            cells.push(current);
            current = previous;
        }
        cells.reverse();
        cells
    }
}

/// Reusable A* pathfinder.
#[derive(Debug, Default)]
pub struct Pathfinder {
    frontier: SearchFrontier,
    max_expansions: Option<usize>,
    last_stats: SearchStats,
}

impl Pathfinder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up (report unreachable) after expanding this many cells.
    #[must_use]
    pub fn with_max_expansions(mut self, max_expansions: Option<usize>) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    #[must_use]
    pub fn last_stats(&self) -> SearchStats {
        self.last_stats
    }

    #[must_use]
    pub fn frontier(&self) -> &SearchFrontier {
        &self.frontier
    }

    /// Find a path between two world positions.
    ///
    /// The returned waypoints are cell centers, starting at a cell adjacent
    /// to `from` and ending at the goal cell. An empty path means the goal
    /// is unreachable, blocked, out of bounds, or already reached.
    pub fn find_path<M: GridMap + ?Sized>(&mut self, map: &M, from: Vec2, to: Vec2) -> Path {
        self.frontier.reset();
        self.last_stats = SearchStats::default();

        let start = map.world_to_grid(from);
        let goal = map.world_to_grid(to);

        if !map.contains(start) || !map.contains(goal) {
            log::debug!("Path request out of bounds: {start:?} -> {goal:?}");
            return Path::default();
        }
        if map.is_blocked(goal) {
            log::debug!("Path goal {goal:?} is blocked");
            return Path::default();
        }

        self.frontier.open(start, 0.0, start.distance(goal));

        while let Some(current) = self.frontier.pop() {
            if current == goal {
                let cells = self.frontier.reconstruct(goal);
                let path = Path::new(cells.into_iter().map(|c| map.grid_to_world(c)));
                log::debug!(
                    "Path {start:?} -> {goal:?}: {} waypoints, {} expanded",
                    path.len(),
                    self.last_stats.expanded
                );
                return path;
            }

            self.frontier.close(current);
            self.last_stats.expanded += 1;

            if self
                .max_expansions
                .is_some_and(|cap| self.last_stats.expanded >= cap)
            {
                log::debug!("Path search capped after {} expansions", self.last_stats.expanded);
                self.last_stats.capped = true;
                return Path::default();
            }

            let current_g = self.frontier.g_score.get(&current).copied().unwrap_or(0.0);

            for neighbor in map.neighbors(current) {
                if self.frontier.is_closed(neighbor) {
                    continue;
                }

                let tentative_g = current_g + current.distance(neighbor);

                if self.frontier.is_open(neighbor) {
                    let known = self.frontier.g_score.get(&neighbor).copied().unwrap_or(f32::MAX);
                    // Equal cost keeps the first route found
                    if tentative_g >= known {
                        continue;
                    }
                }

                self.frontier.came_from.insert(neighbor, current);
                self.frontier.open(neighbor, tentative_g, neighbor.distance(goal));
            }

            self.last_stats.peak_open = self.last_stats.peak_open.max(self.frontier.open_members.len());
        }

        log::debug!("No path {start:?} -> {goal:?}");
        Path::default()
    }
}

/// One-shot search with a fresh frontier.
#[must_use]
pub fn find_path<M: GridMap + ?Sized>(map: &M, from: Vec2, to: Vec2) -> Path {
    Pathfinder::new().find_path(map, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::grid::TileMap;

    fn assert_contiguous(map: &TileMap, from: Vec2, path: &Path) {
        let mut previous = map.world_to_grid(from);
        for waypoint in path.iter() {
            let cell = map.world_to_grid(*waypoint);
            assert!(previous.is_adjacent(cell), "{previous:?} -> {cell:?} not adjacent");
            previous = cell;
        }
    }

    #[test]
    fn test_open_grid_diagonal() {
        let map = TileMap::new(10, 10, 1.0);
        let goal = Vec2::new(9.5, 9.5);

        let path = find_path(&map, Vec2::ZERO, goal);

        assert!(path.len() >= 9);
        assert_contiguous(&map, Vec2::ZERO, &path);

        let distances: Vec<f32> = path.iter().map(|p| p.distance(goal)).collect();
        assert!(distances.windows(2).all(|w| w[1] < w[0]));

        let last = path.iter().last().copied().unwrap();
        assert!(last.distance(goal) <= 1.0);
    }

    #[test]
    fn test_start_cell_excluded() {
        let map = TileMap::new(10, 10, 1.0);
        let path = find_path(&map, Vec2::new(0.5, 0.5), Vec2::new(3.5, 0.5));

        assert_eq!(path.len(), 3);
        assert_eq!(path.front(), Some(Vec2::new(1.5, 0.5)));
        assert!((path.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_path_around_wall() {
        let mut map = TileMap::new(10, 10, 1.0);
        for row in 0..8 {
            map.set_asteroid(GridCell::new(row, 5), true);
        }

        let from = Vec2::new(2.5, 2.5);
        let path = find_path(&map, from, Vec2::new(8.5, 2.5));

        assert!(!path.is_empty());
        assert_contiguous(&map, from, &path);
        assert!(path.iter().all(|p| !map.is_asteroid_at(*p)));
        // Has to climb over the wall top at row 8
        assert!(path.iter().any(|p| map.world_to_grid(*p).row >= 8));
    }

    #[test]
    fn test_blocked_goal_is_empty() {
        let mut map = TileMap::new(10, 10, 1.0);
        map.set_asteroid(GridCell::new(9, 9), true);

        let path = find_path(&map, Vec2::ZERO, Vec2::new(9.5, 9.5));
        assert!(path.is_empty());
    }

    #[test]
    fn test_walled_off_goal_is_empty() {
        let mut map = TileMap::new(5, 5, 1.0);
        for (row, column) in [(2, 2), (2, 3), (2, 4), (3, 2), (4, 2)] {
            map.set_asteroid(GridCell::new(row, column), true);
        }

        let path = find_path(&map, Vec2::new(0.5, 0.5), Vec2::new(3.5, 3.5));
        assert!(path.is_empty());
    }

    #[test]
    fn test_goal_occupied_by_agent_is_empty() {
        let mut map = TileMap::new(6, 6, 1.0);
        let mut world = hecs::World::new();
        map.place_agent(world.spawn(()), Vec2::new(4.5, 4.5));

        let path = find_path(&map, Vec2::new(0.5, 0.5), Vec2::new(4.5, 4.5));
        assert!(path.is_empty());
    }

    #[test]
    fn test_own_cell_does_not_block_start() {
        let mut map = TileMap::new(6, 6, 1.0);
        let mut world = hecs::World::new();
        let from = Vec2::new(0.5, 0.5);
        map.place_agent(world.spawn(()), from);

        let path = find_path(&map, from, Vec2::new(4.5, 0.5));
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_same_cell_is_empty() {
        let map = TileMap::new(4, 4, 1.0);
        let path = find_path(&map, Vec2::new(1.2, 1.2), Vec2::new(1.8, 1.8));
        assert!(path.is_empty());
    }

    #[test]
    fn test_out_of_bounds_is_empty() {
        let map = TileMap::new(4, 4, 1.0);
        assert!(find_path(&map, Vec2::new(0.5, 0.5), Vec2::new(10.0, 1.0)).is_empty());
        assert!(find_path(&map, Vec2::new(-3.0, 0.5), Vec2::new(2.5, 1.5)).is_empty());
    }

    #[test]
    fn test_idempotent_with_reused_frontier() {
        let mut map = TileMap::new(12, 12, 1.0);
        for row in 2..10 {
            map.set_asteroid(GridCell::new(row, 6), true);
        }

        let mut pathfinder = Pathfinder::new();
        let first = pathfinder.find_path(&map, Vec2::new(1.5, 5.5), Vec2::new(10.5, 5.5));
        let second = pathfinder.find_path(&map, Vec2::new(1.5, 5.5), Vec2::new(10.5, 5.5));

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_frontier_scores_stay_consistent() {
        let mut map = TileMap::new(8, 8, 1.0);
        map.set_asteroid(GridCell::new(3, 3), true);

        let mut pathfinder = Pathfinder::new();
        let path = pathfinder.find_path(&map, Vec2::new(0.5, 0.5), Vec2::new(7.5, 7.5));

        assert!(!path.is_empty());
        assert!(pathfinder.frontier().scores_consistent());
        assert!(pathfinder.last_stats().expanded > 0);
    }

    #[test]
    fn test_expansion_cap_reports_unreachable() {
        let map = TileMap::new(50, 50, 1.0);
        let mut pathfinder = Pathfinder::new().with_max_expansions(Some(5));

        let path = pathfinder.find_path(&map, Vec2::new(0.5, 0.5), Vec2::new(49.5, 0.5));

        assert!(path.is_empty());
        assert!(pathfinder.last_stats().capped);
    }
}

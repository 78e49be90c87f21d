//! Grid map adapter
//!
//! Maps world positions to tile cells and back, and answers blocked-cell
//! queries for the pathfinder. A cell is blocked when it holds an asteroid
//! or when a registered agent currently sits on it.

use glam::Vec2;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::ai::AgentId;

/// Discrete tile address. `row` indexes the y axis, `column` the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub row: i32,
    pub column: i32,
}

impl GridCell {
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Euclidean distance in cell units.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        let dr = (self.row - other.row) as f32;
        let dc = (self.column - other.column) as f32;
        (dr * dr + dc * dc).sqrt()
    }

    /// True when `other` lies in this cell's Chebyshev neighborhood.
    #[must_use]
    pub fn is_adjacent(self, other: Self) -> bool {
        self != other && (self.row - other.row).abs() <= 1 && (self.column - other.column).abs() <= 1
    }
}

/// Obstacle map queried by the pathfinder.
pub trait GridMap {
    /// Quantize a world position to the cell containing it.
    fn world_to_grid(&self, point: Vec2) -> GridCell;

    /// Canonical (center) world position of a cell.
    fn grid_to_world(&self, cell: GridCell) -> Vec2;

    /// Whether the cell lies inside the map bounds.
    fn contains(&self, cell: GridCell) -> bool;

    /// Whether the cell holds a static obstacle or a registered agent.
    fn is_blocked(&self, cell: GridCell) -> bool;

    /// In-bounds, unblocked cells of the 8-neighborhood.
    ///
    /// Order is row-major from the lower-left neighbor, which keeps searches
    /// reproducible for a given map state.
    fn neighbors(&self, cell: GridCell) -> SmallVec<[GridCell; 8]> {
        let mut result = SmallVec::new();
        for dr in -1..=1 {
            for dc in -1..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let (Some(row), Some(column)) =
                    (cell.row.checked_add(dr), cell.column.checked_add(dc))
                else {
                    continue;
                };
                let next = GridCell::new(row, column);
                if self.contains(next) && !self.is_blocked(next) {
                    result.push(next);
                }
            }
        }
        result
    }
}

/// Tile map with asteroid tiles and live agent occupancy.
#[derive(Debug, Clone)]
pub struct TileMap {
    /// Number of rows (y axis)
    pub rows: usize,
    /// Number of columns (x axis)
    pub columns: usize,
    /// Tile edge length in world units
    pub tile_size: f32,
    /// World position of the lower-left map corner
    pub origin: Vec2,
    /// Asteroid tiles, row-major
    asteroids: Vec<bool>,
    /// Last known position of every registered agent
    occupants: FxHashMap<AgentId, Vec2>,
}

impl TileMap {
    /// Create an empty map (no asteroids, no agents).
    #[must_use]
    pub fn new(rows: usize, columns: usize, tile_size: f32) -> Self {
        Self {
            rows,
            columns,
            tile_size,
            origin: Vec2::ZERO,
            asteroids: vec![false; rows * columns],
            occupants: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Build a map from ASCII rows, top row first. `#` marks an asteroid,
    /// anything else is open space. Returns `None` for ragged input.
    #[must_use]
    pub fn from_ascii<S: AsRef<str>>(lines: &[S], tile_size: f32) -> Option<Self> {
        let rows = lines.len();
        let columns = lines.first().map_or(0, |l| l.as_ref().chars().count());
        if lines.iter().any(|l| l.as_ref().chars().count() != columns) {
            return None;
        }

        let mut map = Self::new(rows, columns, tile_size);
        for (line_index, line) in lines.iter().enumerate() {
            let row = rows - 1 - line_index;
            for (column, ch) in line.as_ref().chars().enumerate() {
                if ch == '#' {
                    map.set_asteroid(GridCell::new(row as i32, column as i32), true);
                }
            }
        }
        Some(map)
    }

    fn index(&self, cell: GridCell) -> Option<usize> {
        if self.contains(cell) {
            Some(cell.row as usize * self.columns + cell.column as usize)
        } else {
            None
        }
    }

    /// Place or clear an asteroid. Out-of-bounds cells are ignored.
    pub fn set_asteroid(&mut self, cell: GridCell, asteroid: bool) {
        if let Some(i) = self.index(cell) {
            self.asteroids[i] = asteroid;
        }
    }

    #[must_use]
    pub fn is_asteroid(&self, cell: GridCell) -> bool {
        self.index(cell).is_some_and(|i| self.asteroids[i])
    }

    /// Whether a world position falls on an asteroid tile.
    #[must_use]
    pub fn is_asteroid_at(&self, point: Vec2) -> bool {
        self.is_asteroid(self.world_to_grid(point))
    }

    /// Register or move an agent. Must be refreshed before controllers run.
    pub fn place_agent(&mut self, agent: AgentId, position: Vec2) {
        self.occupants.insert(agent, position);
    }

    pub fn remove_agent(&mut self, agent: AgentId) {
        self.occupants.remove(&agent);
    }

    pub fn clear_agents(&mut self) {
        self.occupants.clear();
    }

    /// Whether any registered agent currently sits in `cell`.
    #[must_use]
    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.occupants
            .values()
            .any(|&position| self.world_to_grid(position) == cell)
    }

    /// World-space size of the whole map.
    #[must_use]
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.columns as f32, self.rows as f32) * self.tile_size
    }

    /// Whether a world position lies inside the map.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.contains(self.world_to_grid(point))
    }
}

impl GridMap for TileMap {
    fn world_to_grid(&self, point: Vec2) -> GridCell {
        let local = (point - self.origin) / self.tile_size;
        GridCell::new(local.y.floor() as i32, local.x.floor() as i32)
    }

    fn grid_to_world(&self, cell: GridCell) -> Vec2 {
        self.origin
            + Vec2::new(
                (cell.column as f32 + 0.5) * self.tile_size,
                (cell.row as f32 + 0.5) * self.tile_size,
            )
    }

    fn contains(&self, cell: GridCell) -> bool {
        cell.row >= 0
            && cell.column >= 0
            && (cell.row as usize) < self.rows
            && (cell.column as usize) < self.columns
    }

    fn is_blocked(&self, cell: GridCell) -> bool {
        self.is_asteroid(cell) || self.is_occupied(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entity() -> AgentId {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    #[test]
    fn test_world_grid_round_trip() {
        let map = TileMap::new(8, 8, 64.0).with_origin(Vec2::new(-256.0, -256.0));

        let cell = map.world_to_grid(Vec2::new(10.0, -70.0));
        assert_eq!(cell, GridCell::new(2, 4));

        let center = map.grid_to_world(cell);
        assert!((center - Vec2::new(32.0, -96.0)).length() < 1e-4);
        assert_eq!(map.world_to_grid(center), cell);
    }

    #[test]
    fn test_from_ascii_top_row_first() {
        let map = TileMap::from_ascii(&["#..", "...", "..#"], 1.0).unwrap();

        assert!(map.is_asteroid(GridCell::new(2, 0)));
        assert!(map.is_asteroid(GridCell::new(0, 2)));
        assert!(!map.is_asteroid(GridCell::new(0, 0)));
        assert!(TileMap::from_ascii(&["..", "..."], 1.0).is_none());
    }

    #[test]
    fn test_neighbors_open_interior() {
        let map = TileMap::new(5, 5, 1.0);
        let neighbors = map.neighbors(GridCell::new(2, 2));

        assert_eq!(neighbors.len(), 8);
        assert!(!neighbors.contains(&GridCell::new(2, 2)));
        assert!(neighbors.iter().all(|n| n.is_adjacent(GridCell::new(2, 2))));
    }

    #[test]
    fn test_neighbors_respect_bounds_and_asteroids() {
        let mut map = TileMap::new(5, 5, 1.0);
        map.set_asteroid(GridCell::new(1, 1), true);

        let corner = map.neighbors(GridCell::new(0, 0));
        assert_eq!(corner.len(), 2);
        assert!(!corner.contains(&GridCell::new(1, 1)));
    }

    #[test]
    fn test_occupancy_is_live() {
        let mut map = TileMap::new(5, 5, 1.0);
        let ship = test_entity();

        map.place_agent(ship, Vec2::new(3.5, 3.5));
        assert!(map.is_blocked(GridCell::new(3, 3)));

        // Moving the agent frees the old cell on the next query
        map.place_agent(ship, Vec2::new(0.5, 3.5));
        assert!(!map.is_blocked(GridCell::new(3, 3)));
        assert!(map.is_blocked(GridCell::new(3, 0)));

        map.remove_agent(ship);
        assert!(!map.is_blocked(GridCell::new(3, 0)));
    }

    #[test]
    fn test_out_of_bounds_is_not_contained() {
        let map = TileMap::new(4, 4, 1.0);

        assert!(!map.contains(map.world_to_grid(Vec2::new(-0.5, 1.0))));
        assert!(!map.contains_point(Vec2::new(4.0, 1.0)));
        assert!(map.contains_point(Vec2::new(3.99, 3.99)));
    }

    #[test]
    fn test_neighbors_at_extreme_cells() {
        let map = TileMap::new(4, 4, 1.0);

        let far = map.world_to_grid(Vec2::splat(f32::MAX));
        assert!(map.neighbors(far).is_empty());
        assert!(map.neighbors(GridCell::new(i32::MAX, i32::MAX)).is_empty());
        assert!(map.neighbors(GridCell::new(i32::MIN, i32::MIN)).is_empty());
    }
}

//! Arena scene serialization and deserialization
//!
//! A scene describes the asteroid field and where ships spawn. It is stored
//! in RON (Rusty Object Notation) or JSON. Tile rows are ASCII, top row
//! first: `#` is an asteroid, `.` is open space.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ai::{GridMap, TileMap};

/// Spawn point of a hostile ship
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostileSpawn {
    pub position: Vec2,
    /// Initial velocity
    #[serde(default)]
    pub velocity: Vec2,
}

impl HostileSpawn {
    #[must_use]
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }
}

/// A serializable arena description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaScene {
    /// Scene name
    pub name: String,
    /// Scene version for compatibility
    pub version: u32,
    /// Side length of a tile in world units
    pub tile_size: f32,
    /// World position of the lower-left map corner
    #[serde(default)]
    pub origin: Vec2,
    /// Tile rows, top row first
    pub tiles: Vec<String>,
    /// Player spawn point
    pub player: Vec2,
    #[serde(default)]
    pub hostiles: Vec<HostileSpawn>,
}

impl ArenaScene {
    const ASTEROID: char = '#';
    const OPEN: char = '.';

    /// Create an open arena of `rows` x `columns` tiles with the player at
    /// the lower-left corner tile.
    #[must_use]
    pub fn open(name: impl Into<String>, rows: usize, columns: usize, tile_size: f32) -> Self {
        Self {
            name: name.into(),
            version: 1,
            tile_size,
            origin: Vec2::ZERO,
            tiles: vec![Self::OPEN.to_string().repeat(columns); rows],
            player: Vec2::splat(tile_size * 0.5),
            hostiles: Vec::new(),
        }
    }

    /// The default skirmish: a 36 x 36 field of 64-unit
    /// tiles centered on the origin, a few asteroid belts, the player near
    /// the center and four hostiles around it.
    #[must_use]
    pub fn skirmish() -> Self {
        const SIZE: usize = 36;
        const TILE: f32 = 64.0;

        // (row, column, height, width), rows counted from the bottom
        const BELTS: [(usize, usize, usize, usize); 6] = [
            (15, 7, 2, 3),
            (22, 14, 2, 3),
            (5, 24, 3, 2),
            (28, 22, 2, 2),
            (12, 18, 1, 4),
            (26, 6, 3, 1),
        ];

        let mut grid = vec![vec![Self::OPEN; SIZE]; SIZE];
        for (row, column, height, width) in BELTS {
            for r in row..row + height {
                for c in column..column + width {
                    grid[r][c] = Self::ASTEROID;
                }
            }
        }

        let half = SIZE as f32 * TILE * 0.5;
        Self {
            name: "Skirmish".to_string(),
            version: 1,
            tile_size: TILE,
            origin: Vec2::splat(-half),
            tiles: grid.iter().rev().map(|row| row.iter().collect()).collect(),
            player: Vec2::new(64.0, 64.0),
            hostiles: vec![
                HostileSpawn::new(Vec2::new(832.0, 448.0), Vec2::new(0.0, -1.0)),
                HostileSpawn::new(Vec2::new(896.0, -448.0), Vec2::new(0.0, 1.0)),
                HostileSpawn::new(Vec2::new(-448.0, -448.0), Vec2::new(0.0, 1.0)),
                HostileSpawn::new(Vec2::new(-832.0, 1088.0), Vec2::new(0.0, -1.0)),
            ],
        }
    }

    #[must_use]
    pub fn with_hostile(mut self, position: Vec2, velocity: Vec2) -> Self {
        self.hostiles.push(HostileSpawn::new(position, velocity));
        self
    }

    #[must_use]
    pub fn with_player(mut self, position: Vec2) -> Self {
        self.player = position;
        self
    }

    /// Mark the tile containing `point` as an asteroid. Points outside the
    /// tile rows are ignored.
    #[must_use]
    pub fn with_asteroid_at(mut self, point: Vec2) -> Self {
        let local = (point - self.origin) / self.tile_size;
        let (column, row) = (local.x.floor(), local.y.floor());
        let rows = self.tiles.len();
        if row < 0.0 || column < 0.0 || row as usize >= rows {
            return self;
        }
        let line = &mut self.tiles[rows - 1 - row as usize];
        let column = column as usize;
        if column < line.chars().count() {
            *line = line
                .chars()
                .enumerate()
                .map(|(i, ch)| if i == column { Self::ASTEROID } else { ch })
                .collect();
        }
        self
    }

    /// Build the grid map described by the tile rows
    ///
    /// # Errors
    ///
    /// Returns `InvalidMap` for an empty or ragged grid, an unknown tile
    /// character, or a non-positive tile size
    pub fn to_tile_map(&self) -> Result<TileMap, SceneError> {
        if self.tile_size.is_nan() || self.tile_size <= 0.0 {
            return Err(SceneError::InvalidMap(format!(
                "tile size must be positive, got {}",
                self.tile_size
            )));
        }
        if self.tiles.is_empty() || self.tiles.iter().all(String::is_empty) {
            return Err(SceneError::InvalidMap("no tile rows".to_string()));
        }
        if let Some((index, ch)) = self.tiles.iter().enumerate().find_map(|(index, line)| {
            line.chars()
                .find(|ch| *ch != Self::ASTEROID && *ch != Self::OPEN)
                .map(|ch| (index, ch))
        }) {
            return Err(SceneError::InvalidMap(format!(
                "unknown tile {ch:?} in row {index}"
            )));
        }

        let map = TileMap::from_ascii(&self.tiles, self.tile_size)
            .ok_or_else(|| SceneError::InvalidMap("rows differ in length".to_string()))?
            .with_origin(self.origin);
        Ok(map)
    }

    /// Check that every spawn lies on open space inside the map
    ///
    /// # Errors
    ///
    /// Returns `InvalidMap` if the tiles are malformed, `InvalidSpawn` if a
    /// ship would start outside the map or inside an asteroid
    pub fn validate(&self) -> Result<TileMap, SceneError> {
        let map = self.to_tile_map()?;
        let spawns = std::iter::once(("player", self.player))
            .chain(self.hostiles.iter().map(|spawn| ("hostile", spawn.position)));
        for (kind, position) in spawns {
            if !map.contains_point(position) {
                return Err(SceneError::InvalidSpawn(format!(
                    "{kind} at {position:?} is outside the map"
                )));
            }
            if map.is_asteroid(map.world_to_grid(position)) {
                return Err(SceneError::InvalidSpawn(format!(
                    "{kind} at {position:?} is inside an asteroid"
                )));
            }
        }
        Ok(map)
    }

    /// Save the scene to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| SceneError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a scene from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::IoError(e.to_string()))?;
        let scene: ArenaScene =
            ron::from_str(&content).map_err(|e| SceneError::DeserializeError(e.to_string()))?;
        Ok(scene)
    }

    /// Save the scene to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| SceneError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| SceneError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a scene from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::IoError(e.to_string()))?;
        let scene: ArenaScene = serde_json::from_str(&content)
            .map_err(|e| SceneError::DeserializeError(e.to_string()))?;
        Ok(scene)
    }

    /// Load a scene, picking the format from the file extension
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::load_json(path),
            _ => Self::load_ron(path),
        }
    }
}

impl Default for ArenaScene {
    fn default() -> Self {
        Self::skirmish()
    }
}

/// Errors that can occur during scene operations
#[derive(Debug, Clone)]
pub enum SceneError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// Tile rows do not describe a rectangular grid
    InvalidMap(String),
    /// A ship spawns outside the map or inside an asteroid
    InvalidSpawn(String),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::InvalidMap(e) => write!(f, "Invalid map: {e}"),
            Self::InvalidSpawn(e) => write!(f, "Invalid spawn: {e}"),
        }
    }
}

impl std::error::Error for SceneError {}

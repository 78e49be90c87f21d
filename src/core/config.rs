//! Simulation tuning
//!
//! Every value has a default taken from the shipped game balance, and the
//! whole tree can be loaded from RON or JSON. Missing fields fall back to
//! their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Steering engine constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Cap on the accumulated steering force
    pub max_force: f32,
    /// Distance of the wander circle ahead of the ship
    pub circle_distance: f32,
    /// Radius of the wander circle
    pub circle_radius: f32,
    /// Full width of the per-call wander angle perturbation (radians)
    pub angle_change: f32,
    /// Seed for the wander generator (OS entropy when unset)
    pub wander_seed: Option<u64>,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            max_force: 300.0,
            circle_distance: 200.0,
            circle_radius: 64.0,
            angle_change: 15f32.to_radians(),
            wander_seed: None,
        }
    }
}

impl SteeringConfig {
    pub fn with_max_force(mut self, max_force: f32) -> Self {
        self.max_force = max_force;
        self
    }

    pub fn with_wander_seed(mut self, seed: u64) -> Self {
        self.wander_seed = Some(seed);
        self
    }
}

/// Weapon settings shared by both ship kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Seconds between shots
    pub cooldown: f32,
    /// Projectile speed
    pub projectile_speed: f32,
    /// Spawn distance ahead of the ship
    pub muzzle_offset: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            cooldown: 1.0,
            projectile_speed: 300.0,
            muzzle_offset: 60.0,
        }
    }
}

/// Player ship behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_speed: f32,
    /// Distance under which the player stops and shoots
    pub attack_range: f32,
    /// Distance at which a waypoint counts as reached
    pub checkpoint_radius: f32,
    /// Arrival slowdown radius on the last waypoint
    pub final_slowing_radius: f32,
    pub pursuit_force_scale: f32,
    pub path_force_scale: f32,
    pub weapon: WeaponConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_speed: 100.0,
            attack_range: 300.0,
            checkpoint_radius: 20.0,
            final_slowing_radius: 40.0,
            pursuit_force_scale: 150.0,
            path_force_scale: 100.0,
            weapon: WeaponConfig::default(),
        }
    }
}

impl PlayerConfig {
    pub fn with_attack_range(mut self, range: f32) -> Self {
        self.attack_range = range;
        self
    }

    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.weapon.cooldown = cooldown;
        self
    }
}

/// Hostile ship behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostileConfig {
    pub max_speed: f32,
    /// Distance under which the player is noticed
    pub view_range: f32,
    /// Distance under which the hostile stops and shoots
    pub attack_range: f32,
    pub wander_force_scale: f32,
    pub pursuit_force_scale: f32,
    pub weapon: WeaponConfig,
}

impl Default for HostileConfig {
    fn default() -> Self {
        Self {
            max_speed: 150.0,
            view_range: 300.0,
            attack_range: 150.0,
            wander_force_scale: 100.0,
            pursuit_force_scale: 200.0,
            weapon: WeaponConfig {
                cooldown: 1.5,
                ..WeaponConfig::default()
            },
        }
    }
}

impl HostileConfig {
    pub fn with_ranges(mut self, view_range: f32, attack_range: f32) -> Self {
        self.view_range = view_range;
        self.attack_range = attack_range;
        self
    }

    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.weapon.cooldown = cooldown;
        self
    }
}

/// Pathfinder limits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfinderConfig {
    /// Expansion cap after which a search reports "unreachable"
    pub max_expansions: Option<usize>,
}

/// Reference arena physics and damage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub ship_mass: f32,
    /// Hit radius of a ship
    pub ship_radius: f32,
    pub player_hull: i32,
    pub projectile_damage: i32,
    /// Fraction of velocity lost per second
    pub linear_damping: f32,
    /// Seconds before an unspent projectile is removed
    pub projectile_lifetime: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            ship_mass: 10.0,
            ship_radius: 16.0,
            player_hull: 1000,
            projectile_damage: 10,
            linear_damping: 0.1,
            projectile_lifetime: 4.0,
        }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub steering: SteeringConfig,
    pub player: PlayerConfig,
    pub hostile: HostileConfig,
    pub pathfinder: PathfinderConfig,
    pub arena: ArenaConfig,
}

impl SimConfig {
    pub fn with_steering(mut self, steering: SteeringConfig) -> Self {
        self.steering = steering;
        self
    }

    pub fn with_player(mut self, player: PlayerConfig) -> Self {
        self.player = player;
        self
    }

    pub fn with_hostile(mut self, hostile: HostileConfig) -> Self {
        self.hostile = hostile;
        self
    }

    pub fn with_arena(mut self, arena: ArenaConfig) -> Self {
        self.arena = arena;
        self
    }

    /// Parse a RON document
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }

    /// Load from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Load from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }

    /// Save to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, text).map_err(|e| ConfigError::IoError(e.to_string()))
    }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

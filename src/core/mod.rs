//! Core simulation module
//!
//! Configuration, events, scene description and the headless arena that
//! drives the ship AI.

pub mod arena;
pub mod config;
pub mod events;
pub mod scene;

pub use arena::{Arena, Command, Outcome};
pub use config::{
    ArenaConfig, ConfigError, HostileConfig, PathfinderConfig, PlayerConfig, SimConfig,
    SteeringConfig, WeaponConfig,
};
pub use events::{EventQueue, GameEvent};
pub use scene::{ArenaScene, HostileSpawn, SceneError};

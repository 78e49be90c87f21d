//! AI core for a top-down space shooter
//!
//! This crate provides:
//! - Grid mapping and A* pathfinding over an asteroid field
//! - Steering behaviors (seek, wander, pursuit) with force accumulation
//! - Finite state machines driving the player and hostile ships
//! - A headless arena built on hecs that runs the controllers end to end

pub mod ai;
pub mod core;
pub mod ecs;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        Agent, AgentId, GridCell, GridMap, HostileShip, HostileState, Intent, Kinematics, Path,
        Pathfinder, PlayerShip, PlayerState, SteeringManager, TileMap,
    };
    pub use crate::core::{
        Arena, ArenaScene, Command, EventQueue, GameEvent, Outcome, SceneError, SimConfig,
    };
    pub use crate::ecs::{Body, Hull, Projectile, Ship, World};
    pub use glam::Vec2;
}

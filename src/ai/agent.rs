//! Agent capability and controller outputs

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Agents are identified by their ECS entity.
pub type AgentId = hecs::Entity;

/// Minimal kinematic contract shared by every ship kind.
///
/// The steering engine only ever sees agents through this trait, so the
/// player and hostile ships (and plain snapshots) steer uniformly.
pub trait Agent {
    fn position(&self) -> Vec2;
    fn velocity(&self) -> Vec2;
    fn max_speed(&self) -> f32;
    fn mass(&self) -> f32;
}

/// Kinematic snapshot of an agent, supplied by the environment each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
    pub max_speed: f32,
    pub mass: f32,
}

impl Kinematics {
    #[must_use]
    pub fn new(position: Vec2, velocity: Vec2, max_speed: f32, mass: f32) -> Self {
        Self {
            position,
            velocity,
            max_speed,
            mass,
        }
    }

    /// A stationary snapshot
    #[must_use]
    pub fn at(position: Vec2) -> Self {
        Self::new(position, Vec2::ZERO, 0.0, 1.0)
    }
}

impl Agent for Kinematics {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn max_speed(&self) -> f32 {
        self.max_speed
    }

    fn mass(&self) -> f32 {
        self.mass
    }
}

/// Collision category bits carried by projectile spawn requests.
///
/// Collision filtering itself belongs to the environment; the core only
/// tags what it fires.
pub mod category {
    pub const NONE: u32 = 0;
    pub const PLAYER_BULLET: u32 = 1 << 0;
    pub const ENEMY_BULLET: u32 = 1 << 1;
    pub const PLAYER_SHIP: u32 = 1 << 2;
    pub const ENEMY_SHIP: u32 = 1 << 3;
    pub const ASTEROID: u32 = 1 << 4;
}

/// Request to spawn a projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpawn {
    /// Agent that fired
    pub shooter: AgentId,
    /// Spawn position (shooter position plus muzzle offset)
    pub position: Vec2,
    /// Unit travel direction
    pub direction: Vec2,
    /// Travel speed in world units per second
    pub speed: f32,
    /// Category bits of the projectile itself
    pub category: u32,
    /// Categories the projectile should report contacts with
    pub contact_mask: u32,
}

impl ProjectileSpawn {
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }
}

/// Output of a controller tick, applied by the environment.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Apply this force to the agent's body
    ApplyForce(Vec2),
    /// Zero the agent's velocity
    Halt,
    /// Spawn a projectile
    Fire(ProjectileSpawn),
    /// The behavior state changed
    StateChanged {
        from: &'static str,
        to: &'static str,
    },
}

//! Arena components

use glam::Vec2;

use crate::ai::{AgentId, Kinematics, ProjectileSpawn};

/// Kinematic body of a ship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    /// World units per second
    pub velocity: Vec2,
    pub mass: f32,
    /// Speed the ship's steering aims for
    pub max_speed: f32,
    /// Hit radius
    pub radius: f32,
}

impl Body {
    #[must_use]
    pub fn new(position: Vec2, velocity: Vec2, mass: f32, max_speed: f32, radius: f32) -> Self {
        Self {
            position,
            velocity,
            mass,
            max_speed,
            radius,
        }
    }

    /// Snapshot handed to the controllers.
    #[must_use]
    pub fn kinematics(&self) -> Kinematics {
        Kinematics::new(self.position, self.velocity, self.max_speed, self.mass)
    }

    /// Accelerate by `force` over `delta_time`.
    pub fn apply_force(&mut self, force: Vec2, delta_time: f32) {
        if self.mass > f32::EPSILON {
            self.velocity += force / self.mass * delta_time;
        }
    }

    #[must_use]
    pub fn overlaps(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) <= self.radius * self.radius
    }
}

/// Which side a ship fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ship {
    Player,
    Hostile,
}

/// Remaining hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hull {
    pub life: i32,
}

impl Hull {
    /// Subtract `amount`; true when the hull is exhausted.
    pub fn damage(&mut self, amount: i32) -> bool {
        self.life = self.life.saturating_sub(amount);
        self.life <= 0
    }
}

/// A bullet in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub position: Vec2,
    pub velocity: Vec2,
    pub shooter: AgentId,
    pub damage: i32,
    /// Category bits of the projectile itself
    pub category: u32,
    /// Categories this projectile hits
    pub contact_mask: u32,
    /// Seconds left before it burns out
    pub ttl: f32,
}

impl Projectile {
    #[must_use]
    pub fn from_spawn(spawn: &ProjectileSpawn, damage: i32, ttl: f32) -> Self {
        Self {
            position: spawn.position,
            velocity: spawn.velocity(),
            shooter: spawn.shooter,
            damage,
            category: spawn.category,
            contact_mask: spawn.contact_mask,
            ttl,
        }
    }

    #[must_use]
    pub fn hits(&self, category: u32) -> bool {
        self.contact_mask & category != 0
    }
}

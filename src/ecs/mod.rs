//! Entity Component System module
//!
//! Built on top of the hecs ECS library

mod components;
mod world;

pub use components::{Body, Hull, Projectile, Ship};
pub use world::World;

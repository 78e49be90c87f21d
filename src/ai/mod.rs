//! AI and navigation module
//!
//! Provides grid pathfinding, steering behaviors, finite state machines, and
//! the player and hostile ship controllers built on them.

mod agent;
mod fsm;
mod grid;
mod helm;
mod hostile;
mod pathfinding;
mod player;
mod steering;
mod weapon;

pub use agent::{Agent, AgentId, Intent, Kinematics, ProjectileSpawn, category};
pub use fsm::{State, StateMachine, Transition};
pub use grid::{GridCell, GridMap, TileMap};
pub use helm::Helm;
pub use hostile::{HostileContext, HostileShip, HostileState};
pub use pathfinding::{Path, Pathfinder, SearchFrontier, SearchStats, find_path};
pub use player::{PlayerContext, PlayerShip, PlayerState};
pub use steering::{AvoidanceHook, SteeringManager, SteeringPhase};
pub use weapon::{ShotClock, Weapon};

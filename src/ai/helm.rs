//! Ship helm: kinematic snapshot, heading, steering and pending intents

use glam::Vec2;

use crate::ai::agent::{Agent, Intent, Kinematics};
use crate::ai::steering::SteeringManager;

/// State shared by every ship controller.
#[derive(Debug)]
pub struct Helm {
    /// Latest snapshot written by the environment
    pub body: Kinematics,
    pub steering: SteeringManager,
    /// Unit facing; starts pointing up
    heading: Vec2,
    intents: Vec<Intent>,
}

impl Helm {
    #[must_use]
    pub fn new(body: Kinematics, steering: SteeringManager) -> Self {
        let heading = body.velocity.try_normalize().unwrap_or(Vec2::Y);
        Self {
            body,
            steering,
            heading,
            intents: Vec::new(),
        }
    }

    /// Overwrite position and velocity with the environment's values.
    pub fn sync(&mut self, position: Vec2, velocity: Vec2) {
        self.body.position = position;
        self.body.velocity = velocity;
    }

    #[must_use]
    pub fn heading(&self) -> Vec2 {
        self.heading
    }

    /// Turn to match the direction of travel. No-op while stationary.
    pub fn align_to_velocity(&mut self) {
        if let Some(direction) = self.body.velocity.try_normalize() {
            self.heading = direction;
        }
    }

    /// Turn toward a point. No-op when already on it.
    pub fn face(&mut self, point: Vec2) {
        if let Some(direction) = (point - self.body.position).try_normalize() {
            self.heading = direction;
        }
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.body.position.distance(point)
    }

    /// Stop dead.
    pub fn halt(&mut self) {
        self.body.velocity = Vec2::ZERO;
        self.intents.push(Intent::Halt);
    }

    /// Consume the steering accumulator and queue the scaled force.
    pub fn apply_steering(&mut self, scale: f32) {
        let force = self.steering.steer(&self.body) * scale;
        log::trace!("Applying steering force {force:?}");
        self.intents.push(Intent::ApplyForce(force));
    }

    pub fn push(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Hand queued intents to the environment.
    pub fn drain(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.intents)
    }
}

impl Agent for Helm {
    fn position(&self) -> Vec2 {
        self.body.position
    }

    fn velocity(&self) -> Vec2 {
        self.body.velocity
    }

    fn max_speed(&self) -> f32 {
        self.body.max_speed
    }

    fn mass(&self) -> f32 {
        self.body.mass
    }
}

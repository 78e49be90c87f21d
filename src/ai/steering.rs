//! Steering behaviors for ships
//!
//! Each ship owns a [`SteeringManager`] that accumulates forces from the
//! behaviors invoked during a tick, then hands back a capped, mass-scaled
//! force through [`SteeringManager::steer`].
//!
//! # Accumulator contract
//!
//! `steer()` does not clear the accumulator: it leaves the capped,
//! mass-divided force behind. The expected tick is `reset()` → one or more
//! behaviors → `steer()`; skipping the reset lets that force carry over
//! into the next tick. [`SteeringPhase`] records
//! where in that cycle the manager is.

use std::fmt;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ai::agent::Agent;
use crate::core::config::SteeringConfig;

/// Position of the accumulator in its reset/accumulate/consume cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteeringPhase {
    /// Zeroed, nothing accumulated yet
    Reset,
    /// At least one behavior contributed since the last reset or steer
    Accumulating,
    /// `steer()` has read the accumulator
    Consumed,
}

/// Extra steering contribution supplied by the environment.
///
/// Reserved for obstacle avoidance, which needs ray queries the core
/// does not have.
pub trait AvoidanceHook {
    fn avoidance_force(&self, position: Vec2, velocity: Vec2) -> Vec2;
}

/// Per-agent steering accumulator and behavior set.
pub struct SteeringManager {
    steering: Vec2,
    phase: SteeringPhase,
    wander_angle: f32,
    config: SteeringConfig,
    rng: StdRng,
    avoidance: Option<Box<dyn AvoidanceHook>>,
}

impl SteeringManager {
    /// Create a manager. The wander generator is seeded from the config,
    /// or from the OS when no seed is set.
    #[must_use]
    pub fn new(config: SteeringConfig) -> Self {
        let rng = match config.wander_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }

    #[must_use]
    pub fn with_rng(config: SteeringConfig, rng: StdRng) -> Self {
        Self {
            steering: Vec2::ZERO,
            phase: SteeringPhase::Reset,
            wander_angle: 0.0,
            config,
            rng,
            avoidance: None,
        }
    }

    /// Install an avoidance hook used by [`Self::collision_avoidance`].
    pub fn set_avoidance(&mut self, hook: Box<dyn AvoidanceHook>) {
        self.avoidance = Some(hook);
    }

    #[must_use]
    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    /// Raw accumulated force
    #[must_use]
    pub fn force(&self) -> Vec2 {
        self.steering
    }

    #[must_use]
    pub fn phase(&self) -> SteeringPhase {
        self.phase
    }

    #[must_use]
    pub fn wander_angle(&self) -> f32 {
        self.wander_angle
    }

    /// Steer toward `target`, slowing linearly inside `slowing_radius`.
    /// A radius of zero disables the slowdown.
    pub fn seek(&mut self, host: &impl Agent, target: Vec2, slowing_radius: f32) {
        if let Some(force) = seek_force(host, target, slowing_radius) {
            self.accumulate(force);
        }
    }

    /// Undirected smooth drift around the current heading.
    pub fn wander(&mut self, host: &impl Agent) {
        let heading = host.velocity().normalize_or_zero();
        let circle_center = heading * self.config.circle_distance;

        let base = if heading == Vec2::ZERO { Vec2::X } else { heading };
        let displacement = base.rotate(Vec2::from_angle(self.wander_angle)) * self.config.circle_radius;

        let change = self.config.angle_change;
        self.wander_angle += self.rng.random::<f32>() * change - change * 0.5;

        self.accumulate(circle_center + displacement);
    }

    /// Intercept a moving target by seeking its predicted position.
    pub fn pursuit(&mut self, host: &impl Agent, target: &impl Agent) {
        let max_speed = host.max_speed();
        let updates_needed = if max_speed > f32::EPSILON {
            target.position().distance(host.position()) / max_speed
        } else {
            0.0
        };
        let future = target.position() + target.velocity() * updates_needed;
        self.seek(host, future, 0.0);
    }

    /// Add the installed avoidance hook's force, if any.
    pub fn collision_avoidance(&mut self, host: &impl Agent) {
        let Some(hook) = &self.avoidance else {
            return;
        };
        let force = hook.avoidance_force(host.position(), host.velocity());
        self.accumulate(force);
    }

    /// Cap the accumulator to the maximum force, divide it by the host's
    /// mass and return it. The accumulator keeps the divided value, so a
    /// second call without a reset divides again.
    pub fn steer(&mut self, host: &impl Agent) -> Vec2 {
        self.phase = SteeringPhase::Consumed;

        let mass = host.mass();
        if mass <= f32::EPSILON {
            log::warn!("Steering host has non-positive mass {mass}, dropping force");
            self.steering = Vec2::ZERO;
            return Vec2::ZERO;
        }
        self.steering = self.steering.clamp_length_max(self.config.max_force) / mass;
        self.steering
    }

    /// Zero the accumulator.
    pub fn reset(&mut self) {
        self.steering = Vec2::ZERO;
        self.phase = SteeringPhase::Reset;
    }

    fn accumulate(&mut self, force: Vec2) {
        if !force.is_finite() {
            log::warn!("Discarding non-finite steering force {force:?}");
            return;
        }
        if self.phase == SteeringPhase::Consumed {
            log::trace!("Steering accumulates on a consumed force without reset");
        }
        self.steering += force;
        self.phase = SteeringPhase::Accumulating;
    }
}

impl fmt::Debug for SteeringManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SteeringManager")
            .field("steering", &self.steering)
            .field("phase", &self.phase)
            .field("wander_angle", &self.wander_angle)
            .field("avoidance", &self.avoidance.is_some())
            .finish()
    }
}

/// Velocity the host would like to have to reach `target`.
///
/// `None` when the host already sits on the target.
fn desired_velocity(position: Vec2, target: Vec2, max_speed: f32, slowing_radius: f32) -> Option<Vec2> {
    let offset = target - position;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return None;
    }

    let speed = if slowing_radius > 0.0 && distance <= slowing_radius {
        max_speed * distance / slowing_radius
    } else {
        max_speed
    };
    Some(offset / distance * speed)
}

fn seek_force(host: &impl Agent, target: Vec2, slowing_radius: f32) -> Option<Vec2> {
    desired_velocity(host.position(), target, host.max_speed(), slowing_radius)
        .map(|desired| desired - host.velocity())
}

//! Ship weapons: shot cooldown and projectile requests

use glam::Vec2;

use crate::ai::agent::{AgentId, ProjectileSpawn};
use crate::core::config::WeaponConfig;

/// Cooldown clock for a ship's gun.
///
/// Armed to zero when the ship starts shooting; a shot is due once a full
/// cooldown has elapsed, after which the clock restarts from zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotClock {
    elapsed: f32,
    cooldown: f32,
}

impl ShotClock {
    #[must_use]
    pub fn new(cooldown: f32) -> Self {
        Self {
            elapsed: 0.0,
            cooldown,
        }
    }

    /// Restart the cooldown.
    pub fn arm(&mut self) {
        self.elapsed = 0.0;
    }

    /// Advance by `delta_time`; true when a shot is due.
    pub fn tick(&mut self, delta_time: f32) -> bool {
        self.elapsed += delta_time;
        if self.elapsed < self.cooldown {
            return false;
        }
        self.elapsed = 0.0;
        true
    }

    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// Gun mounted on a ship.
#[derive(Debug, Clone)]
pub struct Weapon {
    pub clock: ShotClock,
    config: WeaponConfig,
    /// Category bits of fired projectiles
    category: u32,
    /// Categories fired projectiles report contacts with
    contact_mask: u32,
}

impl Weapon {
    #[must_use]
    pub fn new(config: WeaponConfig, category: u32, contact_mask: u32) -> Self {
        Self {
            clock: ShotClock::new(config.cooldown),
            config,
            category,
            contact_mask,
        }
    }

    /// Build a projectile leaving the muzzle along `heading`.
    #[must_use]
    pub fn fire(&self, shooter: AgentId, position: Vec2, heading: Vec2) -> ProjectileSpawn {
        let direction = heading.normalize_or_zero();
        ProjectileSpawn {
            shooter,
            position: position + direction * self.config.muzzle_offset,
            direction,
            speed: self.config.projectile_speed,
            category: self.category,
            contact_mask: self.contact_mask,
        }
    }
}

//! Hostile ship controller
//!
//! Wanders until the player comes into view, pursues, then holds position
//! and shoots while the player stays in attack range.

use glam::Vec2;

use crate::ai::agent::{Agent, AgentId, Intent, Kinematics, category};
use crate::ai::fsm::{State, StateMachine, Transition};
use crate::ai::helm::Helm;
use crate::ai::steering::SteeringManager;
use crate::ai::weapon::Weapon;
use crate::core::config::{HostileConfig, SteeringConfig};

/// Behavior of a hostile ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostileState {
    /// Parked, e.g. after the player died
    Inactive,
    Shoot,
    Pursuit,
    Wander,
}

/// Data the hostile states act on.
#[derive(Debug)]
pub struct HostileContext {
    id: AgentId,
    helm: Helm,
    weapon: Weapon,
    config: HostileConfig,
    /// Player snapshot for this tick; `None` once the player is gone
    player: Option<Kinematics>,
    delta_time: f32,
}

impl HostileContext {
    fn player_distance(&self) -> Option<f32> {
        self.player.map(|p| self.helm.distance_to(p.position))
    }

    fn player_in_view(&self) -> bool {
        self.player_distance().is_some_and(|d| d < self.config.view_range)
    }

    fn player_in_attack_range(&self) -> bool {
        self.player_distance().is_some_and(|d| d < self.config.attack_range)
    }
}

impl State<HostileContext> for HostileState {
    fn name(&self) -> &'static str {
        match self {
            HostileState::Inactive => "Inactive",
            HostileState::Shoot => "Shoot",
            HostileState::Pursuit => "Pursuit",
            HostileState::Wander => "Wander",
        }
    }

    fn enter(&self, ctx: &mut HostileContext) {
        match self {
            HostileState::Shoot => {
                ctx.helm.halt();
                ctx.helm.steering.reset();
                ctx.weapon.clock.arm();
            }
            HostileState::Inactive => {
                ctx.helm.halt();
                ctx.helm.steering.reset();
            }
            HostileState::Pursuit | HostileState::Wander => {}
        }
    }

    fn update(&self, ctx: &mut HostileContext) -> Transition<Self> {
        match self {
            HostileState::Inactive => {
                ctx.helm.halt();
                ctx.helm.steering.reset();
                Transition::None
            }

            HostileState::Wander => {
                if ctx.player_in_view() {
                    return Transition::To(HostileState::Pursuit);
                }
                ctx.helm.steering.reset();
                ctx.helm.steering.wander(&ctx.helm.body);
                ctx.helm.apply_steering(ctx.config.wander_force_scale);
                Transition::None
            }

            HostileState::Pursuit => {
                let Some(player) = ctx.player else {
                    log::debug!("Hostile {:?} lost its pursuit target", ctx.id);
                    ctx.helm.steering.reset();
                    return Transition::To(HostileState::Wander);
                };
                if ctx.player_in_attack_range() {
                    return Transition::To(HostileState::Shoot);
                }

                // Out of view: fall back to wandering, but keep chasing this tick
                let next = if ctx.player_in_view() {
                    Transition::None
                } else {
                    Transition::To(HostileState::Wander)
                };

                ctx.helm.steering.reset();
                ctx.helm.steering.pursuit(&ctx.helm.body, &player);
                ctx.helm.apply_steering(ctx.config.pursuit_force_scale);
                next
            }

            HostileState::Shoot => {
                let Some(player) = ctx.player else {
                    return Transition::To(HostileState::Wander);
                };
                if !ctx.player_in_attack_range() {
                    return Transition::To(HostileState::Pursuit);
                }

                ctx.helm.face(player.position);
                if ctx.weapon.clock.tick(ctx.delta_time) {
                    let shot = ctx.weapon.fire(ctx.id, ctx.helm.body.position, ctx.helm.heading());
                    ctx.helm.push(Intent::Fire(shot));
                }
                Transition::None
            }
        }
    }

    fn exit(&self, ctx: &mut HostileContext) {
        if *self == HostileState::Shoot {
            ctx.helm.steering.reset();
        }
    }
}

/// Autonomous enemy ship.
#[derive(Debug)]
pub struct HostileShip {
    fsm: StateMachine<HostileState>,
    ctx: HostileContext,
}

impl HostileShip {
    /// Create a hostile starting in `Wander`.
    #[must_use]
    pub fn new(
        id: AgentId,
        position: Vec2,
        velocity: Vec2,
        mass: f32,
        config: HostileConfig,
        steering: SteeringConfig,
    ) -> Self {
        let body = Kinematics::new(position, velocity, config.max_speed, mass);
        let weapon = Weapon::new(
            config.weapon.clone(),
            category::ENEMY_BULLET,
            category::ASTEROID | category::PLAYER_SHIP,
        );
        Self {
            fsm: StateMachine::new(HostileState::Wander),
            ctx: HostileContext {
                id,
                helm: Helm::new(body, SteeringManager::new(steering)),
                weapon,
                config,
                player: None,
                delta_time: 0.0,
            },
        }
    }

    #[must_use]
    pub fn id(&self) -> AgentId {
        self.ctx.id
    }

    #[must_use]
    pub fn state(&self) -> HostileState {
        self.fsm.current()
    }

    #[must_use]
    pub fn heading(&self) -> Vec2 {
        self.ctx.helm.heading()
    }

    #[must_use]
    pub fn steering(&self) -> &SteeringManager {
        &self.ctx.helm.steering
    }

    /// Write the environment's position and velocity before ticking.
    pub fn sync(&mut self, position: Vec2, velocity: Vec2) {
        self.ctx.helm.sync(position, velocity);
    }

    /// Run one tick against the player's current snapshot (`None` when the
    /// player no longer exists) and return the resulting intents.
    pub fn tick(&mut self, delta_time: f32, player: Option<Kinematics>) -> Vec<Intent> {
        self.ctx.delta_time = delta_time;
        self.ctx.player = player;
        self.ctx.helm.align_to_velocity();

        if let Some(previous) = self.fsm.update(&mut self.ctx) {
            self.ctx.helm.push(Intent::StateChanged {
                from: previous.name(),
                to: self.fsm.current().name(),
            });
        }
        self.ctx.helm.drain()
    }

    /// Park the ship, e.g. when the player is destroyed.
    pub fn deactivate(&mut self) {
        self.force(HostileState::Inactive);
    }

    /// Leave `Inactive` and resume wandering.
    pub fn reactivate(&mut self) {
        if self.fsm.is_in_state(HostileState::Inactive) {
            self.force(HostileState::Wander);
        }
    }

    fn force(&mut self, state: HostileState) {
        let previous = self.fsm.transition(&mut self.ctx, state);
        if previous != state {
            self.ctx.helm.push(Intent::StateChanged {
                from: previous.name(),
                to: state.name(),
            });
        }
    }
}

impl Agent for HostileShip {
    fn position(&self) -> Vec2 {
        self.ctx.helm.position()
    }

    fn velocity(&self) -> Vec2 {
        self.ctx.helm.velocity()
    }

    fn max_speed(&self) -> f32 {
        self.ctx.helm.max_speed()
    }

    fn mass(&self) -> f32 {
        self.ctx.helm.mass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn hostile_at(position: Vec2) -> HostileShip {
        let mut world = hecs::World::new();
        HostileShip::new(
            world.spawn(()),
            position,
            Vec2::new(0.0, -1.0),
            10.0,
            HostileConfig::default(),
            SteeringConfig::default().with_wander_seed(42),
        )
    }

    fn player_at(position: Vec2) -> Option<Kinematics> {
        Some(Kinematics::new(position, Vec2::ZERO, 100.0, 10.0))
    }

    fn fired(intents: &[Intent]) -> usize {
        intents.iter().filter(|i| matches!(i, Intent::Fire(_))).count()
    }

    #[test]
    fn test_starts_wandering() {
        let hostile = hostile_at(Vec2::ZERO);
        assert_eq!(hostile.state(), HostileState::Wander);
    }

    #[test]
    fn test_wander_until_player_in_view_then_pursue_once() {
        let mut hostile = hostile_at(Vec2::ZERO);
        let mut changes = 0;

        for tick in 0..40 {
            // Player approaches from far away; crosses the 300 view range at tick 20
            let distance = 600.0 - tick as f32 * 15.0;
            let intents = hostile.tick(DT, player_at(Vec2::new(distance, 0.0)));
            hostile.sync(Vec2::ZERO, Vec2::ZERO);

            changes += intents
                .iter()
                .filter(|i| matches!(i, Intent::StateChanged { .. }))
                .count();

            if distance >= 300.0 {
                assert_eq!(hostile.state(), HostileState::Wander, "tick {tick}");
                assert!(intents.iter().any(|i| matches!(i, Intent::ApplyForce(_))));
            } else if distance >= 150.0 {
                assert_eq!(hostile.state(), HostileState::Pursuit, "tick {tick}");
            }
        }

        // Wander -> Pursuit, then Pursuit -> Shoot once in attack range
        assert_eq!(changes, 2);
    }

    #[test]
    fn test_pursuit_to_shoot_halts() {
        let mut hostile = hostile_at(Vec2::ZERO);
        hostile.tick(DT, player_at(Vec2::new(200.0, 0.0)));
        assert_eq!(hostile.state(), HostileState::Pursuit);

        let intents = hostile.tick(DT, player_at(Vec2::new(100.0, 0.0)));

        assert_eq!(hostile.state(), HostileState::Shoot);
        assert!(intents.contains(&Intent::Halt));
        assert!(!intents.iter().any(|i| matches!(i, Intent::ApplyForce(_))));
        assert_eq!(hostile.velocity(), Vec2::ZERO);
        assert_eq!(hostile.steering().force(), Vec2::ZERO);
    }

    #[test]
    fn test_pursuit_continues_on_tick_it_loses_view() {
        let mut hostile = hostile_at(Vec2::ZERO);
        hostile.tick(DT, player_at(Vec2::new(200.0, 0.0)));

        let intents = hostile.tick(DT, player_at(Vec2::new(400.0, 0.0)));

        assert_eq!(hostile.state(), HostileState::Wander);
        assert!(intents.iter().any(|i| matches!(i, Intent::ApplyForce(_))));
    }

    #[test]
    fn test_shoot_faces_player_and_respects_cooldown() {
        let mut hostile = hostile_at(Vec2::ZERO);
        let player = player_at(Vec2::new(0.0, 100.0));
        hostile.tick(DT, player_at(Vec2::new(200.0, 0.0)));
        hostile.tick(DT, player);
        assert_eq!(hostile.state(), HostileState::Shoot);

        let cooldown = HostileConfig::default().weapon.cooldown;
        let mut shots = 0;
        let mut elapsed = 0.0;
        for _ in 0..300 {
            let intents = hostile.tick(0.125, player);
            elapsed += 0.125;
            shots += fired(&intents);
            assert!(shots as f32 <= (elapsed / cooldown).floor());
        }

        assert_eq!(shots, 25);
        assert_eq!(hostile.heading(), Vec2::Y);
    }

    #[test]
    fn test_shots_aim_along_heading() {
        let mut hostile = hostile_at(Vec2::ZERO);
        let player = player_at(Vec2::new(-100.0, 0.0));
        hostile.tick(DT, player_at(Vec2::new(200.0, 0.0)));
        hostile.tick(DT, player);

        let shot = (0..20)
            .flat_map(|_| hostile.tick(0.125, player))
            .find_map(|i| match i {
                Intent::Fire(shot) => Some(shot),
                _ => None,
            })
            .unwrap();

        assert_eq!(shot.direction, Vec2::NEG_X);
        assert_eq!(shot.category, category::ENEMY_BULLET);
        assert!(shot.contact_mask & category::PLAYER_SHIP != 0);
    }

    #[test]
    fn test_shoot_returns_to_pursuit() {
        let mut hostile = hostile_at(Vec2::ZERO);
        hostile.tick(DT, player_at(Vec2::new(200.0, 0.0)));
        hostile.tick(DT, player_at(Vec2::new(100.0, 0.0)));

        hostile.tick(DT, player_at(Vec2::new(250.0, 0.0)));

        assert_eq!(hostile.state(), HostileState::Pursuit);
    }

    #[test]
    fn test_missing_player_falls_back_to_wander() {
        let mut hostile = hostile_at(Vec2::ZERO);
        hostile.tick(DT, player_at(Vec2::new(200.0, 0.0)));
        assert_eq!(hostile.state(), HostileState::Pursuit);

        hostile.tick(DT, None);
        assert_eq!(hostile.state(), HostileState::Wander);

        hostile.tick(DT, None);
        assert_eq!(hostile.state(), HostileState::Wander);
    }

    #[test]
    fn test_inactive_holds_still() {
        let mut hostile = hostile_at(Vec2::ZERO);
        hostile.deactivate();
        assert_eq!(hostile.state(), HostileState::Inactive);

        for _ in 0..5 {
            let intents = hostile.tick(DT, player_at(Vec2::new(50.0, 0.0)));
            assert!(intents.contains(&Intent::Halt));
            assert_eq!(fired(&intents), 0);
            assert_eq!(hostile.state(), HostileState::Inactive);
        }

        hostile.reactivate();
        assert_eq!(hostile.state(), HostileState::Wander);
    }
}

//! Player ship controller
//!
//! Idles until commanded. "Move to" plans a path and follows it checkpoint
//! by checkpoint; "attack" pursues a hostile and shoots it once in range.

use glam::Vec2;

use crate::ai::agent::{Agent, AgentId, Intent, Kinematics, category};
use crate::ai::fsm::{State, StateMachine, Transition};
use crate::ai::grid::GridMap;
use crate::ai::helm::Helm;
use crate::ai::pathfinding::{Path, Pathfinder};
use crate::ai::steering::SteeringManager;
use crate::ai::weapon::Weapon;
use crate::core::config::{PathfinderConfig, PlayerConfig, SteeringConfig};

/// Behavior of the player ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Idle,
    Shoot,
    Pursuit,
    PathFollowing,
}

/// Data the player states act on.
#[derive(Debug)]
pub struct PlayerContext {
    id: AgentId,
    helm: Helm,
    weapon: Weapon,
    config: PlayerConfig,
    path: Path,
    /// Designated attack target
    target: Option<AgentId>,
    /// Target snapshot for this tick; `None` when the target is gone
    target_body: Option<Kinematics>,
    delta_time: f32,
}

impl PlayerContext {
    fn target_in_attack_range(&self, target: &Kinematics) -> bool {
        self.helm.distance_to(target.position) < self.config.attack_range
    }

    /// Drop an attack whose target no longer exists.
    fn abandon_target(&mut self) -> Transition<PlayerState> {
        log::debug!("Player target {:?} is gone, idling", self.target);
        self.target = None;
        self.helm.steering.reset();
        Transition::To(PlayerState::Idle)
    }
}

impl State<PlayerContext> for PlayerState {
    fn name(&self) -> &'static str {
        match self {
            PlayerState::Idle => "Idle",
            PlayerState::Shoot => "Shoot",
            PlayerState::Pursuit => "Pursuit",
            PlayerState::PathFollowing => "PathFollowing",
        }
    }

    fn enter(&self, ctx: &mut PlayerContext) {
        if *self == PlayerState::Shoot {
            ctx.helm.halt();
            ctx.helm.steering.reset();
            ctx.weapon.clock.arm();
        }
    }

    fn update(&self, ctx: &mut PlayerContext) -> Transition<Self> {
        match self {
            PlayerState::Idle => Transition::None,

            PlayerState::PathFollowing => {
                let Some(checkpoint) = ctx.path.front() else {
                    ctx.helm.halt();
                    ctx.helm.steering.reset();
                    return Transition::To(PlayerState::Idle);
                };
                if ctx.helm.distance_to(checkpoint) < ctx.config.checkpoint_radius {
                    ctx.path.pop_front();
                    return Transition::None;
                }

                let slowing_radius = if ctx.path.len() == 1 {
                    ctx.config.final_slowing_radius
                } else {
                    0.0
                };
                ctx.helm.steering.reset();
                ctx.helm.steering.seek(&ctx.helm.body, checkpoint, slowing_radius);
                ctx.helm.apply_steering(ctx.config.path_force_scale);
                Transition::None
            }

            PlayerState::Pursuit => {
                let Some(target) = ctx.target_body else {
                    return ctx.abandon_target();
                };
                if ctx.target_in_attack_range(&target) {
                    return Transition::To(PlayerState::Shoot);
                }
                ctx.helm.steering.reset();
                ctx.helm.steering.pursuit(&ctx.helm.body, &target);
                ctx.helm.apply_steering(ctx.config.pursuit_force_scale);
                Transition::None
            }

            PlayerState::Shoot => {
                let Some(target) = ctx.target_body else {
                    return ctx.abandon_target();
                };
                if !ctx.target_in_attack_range(&target) {
                    return Transition::To(PlayerState::Pursuit);
                }

                ctx.helm.face(target.position);
                if ctx.weapon.clock.tick(ctx.delta_time) {
                    let shot = ctx.weapon.fire(ctx.id, ctx.helm.body.position, ctx.helm.heading());
                    ctx.helm.push(Intent::Fire(shot));
                }
                Transition::None
            }
        }
    }

    fn exit(&self, ctx: &mut PlayerContext) {
        match self {
            PlayerState::Shoot => ctx.helm.steering.reset(),
            // A path is never resumed once left
            PlayerState::PathFollowing => ctx.path.clear(),
            PlayerState::Idle | PlayerState::Pursuit => {}
        }
    }
}

/// The player-controlled ship.
#[derive(Debug)]
pub struct PlayerShip {
    fsm: StateMachine<PlayerState>,
    ctx: PlayerContext,
    pathfinder: Pathfinder,
}

impl PlayerShip {
    /// Create a player starting in `Idle`.
    #[must_use]
    pub fn new(
        id: AgentId,
        position: Vec2,
        mass: f32,
        config: PlayerConfig,
        steering: SteeringConfig,
        pathfinder: &PathfinderConfig,
    ) -> Self {
        let body = Kinematics::new(position, Vec2::ZERO, config.max_speed, mass);
        let weapon = Weapon::new(
            config.weapon.clone(),
            category::PLAYER_BULLET,
            category::ASTEROID | category::ENEMY_SHIP,
        );
        Self {
            fsm: StateMachine::new(PlayerState::Idle),
            ctx: PlayerContext {
                id,
                helm: Helm::new(body, SteeringManager::new(steering)),
                weapon,
                config,
                path: Path::default(),
                target: None,
                target_body: None,
                delta_time: 0.0,
            },
            pathfinder: Pathfinder::new().with_max_expansions(pathfinder.max_expansions),
        }
    }

    #[must_use]
    pub fn id(&self) -> AgentId {
        self.ctx.id
    }

    #[must_use]
    pub fn state(&self) -> PlayerState {
        self.fsm.current()
    }

    /// Remaining waypoints, for visualization.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.ctx.path
    }

    /// Designated attack target, if any.
    #[must_use]
    pub fn target(&self) -> Option<AgentId> {
        self.ctx.target
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

    /// Plan a path to `point` and start following it.
    ///
    /// An unreachable point yields an empty path; the next tick then stops
    /// the ship and returns to `Idle`.
    pub fn move_to<M: GridMap + ?Sized>(&mut self, point: Vec2, map: &M) -> &Path {
        self.ctx.helm.steering.reset();
        self.ctx.target = None;
        self.force(PlayerState::PathFollowing);
        self.ctx.path = self
            .pathfinder
            .find_path(map, self.ctx.helm.body.position, point);
        if self.ctx.path.is_empty() {
            log::debug!("Player move to {point:?}: no route");
        }
        &self.ctx.path
    }

    /// Pursue and shoot `target`.
    pub fn attack(&mut self, target: AgentId) {
        self.ctx.target = Some(target);
        self.force(PlayerState::Pursuit);
    }

    /// Environment notification that an agent was destroyed.
    pub fn on_agent_destroyed(&mut self, agent: AgentId) {
        if self.ctx.target != Some(agent) {
            return;
        }
        self.ctx.target = None;
        self.ctx.target_body = None;
        if matches!(self.state(), PlayerState::Shoot | PlayerState::Pursuit) {
            self.ctx.helm.steering.reset();
            self.force(PlayerState::Idle);
        }
    }

    /// Run one tick. `target` is the current snapshot of the designated
    /// target (`None` if there is none or it no longer exists).
    pub fn tick(&mut self, delta_time: f32, target: Option<Kinematics>) -> Vec<Intent> {
        self.ctx.delta_time = delta_time;
        self.ctx.target_body = target;
        self.ctx.helm.align_to_velocity();

        if let Some(previous) = self.fsm.update(&mut self.ctx) {
            self.ctx.helm.push(Intent::StateChanged {
                from: previous.name(),
                to: self.fsm.current().name(),
            });
        }
        self.ctx.helm.drain()
    }

    fn force(&mut self, state: PlayerState) {
        let previous = self.fsm.transition(&mut self.ctx, state);
        if previous != state {
            self.ctx.helm.push(Intent::StateChanged {
                from: previous.name(),
                to: state.name(),
            });
        }
    }
}

impl Agent for PlayerShip {
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
    use crate::ai::grid::{GridCell, TileMap};

    const DT: f32 = 1.0 / 60.0;

    fn entities() -> (AgentId, AgentId) {
        let mut world = hecs::World::new();
        (world.spawn(()), world.spawn(()))
    }

    fn player(id: AgentId, position: Vec2) -> PlayerShip {
        PlayerShip::new(
            id,
            position,
            10.0,
            PlayerConfig::default(),
            SteeringConfig::default().with_wander_seed(5),
            &PathfinderConfig::default(),
        )
    }

    fn enemy_at(position: Vec2) -> Option<Kinematics> {
        Some(Kinematics::new(position, Vec2::ZERO, 150.0, 10.0))
    }

    /// Crude integration standing in for the physics engine.
    fn step(ship: &mut PlayerShip, intents: &[Intent]) {
        let mut velocity = ship.velocity();
        for intent in intents {
            match intent {
                Intent::ApplyForce(force) => velocity += *force / ship.mass() * DT,
                Intent::Halt => velocity = Vec2::ZERO,
                _ => {}
            }
        }
        let position = ship.position() + velocity * DT;
        ship.sync(position, velocity);
    }

    #[test]
    fn test_starts_idle() {
        let (id, _) = entities();
        let mut ship = player(id, Vec2::ZERO);

        assert_eq!(ship.state(), PlayerState::Idle);
        assert!(ship.tick(DT, None).is_empty());
    }

    #[test]
    fn test_move_to_follows_path_and_idles() {
        let (id, _) = entities();
        let mut map = TileMap::new(10, 10, 64.0);
        map.set_asteroid(GridCell::new(1, 1), true);
        let mut ship = player(id, Vec2::new(32.0, 32.0));

        let goal = Vec2::new(4.5 * 64.0, 2.5 * 64.0);
        let waypoints = ship.move_to(goal, &map).len();
        assert!(waypoints >= 4);
        assert_eq!(ship.state(), PlayerState::PathFollowing);

        for _ in 0..6000 {
            let intents = ship.tick(DT, None);
            step(&mut ship, &intents);
            if ship.state() == PlayerState::Idle {
                break;
            }
        }

        assert_eq!(ship.state(), PlayerState::Idle);
        assert!(ship.path().is_empty());
        assert_eq!(ship.velocity(), Vec2::ZERO);
        assert!(ship.position().distance(goal) < 64.0);
    }

    #[test]
    fn test_checkpoint_pop_skips_force() {
        let (id, _) = entities();
        let map = TileMap::new(4, 4, 64.0);
        let mut ship = player(id, Vec2::new(32.0, 32.0));
        ship.move_to(Vec2::new(160.0, 32.0), &map);
        assert_eq!(ship.path().len(), 2);

        // Sitting within the checkpoint radius of the first waypoint
        ship.sync(Vec2::new(90.0, 32.0), Vec2::ZERO);
        let intents = ship.tick(DT, None);

        assert_eq!(ship.path().len(), 1);
        assert!(!intents.iter().any(|i| matches!(i, Intent::ApplyForce(_))));
    }

    #[test]
    fn test_unreachable_move_idles_next_tick() {
        let (id, _) = entities();
        let mut map = TileMap::new(4, 4, 1.0);
        map.set_asteroid(GridCell::new(3, 3), true);
        let mut ship = player(id, Vec2::new(0.5, 0.5));

        assert!(ship.move_to(Vec2::new(3.5, 3.5), &map).is_empty());

        let intents = ship.tick(DT, None);
        assert!(intents.contains(&Intent::Halt));
        assert_eq!(ship.state(), PlayerState::Idle);
    }

    #[test]
    fn test_attack_pursues_then_shoots() {
        let (id, enemy) = entities();
        let mut ship = player(id, Vec2::ZERO);
        ship.attack(enemy);
        assert_eq!(ship.state(), PlayerState::Pursuit);
        assert_eq!(ship.target(), Some(enemy));

        let intents = ship.tick(DT, enemy_at(Vec2::new(500.0, 0.0)));
        assert!(intents.iter().any(|i| matches!(i, Intent::ApplyForce(f) if f.x > 0.0)));
        assert_eq!(ship.state(), PlayerState::Pursuit);

        let intents = ship.tick(DT, enemy_at(Vec2::new(250.0, 0.0)));
        assert_eq!(ship.state(), PlayerState::Shoot);
        assert!(intents.contains(&Intent::Halt));

        // 1 s cooldown: two shots in 2.5 s
        let shots: usize = (0..20)
            .map(|_| {
                ship.tick(0.125, enemy_at(Vec2::new(250.0, 0.0)))
                    .iter()
                    .filter(|i| matches!(i, Intent::Fire(_)))
                    .count()
            })
            .sum();
        assert_eq!(shots, 2);
        assert_eq!(ship.heading(), Vec2::X);
    }

    #[test]
    fn test_shoot_returns_to_pursuit_when_target_escapes() {
        let (id, enemy) = entities();
        let mut ship = player(id, Vec2::ZERO);
        ship.attack(enemy);
        ship.tick(DT, enemy_at(Vec2::new(100.0, 0.0)));
        assert_eq!(ship.state(), PlayerState::Shoot);

        ship.tick(DT, enemy_at(Vec2::new(400.0, 0.0)));
        assert_eq!(ship.state(), PlayerState::Pursuit);
    }

    #[test]
    fn test_target_destroyed_returns_to_idle() {
        let (id, enemy) = entities();
        let mut ship = player(id, Vec2::ZERO);
        ship.attack(enemy);
        ship.tick(DT, enemy_at(Vec2::new(100.0, 0.0)));
        assert_eq!(ship.state(), PlayerState::Shoot);

        ship.on_agent_destroyed(enemy);

        assert_eq!(ship.state(), PlayerState::Idle);
        assert_eq!(ship.target(), None);
        assert_eq!(ship.steering().force(), Vec2::ZERO);
    }

    #[test]
    fn test_other_agent_destroyed_is_ignored() {
        let mut world = hecs::World::new();
        let (id, enemy, bystander) = (world.spawn(()), world.spawn(()), world.spawn(()));
        let mut ship = player(id, Vec2::ZERO);
        ship.attack(enemy);

        ship.on_agent_destroyed(bystander);

        assert_eq!(ship.state(), PlayerState::Pursuit);
        assert_eq!(ship.target(), Some(enemy));
    }

    #[test]
    fn test_vanished_target_idles() {
        let (id, enemy) = entities();
        let mut ship = player(id, Vec2::ZERO);
        ship.attack(enemy);

        ship.tick(DT, None);

        assert_eq!(ship.state(), PlayerState::Idle);
        assert_eq!(ship.target(), None);
    }

    #[test]
    fn test_new_command_discards_path() {
        let (id, enemy) = entities();
        let map = TileMap::new(10, 10, 64.0);
        let mut ship = player(id, Vec2::new(32.0, 32.0));
        ship.move_to(Vec2::new(600.0, 600.0), &map);
        assert!(!ship.path().is_empty());

        ship.attack(enemy);

        assert!(ship.path().is_empty());
        assert_eq!(ship.state(), PlayerState::Pursuit);
    }
}

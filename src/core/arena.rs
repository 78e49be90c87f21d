//! Headless arena driving the ship controllers
//!
//! The arena owns the world, the asteroid map and the controllers. Each
//! [`Arena::step`] runs one fixed tick:
//!
//! 1. refresh hostile occupancy on the map
//! 2. tick the player, then every hostile, applying their intents
//! 3. integrate ship motion (ships slide along asteroids and the map edge)
//! 4. move projectiles and resolve hits
//! 5. publish the tick's events

use glam::Vec2;

use crate::ai::{AgentId, HostileShip, Intent, PlayerShip, TileMap, category};
use crate::core::config::SimConfig;
use crate::core::events::{EventQueue, GameEvent};
use crate::core::scene::{ArenaScene, SceneError};
use crate::ecs::{Body, Hull, Projectile, Ship, World};

/// State of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ongoing,
    /// Every hostile destroyed
    Victory,
    /// Player hull exhausted
    Defeat,
}

/// What a touch at a world point turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Touched an asteroid, or the match is over
    Ignored,
    Attack(AgentId),
    /// Move order with the number of planned waypoints
    Move(usize),
}

/// Reference environment for the ship AI.
pub struct Arena {
    world: World,
    map: TileMap,
    config: SimConfig,
    player: PlayerShip,
    hostiles: Vec<HostileShip>,
    events: EventQueue,
    outcome: Outcome,
    ticks: u64,
    elapsed: f32,
}

impl Arena {
    /// Build an arena from a scene description
    ///
    /// # Errors
    ///
    /// Returns an error if the scene's map or spawn points are invalid
    pub fn new(scene: &ArenaScene, config: SimConfig) -> Result<Self, SceneError> {
        let map = scene.validate()?;
        let mut world = World::new();
        let arena = &config.arena;

        let player_id = world.spawn_ship(
            Ship::Player,
            Body::new(
                scene.player,
                Vec2::ZERO,
                arena.ship_mass,
                config.player.max_speed,
                arena.ship_radius,
            ),
            Some(Hull {
                life: arena.player_hull,
            }),
        );
        let player = PlayerShip::new(
            player_id,
            scene.player,
            arena.ship_mass,
            config.player.clone(),
            config.steering.clone(),
            &config.pathfinder,
        );

        let hostiles = scene
            .hostiles
            .iter()
            .enumerate()
            .map(|(index, spawn)| {
                let id = world.spawn_ship(
                    Ship::Hostile,
                    Body::new(
                        spawn.position,
                        spawn.velocity,
                        arena.ship_mass,
                        config.hostile.max_speed,
                        arena.ship_radius,
                    ),
                    None,
                );
                // Distinct wander streams per ship under a fixed seed
                let mut steering = config.steering.clone();
                if let Some(seed) = steering.wander_seed {
                    steering.wander_seed = Some(seed.wrapping_add(index as u64 + 1));
                }
                HostileShip::new(
                    id,
                    spawn.position,
                    spawn.velocity,
                    arena.ship_mass,
                    config.hostile.clone(),
                    steering,
                )
            })
            .collect::<Vec<_>>();

        log::info!(
            "Arena '{}' ready: {}x{} tiles, {} hostiles",
            scene.name,
            map.columns,
            map.rows,
            hostiles.len()
        );

        Ok(Self {
            world,
            map,
            config,
            player,
            hostiles,
            events: EventQueue::new(),
            outcome: Outcome::Ongoing,
            ticks: 0,
            elapsed: 0.0,
        })
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn player(&self) -> &PlayerShip {
        &self.player
    }

    #[must_use]
    pub fn player_id(&self) -> AgentId {
        self.player.id()
    }

    #[must_use]
    pub fn hostiles(&self) -> &[HostileShip] {
        &self.hostiles
    }

    #[must_use]
    pub fn map(&self) -> &TileMap {
        &self.map
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Events published by the last completed tick.
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[must_use]
    pub fn body(&self, agent: AgentId) -> Option<Body> {
        self.world.body(agent)
    }

    /// Remaining player hull, `None` once destroyed.
    #[must_use]
    pub fn player_hull(&self) -> Option<i32> {
        self.world.hull(self.player.id()).map(|hull| hull.life)
    }

    /// Live hostile whose body covers `point`.
    #[must_use]
    pub fn hostile_at(&self, point: Vec2) -> Option<AgentId> {
        self.hostiles
            .iter()
            .map(HostileShip::id)
            .find(|id| self.world.body(*id).is_some_and(|body| body.overlaps(point)))
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Order the player to fly to `point`. Returns the planned waypoint count.
    pub fn command_move(&mut self, point: Vec2) -> usize {
        if self.outcome != Outcome::Ongoing {
            return 0;
        }
        self.refresh_occupancy();
        self.sync_player();

        let waypoints = self.player.move_to(point, &self.map).len();
        log::debug!("Move to {point:?}: {waypoints} waypoints");
        self.events.push(GameEvent::MoveCommanded { point });
        self.events.push(GameEvent::PathPlanned {
            agent: self.player.id(),
            waypoints,
        });
        waypoints
    }

    /// Order the player to attack `target`. False if it is not a live hostile.
    pub fn command_attack(&mut self, target: AgentId) -> bool {
        if self.outcome != Outcome::Ongoing || !self.is_hostile(target) {
            return false;
        }
        log::debug!("Attack {target:?}");
        self.player.attack(target);
        self.events.push(GameEvent::AttackCommanded { target });
        true
    }

    /// Route a touch at a world point: asteroids are ignored, hostiles are
    /// attacked, anything else is a move order.
    pub fn touch(&mut self, point: Vec2) -> Command {
        if self.outcome != Outcome::Ongoing || self.map.is_asteroid_at(point) {
            return Command::Ignored;
        }
        if let Some(target) = self.hostile_at(point) {
            self.command_attack(target);
            return Command::Attack(target);
        }
        Command::Move(self.command_move(point))
    }

    // ------------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------------

    /// Advance one tick of `delta_time` seconds.
    pub fn step(&mut self, delta_time: f32) -> Outcome {
        if self.outcome != Outcome::Ongoing {
            return self.outcome;
        }

        self.refresh_occupancy();
        self.tick_player(delta_time);
        self.tick_hostiles(delta_time);
        self.integrate_ships(delta_time);
        self.integrate_projectiles(delta_time);
        self.check_victory();

        self.ticks += 1;
        self.elapsed += delta_time;
        self.events.swap();
        self.outcome
    }

    /// Step until the match ends or `max_ticks` have run.
    pub fn run(&mut self, delta_time: f32, max_ticks: u64) -> Outcome {
        for _ in 0..max_ticks {
            if self.step(delta_time) != Outcome::Ongoing {
                break;
            }
        }
        self.outcome
    }

    fn is_hostile(&self, agent: AgentId) -> bool {
        self.hostiles.iter().any(|hostile| hostile.id() == agent)
    }

    fn refresh_occupancy(&mut self) {
        self.map.clear_agents();
        for hostile in &self.hostiles {
            if let Some(body) = self.world.body(hostile.id()) {
                self.map.place_agent(hostile.id(), body.position);
            }
        }
    }

    fn sync_player(&mut self) {
        if let Some(body) = self.world.body(self.player.id()) {
            self.player.sync(body.position, body.velocity);
        }
    }

    fn tick_player(&mut self, delta_time: f32) {
        let id = self.player.id();
        if !self.world.contains(id) {
            return;
        }
        self.sync_player();
        let target = self
            .player
            .target()
            .and_then(|target| self.world.kinematics(target));
        let intents = self.player.tick(delta_time, target);
        self.apply_intents(id, intents, delta_time);
    }

    fn tick_hostiles(&mut self, delta_time: f32) {
        let player = self.world.kinematics(self.player.id());
        let mut pending = Vec::with_capacity(self.hostiles.len());
        for hostile in &mut self.hostiles {
            if let Some(body) = self.world.body(hostile.id()) {
                hostile.sync(body.position, body.velocity);
            }
            pending.push((hostile.id(), hostile.tick(delta_time, player)));
        }
        for (id, intents) in pending {
            self.apply_intents(id, intents, delta_time);
        }
    }

    fn apply_intents(&mut self, agent: AgentId, intents: Vec<Intent>, delta_time: f32) {
        for intent in intents {
            match intent {
                Intent::ApplyForce(force) => {
                    if let Some(mut body) = self.world.body_mut(agent) {
                        body.apply_force(force, delta_time);
                    }
                }
                Intent::Halt => {
                    if let Some(mut body) = self.world.body_mut(agent) {
                        body.velocity = Vec2::ZERO;
                    }
                }
                Intent::Fire(spawn) => {
                    self.world.spawn_projectile(Projectile::from_spawn(
                        &spawn,
                        self.config.arena.projectile_damage,
                        self.config.arena.projectile_lifetime,
                    ));
                    self.events.push(GameEvent::ProjectileFired {
                        shooter: spawn.shooter,
                        position: spawn.position,
                        direction: spawn.direction,
                    });
                }
                Intent::StateChanged { from, to } => {
                    self.events.push(GameEvent::StateChanged { agent, from, to });
                }
            }
        }
    }

    fn integrate_ships(&mut self, delta_time: f32) {
        let damping = (1.0 - self.config.arena.linear_damping * delta_time).max(0.0);
        let map = &self.map;
        let open = |point: Vec2| map.contains_point(point) && !map.is_asteroid_at(point);
        for (_, (body, _)) in self.world.query_mut::<(&mut Body, &Ship)>() {
            body.velocity *= damping;
            let step = body.velocity * delta_time;

            let next = body.position + step;
            if open(next) {
                body.position = next;
                continue;
            }

            // Blocked: slide along whichever axis is still free
            let along_x = body.position + Vec2::new(step.x, 0.0);
            let along_y = body.position + Vec2::new(0.0, step.y);
            if step.x != 0.0 && open(along_x) {
                body.position = along_x;
                body.velocity.y = 0.0;
            } else if step.y != 0.0 && open(along_y) {
                body.position = along_y;
                body.velocity.x = 0.0;
            } else {
                body.velocity = Vec2::ZERO;
            }
        }
    }

    fn integrate_projectiles(&mut self, delta_time: f32) {
        let mut spent = Vec::new();
        let mut hits = Vec::new();

        let ships = self
            .world
            .query::<(&Body, &Ship)>()
            .iter()
            .map(|(entity, (body, ship))| (entity, *body, *ship))
            .collect::<Vec<_>>();

        let map = &self.map;
        for (entity, projectile) in self.world.query_mut::<&mut Projectile>() {
            projectile.ttl -= delta_time;
            projectile.position += projectile.velocity * delta_time;

            if projectile.ttl <= 0.0 || !map.contains_point(projectile.position) {
                spent.push(entity);
                continue;
            }
            if projectile.hits(category::ASTEROID) && map.is_asteroid_at(projectile.position) {
                spent.push(entity);
                continue;
            }

            let struck = ships.iter().find(|(id, body, ship)| {
                let ship_category = match ship {
                    Ship::Player => category::PLAYER_SHIP,
                    Ship::Hostile => category::ENEMY_SHIP,
                };
                *id != projectile.shooter
                    && projectile.hits(ship_category)
                    && body.overlaps(projectile.position)
            });
            if let Some((id, _, ship)) = struck {
                spent.push(entity);
                hits.push((*id, *ship, projectile.shooter, projectile.damage));
            }
        }

        for entity in spent {
            let _ = self.world.despawn(entity);
        }
        for (agent, ship, shooter, damage) in hits {
            match ship {
                Ship::Player => self.damage_player(shooter, damage),
                Ship::Hostile => self.destroy_hostile(agent, shooter),
            }
        }
    }

    fn damage_player(&mut self, shooter: AgentId, amount: i32) {
        let id = self.player.id();
        let Some(mut hull) = self.world.hull_mut(id) else {
            return;
        };
        let destroyed = hull.damage(amount);
        let remaining = hull.life;
        drop(hull);

        self.events.push(GameEvent::AgentDamaged {
            agent: id,
            amount,
            remaining,
            source: Some(shooter),
        });
        if !destroyed {
            return;
        }

        log::info!("Player destroyed by {shooter:?}");
        let _ = self.world.despawn(id);
        self.events.push(GameEvent::AgentDestroyed {
            agent: id,
            destroyer: Some(shooter),
        });
        for hostile in &mut self.hostiles {
            hostile.deactivate();
        }
        let deactivated = self
            .hostiles
            .iter_mut()
            .map(|hostile| (hostile.id(), hostile.tick(0.0, None)))
            .collect::<Vec<_>>();
        for (agent, intents) in deactivated {
            self.apply_intents(agent, intents, 0.0);
        }
        self.finish(Outcome::Defeat);
    }

    fn destroy_hostile(&mut self, agent: AgentId, shooter: AgentId) {
        if !self.is_hostile(agent) {
            return;
        }
        log::info!("Hostile {agent:?} destroyed");
        let _ = self.world.despawn(agent);
        self.hostiles.retain(|hostile| hostile.id() != agent);
        self.map.remove_agent(agent);
        self.player.on_agent_destroyed(agent);
        self.events.push(GameEvent::AgentDestroyed {
            agent,
            destroyer: Some(shooter),
        });
    }

    fn check_victory(&mut self) {
        if self.outcome == Outcome::Ongoing && self.hostiles.is_empty() {
            self.finish(Outcome::Victory);
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        log::info!("Match over after {} ticks: {outcome:?}", self.ticks);
        self.outcome = outcome;
        self.events.push(GameEvent::MatchOver {
            victory: outcome == Outcome::Victory,
        });
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("player", &self.player.state())
            .field("hostiles", &self.hostiles.len())
            .field("outcome", &self.outcome)
            .field("ticks", &self.ticks)
            .finish()
    }
}

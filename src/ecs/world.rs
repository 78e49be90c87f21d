//! World wrapper around hecs

use hecs::Entity;

use crate::ai::Kinematics;
use crate::ecs::components::{Body, Hull, Projectile, Ship};

/// Arena world containing ships and projectiles
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn a ship; only the player carries a hull
    pub fn spawn_ship(&mut self, ship: Ship, body: Body, hull: Option<Hull>) -> Entity {
        match hull {
            Some(hull) => self.inner.spawn((ship, body, hull)),
            None => self.inner.spawn((ship, body)),
        }
    }

    /// Spawn a projectile
    pub fn spawn_projectile(&mut self, projectile: Projectile) -> Entity {
        self.inner.spawn((projectile,))
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Copy of a ship's body, if the entity still has one
    pub fn body(&self, entity: Entity) -> Option<Body> {
        self.inner.get::<&Body>(entity).ok().map(|body| *body)
    }

    /// Get a mutable reference to a ship's body
    pub fn body_mut(&mut self, entity: Entity) -> Option<hecs::RefMut<'_, Body>> {
        self.inner.get::<&mut Body>(entity).ok()
    }

    /// Kinematic snapshot for the controllers
    pub fn kinematics(&self, entity: Entity) -> Option<Kinematics> {
        self.body(entity).map(|body| body.kinematics())
    }

    pub fn hull(&self, entity: Entity) -> Option<Hull> {
        self.inner.get::<&Hull>(entity).ok().map(|hull| *hull)
    }

    pub fn hull_mut(&mut self, entity: Entity) -> Option<hecs::RefMut<'_, Hull>> {
        self.inner.get::<&mut Hull>(entity).ok()
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Number of projectiles in flight
    pub fn projectile_count(&self) -> usize {
        self.inner.query::<&Projectile>().iter().count()
    }

    /// Get the number of entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Query for entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Query for entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut::<Q>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_spawn_and_lookup_ships() {
        let mut world = World::new();
        let body = Body::new(Vec2::new(1.0, 2.0), Vec2::ZERO, 10.0, 100.0, 16.0);

        let player = world.spawn_ship(Ship::Player, body, Some(Hull { life: 5 }));
        let hostile = world.spawn_ship(Ship::Hostile, body, None);

        assert_eq!(world.len(), 2);
        assert_eq!(world.body(player), Some(body));
        assert_eq!(world.hull(player), Some(Hull { life: 5 }));
        assert_eq!(world.hull(hostile), None);
        assert_eq!(
            world.kinematics(hostile).map(|k| k.position),
            Some(Vec2::new(1.0, 2.0))
        );
    }

    #[test]
    fn test_despawned_ship_has_no_snapshot() {
        let mut world = World::new();
        let body = Body::new(Vec2::ZERO, Vec2::ZERO, 10.0, 100.0, 16.0);
        let hostile = world.spawn_ship(Ship::Hostile, body, None);

        assert!(world.despawn(hostile).is_ok());
        assert!(!world.contains(hostile));
        assert_eq!(world.kinematics(hostile), None);
        assert!(world.is_empty());
    }

    #[test]
    fn test_body_mut_writes_through() {
        let mut world = World::new();
        let body = Body::new(Vec2::ZERO, Vec2::ZERO, 10.0, 100.0, 16.0);
        let ship = world.spawn_ship(Ship::Hostile, body, None);

        if let Some(mut body) = world.body_mut(ship) {
            body.velocity = Vec2::X;
        }
        assert_eq!(world.body(ship).map(|b| b.velocity), Some(Vec2::X));
    }
}

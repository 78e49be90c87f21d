//! Event Queue for Decoupled Communication
//!
//! The arena publishes what happened during a tick (hits, deaths, shots,
//! behavior changes) without knowing who listens. Events pushed during a
//! tick become readable once the arena swaps the queue at the end of it.
//!
//! # Example
//!
//! ```ignore
//! queue.push(GameEvent::AgentDestroyed { agent, destroyer: Some(player) });
//!
//! // End of tick
//! queue.swap();
//! for event in queue.iter() {
//!     if let GameEvent::AgentDestroyed { agent, .. } = event {
//!         log::info!("{agent:?} destroyed");
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec2;

use crate::ai::AgentId;

// ============================================================================
// Event Types
// ============================================================================

/// Things that happened in the arena.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GameEvent {
    // -------------------------------------------------------------------------
    // Combat Events
    // -------------------------------------------------------------------------
    /// An agent took damage.
    AgentDamaged {
        agent: AgentId,
        amount: i32,
        /// Remaining hull
        remaining: i32,
        source: Option<AgentId>,
    },

    /// An agent was destroyed.
    AgentDestroyed {
        agent: AgentId,
        destroyer: Option<AgentId>,
    },

    /// A projectile was spawned.
    ProjectileFired {
        shooter: AgentId,
        position: Vec2,
        direction: Vec2,
    },

    // -------------------------------------------------------------------------
    // Command Events
    // -------------------------------------------------------------------------
    /// The player was ordered to move.
    MoveCommanded { point: Vec2 },

    /// A route was planned for an agent (0 waypoints when unreachable).
    PathPlanned { agent: AgentId, waypoints: usize },

    /// The player was ordered to attack.
    AttackCommanded { target: AgentId },

    // -------------------------------------------------------------------------
    // Behavior Events
    // -------------------------------------------------------------------------
    /// A controller switched behavior state.
    StateChanged {
        agent: AgentId,
        from: &'static str,
        to: &'static str,
    },

    /// The match ended.
    MatchOver { victory: bool },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for tick-consistent event processing.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<GameEvent>,
    /// Events from previous tick, ready for processing
    processing: VecDeque<GameEvent>,
}

impl EventQueue {
    const DEFAULT_CAPACITY: usize = 64;

    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event, readable after the next `swap()`.
    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    /// Make this tick's events readable and start a fresh pending buffer.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous tick.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.processing.iter()
    }

    /// Take ownership of the events from the previous tick.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.processing.drain(..)
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Iterate over events pushed this tick, before they are swapped in.
    pub fn pending(&self) -> impl Iterator<Item = &GameEvent> {
        self.pending.iter()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entity() -> AgentId {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    #[test]
    fn test_event_queue_push_and_swap() {
        let mut queue = EventQueue::new();
        let target = test_entity();

        queue.push(GameEvent::AttackCommanded { target });
        assert!(queue.is_empty(), "Events should not be visible before swap");
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(
            queue.pending().next(),
            Some(&GameEvent::AttackCommanded { target })
        );

        queue.swap();
        assert_eq!(queue.len(), 1);
        assert_eq!(
            queue.iter().next(),
            Some(&GameEvent::AttackCommanded { target })
        );
    }

    #[test]
    fn test_event_queue_double_buffer_isolation() {
        let mut queue = EventQueue::new();

        queue.push(GameEvent::MatchOver { victory: false });
        queue.swap();

        queue.push(GameEvent::MatchOver { victory: true });

        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events, vec![&GameEvent::MatchOver { victory: false }]);

        queue.swap();
        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events, vec![&GameEvent::MatchOver { victory: true }]);
    }

    #[test]
    fn test_event_queue_drain_and_clear() {
        let mut queue = EventQueue::new();
        let agent = test_entity();

        queue.push(GameEvent::StateChanged {
            agent,
            from: "Wander",
            to: "Pursuit",
        });
        queue.push(GameEvent::AgentDestroyed {
            agent,
            destroyer: None,
        });
        queue.swap();

        assert_eq!(queue.drain().count(), 2);
        assert!(queue.is_empty());

        queue.push(GameEvent::MatchOver { victory: true });
        queue.clear();
        assert_eq!(queue.pending_count(), 0);
    }
}

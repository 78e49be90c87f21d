//! Finite State Machine for ship behavior
//!
//! States are plain enums; the data they act on lives in a context type
//! owned by the controller. Each state gets an enter/update/exit lifecycle:
//!
//! 1. `enter()` - Called once when the state becomes active
//! 2. `update()` - Called each tick while active, returns a [`Transition`]
//! 3. `exit()` - Called once when the state is left
//!
//! A transition returned from `update()` is applied after the body has run,
//! so at most one state change happens per tick and the new state's body
//! first runs on the following tick.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Door { Open, Closed }
//!
//! impl State<DoorContext> for Door {
//!     fn name(&self) -> &'static str { ... }
//!     fn update(&self, ctx: &mut DoorContext) -> Transition<Self> {
//!         if ctx.pushed { Transition::To(Door::Open) } else { Transition::None }
//!     }
//! }
//!
//! let mut fsm = StateMachine::new(Door::Closed);
//! fsm.update(&mut ctx);
//! ```

use std::fmt;

// ============================================================================
// State Trait
// ============================================================================

/// A behavior state acting on a context `Ctx`.
pub trait State<Ctx>: Copy + Eq + fmt::Debug {
    /// State name for logging and UI.
    fn name(&self) -> &'static str;

    /// Called when entering this state.
    fn enter(&self, _ctx: &mut Ctx) {}

    /// Called each tick while in this state.
    fn update(&self, ctx: &mut Ctx) -> Transition<Self>;

    /// Called when exiting this state.
    fn exit(&self, _ctx: &mut Ctx) {}
}

// ============================================================================
// Transition
// ============================================================================

/// Decision returned from `State::update()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    /// Stay in the current state.
    None,
    /// Switch to another state after this tick's body.
    To(S),
}

// ============================================================================
// State Machine
// ============================================================================

/// Owns the active state and drives its lifecycle.
#[derive(Clone)]
pub struct StateMachine<S> {
    /// Current active state
    current: S,
    /// Whether enter() has been called on current state
    entered: bool,
}

impl<S: Copy + Eq + fmt::Debug> StateMachine<S> {
    /// Create a machine. The initial state's `enter()` runs on the first
    /// `update()`.
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            entered: false,
        }
    }

    /// Run one tick.
    ///
    /// Returns the state that was left, if the tick produced a transition.
    pub fn update<Ctx>(&mut self, ctx: &mut Ctx) -> Option<S>
    where
        S: State<Ctx>,
    {
        if !self.entered {
            self.current.enter(ctx);
            self.entered = true;
        }

        match self.current.update(ctx) {
            Transition::To(next) if next != self.current => {
                let previous = self.current;
                self.current.exit(ctx);
                next.enter(ctx);
                self.current = next;
                log::debug!("State {} -> {}", previous.name(), next.name());
                Some(previous)
            }
            _ => None,
        }
    }

    /// Force a transition from outside the tick (commands, notifications).
    ///
    /// Runs `exit()` on the current state and `enter()` on the new one, even
    /// when both are the same state.
    pub fn transition<Ctx>(&mut self, ctx: &mut Ctx, next: S) -> S
    where
        S: State<Ctx>,
    {
        let previous = self.current;
        if self.entered {
            self.current.exit(ctx);
        }
        self.current = next;
        self.current.enter(ctx);
        self.entered = true;
        log::debug!("State {} -> {} (forced)", previous.name(), next.name());
        previous
    }

    /// The active state.
    #[must_use]
    pub fn current(&self) -> S {
        self.current
    }

    /// Check if the machine is in the given state.
    #[must_use]
    pub fn is_in_state(&self, state: S) -> bool {
        self.current == state
    }
}

impl<S: fmt::Debug> fmt::Debug for StateMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("entered", &self.entered)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Probe {
        signal: bool,
        log: Vec<&'static str>,
        bodies: u32,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Red,
        Green,
    }

    impl State<Probe> for Light {
        fn name(&self) -> &'static str {
            match self {
                Light::Red => "Red",
                Light::Green => "Green",
            }
        }

        fn enter(&self, ctx: &mut Probe) {
            ctx.log.push(self.name());
        }

        fn update(&self, ctx: &mut Probe) -> Transition<Self> {
            ctx.bodies += 1;
            match self {
                Light::Red if ctx.signal => Transition::To(Light::Green),
                Light::Green if !ctx.signal => Transition::To(Light::Red),
                _ => Transition::None,
            }
        }

        fn exit(&self, ctx: &mut Probe) {
            ctx.log.push("exit");
        }
    }

    #[test]
    fn test_fsm_initial_state() {
        let fsm = StateMachine::new(Light::Red);
        assert_eq!(fsm.current(), Light::Red);
        assert!(!fsm.entered);
    }

    #[test]
    fn test_fsm_enter_called_on_first_update() {
        let mut fsm = StateMachine::new(Light::Red);
        let mut ctx = Probe::default();

        fsm.update(&mut ctx);

        assert!(fsm.entered);
        assert_eq!(ctx.log, vec!["Red"]);
    }

    #[test]
    fn test_fsm_transition_applies_after_body() {
        let mut fsm = StateMachine::new(Light::Red);
        let mut ctx = Probe {
            signal: true,
            ..Default::default()
        };

        let left = fsm.update(&mut ctx);

        assert_eq!(left, Some(Light::Red));
        assert_eq!(fsm.current(), Light::Green);
        // Only Red's body ran this tick
        assert_eq!(ctx.bodies, 1);
        assert_eq!(ctx.log, vec!["Red", "exit", "Green"]);
    }

    #[test]
    fn test_fsm_one_change_per_tick() {
        let mut fsm = StateMachine::new(Light::Red);
        let mut ctx = Probe {
            signal: true,
            ..Default::default()
        };

        fsm.update(&mut ctx);
        ctx.signal = false;
        fsm.update(&mut ctx);

        assert_eq!(fsm.current(), Light::Red);
        assert_eq!(ctx.bodies, 2);
    }

    #[test]
    fn test_fsm_stays_without_transition() {
        let mut fsm = StateMachine::new(Light::Green);
        let mut ctx = Probe {
            signal: true,
            ..Default::default()
        };

        for _ in 0..5 {
            assert_eq!(fsm.update(&mut ctx), None);
        }
        assert!(fsm.is_in_state(Light::Green));
    }

    #[test]
    fn test_fsm_forced_transition() {
        let mut fsm = StateMachine::new(Light::Red);
        let mut ctx = Probe::default();

        let previous = fsm.transition(&mut ctx, Light::Green);

        assert_eq!(previous, Light::Red);
        assert_eq!(fsm.current(), Light::Green);
        // Red was never entered, so it is not exited either
        assert_eq!(ctx.log, vec!["Green"]);
    }
}

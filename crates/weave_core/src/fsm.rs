//! Table-driven state machines
//!
//! Flat machines with explicit transitions and a transition history. The
//! states and events are small `Copy` enums supplied by the caller; see
//! [`crate::toggle`] for the open/closed machine used by dropdowns and
//! accordions.

use smallvec::SmallVec;

/// A transition in the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<S, E> {
    pub from: S,
    pub event: E,
    pub to: S,
}

impl<S, E> Transition<S, E> {
    pub const fn new(from: S, event: E, to: S) -> Self {
        Self { from, event, to }
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder<S, E> {
    initial: S,
    transitions: SmallVec<[Transition<S, E>; 8]>,
}

impl<S: Copy + Eq, E: Copy + Eq> StateMachineBuilder<S, E> {
    pub fn new(initial: S) -> Self {
        Self {
            initial,
            transitions: SmallVec::new(),
        }
    }

    /// Add a transition (from, event, to)
    pub fn on(mut self, from: S, event: E, to: S) -> Self {
        self.transitions.push(Transition::new(from, event, to));
        self
    }

    pub fn build(self) -> StateMachine<S, E> {
        StateMachine {
            current: self.initial,
            transitions: self.transitions,
            history: Vec::new(),
        }
    }
}

/// A state machine instance
#[derive(Clone, Debug)]
pub struct StateMachine<S, E> {
    current: S,
    transitions: SmallVec<[Transition<S, E>; 8]>,
    /// History of state transitions (for debugging and tests)
    history: Vec<(S, E, S)>,
}

impl<S: Copy + Eq, E: Copy + Eq> StateMachine<S, E> {
    pub fn new(initial: S, transitions: impl IntoIterator<Item = Transition<S, E>>) -> Self {
        Self {
            current: initial,
            transitions: transitions.into_iter().collect(),
            history: Vec::new(),
        }
    }

    pub fn builder(initial: S) -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new(initial)
    }

    pub fn current_state(&self) -> S {
        self.current
    }

    pub fn is_in(&self, state: S) -> bool {
        self.current == state
    }

    pub fn history(&self) -> &[(S, E, S)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn find(&self, event: E) -> Option<&Transition<S, E>> {
        self.transitions
            .iter()
            .find(|t| t.from == self.current && t.event == event)
    }

    /// Check if an event can trigger a transition from the current state
    pub fn can_send(&self, event: E) -> bool {
        self.find(event).is_some()
    }

    /// Send an event. Returns the new state if a transition fired, `None` if
    /// the event is not accepted in the current state.
    pub fn send(&mut self, event: E) -> Option<S> {
        let from = self.current;
        let to = self.find(event)?.to;
        self.current = to;
        self.history.push((from, event, to));
        Some(to)
    }
}

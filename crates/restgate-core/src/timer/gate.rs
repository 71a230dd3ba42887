//! Dual-touch engagement gate.
//!
//! Tracks two independent contact points and reports the edges of the
//! derived `both_held` signal. No timers live here; the clock decides what an
//! edge means for the current phase.

use serde::{Deserialize, Serialize};

/// Raw contact state of the two touch points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchGateState {
    pub left_held: bool,
    pub right_held: bool,
}

impl TouchGateState {
    pub fn both_held(&self) -> bool {
        self.left_held && self.right_held
    }
}

/// Edge of the `both_held` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateTransition {
    /// Both points became held; they were not both held before.
    BothHeldEntered,
    /// One point let go while both had been held.
    ReleasedFromBoth,
}

#[derive(Debug, Clone, Default)]
pub struct EngagementGate {
    state: TouchGateState,
}

impl EngagementGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TouchGateState {
        self.state
    }

    pub fn both_held(&self) -> bool {
        self.state.both_held()
    }

    pub fn set_left(&mut self, held: bool) -> Option<GateTransition> {
        self.update(TouchGateState {
            left_held: held,
            ..self.state
        })
    }

    pub fn set_right(&mut self, held: bool) -> Option<GateTransition> {
        self.update(TouchGateState {
            right_held: held,
            ..self.state
        })
    }

    /// Drop both contacts without reporting an edge.
    ///
    /// Used when a new work session starts: touches left over from the
    /// previous break must not count toward the next one.
    pub fn reset(&mut self) {
        self.state = TouchGateState::default();
    }

    fn update(&mut self, next: TouchGateState) -> Option<GateTransition> {
        let before = self.state.both_held();
        self.state = next;
        match (before, next.both_held()) {
            (false, true) => Some(GateTransition::BothHeldEntered),
            (true, false) => Some(GateTransition::ReleasedFromBoth),
            _ => None,
        }
    }
}

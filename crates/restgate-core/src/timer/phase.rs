use std::fmt;

use serde::{Deserialize, Serialize};

/// The mutually exclusive phase of a session.
///
/// ```text
/// Idle -> Working -> (Alarming <-> Resting) -> Working ...
///                 \-> AwaitingRestPrompt <-> AwaitingRestConfirmation
///                                             <-> AwaitingStartConfirmation -> Working
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Working,
    /// Work finished; the alarm pulses until both touch points are held.
    Alarming,
    /// Break countdown running while the gate stays engaged.
    Resting,
    AwaitingRestPrompt,
    AwaitingRestConfirmation,
    AwaitingStartConfirmation,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Working => "working",
            Phase::Alarming => "alarming",
            Phase::Resting => "resting",
            Phase::AwaitingRestPrompt => "awaiting_rest_prompt",
            Phase::AwaitingRestConfirmation => "awaiting_rest_confirmation",
            Phase::AwaitingStartConfirmation => "awaiting_start_confirmation",
        }
    }

    /// Phases that own a running countdown.
    pub fn has_countdown(self) -> bool {
        matches!(self, Phase::Working | Phase::Alarming | Phase::Resting)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

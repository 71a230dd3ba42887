use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every phase transition of the session clock produces an Event.
/// The notifier and the interval sources react to them; hosts may print them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    WorkStarted {
        duration_secs: u64,
        /// Break that will follow this session if it completes.
        upcoming_break_secs: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        sessions_completed: u32,
    },
    BreakAlarmStarted {
        duration_secs: u64,
        long_break: bool,
    },
    BreakCountdownStarted {
        remaining_secs: u64,
    },
    /// The gate was released mid-break; progress is forfeited.
    BreakAlarmRestarted {
        duration_secs: u64,
    },
    BreakCompleted {
        sessions_completed: u32,
    },
    RestPromptReached {
        sessions_completed: u32,
    },
    RestConfirmationRequested,
    StartConfirmationRequested,
    /// The user chose to stop; the host should terminate.
    ExitRequested,
    Reset {
        at: DateTime<Utc>,
    },
    Suspended {
        at: DateTime<Utc>,
    },
    Resumed {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::WorkStarted { .. } => "work_started",
            Event::SessionCompleted { .. } => "session_completed",
            Event::BreakAlarmStarted { .. } => "break_alarm_started",
            Event::BreakCountdownStarted { .. } => "break_countdown_started",
            Event::BreakAlarmRestarted { .. } => "break_alarm_restarted",
            Event::BreakCompleted { .. } => "break_completed",
            Event::RestPromptReached { .. } => "rest_prompt_reached",
            Event::RestConfirmationRequested => "rest_confirmation_requested",
            Event::StartConfirmationRequested => "start_confirmation_requested",
            Event::ExitRequested => "exit_requested",
            Event::Reset { .. } => "reset",
            Event::Suspended { .. } => "suspended",
            Event::Resumed { .. } => "resumed",
        }
    }
}

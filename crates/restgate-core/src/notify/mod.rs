//! Collaborator seams for alerts: the system notification service and the
//! audio device. Hosts implement these; the core only talks to the traits.

mod scheduler;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

pub use scheduler::{NotificationScheduler, IMMEDIATE_DELAY_SECS};

/// Purpose of a scheduled alert. Scheduling again with the same id
/// supersedes the pending alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertId {
    #[serde(rename = "workSessionEnd")]
    WorkSessionEnd,
    #[serde(rename = "breakSessionStart")]
    BreakSessionStart,
}

impl AlertId {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertId::WorkSessionEnd => "workSessionEnd",
            AlertId::BreakSessionStart => "breakSessionStart",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AlertId::WorkSessionEnd => "Work session complete",
            AlertId::BreakSessionStart => "Time for a break",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            AlertId::WorkSessionEnd => "Hold both touch points to start your break.",
            AlertId::BreakSessionStart => "Your break is waiting. Come back and hold both touch points.",
        }
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// System notification service.
pub trait NotificationService {
    fn schedule_alert(
        &mut self,
        id: AlertId,
        delay_secs: u64,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError>;

    fn cancel_all_pending(&mut self) -> Result<(), NotifyError>;
}

/// Audio output for the alarm pulse. Fire-and-forget.
pub trait AudioDevice {
    fn play_alert_pulse(&mut self) -> Result<(), NotifyError>;
}

use serde::Serialize;

use crate::error::ConfigError;

/// Durations and cadence of a session, fixed for the lifetime of a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    work_duration_secs: u64,
    break_duration_secs: u64,
    long_break_duration_secs: u64,
    /// Every Nth completed work session is followed by a long break.
    long_break_every: u32,
    /// Completed sessions after which the user is asked to stop.
    sessions_before_rest_prompt: u32,
}

impl SessionConfig {
    pub const DEFAULT_WORK_SECS: u64 = 25 * 60;
    pub const DEFAULT_BREAK_SECS: u64 = 5 * 60;
    pub const DEFAULT_LONG_BREAK_SECS: u64 = 15 * 60;
    pub const DEFAULT_LONG_BREAK_EVERY: u32 = 4;
    pub const DEFAULT_SESSIONS_BEFORE_REST_PROMPT: u32 = 8;

    /// Build a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when any duration or cadence is zero.
    pub fn new(
        work_duration_secs: u64,
        break_duration_secs: u64,
        long_break_duration_secs: u64,
        long_break_every: u32,
        sessions_before_rest_prompt: u32,
    ) -> Result<Self, ConfigError> {
        positive("work_duration_secs", work_duration_secs)?;
        positive("break_duration_secs", break_duration_secs)?;
        positive("long_break_duration_secs", long_break_duration_secs)?;
        positive("long_break_every", u64::from(long_break_every))?;
        positive(
            "sessions_before_rest_prompt",
            u64::from(sessions_before_rest_prompt),
        )?;
        Ok(Self {
            work_duration_secs,
            break_duration_secs,
            long_break_duration_secs,
            long_break_every,
            sessions_before_rest_prompt,
        })
    }

    pub fn work_duration_secs(&self) -> u64 {
        self.work_duration_secs
    }

    pub fn break_duration_secs(&self) -> u64 {
        self.break_duration_secs
    }

    pub fn long_break_duration_secs(&self) -> u64 {
        self.long_break_duration_secs
    }

    pub fn long_break_every(&self) -> u32 {
        self.long_break_every
    }

    pub fn sessions_before_rest_prompt(&self) -> u32 {
        self.sessions_before_rest_prompt
    }

    /// Whether the break that follows `sessions_completed` sessions is a long one.
    ///
    /// Zero completed sessions counts as a multiple, matching the cadence used
    /// when work starts before anything has been completed.
    pub fn is_long_break(&self, sessions_completed: u32) -> bool {
        sessions_completed % self.long_break_every == 0
    }

    /// Break length for the given completed-session count.
    pub fn break_secs_for(&self, sessions_completed: u32) -> u64 {
        if self.is_long_break(sessions_completed) {
            self.long_break_duration_secs
        } else {
            self.break_duration_secs
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_duration_secs: Self::DEFAULT_WORK_SECS,
            break_duration_secs: Self::DEFAULT_BREAK_SECS,
            long_break_duration_secs: Self::DEFAULT_LONG_BREAK_SECS,
            long_break_every: Self::DEFAULT_LONG_BREAK_EVERY,
            sessions_before_rest_prompt: Self::DEFAULT_SESSIONS_BEFORE_REST_PROMPT,
        }
    }
}

fn positive(key: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".into(),
        });
    }
    Ok(())
}

//! Session clock implementation.
//!
//! The clock is a wall-clock-based state machine. It does not use internal
//! threads and never reads the system time itself: every operation that
//! depends on time takes `now` from the caller. Foreground ticks and the
//! single catch-up tick after a suspension go through the same
//! reconciliation, so a gap of N seconds costs the same whichever way it
//! arrives.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Working                      start_work
//! Working -> AwaitingRestPrompt        tick reaches 0, threshold reached
//! Working -> Alarming                  tick reaches 0
//! Alarming -> Resting                  on_gate_both_held
//! Resting -> Alarming                  on_gate_released, or tick without engagement
//! Resting -> Working                   tick reaches 0
//! AwaitingRestPrompt -> AwaitingRestConfirmation   resolve_rest_prompt(Reset)
//! AwaitingRestConfirmation -> AwaitingStartConfirmation | AwaitingRestPrompt
//! AwaitingStartConfirmation -> Working | AwaitingRestConfirmation
//! any -> Idle                          reset_all
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut clock = SessionClock::new(SessionConfig::default(), Utc::now());
//! clock.start_work(Utc::now())?;
//! // Once per second while working or resting:
//! for event in clock.tick(Utc::now()) { /* forward to the notifier */ }
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::config::SessionConfig;
use super::phase::Phase;
use crate::error::TransitionError;
use crate::events::Event;

/// Answer to the rest prompt shown after the configured number of sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestPromptChoice {
    /// Start over from zero completed sessions (after two confirmations).
    Reset,
    /// Stop for the day; the host terminates.
    Exit,
}

/// Read-only view handed to the UI on every render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    /// Work countdown while working, break countdown while alarming or resting.
    pub display_secs: u64,
    pub sessions_completed: u32,
    pub is_alarm_active: bool,
    pub gate_engaged: bool,
    pub suspended: bool,
}

#[derive(Debug, Clone)]
struct SessionState {
    phase: Phase,
    remaining_work_secs: u64,
    remaining_break_secs: u64,
    /// Break that follows the running work session.
    upcoming_break_secs: u64,
    sessions_completed: u32,
    /// Instant up to which elapsed time has been accounted for.
    last_tick: DateTime<Utc>,
    /// Mirror of the gate's `both_held`, as last reported to the clock.
    gate_engaged: bool,
    suspended_at: Option<DateTime<Utc>>,
}

impl SessionState {
    fn fresh(config: &SessionConfig, now: DateTime<Utc>) -> Self {
        Self {
            phase: Phase::Idle,
            remaining_work_secs: config.work_duration_secs(),
            remaining_break_secs: config.break_duration_secs(),
            upcoming_break_secs: config.break_secs_for(1),
            sessions_completed: 0,
            last_tick: now,
            gate_engaged: false,
            suspended_at: None,
        }
    }
}

/// Owner of the session phase and countdowns.
#[derive(Debug, Clone)]
pub struct SessionClock {
    config: SessionConfig,
    state: SessionState,
}

impl SessionClock {
    /// Create a clock in the `Idle` phase with full durations.
    pub fn new(config: SessionConfig, now: DateTime<Utc>) -> Self {
        let state = SessionState::fresh(&config, now);
        Self { config, state }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn remaining_work_secs(&self) -> u64 {
        self.state.remaining_work_secs
    }

    pub fn remaining_break_secs(&self) -> u64 {
        self.state.remaining_break_secs
    }

    pub fn upcoming_break_secs(&self) -> u64 {
        self.state.upcoming_break_secs
    }

    pub fn sessions_completed(&self) -> u32 {
        self.state.sessions_completed
    }

    pub fn gate_engaged(&self) -> bool {
        self.state.gate_engaged
    }

    pub fn is_suspended(&self) -> bool {
        self.state.suspended_at.is_some()
    }

    pub fn last_tick(&self) -> DateTime<Utc> {
        self.state.last_tick
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let display_secs = match self.state.phase {
            Phase::Working => self.state.remaining_work_secs,
            phase if phase.has_countdown() => self.state.remaining_break_secs,
            _ => 0,
        };
        SessionSnapshot {
            phase: self.state.phase,
            display_secs,
            sessions_completed: self.state.sessions_completed,
            is_alarm_active: self.state.phase == Phase::Alarming,
            gate_engaged: self.state.gate_engaged,
            suspended: self.is_suspended(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a work session from `Idle`.
    ///
    /// To start from any other phase, call [`reset_all`](Self::reset_all) first.
    pub fn start_work(&mut self, now: DateTime<Utc>) -> Result<Event, TransitionError> {
        self.expect_phase("start_work", Phase::Idle)?;
        Ok(self.begin_work(now))
    }

    /// Reconcile the countdown against wall-clock time.
    ///
    /// Consumes whole elapsed seconds since the last reconciliation; the
    /// sub-second remainder stays on the books for the next call, so calling
    /// twice with the same `now` changes nothing the second time.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.is_suspended() {
            return Vec::new();
        }
        let elapsed = self.consume_elapsed(now);
        let mut events = Vec::new();

        match self.state.phase {
            Phase::Working => {
                if elapsed == 0 {
                    return events;
                }
                self.state.remaining_work_secs =
                    self.state.remaining_work_secs.saturating_sub(elapsed);
                if self.state.remaining_work_secs == 0 {
                    self.complete_work(now, &mut events);
                }
            }
            Phase::Resting if !self.state.gate_engaged => {
                // Break time only runs under engagement.
                events.push(self.abort_break());
            }
            Phase::Resting => {
                if elapsed == 0 {
                    return events;
                }
                self.state.remaining_break_secs =
                    self.state.remaining_break_secs.saturating_sub(elapsed);
                if self.state.remaining_break_secs == 0 {
                    tracing::debug!(
                        sessions_completed = self.state.sessions_completed,
                        "break completed"
                    );
                    events.push(Event::BreakCompleted {
                        sessions_completed: self.state.sessions_completed,
                    });
                    events.push(self.begin_work(now));
                }
            }
            _ => {}
        }
        events
    }

    /// Both touch points are held: the break countdown starts.
    pub fn on_gate_both_held(&mut self, now: DateTime<Utc>) -> Result<Event, TransitionError> {
        self.expect_phase("on_gate_both_held", Phase::Alarming)?;
        self.state.phase = Phase::Resting;
        self.state.gate_engaged = true;
        self.state.last_tick = now;
        tracing::debug!(remaining = self.state.remaining_break_secs, "break countdown started");
        Ok(Event::BreakCountdownStarted {
            remaining_secs: self.state.remaining_break_secs,
        })
    }

    /// A touch point let go during the break: progress is forfeited and the
    /// alarm restarts from the full break duration.
    pub fn on_gate_released(&mut self) -> Result<Event, TransitionError> {
        self.expect_phase("on_gate_released", Phase::Resting)?;
        Ok(self.abort_break())
    }

    pub fn resolve_rest_prompt(
        &mut self,
        choice: RestPromptChoice,
    ) -> Result<Event, TransitionError> {
        self.expect_phase("resolve_rest_prompt", Phase::AwaitingRestPrompt)?;
        match choice {
            RestPromptChoice::Reset => {
                self.state.phase = Phase::AwaitingRestConfirmation;
                Ok(Event::RestConfirmationRequested)
            }
            RestPromptChoice::Exit => {
                tracing::debug!("exit requested from rest prompt");
                Ok(Event::ExitRequested)
            }
        }
    }

    pub fn resolve_rest_confirmation(&mut self, confirmed: bool) -> Result<Event, TransitionError> {
        self.expect_phase("resolve_rest_confirmation", Phase::AwaitingRestConfirmation)?;
        if confirmed {
            self.state.phase = Phase::AwaitingStartConfirmation;
            Ok(Event::StartConfirmationRequested)
        } else {
            self.state.phase = Phase::AwaitingRestPrompt;
            Ok(Event::RestPromptReached {
                sessions_completed: self.state.sessions_completed,
            })
        }
    }

    /// Confirmed: full reset, then a fresh work session. Emits `Reset`
    /// followed by `WorkStarted`.
    pub fn resolve_start_confirmation(
        &mut self,
        confirmed: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, TransitionError> {
        self.expect_phase("resolve_start_confirmation", Phase::AwaitingStartConfirmation)?;
        if confirmed {
            let reset = self.reset_all(now);
            let started = self.begin_work(now);
            Ok(vec![reset, started])
        } else {
            self.state.phase = Phase::AwaitingRestConfirmation;
            Ok(vec![Event::RestConfirmationRequested])
        }
    }

    /// Back to `Idle` with zero completed sessions. Valid from any phase.
    pub fn reset_all(&mut self, now: DateTime<Utc>) -> Event {
        tracing::debug!(from = %self.state.phase, "session reset");
        self.state = SessionState::fresh(&self.config, now);
        Event::Reset { at: now }
    }

    /// Record that the host went to the background.
    ///
    /// Countdowns are left alone; [`resume`](Self::resume) settles the gap.
    /// Touch contact cannot survive backgrounding, so the gate mirror drops.
    /// A second call before `resume` keeps the first instant.
    pub fn suspend(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.is_suspended() {
            return None;
        }
        self.state.suspended_at = Some(now);
        self.state.gate_engaged = false;
        tracing::debug!(phase = %self.state.phase, "suspended");
        Some(Event::Suspended { at: now })
    }

    /// Settle the suspension gap.
    ///
    /// Working feeds the gap through [`tick`](Self::tick); a session that ran
    /// out while suspended completes, but the overshoot is not carried into
    /// the break. Break time never advances while suspended: Resting falls
    /// back to Alarming at full duration and Alarming stays put.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let Some(suspended_at) = self.state.suspended_at.take() else {
            return Vec::new();
        };
        let elapsed_secs = (now - suspended_at).num_seconds().max(0) as u64;
        tracing::debug!(phase = %self.state.phase, elapsed_secs, "resumed");

        let mut events = vec![Event::Resumed {
            elapsed_secs,
            at: now,
        }];
        match self.state.phase {
            Phase::Working | Phase::Resting => events.extend(self.tick(now)),
            _ => self.state.last_tick = now,
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn expect_phase(&self, operation: &'static str, expected: Phase) -> Result<(), TransitionError> {
        if self.state.phase == expected {
            Ok(())
        } else {
            Err(TransitionError::InvalidPhase {
                operation,
                phase: self.state.phase,
            })
        }
    }

    /// Whole seconds since `last_tick`; advances `last_tick` by exactly that
    /// much. A clock that went backwards yields zero.
    fn consume_elapsed(&mut self, now: DateTime<Utc>) -> u64 {
        let secs = (now - self.state.last_tick).num_seconds();
        if secs <= 0 {
            return 0;
        }
        self.state.last_tick += Duration::seconds(secs);
        secs as u64
    }

    fn begin_work(&mut self, now: DateTime<Utc>) -> Event {
        let next_count = self.state.sessions_completed.saturating_add(1);
        self.state.phase = Phase::Working;
        self.state.remaining_work_secs = self.config.work_duration_secs();
        self.state.upcoming_break_secs = self.config.break_secs_for(next_count);
        self.state.gate_engaged = false;
        self.state.last_tick = now;
        tracing::debug!(
            duration = self.config.work_duration_secs(),
            session = next_count,
            "work started"
        );
        Event::WorkStarted {
            duration_secs: self.config.work_duration_secs(),
            upcoming_break_secs: self.state.upcoming_break_secs,
            at: now,
        }
    }

    fn complete_work(&mut self, now: DateTime<Utc>, events: &mut Vec<Event>) {
        self.state.sessions_completed = self.state.sessions_completed.saturating_add(1);
        self.state.last_tick = now;
        let count = self.state.sessions_completed;
        events.push(Event::SessionCompleted {
            sessions_completed: count,
        });

        if count == self.config.sessions_before_rest_prompt() {
            tracing::debug!(sessions_completed = count, "rest prompt reached");
            self.state.phase = Phase::AwaitingRestPrompt;
            events.push(Event::RestPromptReached {
                sessions_completed: count,
            });
        } else {
            events.push(self.enter_alarm());
        }
    }

    fn enter_alarm(&mut self) -> Event {
        let count = self.state.sessions_completed;
        let long_break = self.config.is_long_break(count);
        self.state.phase = Phase::Alarming;
        self.state.remaining_break_secs = self.config.break_secs_for(count);
        self.state.gate_engaged = false;
        tracing::debug!(
            duration = self.state.remaining_break_secs,
            long_break,
            "break alarm started"
        );
        Event::BreakAlarmStarted {
            duration_secs: self.state.remaining_break_secs,
            long_break,
        }
    }

    fn abort_break(&mut self) -> Event {
        self.state.phase = Phase::Alarming;
        self.state.remaining_break_secs = self.config.break_secs_for(self.state.sessions_completed);
        self.state.gate_engaged = false;
        tracing::debug!(
            duration = self.state.remaining_break_secs,
            "gate released, break alarm restarted"
        );
        Event::BreakAlarmRestarted {
            duration_secs: self.state.remaining_break_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(secs)
    }

    fn small() -> SessionConfig {
        SessionConfig::new(10, 5, 15, 4, 8).unwrap()
    }

    fn working_clock() -> SessionClock {
        let mut clock = SessionClock::new(small(), t0());
        clock.start_work(t0()).unwrap();
        clock
    }

    #[test]
    fn starts_idle_with_full_durations() {
        let clock = SessionClock::new(small(), t0());
        assert_eq!(clock.phase(), Phase::Idle);
        assert_eq!(clock.remaining_work_secs(), 10);
        assert_eq!(clock.sessions_completed(), 0);
        assert_eq!(clock.snapshot().display_secs, 0);
    }

    #[test]
    fn start_work_emits_duration_and_next_break() {
        let mut clock = SessionClock::new(small(), t0());
        let event = clock.start_work(t0()).unwrap();
        assert_eq!(
            event,
            Event::WorkStarted {
                duration_secs: 10,
                upcoming_break_secs: 5,
                at: t0(),
            }
        );
        assert_eq!(clock.phase(), Phase::Working);
    }

    #[test]
    fn start_work_rejected_outside_idle() {
        let mut clock = working_clock();
        let err = clock.start_work(at(1)).unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidPhase {
                operation: "start_work",
                phase: Phase::Working,
            }
        );
        assert_eq!(clock.remaining_work_secs(), 10);
    }

    #[test]
    fn tick_counts_down_work() {
        let mut clock = working_clock();
        assert!(clock.tick(at(3)).is_empty());
        assert_eq!(clock.remaining_work_secs(), 7);
        assert_eq!(clock.snapshot().display_secs, 7);
    }

    #[test]
    fn tick_is_idempotent_for_same_instant() {
        let mut clock = working_clock();
        clock.tick(at(4));
        let before = clock.snapshot();
        assert!(clock.tick(at(4)).is_empty());
        assert_eq!(clock.snapshot(), before);
    }

    #[test]
    fn sub_second_ticks_do_not_lose_time() {
        let mut clock = working_clock();
        for half in 1..=8 {
            clock.tick(t0() + Duration::milliseconds(half * 500));
        }
        assert_eq!(clock.remaining_work_secs(), 6);
    }

    #[test]
    fn backwards_clock_is_ignored() {
        let mut clock = working_clock();
        clock.tick(at(5));
        assert!(clock.tick(at(2)).is_empty());
        assert_eq!(clock.remaining_work_secs(), 5);
    }

    #[test]
    fn work_completion_enters_alarm() {
        let mut clock = working_clock();
        let events = clock.tick(at(10));
        assert_eq!(
            events,
            vec![
                Event::SessionCompleted {
                    sessions_completed: 1
                },
                Event::BreakAlarmStarted {
                    duration_secs: 5,
                    long_break: false
                },
            ]
        );
        assert_eq!(clock.phase(), Phase::Alarming);
        assert!(clock.snapshot().is_alarm_active);
    }

    #[test]
    fn ticks_ignored_while_alarming() {
        let mut clock = working_clock();
        clock.tick(at(10));
        assert!(clock.tick(at(30)).is_empty());
        assert_eq!(clock.remaining_break_secs(), 5);
    }

    #[test]
    fn gate_ops_rejected_in_wrong_phase() {
        let mut clock = working_clock();
        assert!(clock.on_gate_both_held(at(1)).is_err());
        assert!(clock.on_gate_released().is_err());
        assert!(clock.resolve_rest_prompt(RestPromptChoice::Reset).is_err());
        assert!(clock.resolve_rest_confirmation(true).is_err());
        assert!(clock.resolve_start_confirmation(true, at(1)).is_err());
        assert_eq!(clock.phase(), Phase::Working);
    }

    #[test]
    fn release_forfeits_break_progress() {
        let mut clock = working_clock();
        clock.tick(at(10));
        clock.on_gate_both_held(at(10)).unwrap();
        clock.tick(at(13));
        assert_eq!(clock.remaining_break_secs(), 2);

        let event = clock.on_gate_released().unwrap();
        assert_eq!(event, Event::BreakAlarmRestarted { duration_secs: 5 });
        assert_eq!(clock.phase(), Phase::Alarming);

        clock.on_gate_both_held(at(20)).unwrap();
        assert_eq!(clock.remaining_break_secs(), 5);
    }

    #[test]
    fn alarm_wait_does_not_consume_break() {
        let mut clock = working_clock();
        clock.tick(at(10));
        // Thirty seconds pass before the user engages.
        clock.on_gate_both_held(at(40)).unwrap();
        clock.tick(at(41));
        assert_eq!(clock.remaining_break_secs(), 4);
    }

    #[test]
    fn finished_break_starts_next_session() {
        let mut clock = working_clock();
        clock.tick(at(10));
        clock.on_gate_both_held(at(10)).unwrap();
        let events = clock.tick(at(15));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::BreakCompleted { sessions_completed: 1 });
        assert!(matches!(events[1], Event::WorkStarted { duration_secs: 10, .. }));
        assert_eq!(clock.phase(), Phase::Working);
        assert_eq!(clock.remaining_work_secs(), 10);
        assert!(!clock.gate_engaged());
    }

    #[test]
    fn next_work_session_leaves_break_countdown_alone() {
        let mut clock = working_clock();
        clock.tick(at(10));
        clock.on_gate_both_held(at(10)).unwrap();
        clock.tick(at(15));
        assert_eq!(clock.phase(), Phase::Working);
        assert_eq!(clock.remaining_break_secs(), 0);
        assert_eq!(clock.upcoming_break_secs(), 5);

        clock.tick(at(25));
        assert_eq!(clock.phase(), Phase::Alarming);
        assert_eq!(clock.remaining_break_secs(), 5);
        assert_eq!(clock.snapshot().display_secs, 5);
    }

    #[test]
    fn reset_all_clears_everything() {
        let mut clock = working_clock();
        clock.tick(at(10));
        clock.suspend(at(11));
        let event = clock.reset_all(at(12));
        assert_eq!(event, Event::Reset { at: at(12) });
        assert_eq!(clock.phase(), Phase::Idle);
        assert_eq!(clock.sessions_completed(), 0);
        assert!(!clock.is_suspended());
        assert_eq!(clock.remaining_work_secs(), 10);
    }

    #[test]
    fn suspend_twice_keeps_first_instant() {
        let mut clock = working_clock();
        assert!(clock.suspend(at(2)).is_some());
        assert!(clock.suspend(at(5)).is_none());
        let events = clock.resume(at(6));
        assert_eq!(
            events[0],
            Event::Resumed {
                elapsed_secs: 4,
                at: at(6)
            }
        );
        assert_eq!(clock.remaining_work_secs(), 4);
    }

    #[test]
    fn ticks_ignored_while_suspended() {
        let mut clock = working_clock();
        clock.suspend(at(1));
        assert!(clock.tick(at(5)).is_empty());
        assert_eq!(clock.remaining_work_secs(), 10);
        clock.resume(at(5));
        assert_eq!(clock.remaining_work_secs(), 5);
    }

    #[test]
    fn resume_without_suspend_is_noop() {
        let mut clock = working_clock();
        assert!(clock.resume(at(3)).is_empty());
        assert_eq!(clock.remaining_work_secs(), 10);
    }

    #[test]
    fn resume_past_end_completes_without_carry() {
        let mut clock = working_clock();
        clock.suspend(at(2));
        let events = clock.resume(at(100));
        assert!(events.contains(&Event::SessionCompleted {
            sessions_completed: 1
        }));
        assert_eq!(clock.phase(), Phase::Alarming);
        assert_eq!(clock.remaining_break_secs(), 5);
    }

    #[test]
    fn resume_while_resting_falls_back_to_alarm() {
        let mut clock = working_clock();
        clock.tick(at(10));
        clock.on_gate_both_held(at(10)).unwrap();
        clock.tick(at(12));
        clock.suspend(at(12));
        assert!(!clock.gate_engaged());
        let events = clock.resume(at(60));
        assert_eq!(events[1], Event::BreakAlarmRestarted { duration_secs: 5 });
        assert_eq!(clock.phase(), Phase::Alarming);
        assert_eq!(clock.remaining_break_secs(), 5);
    }

    #[test]
    fn resume_while_alarming_keeps_break_intact() {
        let mut clock = working_clock();
        clock.tick(at(10));
        clock.suspend(at(11));
        let events = clock.resume(at(500));
        assert_eq!(events.len(), 1);
        assert_eq!(clock.phase(), Phase::Alarming);
        assert_eq!(clock.remaining_break_secs(), 5);
        assert_eq!(clock.last_tick(), at(500));
    }

    proptest! {
        #[test]
        fn suspend_resume_matches_foreground_ticks(
            steps in prop::collection::vec(0i64..4, 0..20),
            extra_ms in 0i64..1000,
        ) {
            let total: i64 = steps.iter().sum();
            let cfg = SessionConfig::new(1_000, 5, 15, 4, 8).unwrap();

            let mut foreground = SessionClock::new(cfg, t0());
            foreground.start_work(t0()).unwrap();
            let mut now = 0;
            for step in &steps {
                now += step;
                foreground.tick(at(now));
            }

            let mut background = SessionClock::new(cfg, t0());
            background.start_work(t0()).unwrap();
            background.suspend(t0() + Duration::milliseconds(extra_ms.min(total * 1000)));
            background.resume(at(total));

            prop_assert_eq!(foreground.remaining_work_secs(), 1_000 - total as u64);
            prop_assert_eq!(background.remaining_work_secs(), 1_000 - total as u64);
        }
    }
}

//! Translates clock events into notification and audio requests.
//!
//! Holds at most one pending alert per [`AlertId`]. Collaborator failures are
//! logged and dropped here; nothing flows back into the clock.

use std::collections::HashSet;

use super::{AlertId, AudioDevice, NotificationService};
use crate::events::Event;

/// Delay used for "as soon as possible" alerts. Notification services tend
/// to reject a zero delay.
pub const IMMEDIATE_DELAY_SECS: u64 = 1;

pub struct NotificationScheduler<N, A> {
    service: N,
    audio: A,
    enabled: bool,
    backgrounded: bool,
    /// An alarm episode is running and has not yet produced a system alert.
    break_alert_armed: bool,
    pending: HashSet<AlertId>,
}

impl<N: NotificationService, A: AudioDevice> NotificationScheduler<N, A> {
    pub fn new(service: N, audio: A) -> Self {
        Self {
            service,
            audio,
            enabled: true,
            backgrounded: false,
            break_alert_armed: false,
            pending: HashSet::new(),
        }
    }

    /// Turn system notifications off; the in-app pulse keeps working.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn service(&self) -> &N {
        &self.service
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn is_backgrounded(&self) -> bool {
        self.backgrounded
    }

    pub fn is_break_alert_armed(&self) -> bool {
        self.break_alert_armed
    }

    pub fn is_pending(&self, id: AlertId) -> bool {
        self.pending.contains(&id)
    }

    /// Dispatch a clock event to the matching handler.
    pub fn handle(&mut self, event: &Event) {
        match event {
            Event::WorkStarted { duration_secs, .. } => self.on_work_started(*duration_secs),
            Event::BreakAlarmStarted { .. } | Event::BreakAlarmRestarted { .. } => {
                self.on_break_alarm_started()
            }
            Event::BreakCountdownStarted { .. } => self.on_break_countdown_started(),
            Event::Reset { .. } | Event::ExitRequested => self.on_reset(),
            _ => {}
        }
    }

    pub fn on_work_started(&mut self, duration_secs: u64) {
        self.cancel_all();
        self.break_alert_armed = false;
        self.schedule(AlertId::WorkSessionEnd, duration_secs);
    }

    /// Background: alert right away. Foreground: the in-app pulse covers it,
    /// but a later backgrounding in the same episode still alerts once.
    pub fn on_break_alarm_started(&mut self) {
        self.break_alert_armed = true;
        if self.backgrounded {
            self.schedule_break_alert();
        }
    }

    pub fn on_break_countdown_started(&mut self) {
        self.break_alert_armed = false;
    }

    pub fn on_reset(&mut self) {
        self.cancel_all();
        self.break_alert_armed = false;
    }

    pub fn on_background(&mut self, alarming: bool) {
        self.backgrounded = true;
        if alarming && self.break_alert_armed {
            self.schedule_break_alert();
        }
    }

    pub fn on_foreground(&mut self) {
        self.backgrounded = false;
    }

    /// One beat of the alarm pulse source. The gate is checked on every
    /// beat, so a brief touch never silences the alarm on its own.
    pub fn on_alarm_pulse(&mut self, gate_engaged: bool) {
        if gate_engaged {
            return;
        }
        if let Err(e) = self.audio.play_alert_pulse() {
            tracing::warn!(error = %e, "alert pulse failed");
        }
    }

    fn schedule_break_alert(&mut self) {
        if self.pending.contains(&AlertId::BreakSessionStart) {
            return;
        }
        self.schedule(AlertId::BreakSessionStart, IMMEDIATE_DELAY_SECS);
    }

    fn schedule(&mut self, id: AlertId, delay_secs: u64) {
        if !self.enabled {
            return;
        }
        match self
            .service
            .schedule_alert(id, delay_secs, id.title(), id.body())
        {
            Ok(()) => {
                tracing::debug!(%id, delay_secs, "alert scheduled");
                self.pending.insert(id);
            }
            Err(e) => tracing::warn!(%id, error = %e, "failed to schedule alert"),
        }
    }

    fn cancel_all(&mut self) {
        self.pending.clear();
        if !self.enabled {
            return;
        }
        if let Err(e) = self.service.cancel_all_pending() {
            tracing::warn!(error = %e, "failed to cancel pending alerts");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use chrono::Utc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Schedule(AlertId, u64),
        CancelAll,
    }

    #[derive(Default)]
    struct FakeService {
        calls: Vec<Call>,
        reject: bool,
    }

    impl NotificationService for FakeService {
        fn schedule_alert(
            &mut self,
            id: AlertId,
            delay_secs: u64,
            _title: &str,
            _body: &str,
        ) -> Result<(), NotifyError> {
            if self.reject {
                return Err(NotifyError::Rejected("denied".into()));
            }
            self.calls.push(Call::Schedule(id, delay_secs));
            Ok(())
        }

        fn cancel_all_pending(&mut self) -> Result<(), NotifyError> {
            self.calls.push(Call::CancelAll);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeAudio {
        pulses: u32,
        broken: bool,
    }

    impl AudioDevice for FakeAudio {
        fn play_alert_pulse(&mut self) -> Result<(), NotifyError> {
            if self.broken {
                return Err(NotifyError::AudioUnavailable("no output".into()));
            }
            self.pulses += 1;
            Ok(())
        }
    }

    fn scheduler() -> NotificationScheduler<FakeService, FakeAudio> {
        NotificationScheduler::new(FakeService::default(), FakeAudio::default())
    }

    fn break_schedules(s: &NotificationScheduler<FakeService, FakeAudio>) -> usize {
        s.service()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Schedule(AlertId::BreakSessionStart, _)))
            .count()
    }

    #[test]
    fn work_started_replaces_pending_alert() {
        let mut s = scheduler();
        s.on_work_started(1500);
        s.on_work_started(1500);
        assert_eq!(
            s.service().calls,
            vec![
                Call::CancelAll,
                Call::Schedule(AlertId::WorkSessionEnd, 1500),
                Call::CancelAll,
                Call::Schedule(AlertId::WorkSessionEnd, 1500),
            ]
        );
        assert!(s.is_pending(AlertId::WorkSessionEnd));
    }

    #[test]
    fn foreground_alarm_only_arms() {
        let mut s = scheduler();
        s.on_break_alarm_started();
        assert!(s.is_break_alert_armed());
        assert_eq!(break_schedules(&s), 0);
    }

    #[test]
    fn backgrounding_during_alarm_alerts_once() {
        let mut s = scheduler();
        s.on_break_alarm_started();
        s.on_background(true);
        s.on_foreground();
        s.on_background(true);
        s.on_break_alarm_started();
        assert_eq!(break_schedules(&s), 1);
        assert!(s
            .service()
            .calls
            .contains(&Call::Schedule(AlertId::BreakSessionStart, IMMEDIATE_DELAY_SECS)));
    }

    #[test]
    fn background_alarm_start_alerts_immediately() {
        let mut s = scheduler();
        s.on_background(false);
        s.on_break_alarm_started();
        assert_eq!(break_schedules(&s), 1);
    }

    #[test]
    fn countdown_disarms() {
        let mut s = scheduler();
        s.on_break_alarm_started();
        s.on_break_countdown_started();
        s.on_background(true);
        assert_eq!(break_schedules(&s), 0);
    }

    #[test]
    fn reset_cancels_and_disarms() {
        let mut s = scheduler();
        s.on_work_started(60);
        s.on_break_alarm_started();
        s.handle(&Event::Reset { at: Utc::now() });
        assert!(!s.is_break_alert_armed());
        assert!(!s.is_pending(AlertId::WorkSessionEnd));
        assert_eq!(s.service().calls.last(), Some(&Call::CancelAll));
    }

    #[test]
    fn rejected_schedule_is_swallowed() {
        let mut s = NotificationScheduler::new(
            FakeService {
                reject: true,
                ..Default::default()
            },
            FakeAudio::default(),
        );
        s.on_work_started(60);
        assert!(!s.is_pending(AlertId::WorkSessionEnd));
    }

    #[test]
    fn pulse_respects_gate() {
        let mut s = scheduler();
        s.on_alarm_pulse(false);
        s.on_alarm_pulse(true);
        s.on_alarm_pulse(false);
        assert_eq!(s.audio().pulses, 2);
    }

    #[test]
    fn broken_audio_is_swallowed() {
        let mut s = NotificationScheduler::new(
            FakeService::default(),
            FakeAudio {
                broken: true,
                ..Default::default()
            },
        );
        s.on_alarm_pulse(false);
        assert_eq!(s.audio().pulses, 0);
    }

    #[test]
    fn disabled_scheduler_stays_silent() {
        let mut s = scheduler().with_enabled(false);
        s.on_work_started(60);
        s.on_background(false);
        s.on_break_alarm_started();
        assert!(s.service().calls.is_empty());
    }
}

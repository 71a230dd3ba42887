//! Recurring drivers: the 1 s foreground tick and the 1.5 s alarm pulse.
//!
//! Hosts own the actual timer facility behind [`IntervalScheduler`]. The
//! [`SourceSet`] keeps at most one live handle per [`SourceKind`] and always
//! cancels the old handle before arming a new one, including when a source
//! is restarted in place.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::phase::Phase;
use crate::events::Event;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);
pub const PULSE_PERIOD: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Tick,
    Pulse,
}

impl SourceKind {
    pub const ALL: [SourceKind; 2] = [SourceKind::Tick, SourceKind::Pulse];

    pub fn period(self) -> Duration {
        match self {
            SourceKind::Tick => TICK_PERIOD,
            SourceKind::Pulse => PULSE_PERIOD,
        }
    }
}

/// Host timer facility.
///
/// `generation` identifies this arming; hosts hand it back with every firing
/// so late deliveries from a cancelled source can be recognised and dropped.
pub trait IntervalScheduler {
    type Handle;

    fn arm(&mut self, kind: SourceKind, period: Duration, generation: u64) -> Self::Handle;
    fn cancel(&mut self, handle: Self::Handle);
}

/// Which sources should be running for a given session state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourcePlan {
    pub tick: bool,
    pub pulse: bool,
}

impl SourcePlan {
    pub fn for_state(phase: Phase, gate_engaged: bool, suspended: bool) -> Self {
        if suspended {
            return Self::default();
        }
        Self {
            tick: phase == Phase::Working || (phase == Phase::Resting && gate_engaged),
            pulse: phase == Phase::Alarming,
        }
    }

    pub fn wants(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::Tick => self.tick,
            SourceKind::Pulse => self.pulse,
        }
    }
}

struct Armed<H> {
    generation: u64,
    handle: H,
}

pub struct SourceSet<S: IntervalScheduler> {
    scheduler: S,
    tick: Option<Armed<S::Handle>>,
    pulse: Option<Armed<S::Handle>>,
    next_generation: u64,
}

impl<S: IntervalScheduler> SourceSet<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            tick: None,
            pulse: None,
            next_generation: 1,
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn is_active(&self, kind: SourceKind) -> bool {
        self.slot(kind).is_some()
    }

    /// Whether a firing tagged with `generation` comes from the live source.
    pub fn accepts(&self, kind: SourceKind, generation: u64) -> bool {
        self.slot(kind)
            .map(|armed| armed.generation == generation)
            .unwrap_or(false)
    }

    /// Cancel the current source of this kind (if any), then arm a new one.
    pub fn rearm(&mut self, kind: SourceKind) {
        self.cancel(kind);
        let generation = self.next_generation;
        self.next_generation += 1;
        let handle = self.scheduler.arm(kind, kind.period(), generation);
        *self.slot_mut(kind) = Some(Armed { generation, handle });
    }

    pub fn cancel(&mut self, kind: SourceKind) {
        if let Some(armed) = self.slot_mut(kind).take() {
            self.scheduler.cancel(armed.handle);
        }
    }

    /// Bring the live sources in line with `plan` after a batch of events.
    ///
    /// Transitions that start a countdown or an alarm episode restart the
    /// matching source so its cadence lines up with the transition; sources
    /// the plan does not want are cancelled.
    pub fn apply(&mut self, events: &[Event], plan: SourcePlan) {
        for kind in SourceKind::ALL {
            if !plan.wants(kind) {
                self.cancel(kind);
            } else if events.iter().any(|e| restarts(e, kind)) || !self.is_active(kind) {
                self.rearm(kind);
            }
        }
    }

    fn slot(&self, kind: SourceKind) -> Option<&Armed<S::Handle>> {
        match kind {
            SourceKind::Tick => self.tick.as_ref(),
            SourceKind::Pulse => self.pulse.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: SourceKind) -> &mut Option<Armed<S::Handle>> {
        match kind {
            SourceKind::Tick => &mut self.tick,
            SourceKind::Pulse => &mut self.pulse,
        }
    }
}

fn restarts(event: &Event, kind: SourceKind) -> bool {
    match kind {
        SourceKind::Tick => matches!(
            event,
            Event::WorkStarted { .. } | Event::BreakCountdownStarted { .. }
        ),
        SourceKind::Pulse => matches!(
            event,
            Event::BreakAlarmStarted { .. } | Event::BreakAlarmRestarted { .. }
        ),
    }
}

/// A firing delivered by [`TokioIntervals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFire {
    pub kind: SourceKind,
    pub generation: u64,
}

/// [`IntervalScheduler`] backed by tokio tasks.
///
/// Each armed source is a task running `tokio::time::interval` that sends a
/// [`SourceFire`] on the channel; cancelling aborts the task. Firings are
/// consumed on the host's single event-loop task.
pub struct TokioIntervals {
    tx: mpsc::UnboundedSender<SourceFire>,
}

impl TokioIntervals {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SourceFire>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl IntervalScheduler for TokioIntervals {
    type Handle = JoinHandle<()>;

    fn arm(&mut self, kind: SourceKind, period: Duration, generation: u64) -> Self::Handle {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(SourceFire { kind, generation }).is_err() {
                    break;
                }
            }
        })
    }

    fn cancel(&mut self, handle: Self::Handle) {
        handle.abort();
    }
}

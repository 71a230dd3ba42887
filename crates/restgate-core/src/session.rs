//! Single-context wiring of clock, gate, notifier and interval sources.
//!
//! Everything here runs on one logical thread (the host's event loop), so
//! nothing is locked. Touch events go through the gate; gate edges and
//! source firings drive the clock; every batch of clock events is handed to
//! the notifier and then used to settle the interval sources.

use chrono::{DateTime, Utc};

use crate::error::TransitionError;
use crate::events::Event;
use crate::notify::{AudioDevice, NotificationScheduler, NotificationService};
use crate::timer::{
    EngagementGate, GateTransition, IntervalScheduler, Phase, RestPromptChoice, SessionClock,
    SessionSnapshot, SourceFire, SourceKind, SourcePlan, SourceSet,
};

pub struct Session<N, A, S: IntervalScheduler> {
    clock: SessionClock,
    gate: EngagementGate,
    notifier: NotificationScheduler<N, A>,
    sources: SourceSet<S>,
    exit_requested: bool,
}

impl<N, A, S> Session<N, A, S>
where
    N: NotificationService,
    A: AudioDevice,
    S: IntervalScheduler,
{
    pub fn new(
        clock: SessionClock,
        notifier: NotificationScheduler<N, A>,
        sources: SourceSet<S>,
    ) -> Self {
        Self {
            clock,
            gate: EngagementGate::new(),
            notifier,
            sources,
            exit_requested: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn gate(&self) -> &EngagementGate {
        &self.gate
    }

    pub fn notifier(&self) -> &NotificationScheduler<N, A> {
        &self.notifier
    }

    pub fn sources(&self) -> &SourceSet<S> {
        &self.sources
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.clock.snapshot()
    }

    /// The user chose to exit at the rest prompt.
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    // ── Intents ──────────────────────────────────────────────────────

    pub fn start(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        match self.clock.start_work(now) {
            Ok(event) => self.dispatch(vec![event]),
            Err(e) => rejected(e),
        }
    }

    /// Reset from any phase and immediately start a fresh work session.
    pub fn restart(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        self.exit_requested = false;
        let mut events = vec![self.clock.reset_all(now)];
        if let Ok(started) = self.clock.start_work(now) {
            events.push(started);
        }
        self.dispatch(events)
    }

    pub fn reset_all(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        self.exit_requested = false;
        let event = self.clock.reset_all(now);
        self.dispatch(vec![event])
    }

    pub fn set_left(&mut self, held: bool, now: DateTime<Utc>) -> Vec<Event> {
        let edge = self.gate.set_left(held);
        self.on_gate_edge(edge, now)
    }

    pub fn set_right(&mut self, held: bool, now: DateTime<Utc>) -> Vec<Event> {
        let edge = self.gate.set_right(held);
        self.on_gate_edge(edge, now)
    }

    pub fn resolve_rest_prompt(&mut self, choice: RestPromptChoice) -> Vec<Event> {
        match self.clock.resolve_rest_prompt(choice) {
            Ok(event) => self.dispatch(vec![event]),
            Err(e) => rejected(e),
        }
    }

    pub fn resolve_rest_confirmation(&mut self, confirmed: bool) -> Vec<Event> {
        match self.clock.resolve_rest_confirmation(confirmed) {
            Ok(event) => self.dispatch(vec![event]),
            Err(e) => rejected(e),
        }
    }

    pub fn resolve_start_confirmation(
        &mut self,
        confirmed: bool,
        now: DateTime<Utc>,
    ) -> Vec<Event> {
        match self.clock.resolve_start_confirmation(confirmed, now) {
            Ok(events) => self.dispatch(events),
            Err(e) => rejected(e),
        }
    }

    // ── Drivers ──────────────────────────────────────────────────────

    /// A firing from the host's interval facility. Firings from a source
    /// that has since been cancelled or re-armed are dropped.
    pub fn on_fire(&mut self, fire: SourceFire, now: DateTime<Utc>) -> Vec<Event> {
        if !self.sources.accepts(fire.kind, fire.generation) {
            tracing::trace!(kind = ?fire.kind, generation = fire.generation, "stale firing dropped");
            return Vec::new();
        }
        match fire.kind {
            SourceKind::Tick => self.on_tick(now),
            SourceKind::Pulse => {
                self.on_pulse();
                Vec::new()
            }
        }
    }

    pub fn on_tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let events = self.clock.tick(now);
        let events = self.dispatch(events);
        self.engage_held_gate(events, now)
    }

    pub fn on_pulse(&mut self) {
        if self.clock.phase() == Phase::Alarming {
            self.notifier.on_alarm_pulse(self.gate.both_held());
        }
    }

    pub fn on_background(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let Some(event) = self.clock.suspend(now) else {
            return Vec::new();
        };
        // Contacts do not survive backgrounding.
        self.gate.reset();
        self.notifier
            .on_background(self.clock.phase() == Phase::Alarming);
        self.dispatch(vec![event])
    }

    pub fn on_foreground(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        self.notifier.on_foreground();
        let events = self.clock.resume(now);
        let events = self.dispatch(events);
        self.engage_held_gate(events, now)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn on_gate_edge(&mut self, edge: Option<GateTransition>, now: DateTime<Utc>) -> Vec<Event> {
        let result = match edge {
            None => return Vec::new(),
            Some(GateTransition::BothHeldEntered) => self.clock.on_gate_both_held(now),
            Some(GateTransition::ReleasedFromBoth) => self.clock.on_gate_released(),
        };
        match result {
            Ok(event) => self.dispatch(vec![event]),
            Err(e) => rejected(e),
        }
    }

    /// Both contacts may already be down when the alarm starts: the clock
    /// rejected that edge while working, so replay it now.
    fn engage_held_gate(&mut self, mut events: Vec<Event>, now: DateTime<Utc>) -> Vec<Event> {
        if self.clock.phase() != Phase::Alarming || !self.gate.both_held() {
            return events;
        }
        match self.clock.on_gate_both_held(now) {
            Ok(event) => events.extend(self.dispatch(vec![event])),
            Err(e) => tracing::debug!(error = %e, "held gate not applied"),
        }
        events
    }

    fn dispatch(&mut self, events: Vec<Event>) -> Vec<Event> {
        if events.is_empty() {
            return events;
        }
        for event in &events {
            match event {
                Event::WorkStarted { .. } => self.gate.reset(),
                // A reset clears any suspension, so the host is in front.
                Event::Reset { .. } => {
                    self.gate.reset();
                    self.notifier.on_foreground();
                }
                Event::ExitRequested => self.exit_requested = true,
                _ => {}
            }
            self.notifier.handle(event);
        }
        let plan = SourcePlan::for_state(
            self.clock.phase(),
            self.clock.gate_engaged(),
            self.clock.is_suspended(),
        );
        self.sources.apply(&events, plan);
        events
    }
}

fn rejected(err: TransitionError) -> Vec<Event> {
    tracing::debug!(error = %err, "intent ignored");
    Vec::new()
}

mod clock;
mod config;
mod gate;
mod phase;
mod sources;

pub use clock::{RestPromptChoice, SessionClock, SessionSnapshot};
pub use config::SessionConfig;
pub use gate::{EngagementGate, GateTransition, TouchGateState};
pub use phase::Phase;
pub use sources::{
    IntervalScheduler, SourceFire, SourceKind, SourcePlan, SourceSet, TokioIntervals, PULSE_PERIOD,
    TICK_PERIOD,
};

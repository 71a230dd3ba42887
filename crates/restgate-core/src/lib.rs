//! # restgate Core Library
//!
//! Core logic for a work/break interval timer whose breaks are gated on
//! physical engagement: the user has to hold two touch points at once to
//! start a break and keep holding them for the break to count down.
//!
//! ## Architecture
//!
//! - **Session clock**: a wall-clock-based state machine that requires the
//!   caller to invoke `tick()` and to report suspension/resume; no threads
//! - **Engagement gate**: edge detection over two touch contacts
//! - **Notification scheduler**: turns clock events into system alerts and
//!   alarm pulses without ever duplicating a pending alert
//! - **Interval sources**: at most one live tick and one live pulse source
//! - **Storage**: TOML-based configuration (sessions are not persisted)
//!
//! ## Key Components
//!
//! - [`SessionClock`]: phase and countdown state machine
//! - [`EngagementGate`]: dual-touch gate
//! - [`NotificationScheduler`]: adapter to the notification service and audio device
//! - [`Session`]: single-context wiring of all of the above
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod notify;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, NotifyError, TransitionError};
pub use events::Event;
pub use notify::{AlertId, AudioDevice, NotificationScheduler, NotificationService};
pub use session::Session;
pub use storage::Config;
pub use timer::{
    EngagementGate, GateTransition, IntervalScheduler, Phase, RestPromptChoice, SessionClock,
    SessionConfig, SessionSnapshot, SourceFire, SourceKind, SourcePlan, SourceSet,
    TokioIntervals,
};

//! Deterministic replay against a virtual clock.
//!
//! Besides the intents understood by `run`, a script can move time:
//! `tick N` advances N seconds, delivering one tick per second while the tick
//! source is live; `advance N` moves the clock without any ticks (time spent
//! backgrounded); `pulse` delivers one alarm-pulse beat.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use clap::Args;
use restgate_core::{
    IntervalScheduler, NotificationScheduler, Session, SessionClock, SourceKind, SourceSet,
};

use super::SessionArgs;
use crate::console::{self, ConsoleNotifier, TerminalBell};
use crate::intent::Intent;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Script file, or `-` for stdin
    pub script: PathBuf,
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Intent(Intent),
    Tick(u32),
    Advance(u32),
    Pulse,
}

/// Parse a whole script, reporting the first bad line by number.
pub fn parse_script(source: &str) -> Result<Vec<Step>, String> {
    let mut steps = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let parsed = parse_step(line).map_err(|e| format!("line {}: {e}", index + 1))?;
        steps.extend(parsed);
    }
    Ok(steps)
}

fn parse_step(line: &str) -> Result<Option<Step>, String> {
    let mut words = line.split_whitespace();
    let seconds = |arg: Option<&str>| -> Result<u32, String> {
        let arg = arg.ok_or_else(|| "missing number of seconds".to_string())?;
        arg.parse::<u32>()
            .map_err(|e| format!("bad number of seconds '{arg}': {e}"))
    };
    match words.next() {
        Some("tick") => Ok(Some(Step::Tick(seconds(words.next())?))),
        Some("advance") => Ok(Some(Step::Advance(seconds(words.next())?))),
        Some("pulse") => Ok(Some(Step::Pulse)),
        _ => Ok(Intent::parse(line)?.map(Step::Intent)),
    }
}

/// Interval facility for the virtual clock. Nothing runs on its own: the
/// script delivers firings, gated on what the session's source set holds.
#[derive(Default)]
pub struct VirtualIntervals;

impl IntervalScheduler for VirtualIntervals {
    type Handle = u64;

    fn arm(&mut self, _kind: SourceKind, _period: Duration, generation: u64) -> u64 {
        generation
    }

    fn cancel(&mut self, _handle: u64) {}
}

fn advance(now: DateTime<Utc>, secs: u32) -> Result<DateTime<Utc>, String> {
    now.checked_add_signed(chrono::Duration::seconds(i64::from(secs)))
        .ok_or_else(|| format!("virtual clock out of range after {now}"))
}

fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).single().unwrap_or_default()
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source = if args.script.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&args.script)?
    };
    let steps = parse_script(&source)?;

    let config = args.session.load_config()?;
    let session_config = args.session.session_config(&config)?;
    let mut now = epoch();

    let notifier = NotificationScheduler::new(ConsoleNotifier, TerminalBell { ring: false })
        .with_enabled(config.notifications.enabled);
    let mut session = Session::new(
        SessionClock::new(session_config, now),
        notifier,
        SourceSet::new(VirtualIntervals),
    );

    for step in steps {
        match step {
            Step::Intent(Intent::Status) => console::print_snapshot(&session.snapshot()),
            Step::Intent(intent) => console::print_events(&intent.apply(&mut session, now)),
            Step::Tick(secs) => {
                for _ in 0..secs {
                    now = advance(now, 1)?;
                    if session.sources().is_active(SourceKind::Tick) {
                        console::print_events(&session.on_tick(now));
                    }
                }
            }
            Step::Advance(secs) => now = advance(now, secs)?,
            Step::Pulse => {
                if session.sources().is_active(SourceKind::Pulse) {
                    session.on_pulse();
                }
            }
        }
        if session.exit_requested() {
            break;
        }
    }

    console::print_snapshot(&session.snapshot());
    Ok(())
}

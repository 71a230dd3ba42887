//! Live terminal host.
//!
//! One current-thread tokio runtime is the single event-loop context: it
//! receives interval firings and stdin intents and applies both to the
//! session in arrival order.

use chrono::Utc;
use restgate_core::{NotificationScheduler, Session, SessionClock, SourceSet, TokioIntervals};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::SessionArgs;
use crate::console::{self, ConsoleNotifier, TerminalBell};
use crate::intent::Intent;

pub fn run(args: SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.load_config()?;
    let session_config = args.session_config(&config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let (intervals, mut fires) = TokioIntervals::channel();
        let notifier = NotificationScheduler::new(ConsoleNotifier, TerminalBell { ring: true })
            .with_enabled(config.notifications.enabled);
        let mut session = Session::new(
            SessionClock::new(session_config, Utc::now()),
            notifier,
            SourceSet::new(intervals),
        );

        console::print_events(&session.start(Utc::now()));
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                Some(fire) = fires.recv() => {
                    console::print_events(&session.on_fire(fire, Utc::now()));
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match Intent::parse(&line) {
                        Ok(Some(Intent::Status)) => console::print_snapshot(&session.snapshot()),
                        Ok(Some(intent)) => {
                            tracing::debug!(?intent, "intent");
                            console::print_events(&intent.apply(&mut session, Utc::now()));
                        }
                        Ok(None) => {}
                        Err(e) => eprintln!("{e}"),
                    }
                }
            }
            if session.exit_requested() {
                break;
            }
        }

        console::print_snapshot(&session.snapshot());
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

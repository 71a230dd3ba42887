//! Terminal stand-ins for the notification service and the audio device.
//!
//! Both write JSON lines to stdout next to the session events, so a script
//! run shows exactly what would have reached the real collaborators.

use std::io::Write;

use restgate_core::{AlertId, AudioDevice, Event, NotificationService, NotifyError, SessionSnapshot};
use serde_json::json;

pub struct ConsoleNotifier;

impl NotificationService for ConsoleNotifier {
    fn schedule_alert(
        &mut self,
        id: AlertId,
        delay_secs: u64,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        print_line(&json!({
            "type": "alert_scheduled",
            "id": id,
            "delay_secs": delay_secs,
            "title": title,
            "body": body,
        }));
        Ok(())
    }

    fn cancel_all_pending(&mut self) -> Result<(), NotifyError> {
        print_line(&json!({ "type": "alerts_cancelled" }));
        Ok(())
    }
}

/// Prints a pulse marker and, when `ring` is set, the terminal bell on stderr.
pub struct TerminalBell {
    pub ring: bool,
}

impl AudioDevice for TerminalBell {
    fn play_alert_pulse(&mut self) -> Result<(), NotifyError> {
        print_line(&json!({ "type": "pulse" }));
        if self.ring {
            let mut stderr = std::io::stderr();
            stderr
                .write_all(b"\x07")
                .and_then(|()| stderr.flush())
                .map_err(|e| NotifyError::AudioUnavailable(e.to_string()))?;
        }
        Ok(())
    }
}

pub fn print_events(events: &[Event]) {
    for event in events {
        print_line(&json!(event));
    }
}

pub fn print_snapshot(snapshot: &SessionSnapshot) {
    let mut value = json!(snapshot);
    value["type"] = json!("snapshot");
    print_line(&value);
}

fn print_line(value: &serde_json::Value) {
    println!("{value}");
}

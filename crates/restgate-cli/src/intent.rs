//! Line-oriented user intents shared by `run` (stdin) and `simulate` (script).

use chrono::{DateTime, Utc};
use restgate_core::{
    AudioDevice, Event, IntervalScheduler, NotificationService, RestPromptChoice, Session,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Start,
    Restart,
    Reset,
    Left(bool),
    Right(bool),
    Background,
    Foreground,
    RestPrompt(RestPromptChoice),
    RestConfirm(bool),
    StartConfirm(bool),
    Status,
}

impl Intent {
    /// Parse one command line. Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let arg = words.next();
        if let Some(extra) = words.next() {
            return Err(format!("unexpected argument '{extra}' in '{line}'"));
        }

        let intent = match (command, arg) {
            ("start", None) => Intent::Start,
            ("restart", None) => Intent::Restart,
            ("reset", None) => Intent::Reset,
            ("left", Some(state)) => Intent::Left(parse_on_off(state)?),
            ("right", Some(state)) => Intent::Right(parse_on_off(state)?),
            ("bg", None) => Intent::Background,
            ("fg", None) => Intent::Foreground,
            ("prompt", Some("reset")) => Intent::RestPrompt(RestPromptChoice::Reset),
            ("prompt", Some("exit")) => Intent::RestPrompt(RestPromptChoice::Exit),
            ("confirm", Some(answer)) => Intent::RestConfirm(parse_yes_no(answer)?),
            ("start-confirm", Some(answer)) => Intent::StartConfirm(parse_yes_no(answer)?),
            ("status", None) => Intent::Status,
            _ => return Err(format!("unknown command '{line}'")),
        };
        Ok(Some(intent))
    }

    pub fn apply<N, A, S>(self, session: &mut Session<N, A, S>, now: DateTime<Utc>) -> Vec<Event>
    where
        N: NotificationService,
        A: AudioDevice,
        S: IntervalScheduler,
    {
        match self {
            Intent::Start => session.start(now),
            Intent::Restart => session.restart(now),
            Intent::Reset => session.reset_all(now),
            Intent::Left(held) => session.set_left(held, now),
            Intent::Right(held) => session.set_right(held, now),
            Intent::Background => session.on_background(now),
            Intent::Foreground => session.on_foreground(now),
            Intent::RestPrompt(choice) => session.resolve_rest_prompt(choice),
            Intent::RestConfirm(confirmed) => session.resolve_rest_confirmation(confirmed),
            Intent::StartConfirm(confirmed) => session.resolve_start_confirmation(confirmed, now),
            Intent::Status => Vec::new(),
        }
    }
}

fn parse_on_off(word: &str) -> Result<bool, String> {
    match word {
        "on" | "down" => Ok(true),
        "off" | "up" => Ok(false),
        other => Err(format!("expected on/off, got '{other}'")),
    }
}

fn parse_yes_no(word: &str) -> Result<bool, String> {
    match word {
        "yes" | "y" => Ok(true),
        "no" | "n" => Ok(false),
        other => Err(format!("expected yes/no, got '{other}'")),
    }
}

pub mod config;
pub mod run;
pub mod simulate;

use std::path::PathBuf;

use clap::Args;
use restgate_core::{Config, SessionConfig};

/// Session cadence overrides shared by `run` and `simulate`.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Config file to read instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Work duration in seconds
    #[arg(long)]
    pub work_secs: Option<u64>,
    /// Short break duration in seconds
    #[arg(long)]
    pub break_secs: Option<u64>,
    /// Long break duration in seconds
    #[arg(long)]
    pub long_break_secs: Option<u64>,
    /// Every Nth session is followed by a long break
    #[arg(long)]
    pub long_break_every: Option<u32>,
    /// Completed sessions before the rest prompt
    #[arg(long)]
    pub rest_prompt_at: Option<u32>,
}

impl SessionArgs {
    pub fn load_config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        Ok(match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load_or_default(),
        })
    }

    /// Config file values with command-line overrides on top.
    pub fn session_config(&self, config: &Config) -> Result<SessionConfig, Box<dyn std::error::Error>> {
        let base = config.session_config()?;
        let session = SessionConfig::new(
            self.work_secs.unwrap_or(base.work_duration_secs()),
            self.break_secs.unwrap_or(base.break_duration_secs()),
            self.long_break_secs.unwrap_or(base.long_break_duration_secs()),
            self.long_break_every.unwrap_or(base.long_break_every()),
            self.rest_prompt_at.unwrap_or(base.sessions_before_rest_prompt()),
        )?;
        Ok(session)
    }
}

mod config;

pub use config::{Config, NotificationsConfig, SessionSection};

use std::path::PathBuf;

/// Returns `~/.config/restgate[-dev]/` based on RESTGATE_ENV.
///
/// Set RESTGATE_ENV=dev to use a development config directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("RESTGATE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("restgate-dev")
    } else {
        base_dir.join("restgate")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

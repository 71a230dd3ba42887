use std::path::PathBuf;

use clap::Subcommand;
use restgate_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        key: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Set a config value
    Set {
        key: String,
        value: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List all config values
    List {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default config file location
    Path,
}

fn load(path: Option<&PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) if path.exists() => Ok(Config::load_from(path)?),
        Some(_) => Ok(Config::default()),
        None => Ok(Config::load()?),
    }
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key, config } => {
            let cfg = load(config.as_ref())?;
            match cfg.get(&key) {
                Some(val) => println!("{val}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value, config } => {
            let mut cfg = load(config.as_ref())?;
            cfg.set(&key, &value)?;
            cfg.session_config()?;
            match config {
                Some(path) => cfg.save_to(&path)?,
                None => cfg.save()?,
            }
            println!("{key} = {value}");
        }
        ConfigAction::List { config } => {
            let cfg = load(config.as_ref())?;
            for (key, value) in cfg.entries() {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
    }
    Ok(())
}

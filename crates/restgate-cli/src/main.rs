use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod console;
mod intent;

#[derive(Parser)]
#[command(name = "restgate", version, about = "Work/break timer with a two-hand break gate")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a live session in the terminal, reading intents from stdin
    Run {
        #[command(flatten)]
        session: commands::SessionArgs,
    },
    /// Replay a script against a virtual clock and print every event
    Simulate {
        #[command(flatten)]
        args: commands::simulate::SimulateArgs,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RESTGATE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { session } => commands::run::run(session),
        Commands::Simulate { args } => commands::simulate::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

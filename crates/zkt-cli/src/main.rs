//! # zkt CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zkt_cli::demo::{run_demo, DemoArgs};
use zkt_cli::inspect::{run_inspect, InspectArgs};
use zkt_cli::replay::{run_replay, ReplayArgs};

/// Anonymous threaded discussions over Semaphore-style membership proofs.
///
/// Replays transaction logs against the protocol core with the mock proof
/// system, runs a scripted demo, and inspects state snapshots.
#[derive(Parser, Debug)]
#[command(name = "zkt", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the reference discussion with mock identities.
    Demo(DemoArgs),

    /// Apply a transaction log to a fresh core.
    Replay(ReplayArgs),

    /// Summarize a state snapshot.
    Inspect(InspectArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let result = match cli.command {
        Commands::Demo(args) => run_demo(&args),
        Commands::Replay(args) => run_replay(&args),
        Commands::Inspect(args) => run_inspect(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

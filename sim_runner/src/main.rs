//! # Sim Runner
//!
//! Loads a YAML program configuration and drives [`sim_core`]'s engine,
//! writing one JSON object per cycle to stdout.
//!
//! # Usage
//!
//! ```bash
//! # Run exactly 100 cycles, ignoring cycle_time pacing
//! sim_runner --config program.yaml --cycles 100
//!
//! # Run paced in real time until Ctrl-C
//! sim_runner --config program.yaml --realtime
//!
//! # Verbose logging
//! sim_runner -c program.yaml --cycles 10 -v
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use clap::Parser;
use sim_core::prelude::*;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// sim_runner - drives a sim_core program and streams cycle snapshots
#[derive(Parser, Debug)]
#[command(name = "sim_runner")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Loads a program configuration and drives the simulation engine")]
#[command(long_about = None)]
struct Args {
    /// Path to the program configuration file (YAML)
    #[arg(short, long)]
    config: PathBuf,

    /// Run exactly this many cycles in Generator mode (no wall-clock pacing)
    #[arg(long, conflicts_with = "realtime")]
    cycles: Option<u64>,

    /// Run paced in real time, one cycle per cycle_time, until Ctrl-C
    #[arg(long)]
    realtime: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("sim_runner failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(&args);

    info!("sim_runner v{} starting...", env!("CARGO_PKG_VERSION"));

    let text = std::fs::read_to_string(&args.config)?;
    let mut engine = Engine::from_config(&text)?;

    if args.realtime {
        let cancel = Arc::new(AtomicBool::new(false));
        let handler_cancel = cancel.clone();
        ctrlc::set_handler(move || {
            info!("received shutdown signal");
            handler_cancel.store(true, Ordering::SeqCst);
        })?;

        let (tx, rx) = mpsc::channel();
        let printer = std::thread::spawn(move || {
            for snapshot in rx.iter() {
                print_snapshot(&snapshot);
            }
        });
        engine.run_realtime(&cancel, tx)?;
        printer.join().expect("printer thread panicked");
    } else {
        let cycles = args.cycles.unwrap_or(1);
        for snapshot in engine.run_generator(cycles)? {
            print_snapshot(&snapshot);
        }
    }

    info!("sim_runner shutdown complete");
    Ok(())
}

fn print_snapshot(snapshot: &Snapshot) {
    match serde_json::to_string(snapshot) {
        Ok(line) => println!("{line}"),
        Err(e) => error!("failed to serialize snapshot: {e}"),
    }
}

/// Setup tracing subscriber based on CLI arguments
fn setup_tracing(args: &Args) {
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

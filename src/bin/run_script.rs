//! Scene Script Runner
//!
//! Loads a JSON command script, executes every command against a fresh scene
//! and prints each result. A failing command is reported and the script keeps
//! going.
//!
//! Usage:
//!   cargo run --bin run_script -- [--settings settings.json] [--offline] script.json

use std::path::PathBuf;
use std::time::Instant;

use clap::{ArgAction, Parser};
use quaternions::commands::{load_script, run_script};
use quaternions::config::Settings;
use quaternions::tle::{StaticFetcher, TleFetcher};
use quaternions::Scene;

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Scene Script Runner
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Executes a JSON command script against a fresh scene",
    long_about = None
)]
struct Args {
    /// Settings file (JSON); defaults are used when omitted
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Never fetch TLEs over the network
    #[arg(long, action = ArgAction::SetTrue)]
    offline: bool,

    /// Print the scene contents after the script finishes
    #[arg(short, long, action = ArgAction::SetTrue)]
    dump: bool,

    /// Command script to execute
    script: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load_or_default(args.settings.as_ref())?;
    let commands = load_script(&args.script)?;
    let mut scene = Scene::from_settings(&settings)?;

    let fetcher: Box<dyn TleFetcher> = if args.offline {
        Box::new(StaticFetcher::new())
    } else if settings.disk_cache {
        Box::new(settings.cached_fetcher())
    } else {
        Box::new(settings.celestrak_fetcher())
    };

    println!(
        "Running {} commands from {}",
        commands.len(),
        args.script.display()
    );

    let start = Instant::now();
    let results = run_script(&mut scene, &commands, fetcher.as_ref());

    let mut failures = 0;
    for step in &results {
        match &step.result {
            Ok(output) => println!("[{:>3}] {:<22} {}", step.index, step.command, output),
            Err(error) => {
                failures += 1;
                println!("[{:>3}] {:<22} ERROR: {}", step.index, step.command, error);
            }
        }
    }

    println!(
        "\n{} commands, {} failed, {:.2?} elapsed",
        results.len(),
        failures,
        start.elapsed()
    );

    if args.dump {
        println!("\nPoints:");
        for (name, point) in scene.points() {
            println!("  {:<16} {}", name, point);
        }
        println!("Lines:");
        for (name, line) in scene.lines() {
            println!("  {:<16} {:?} -> {:?}", name, line.start, line.end);
        }
        println!("Clock: {}", scene.clock());
    }

    Ok(())
}

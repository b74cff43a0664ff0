//! CLI frontend for the CircleWorld cell simulation.

mod commands;
mod scene;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cw",
    about = "CircleWorld: soft-bodied organisms that collide, merge, eat, and reproduce",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed a random scene and run the simulation
    Simulate {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "100")]
        ticks: u64,

        /// RNG seed for the initial scene
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Number of organisms to seed
        #[arg(short, long, default_value = "8")]
        organisms: usize,

        /// Number of food cells to scatter
        #[arg(short, long, default_value = "40")]
        food: usize,

        /// JSON configuration file (missing fields take defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show all events (not just summary)
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the default configuration as JSON
    Config,
}

/// Send diagnostics to stderr, filtered by `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            ticks,
            seed,
            organisms,
            food,
            config,
            verbose,
        } => commands::simulate::run(&commands::simulate::SimulateArgs {
            ticks,
            seed,
            organisms,
            food,
            config,
            verbose,
        }),
        Commands::Config => commands::config::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

//! LaneMap CLI - Command-line interface
//!
//! Renders lane-level road overlay tiles with the `lanemap` library.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::render::RenderArgs;

#[derive(Parser)]
#[command(name = "lanemap")]
#[command(version = lanemap::VERSION)]
#[command(about = "Render lane-level road overlay tiles from OpenStreetMap data", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ~/.lanemap/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one tile to a PNG file
    Render {
        /// Zoom level (must be at or above the cache base zoom)
        zoom: u8,

        /// Tile column
        x: u32,

        /// Tile row
        y: u32,

        /// Output file path (defaults to <zoom>_<x>_<y>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration and where it was loaded from
    Config,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render { zoom, x, y, output } => commands::render::run(RenderArgs {
            zoom,
            x,
            y,
            output,
            config: cli.config,
        }),
        Commands::Config => commands::config::run(cli.config),
    };

    if let Err(e) = result {
        e.exit();
    }
}

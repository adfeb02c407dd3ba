//! TrackAlign command-line aligner
//!
//! Synchronizes drifted media tracks and keyframe-aligns cut lists using
//! already-extracted track metadata.
//!
//! # Usage
//!
//! ```bash
//! aligner align --tracks tracks.json --json
//! aligner optimize --cuts 3.4,6.7,9.9 --keyframes 0,3.3,5,10 --min-segment 1
//! aligner snap --value 3.43 --keyframes 0,3.33,5 --threshold 0.2
//! aligner analyze --keyframes 0,2,4,6,8 --cuts 2.05,5 --fps 25
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use trackalign::adapters::tracing_log::{init_logging, LogLevel};
use trackalign::cli::{commands, Cli, Commands};

/// Main entry point for the TrackAlign CLI application
fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    let level: LogLevel = cli.log_level.parse()?;
    init_logging(level, cli.log_json);

    let threads = cli.threads.unwrap_or_else(num_cpus::get).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to initialize worker pool")?;
    debug!("Using {} worker threads", threads);

    info!("Starting TrackAlign");

    // Execute the requested command
    match cli.command {
        Commands::Align(args) => {
            info!("Executing align command");
            commands::align(args)?;
        }
        Commands::Optimize(args) => {
            info!("Executing optimize command");
            commands::optimize(args)?;
        }
        Commands::Snap(args) => {
            info!("Executing snap command");
            commands::snap(args)?;
        }
        Commands::Analyze(args) => {
            info!("Executing analyze command");
            commands::analyze(args)?;
        }
    }

    info!("TrackAlign completed successfully");
    Ok(())
}

//! Binary crate for the `weatherclock` terminal clock.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Driving the weather pipeline (startup, periodic, manual)
//! - Rendering the clock face

use clap::Parser;

mod cli;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Some(log_path) = logging::init() {
        tracing::debug!(path = %log_path.display(), "logging to file");
    }
    let cmd = cli::Cli::parse();
    cmd.run().await
}

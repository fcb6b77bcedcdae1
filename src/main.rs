//! Clean Music Locator
//!
//! Finds music in a library that is a clean edit when an explicit version of
//! the recording exists.
//!
//! # Usage
//!
//! ```bash
//! clean-locator ~/Music --sleep 500 --token "$CATALOG_TOKEN"
//! clean-locator ~/Music --output json --db library.db
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use clean_locator::cli::{commands, Cli};

/// Main entry point for the Clean Locator CLI application
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if commands::audit(cli).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

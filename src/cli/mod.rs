//! CLI module for Clean Locator
//!
//! This module handles command-line argument parsing and command execution.

use clap::Parser;

pub mod args;
pub mod commands;

/// Clean Music Locator
///
/// Finds music in your library that is a clean edit when an explicit
/// version of the recording exists.
#[derive(Parser, Debug)]
#[command(name = "clean-locator")]
#[command(
    about = "Clean Music Locator finds music in your library that are clean when an explicit version exists"
)]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub audit: args::AuditArgs,

    #[command(flatten)]
    pub log: args::LogArgs,
}

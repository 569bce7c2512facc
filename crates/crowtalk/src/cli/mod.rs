//! Command-line interface for crowtalk.
//!
//! This module provides the CLI structure and command handlers for the
//! `crowtalk` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CategoriesCommand, ConfigCommand, ExportCommand, LogCommand, RecordCommand, SoundsCommand,
    StatusCommand, SuggestCommand,
};

/// crowtalk - Offline field companion for corvid vocalizations
///
/// Builds the unified sound catalog, logs playback/response pairs, and
/// suggests what to play next based on the communication guide.
#[derive(Debug, Parser)]
#[command(name = "crowtalk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the ordered sound catalog
    Sounds(SoundsCommand),

    /// List the vocalization categories
    Categories(CategoriesCommand),

    /// Log a playback and the crow's response
    Log(LogCommand),

    /// Suggest what to play next
    Suggest(SuggestCommand),

    /// Manage field recording metadata
    #[command(subcommand)]
    Record(RecordCommand),

    /// Export all data as JSON
    Export(ExportCommand),

    /// Show database and session status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

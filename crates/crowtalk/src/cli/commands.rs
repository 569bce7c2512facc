//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Sounds command arguments.
#[derive(Debug, Args)]
pub struct SoundsCommand {
    /// Viewer latitude for distance sorting (overrides configured home position)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Viewer longitude for distance sorting
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Categories command arguments.
#[derive(Debug, Args)]
pub struct CategoriesCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Log command arguments.
#[derive(Debug, Args)]
pub struct LogCommand {
    /// Category code that was played (e.g. "kontaktrop")
    pub category: String,

    /// Observed response tag (e.g. "approached", "ignored", "fled")
    pub response: String,
}

/// Suggest command arguments.
#[derive(Debug, Args)]
pub struct SuggestCommand {
    /// Category code that was played
    pub category: String,

    /// Observed response tag
    pub response: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Field recording commands.
#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    /// Register a field recording's metadata
    Add {
        /// Opaque audio handle (e.g. a file path)
        #[arg(long)]
        audio: String,

        /// Category code
        #[arg(long, default_value = "")]
        category: String,

        /// Phonetic rendering of the call
        #[arg(long, default_value = "")]
        phonetic: String,

        /// Free-text interpretation
        #[arg(long, default_value = "")]
        interpretation: String,

        /// Observed response tag
        #[arg(long, default_value = "")]
        response: String,

        /// Place name
        #[arg(long, default_value = "")]
        place: String,

        /// Free-text notes
        #[arg(long, default_value = "")]
        notes: String,

        /// GPS latitude
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// GPS longitude
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// GPS accuracy in meters
        #[arg(long, default_value = "0")]
        acc: u32,

        /// Recording length in seconds
        #[arg(long, default_value = "0")]
        duration: f64,
    },

    /// List stored recordings
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Delete a recording by id
    Delete {
        /// Row id as shown by `record list`
        id: i64,
    },
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Write the export to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

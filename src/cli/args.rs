//! Command-line argument definitions for the `toa5` tool
//!
//! This module defines the CLI interface using the clap derive API.

use crate::config::{NameStyle, ReadConfig};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Inspect and convert TOA5 data logger files
#[derive(Debug, Clone, Parser)]
#[command(
    name = "toa5",
    version,
    about = "Inspect and convert TOA5 data logger files",
    long_about = "Reads the four-row header of TOA5 files written by Campbell Scientific data \
                  loggers, and converts them to plain CSV files with a single header row of \
                  friendly or SQL-safe column names."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert a TOA5 file to CSV with a single header row
    ToCsv(ToCsvArgs),
    /// Show the environment line and column headers of a TOA5 file
    Header(HeaderArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct ToCsvArgs {
    /// TOA5 file to read
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output CSV file (standard output when omitted)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Use SQL-safe column names instead of friendly ones
    #[arg(short = 's', long = "sql")]
    pub sql: bool,

    /// Accept duplicate column names in the TOA5 header
    #[arg(short = 'd', long = "allow-dupes")]
    pub allow_dupes: bool,

    /// Allow '/', '[' and ']' in column names and skip the field checks
    #[arg(short = 'l', long = "lenient")]
    pub lenient: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct HeaderArgs {
    /// TOA5 file to read
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Accept duplicate column names in the TOA5 header
    #[arg(short = 'd', long = "allow-dupes")]
    pub allow_dupes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Args {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

impl ToCsvArgs {
    pub fn read_config(&self) -> ReadConfig {
        let names = if self.sql {
            NameStyle::Sql
        } else {
            NameStyle::Friendly
        };
        ReadConfig::default()
            .with_names(names)
            .with_duplicate_names(self.allow_dupes)
            .with_strict(!self.lenient)
    }
}

//! CLI subcommand definitions and handlers.
//!
//! - `recon scan --targets <file>` - scan every target against a port set

mod scan;

pub use scan::{ScanCommand, ScanOptions};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// recon - network reconnaissance over TCP connect scans.
///
/// Probes every host in a target file against a set of ports with a
/// bounded pool of concurrent workers, retrying timeouts with exponential
/// backoff, and writes the results as JSON and CSV.
#[derive(Parser, Debug)]
#[command(name = "recon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Recon tool for network reconnaissance", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a settings file (defaults to the XDG config directory)
    #[arg(long, global = true, value_name = "PATH", env = "RECON_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan targets for open ports
    #[command(alias = "s")]
    Scan(ScanCommand),
}

//! # recon - concurrent TCP reconnaissance
//!
//! Given a list of hosts and a port specification, recon probes every
//! (host, port) pair with a TCP connect, classifies the outcome as `open`,
//! `closed`, `filtered_timeout` or `error`, and writes the results as JSON
//! and CSV.
//!
//! ## Features
//!
//! - **Bounded concurrency**: at most `workers` probes in flight
//! - **Retry with backoff**: timeouts and unreachable routes are retried with
//!   exponential backoff; refusals and unexpected errors are not
//! - **Forgiving input**: malformed port tokens and target lines are reported
//!   and skipped
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use recon::scanner::{NoProgress, PortProbe, ProbeConfig, ScanScheduler};
//! use recon::types::PortSet;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let probe = PortProbe::tcp(ProbeConfig::new(Duration::from_secs(1), 2));
//!     let scheduler = ScanScheduler::new(Arc::new(probe), 20);
//!
//!     let targets = vec!["192.168.1.1".to_string()];
//!     let results = scheduler.run(&targets, &PortSet::parse("22,80,443"), &NoProgress).await;
//!
//!     for r in results {
//!         println!("{}:{} is {}", r.host, r.port, r.status);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - ports, port-spec parsing and target lists
//! - [`scanner`] - probe state machine, scheduler and TCP connector
//! - [`aggregate`] - summary counts over finished results
//! - [`output`] - JSON/CSV writers and console summary
//! - [`config`] - settings file with command defaults
//! - [`report`] - injectable log sink
//! - [`error`] - error types

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use aggregate::{ResultAggregator, ScanReport, ScanSummary};
pub use error::{CliError, ScanError};
pub use scanner::{PortProbe, Probe, ScanResult, ScanScheduler, ScanStatus, ScanTask};
pub use types::{parse_port_spec, Port, PortSet, TargetList};

//! Error types for recon.
//!
//! Uses `thiserror` for ergonomic error definitions. Network failures never
//! escape a probe: they are classified into a [`ScanStatus`](crate::scanner::ScanStatus)
//! instead. Only the process-level errors below end a run.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single connection attempt.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("connection to {target}:{port} failed: {reason}")]
    ConnectionFailed {
        target: String,
        port: u16,
        reason: String,
    },

    #[error("Connection timed out")]
    Timeout,

    #[error("Connection refused")]
    ConnectionRefused,

    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("Host unreachable")]
    HostUnreachable,

    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),
}

/// How the probe reacts to a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The peer actively refused the connection.
    Refused,
    /// Timeout or missing route; worth another attempt.
    Transient,
    /// Anything else. Never retried.
    Unexpected,
}

impl ScanError {
    /// Classify this failure for the probe state machine.
    pub fn class(&self) -> FailureClass {
        match self {
            Self::ConnectionRefused => FailureClass::Refused,
            Self::Timeout | Self::HostUnreachable | Self::NetworkUnreachable(_) => {
                FailureClass::Transient
            }
            Self::ConnectionFailed { .. } | Self::DnsResolution(_) => {
                FailureClass::Unexpected
            }
        }
    }
}

/// Errors raised while loading the target list.
#[derive(Error, Debug)]
pub enum TargetError {
    #[error("target file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read target file {}: {reason}", path.display())]
    ReadFailed { path: PathBuf, reason: String },
}

/// Errors raised while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("settings file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {reason}", path.display())]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),
}

/// Errors raised by the result writers.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Process-level errors. Any of these ends the run with a nonzero exit code.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for connection attempts.
pub type ScanAttempt<T> = Result<T, ScanError>;

pub type CliResult<T> = Result<T, CliError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type OutputResult<T> = Result<T, OutputError>;

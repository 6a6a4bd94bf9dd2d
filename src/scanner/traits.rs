//! Scanner data types and trait abstractions.
//!
//! The probe talks to the network only through [`Connector`] and waits only
//! through [`Sleeper`], so the retry logic can be driven by scripted fakes.
//! The scheduler only knows about [`Probe`].

use crate::error::ScanAttempt;
use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Terminal state of a probed (host, port) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// The TCP handshake completed.
    Open,
    /// The peer actively refused the connection.
    Closed,
    /// No answer or no route within every attempt.
    FilteredTimeout,
    /// Resolution failure or an unexpected socket error.
    Error,
}

impl ScanStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::FilteredTimeout => "filtered_timeout",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work: a host and a port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanTask {
    pub host: String,
    pub port: Port,
}

impl ScanTask {
    pub fn new(host: impl Into<String>, port: Port) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ScanTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// HTTP metadata. Reserved; no probe fills it in yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpInfo {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub server: Option<String>,
}

/// TLS certificate metadata. Reserved; no probe fills it in yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsInfo {
    pub subject: Option<String>,
    pub issuer: Option<String>,
    pub not_after: Option<String>,
}

/// Outcome of probing a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub host: String,
    pub port: Port,
    pub status: ScanStatus,
    /// Elapsed time of the last connection attempt.
    pub duration_ms: Option<u64>,
    /// Only set when the port is open.
    pub service_hint: Option<String>,
    pub banner: Option<String>,
    pub http: Option<HttpInfo>,
    pub tls: Option<TlsInfo>,
}

impl ScanResult {
    /// Create a result for `task` with no timing or hint.
    pub fn new(task: &ScanTask, status: ScanStatus) -> Self {
        Self {
            host: task.host.clone(),
            port: task.port,
            status,
            duration_ms: None,
            service_hint: None,
            banner: None,
            http: None,
            tls: None,
        }
    }

    /// Set the elapsed time of the last attempt.
    pub fn with_duration(mut self, duration_ms: Option<u64>) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Set the service hint.
    pub fn with_service_hint(mut self, hint: impl Into<String>) -> Self {
        self.service_hint = Some(hint.into());
        self
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.status == ScanStatus::Open
    }
}

/// Per-probe tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Bound on each connection attempt.
    pub timeout: Duration,
    /// Total attempts for transient failures, at least 1.
    pub max_attempts: u32,
    /// Backoff before retry `n` is `backoff_unit * 2^n`.
    pub backoff_unit: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_attempts: 1,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl ProbeConfig {
    pub fn new(timeout: Duration, max_attempts: u32) -> Self {
        Self {
            timeout,
            max_attempts,
            ..Self::default()
        }
    }

    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }
}

/// Opens one TCP connection and reports how it went.
///
/// Implementations must release the socket before returning.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, host: &str, port: u16, timeout: Duration) -> ScanAttempt<()>;
}

/// Suspends the calling task between retries.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Something that turns a task into a result.
///
/// This is the seam the scheduler dispatches through.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, task: &ScanTask) -> ScanResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(ScanStatus::Open.to_string(), "open");
        assert_eq!(ScanStatus::Closed.to_string(), "closed");
        assert_eq!(ScanStatus::FilteredTimeout.to_string(), "filtered_timeout");
        assert_eq!(ScanStatus::Error.to_string(), "error");
    }

    #[test]
    fn test_result_json_shape() {
        let task = ScanTask::new("127.0.0.1", Port::new(80).unwrap());
        let result = ScanResult::new(&task, ScanStatus::Open)
            .with_duration(Some(3))
            .with_service_hint("http");

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["host"], "127.0.0.1");
        assert_eq!(value["port"], 80);
        assert_eq!(value["status"], "open");
        assert_eq!(value["duration_ms"], 3);
        assert_eq!(value["service_hint"], "http");
        assert!(value["banner"].is_null());
        assert!(value["http"].is_null());
        assert!(value["tls"].is_null());
    }

    #[test]
    fn test_filtered_status_serializes_snake_case() {
        let json = serde_json::to_string(&ScanStatus::FilteredTimeout).unwrap();
        assert_eq!(json, "\"filtered_timeout\"");
    }

    #[test]
    fn test_task_display() {
        let port = Port::new(443).unwrap();
        assert_eq!(ScanTask::new("example.com", port).to_string(), "example.com:443");
        assert_eq!(ScanTask::new("::1", port).to_string(), "[::1]:443");
    }
}

//! Per-task probe: connect, classify, retry with exponential backoff.
//!
//! The decision logic lives in [`ProbeMachine`], a plain state machine with
//! no I/O. [`PortProbe`] drives it with a [`Connector`] and a [`Sleeper`].
//!
//! ```text
//! Connecting(n) --ok------------------------------> Finished(Open)
//!               --refused-------------------------> Finished(Closed)
//!               --timeout/unreachable, n+1 < max--> Backoff(n) --> Connecting(n+1)
//!               --timeout/unreachable, n+1 = max--> Finished(FilteredTimeout)
//!               --anything else-------------------> Finished(Error)
//! ```

use crate::error::{FailureClass, ScanAttempt};
use crate::scanner::tcp::TcpConnector;
use crate::scanner::traits::{
    Connector, Probe, ProbeConfig, ScanResult, ScanStatus, ScanTask, Sleeper, TokioSleeper,
};
use crate::services::service_hint;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Where a probe currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// About to run attempt `attempt` (0-based).
    Connecting { attempt: u32 },
    /// Attempt `attempt` failed transiently; wait `delay` before the next one.
    Backoff { attempt: u32, delay: Duration },
    /// Terminal.
    Finished(ScanStatus),
}

/// Retry/classification state machine for one (host, port).
#[derive(Debug, Clone)]
pub struct ProbeMachine {
    state: ProbeState,
    max_attempts: u32,
    backoff_unit: Duration,
}

impl ProbeMachine {
    /// `max_attempts` below 1 is treated as 1.
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            state: ProbeState::Connecting { attempt: 0 },
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, ProbeState::Finished(_))
    }

    /// Backoff before the attempt following `attempt`: `unit * 2^attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(factor)
    }

    /// Feed the outcome of the current connection attempt.
    ///
    /// Ignored unless the machine is in `Connecting`.
    pub fn on_attempt<T>(&mut self, outcome: &ScanAttempt<T>) -> ProbeState {
        let ProbeState::Connecting { attempt } = self.state else {
            return self.state;
        };

        self.state = match outcome {
            Ok(_) => ProbeState::Finished(ScanStatus::Open),
            Err(e) => match e.class() {
                FailureClass::Refused => ProbeState::Finished(ScanStatus::Closed),
                FailureClass::Unexpected => ProbeState::Finished(ScanStatus::Error),
                FailureClass::Transient if attempt + 1 < self.max_attempts => ProbeState::Backoff {
                    attempt,
                    delay: self.backoff_for(attempt),
                },
                FailureClass::Transient => ProbeState::Finished(ScanStatus::FilteredTimeout),
            },
        };
        self.state
    }

    /// The backoff interval has passed.
    pub fn on_backoff_elapsed(&mut self) -> ProbeState {
        if let ProbeState::Backoff { attempt, .. } = self.state {
            self.state = ProbeState::Connecting {
                attempt: attempt + 1,
            };
        }
        self.state
    }
}

/// Bounded-retry TCP reachability check.
pub struct PortProbe {
    connector: Arc<dyn Connector>,
    sleeper: Arc<dyn Sleeper>,
    config: ProbeConfig,
}

impl PortProbe {
    /// Probe over real TCP sockets and the tokio timer.
    pub fn tcp(config: ProbeConfig) -> Self {
        Self::new(Arc::new(TcpConnector::new()), Arc::new(TokioSleeper), config)
    }

    pub fn new(connector: Arc<dyn Connector>, sleeper: Arc<dyn Sleeper>, config: ProbeConfig) -> Self {
        Self {
            connector,
            sleeper,
            config,
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Run the state machine for one task until it reaches a terminal state.
    pub async fn run(&self, task: &ScanTask) -> ScanResult {
        let port = task.port.as_u16();
        let mut machine = ProbeMachine::new(self.config.max_attempts, self.config.backoff_unit);
        let mut last_duration_ms = None;

        loop {
            match machine.state() {
                ProbeState::Connecting { attempt } => {
                    let start = Instant::now();
                    let outcome = self
                        .connector
                        .connect(&task.host, port, self.config.timeout)
                        .await;
                    last_duration_ms = Some(start.elapsed().as_millis() as u64);

                    if let Err(ref e) = outcome {
                        tracing::debug!(%task, attempt, error = %e, "connection attempt failed");
                    }
                    machine.on_attempt(&outcome);
                }
                ProbeState::Backoff { attempt, delay } => {
                    tracing::debug!(%task, attempt, ?delay, "backing off before retry");
                    self.sleeper.sleep(delay).await;
                    machine.on_backoff_elapsed();
                }
                ProbeState::Finished(status) => {
                    let result = ScanResult::new(task, status).with_duration(last_duration_ms);
                    return match status {
                        ScanStatus::Open => result.with_service_hint(service_hint(port)),
                        _ => result,
                    };
                }
            }
        }
    }
}

#[async_trait]
impl Probe for PortProbe {
    async fn probe(&self, task: &ScanTask) -> ScanResult {
        self.run(task).await
    }
}

//! Scanner module - the concurrent scan engine.
//!
//! - [`probe`]: per-task connect/classify/retry state machine
//! - [`scheduler`]: bounded worker pool over `targets × ports`
//! - [`tcp`]: the real socket connector
//! - [`progress`]: observers for completion counts

pub mod probe;
pub mod progress;
pub mod scheduler;
pub mod tcp;
pub mod traits;

pub use probe::{PortProbe, ProbeMachine, ProbeState};
pub use progress::{BarProgress, LogProgress, NoProgress, ProgressObserver};
pub use scheduler::{build_tasks, ScanScheduler, PROGRESS_INTERVAL};
pub use tcp::TcpConnector;
pub use traits::{
    Connector, HttpInfo, Probe, ProbeConfig, ScanResult, ScanStatus, ScanTask, Sleeper, TlsInfo,
    TokioSleeper,
};

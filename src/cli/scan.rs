//! Scan subcommand implementation.
//!
//! Handles `recon scan --targets <file>`: loads targets, parses ports, runs
//! the scheduler and hands the aggregated results to the writers.

use crate::aggregate::{ResultAggregator, ScanReport};
use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use crate::output;
use crate::report::{Reporter, TracingReporter};
use crate::scanner::{
    BarProgress, LogProgress, PortProbe, ProbeConfig, ProgressObserver, ScanScheduler,
};
use crate::types::{parse_port_spec, TargetList};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Scan every target in a file against a set of ports.
#[derive(Parser, Debug, Default)]
pub struct ScanCommand {
    /// Path to file (one host per line; host or host:port, the port is ignored)
    #[arg(long, value_name = "PATH")]
    pub targets: PathBuf,

    /// Comma list or ranges (e.g., 80,443,8000-8100) [default: 80,443]
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Concurrent TCP workers [default: 20]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub workers: Option<u32>,

    /// Per-connection timeout in seconds, fractions allowed [default: 5.0]
    #[arg(short, long)]
    pub timeout: Option<f64>,

    /// Connection attempts per port for timeouts and unreachable hosts [default: 1]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub retry: Option<u32>,

    /// Path prefix; writes PREFIX.results.json and PREFIX.results.csv [default: recon_results]
    #[arg(short, long, value_name = "PREFIX")]
    pub output: Option<String>,

    /// Resume a previous scan (not supported yet)
    #[arg(long)]
    pub resume: bool,

    /// Probe HTTP(S) services for title, meta description and Server header (not supported yet)
    #[arg(long)]
    pub http: bool,

    /// Retrieve TLS certificates from TLS ports (not supported yet)
    #[arg(long)]
    pub tls: bool,
}

/// Fully resolved scan parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub ports: String,
    pub workers: usize,
    pub probe: ProbeConfig,
    pub output: String,
}

impl ScanCommand {
    /// Merge command-line flags over `settings`.
    pub fn options(&self, settings: &AppSettings) -> CliResult<ScanOptions> {
        let timeout_secs = self.timeout.unwrap_or(settings.default_timeout_secs);
        if !timeout_secs.is_finite() || timeout_secs <= 0.0 {
            return Err(CliError::InvalidArgument(format!(
                "timeout must be a positive number of seconds, got {}",
                timeout_secs
            )));
        }

        let timeout = Duration::try_from_secs_f64(timeout_secs).map_err(|_| {
            CliError::InvalidArgument(format!("timeout of {} seconds is too large", timeout_secs))
        })?;

        let workers = self
            .workers
            .map(|w| w as usize)
            .unwrap_or(settings.default_workers)
            .max(1);

        let probe = ProbeConfig::new(
            timeout,
            self.retry.unwrap_or(settings.default_retry).max(1),
        )
        .with_backoff_unit(Duration::from_millis(settings.backoff_unit_ms));

        Ok(ScanOptions {
            ports: self
                .ports
                .clone()
                .unwrap_or_else(|| settings.default_ports.clone()),
            workers,
            probe,
            output: self
                .output
                .clone()
                .unwrap_or_else(|| settings.default_output.clone()),
        })
    }

    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings) -> CliResult<ScanReport> {
        let reporter: Arc<dyn Reporter> = Arc::new(TracingReporter);
        let options = self.options(settings)?;

        // Fatal before any scanning if the file is missing.
        let targets = TargetList::load(&self.targets, reporter.as_ref())?;
        let ports = parse_port_spec(&options.ports, reporter.as_ref());
        if ports.is_empty() {
            return Err(CliError::InvalidArgument(format!(
                "no valid ports in '{}'",
                options.ports
            )));
        }
        if targets.is_empty() {
            reporter.warn(&format!(
                "no targets found in {}",
                self.targets.display()
            ));
        }

        tracing::info!(
            "Loaded {} targets and {} ports to scan.",
            targets.len(),
            ports.len()
        );
        self.note_unsupported_flags(reporter.as_ref());

        output::print_scan_header(targets.len(), ports.len(), options.workers);

        let probe = Arc::new(PortProbe::tcp(options.probe));
        let scheduler =
            ScanScheduler::new(probe, options.workers).with_reporter(Arc::clone(&reporter));
        let progress: Box<dyn ProgressObserver> = if console::Term::stderr().is_term() {
            Box::new(BarProgress::new())
        } else {
            Box::new(LogProgress::new(Arc::clone(&reporter)))
        };

        tracing::info!("Scan started at {}", Utc::now().to_rfc3339());
        let started = Instant::now();
        let results = scheduler
            .run(targets.hosts(), &ports, progress.as_ref())
            .await;
        let elapsed = started.elapsed();

        let report = ResultAggregator::aggregate(results);

        output::print_summary(&report, elapsed).map_err(|source| {
            crate::error::OutputError::WriteFailed {
                path: PathBuf::from("<stdout>"),
                source,
            }
        })?;
        tracing::info!("Found {} open services.", report.summary.open_count);

        let paths = output::write_results(&options.output, &report.results)?;
        output::print_success(&format!(
            "Results written to {} and {}",
            paths.json.display(),
            paths.csv.display()
        ));

        Ok(report)
    }

    fn note_unsupported_flags(&self, reporter: &dyn Reporter) {
        if self.resume {
            reporter.warn("--resume is not supported yet; starting a fresh scan");
        }
        if self.http {
            reporter.warn("--http is not supported yet; the http field stays null");
        }
        if self.tls {
            reporter.warn("--tls is not supported yet; the tls field stays null");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Level, MemoryReporter};

    fn command() -> ScanCommand {
        ScanCommand {
            targets: PathBuf::from("targets.txt"),
            ..ScanCommand::default()
        }
    }

    #[test]
    fn test_defaults_come_from_settings() {
        let options = command().options(&AppSettings::default()).unwrap();
        assert_eq!(options.ports, "80,443");
        assert_eq!(options.workers, 20);
        assert_eq!(options.probe.timeout, Duration::from_secs(5));
        assert_eq!(options.probe.max_attempts, 1);
        assert_eq!(options.probe.backoff_unit, Duration::from_secs(1));
        assert_eq!(options.output, "recon_results");
    }

    #[test]
    fn test_flags_override_settings() {
        let cmd = ScanCommand {
            ports: Some("22".into()),
            workers: Some(3),
            timeout: Some(0.25),
            retry: Some(4),
            output: Some("lab".into()),
            ..command()
        };
        let options = cmd.options(&AppSettings::default()).unwrap();
        assert_eq!(options.ports, "22");
        assert_eq!(options.workers, 3);
        assert_eq!(options.probe.timeout, Duration::from_millis(250));
        assert_eq!(options.probe.max_attempts, 4);
        assert_eq!(options.output, "lab");
    }

    #[test]
    fn test_rejects_bad_timeout() {
        let cmd = ScanCommand {
            timeout: Some(0.0),
            ..command()
        };
        assert!(matches!(
            cmd.options(&AppSettings::default()),
            Err(CliError::InvalidArgument(_))
        ));

        let cmd = ScanCommand {
            timeout: Some(1e30),
            ..command()
        };
        assert!(cmd.options(&AppSettings::default()).is_err());
    }

    #[test]
    fn test_zero_workers_in_settings_clamped() {
        let settings = AppSettings {
            default_workers: 0,
            default_retry: 0,
            ..AppSettings::default()
        };
        let options = command().options(&settings).unwrap();
        assert_eq!(options.workers, 1);
        assert_eq!(options.probe.max_attempts, 1);
    }

    #[test]
    fn test_unsupported_flags_warn() {
        let cmd = ScanCommand {
            resume: true,
            http: true,
            tls: true,
            ..command()
        };
        let reporter = MemoryReporter::new();
        cmd.note_unsupported_flags(&reporter);
        assert_eq!(reporter.messages(Level::Warn).len(), 3);
    }

    #[tokio::test]
    async fn test_missing_target_file_is_fatal() {
        let cmd = ScanCommand {
            targets: PathBuf::from("/nonexistent/recon-targets.txt"),
            ..command()
        };
        let err = cmd.execute(&AppSettings::default()).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Target(crate::error::TargetError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_execute_scans_loopback_and_writes_results() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let dir = tempfile::tempdir().unwrap();
        let targets = dir.path().join("targets.txt");
        std::fs::write(&targets, "# lab\n127.0.0.1\n127.0.0.1:22\n").unwrap();
        let prefix = dir.path().join("lab");

        let cmd = ScanCommand {
            targets,
            ports: Some(port.to_string()),
            workers: Some(1),
            timeout: Some(1.0),
            output: Some(prefix.to_string_lossy().into_owned()),
            ..ScanCommand::default()
        };
        let report = cmd.execute(&AppSettings::default()).await.unwrap();

        assert_eq!(report.summary.total, 1);
        assert_eq!(report.summary.open_count, 1);
        assert!(dir.path().join("lab.results.json").exists());
        assert!(dir.path().join("lab.results.csv").exists());
    }

    #[test]
    fn test_parses_from_args() {
        let cmd = ScanCommand::try_parse_from([
            "scan",
            "--targets",
            "hosts.txt",
            "--ports",
            "80,8000-8002",
            "--workers",
            "5",
            "--timeout",
            "1.5",
            "--retry",
            "3",
            "--http",
        ])
        .unwrap();
        assert_eq!(cmd.targets, PathBuf::from("hosts.txt"));
        assert_eq!(cmd.workers, Some(5));
        assert_eq!(cmd.timeout, Some(1.5));
        assert!(cmd.http);
        assert!(!cmd.resume);

        assert!(ScanCommand::try_parse_from(["scan", "--targets", "h", "--workers", "0"]).is_err());
    }
}

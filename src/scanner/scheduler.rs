//! Bounded-concurrency dispatch of scan tasks.
//!
//! Tasks are enumerated targets-outer, ports-inner, so `hosts = [a, b]` and
//! `ports = [22, 80]` dispatch `a:22, a:80, b:22, b:80`. Each task runs on its
//! own tokio task; a semaphore caps how many probes run at once and the
//! spawned handles are fanned back in through a `buffer_unordered` stream,
//! which is the only place results are collected.

use crate::report::{Reporter, TracingReporter};
use crate::scanner::progress::ProgressObserver;
use crate::scanner::traits::{Probe, ScanResult, ScanTask};
use crate::types::PortSet;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Progress is signalled every this many completions, and at the last one.
pub const PROGRESS_INTERVAL: usize = 50;

/// Build the full task list for `targets × ports`.
pub fn build_tasks(targets: &[String], ports: &PortSet) -> Vec<ScanTask> {
    targets
        .iter()
        .flat_map(|host| ports.iter().map(move |port| ScanTask::new(host.clone(), port)))
        .collect()
}

/// Runs a [`Probe`] over every task with at most `workers` in flight.
pub struct ScanScheduler {
    probe: Arc<dyn Probe>,
    workers: usize,
    reporter: Arc<dyn Reporter>,
}

impl ScanScheduler {
    /// `workers` below 1 is treated as 1.
    pub fn new(probe: Arc<dyn Probe>, workers: usize) -> Self {
        Self {
            probe,
            workers: workers.max(1),
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Route warnings about failed tasks to `reporter`.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Scan every host against every port.
    ///
    /// Returns results in completion order. A task whose probe panics is
    /// reported and produces no result; everything else still runs.
    pub async fn run(
        &self,
        targets: &[String],
        ports: &PortSet,
        progress: &dyn ProgressObserver,
    ) -> Vec<ScanResult> {
        self.run_tasks(build_tasks(targets, ports), progress).await
    }

    /// Dispatch an explicit task list, in the given order.
    pub async fn run_tasks(
        &self,
        tasks: Vec<ScanTask>,
        progress: &dyn ProgressObserver,
    ) -> Vec<ScanResult> {
        let total = tasks.len();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut results = Vec::with_capacity(total);
        let mut completed = 0usize;
        let mut dropped = 0usize;

        progress.on_start(total);

        let mut finished = stream::iter(tasks)
            .map(|task| {
                let sem = Arc::clone(&semaphore);
                let probe = Arc::clone(&self.probe);
                let label = task.to_string();

                let handle = tokio::spawn(async move {
                    // The permit lives until the probe returns or unwinds.
                    let _permit = sem.acquire_owned().await.ok()?;
                    Some(probe.probe(&task).await)
                });
                async move { (label, handle.await) }
            })
            .buffer_unordered(self.workers);

        while let Some((label, joined)) = finished.next().await {
            completed += 1;

            match joined {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {
                    dropped += 1;
                    self.reporter
                        .warn(&format!("task {} dropped: worker pool closed", label));
                }
                Err(e) => {
                    dropped += 1;
                    self.reporter
                        .warn(&format!("task {} failed without a result: {}", label, e));
                }
            }

            if completed % PROGRESS_INTERVAL == 0 || completed == total {
                progress.on_progress(completed, total);
            }
        }

        if dropped > 0 {
            self.reporter.warn(&format!(
                "{} of {} tasks produced no result",
                dropped, total
            ));
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Level, MemoryReporter};
    use crate::scanner::progress::NoProgress;
    use crate::scanner::traits::ScanStatus;
    use crate::types::Port;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Marks every port open without touching the network.
    struct InstantProbe;

    #[async_trait]
    impl Probe for InstantProbe {
        async fn probe(&self, task: &ScanTask) -> ScanResult {
            ScanResult::new(task, ScanStatus::Open)
        }
    }

    /// Holds each probe open for a while and records peak concurrency.
    #[derive(Default)]
    struct GaugeProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Probe for GaugeProbe {
        async fn probe(&self, task: &ScanTask) -> ScanResult {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            ScanResult::new(task, ScanStatus::Closed)
        }
    }

    /// Panics on one port, which a classified failure never does.
    struct BrokenProbe {
        bad_port: u16,
    }

    #[async_trait]
    impl Probe for BrokenProbe {
        async fn probe(&self, task: &ScanTask) -> ScanResult {
            if task.port.as_u16() == self.bad_port {
                panic!("probe bug on port {}", self.bad_port);
            }
            ScanResult::new(task, ScanStatus::Closed)
        }
    }

    fn ports(spec: &str) -> PortSet {
        PortSet::parse(spec)
    }

    fn hosts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_task_order_is_targets_outer() {
        let tasks = build_tasks(&hosts(&["a", "b"]), &ports("80,22"));
        let labels: Vec<String> = tasks.iter().map(|t| t.to_string()).collect();
        assert_eq!(labels, vec!["a:22", "a:80", "b:22", "b:80"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_pair_scanned_exactly_once() {
        let targets = hosts(&["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
        let port_set = ports("1-40");
        let scheduler = ScanScheduler::new(Arc::new(InstantProbe), 7);

        let results = scheduler.run(&targets, &port_set, &NoProgress).await;
        assert_eq!(results.len(), targets.len() * port_set.len());

        let pairs: HashSet<(String, u16)> = results
            .iter()
            .map(|r| (r.host.clone(), r.port.as_u16()))
            .collect();
        assert_eq!(pairs.len(), results.len());
        for host in &targets {
            for port in port_set.iter() {
                assert!(pairs.contains(&(host.clone(), port.as_u16())));
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_worker_bound_is_never_exceeded() {
        let probe = Arc::new(GaugeProbe::default());
        let scheduler = ScanScheduler::new(probe.clone(), 4);

        let results = scheduler
            .run(&hosts(&["h1", "h2"]), &ports("1-15"), &NoProgress)
            .await;

        assert_eq!(results.len(), 30);
        let peak = probe.peak.load(Ordering::SeqCst);
        assert!(peak <= 4, "peak concurrency {} exceeded 4 workers", peak);
        assert!(peak >= 1);
        assert_eq!(probe.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_single_worker_runs_serially() {
        let probe = Arc::new(GaugeProbe::default());
        let scheduler = ScanScheduler::new(probe.clone(), 0);
        assert_eq!(scheduler.workers(), 1);

        scheduler
            .run(&hosts(&["h"]), &ports("1-5"), &NoProgress)
            .await;
        assert_eq!(probe.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_panicking_task_is_dropped_not_fatal() {
        let reporter = Arc::new(MemoryReporter::new());
        let scheduler = ScanScheduler::new(Arc::new(BrokenProbe { bad_port: 3 }), 2)
            .with_reporter(reporter.clone());

        let targets = hosts(&["h1", "h2"]);
        let results = scheduler.run(&targets, &ports("1-5"), &NoProgress).await;

        // Two tasks (h1:3, h2:3) panic; the other eight complete.
        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.port.as_u16() != 3));
        assert!(results.iter().all(|r| r.status == ScanStatus::Closed));

        let warnings = reporter.messages(Level::Warn);
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("h1:3")));
        assert!(warnings.last().unwrap().contains("2 of 10"));
    }

    #[tokio::test]
    async fn test_progress_cadence() {
        let calls = Mutex::new(Vec::new());
        let observer = |done: usize, total: usize| calls.lock().unwrap().push((done, total));

        let scheduler = ScanScheduler::new(Arc::new(InstantProbe), 10);
        scheduler
            .run(&hosts(&["a", "b"]), &ports("1-60"), &observer)
            .await;

        assert_eq!(*calls.lock().unwrap(), vec![(50, 120), (100, 120), (120, 120)]);
    }

    #[tokio::test]
    async fn test_empty_inputs() {
        let calls = Mutex::new(Vec::new());
        let observer = |done: usize, total: usize| calls.lock().unwrap().push((done, total));
        let scheduler = ScanScheduler::new(Arc::new(InstantProbe), 3);

        let results = scheduler.run(&[], &ports("80"), &observer).await;
        assert!(results.is_empty());
        assert!(calls.lock().unwrap().is_empty());

        let port = Port::new(80).unwrap();
        let results = scheduler
            .run_tasks(vec![ScanTask::new("x", port)], &observer)
            .await;
        assert_eq!(results.len(), 1);
        assert_eq!(*calls.lock().unwrap(), vec![(1, 1)]);
    }
}

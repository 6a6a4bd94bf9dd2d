//! Result aggregation.
//!
//! Pure bookkeeping over finished results: counts per status and the
//! collection itself, untouched, for the writers.

use crate::scanner::{ScanResult, ScanStatus};
use serde::Serialize;

/// Counts per terminal status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub total: usize,
    pub open_count: usize,
    pub closed_count: usize,
    pub filtered_count: usize,
    pub error_count: usize,
}

impl ScanSummary {
    /// Count results by status.
    pub fn from_results(results: &[ScanResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };

        for result in results {
            match result.status {
                ScanStatus::Open => summary.open_count += 1,
                ScanStatus::Closed => summary.closed_count += 1,
                ScanStatus::FilteredTimeout => summary.filtered_count += 1,
                ScanStatus::Error => summary.error_count += 1,
            }
        }

        summary
    }
}

/// Final output of a scan, ready for serialization.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub summary: ScanSummary,
    pub results: Vec<ScanResult>,
}

impl ScanReport {
    /// Results with status `open`, in collection order.
    pub fn open_results(&self) -> impl Iterator<Item = &ScanResult> {
        self.results.iter().filter(|r| r.is_open())
    }
}

/// Builds a [`ScanReport`] from whatever the scheduler produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAggregator;

impl ResultAggregator {
    /// Summarize `results`. Order is preserved; partial and empty inputs are fine.
    pub fn aggregate(results: Vec<ScanResult>) -> ScanReport {
        ScanReport {
            summary: ScanSummary::from_results(&results),
            results,
        }
    }
}

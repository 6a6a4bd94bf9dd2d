//! Progress observers for the scheduler.

use crate::report::Reporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// Receives completion counts from the scheduler.
pub trait ProgressObserver: Send + Sync {
    /// Called once before dispatch with the total task count.
    fn on_start(&self, _total: usize) {}

    /// Called every few completions and at the last one.
    fn on_progress(&self, completed: usize, total: usize);
}

impl<F> ProgressObserver for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _completed: usize, _total: usize) {}
}

/// Writes progress lines through a [`Reporter`].
pub struct LogProgress {
    reporter: Arc<dyn Reporter>,
}

impl LogProgress {
    pub fn new(reporter: Arc<dyn Reporter>) -> Self {
        Self { reporter }
    }
}

impl ProgressObserver for LogProgress {
    fn on_progress(&self, completed: usize, total: usize) {
        self.reporter
            .info(&format!("progress: {}/{} tasks complete", completed, total));
    }
}

/// Terminal progress bar.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::hidden();
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        ) {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self { bar }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for BarProgress {
    fn on_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar
            .set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn on_progress(&self, completed: usize, total: usize) {
        self.bar.set_position(completed as u64);
        if completed == total {
            self.bar.finish_with_message("Scan complete");
        }
    }
}

//! Plain text console output.
//!
//! Produces human-readable output with colors and formatting.

use crate::aggregate::ScanReport;
use console::{style, Style};
use std::io::{self, Write};
use std::time::Duration;

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print a scan header before scanning begins.
pub fn print_scan_header(targets: usize, ports: usize, workers: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("recon").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Targets: {}",
        style("•").dim(),
        style(targets).white().bold()
    );
    println!(
        "{} Ports per target: {}",
        style("•").dim(),
        style(ports).white().bold()
    );
    println!(
        "{} Scanning {} tasks with {} workers...",
        style("•").dim(),
        style(targets * ports).white().bold(),
        workers
    );
    println!();
}

/// Print the summary table for a finished scan.
pub fn print_summary(report: &ScanReport, elapsed: Duration) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_summary(&mut out, report, elapsed)
}

/// Render the summary into any writer.
pub fn write_summary<W: Write>(out: &mut W, report: &ScanReport, elapsed: Duration) -> io::Result<()> {
    let summary = &report.summary;

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out, "                    {} Scan Results", style("recon").cyan().bold())?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {} results in {:.2}s",
        style("Statistics:").bold(),
        summary.total,
        elapsed.as_secs_f64()
    )?;
    writeln!(
        out,
        "               {} open, {} closed, {} filtered, {} error",
        style(summary.open_count).green().bold(),
        style(summary.closed_count).red(),
        style(summary.filtered_count).yellow(),
        style(summary.error_count).magenta()
    )?;
    writeln!(out)?;

    let mut open: Vec<_> = report.open_results().collect();
    if open.is_empty() {
        writeln!(out, "  {}", style("No open services found.").dim())?;
    } else {
        open.sort_by(|a, b| (&a.host, a.port).cmp(&(&b.host, b.port)));

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<24}  {:>6}  {:<10}  {}",
            style("HOST").bold(),
            style("PORT").bold(),
            style("HINT").bold(),
            style("TIME").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        let open_style = Style::new().green().bold();
        for result in open {
            writeln!(
                out,
                "  {:<24}  {:>6}  {:<10}  {}",
                truncate_string(&result.host, 24),
                open_style.apply_to(result.port),
                result.service_hint.as_deref().unwrap_or(""),
                style(result.duration_ms.map_or(String::new(), |ms| format!("{}ms", ms))).dim()
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Truncate a string to a maximum length, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

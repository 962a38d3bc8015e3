//! Formatting of durations and the end-of-run summary.

use console::Term;
use nox_core::RunStats;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Format duration in human-readable format.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use nox_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// One-line totals, e.g. `3 destructors in 1 unit: 1 diagnostic, 1 fix-it`.
pub fn summary_line(units: usize, stats: &RunStats) -> String {
    format!(
        "{} destructor{} in {} unit{}: {} diagnostic{}, {} fix-it{}",
        stats.declarations,
        plural(stats.declarations),
        units,
        plural(units),
        stats.diagnostics,
        plural(stats.diagnostics),
        stats.fixes,
        plural(stats.fixes),
    )
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Print the per-state breakdown of a run to stderr.
pub fn print_check_summary(units: usize, stats: &RunStats, elapsed: Duration) {
    let width = (Term::stderr().size().1 as usize).min(60);

    eprintln!("\n{}", "Check Summary".bold().underline());
    eprintln!("{}", "─".repeat(width));
    eprintln!("  {:<16} {:>6}", "throwing", stats.throwing.red());
    eprintln!("  {:<16} {:>6}", "not throwing", stats.not_throwing.green());
    eprintln!("  {:<16} {:>6}", "unknown", stats.unknown.yellow());
    if stats.deleted_skipped > 0 {
        eprintln!("  {:<16} {:>6}", "deleted", stats.deleted_skipped.dimmed());
    }
    eprintln!("{}", "─".repeat(width));
    eprintln!(
        "  {} {}",
        summary_line(units, stats),
        format!("({})", format_duration(elapsed)).dimmed()
    );
}

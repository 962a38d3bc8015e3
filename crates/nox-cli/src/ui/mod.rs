//! Terminal output helpers: status messages and the run summary.
//!
//! Everything here writes to stderr so that stdout carries only the
//! diagnostics (or the JSON report).

mod format;
mod messages;

pub use format::{format_duration, print_check_summary, summary_line};
pub use messages::{info, success, warning};

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR, then falls back to terminal detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    console::user_attended_stderr()
}

/// Initialize color support based on environment and `--no-color`.
///
/// Turns colors off globally for `owo-colors`; call once from `main`.
pub fn init_colors(no_color: bool) {
    if no_color || !should_use_color() {
        owo_colors::set_override(false);
    }
}

//! Terminal output: status lines and the build summary.
//!
//! Everything goes to stderr. `--quiet` silences all but error lines and
//! `--no-color` (or `NO_COLOR`) switches to plain text.
//!
//! ```no_run
//! use wcb_cli::ui;
//!
//! ui::init(false, false);
//! ui::success("Build completed");
//! ui::error("Failed to parse widget.js");
//! ```

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_size, print_run_summary, summary_lines, SummaryRow};
pub use messages::{error, info, success, warning};

static QUIET: AtomicBool = AtomicBool::new(false);
static COLOR: AtomicBool = AtomicBool::new(true);

/// Apply the global output flags. Call once, early in `main`.
pub fn init(quiet: bool, no_color: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
    COLOR.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

pub(crate) fn colors_enabled() -> bool {
    COLOR.load(Ordering::Relaxed)
}

/// Check if color output should be enabled.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise colors follow whether
/// stderr is a terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

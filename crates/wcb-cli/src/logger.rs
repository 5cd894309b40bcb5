//! Logging setup for the wcb CLI.
//!
//! The libraries only emit `tracing` events; this module installs the
//! subscriber that prints them.
//!
//! The filter is chosen in this order:
//! 1. `--verbose`: debug for the wcb crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`, when set
//! 4. info for the wcb crates

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "wcb=debug,wcb_bundler=debug,wcb_config=debug,wcb_cli=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "wcb=info,wcb_bundler=info,wcb_config=info,wcb_cli=info";

/// Build the filter for the given flags.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the tracing subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && crate::ui::should_use_color())
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global subscriber can only be installed once per process, so these
    // only check filter construction.

    #[test]
    fn test_verbose_filter_mentions_debug() {
        assert!(filter_for(true, false).to_string().contains("wcb_bundler=debug"));
    }

    #[test]
    fn test_verbose_wins_over_quiet() {
        assert!(filter_for(true, true).to_string().contains("debug"));
    }

    #[test]
    fn test_quiet_filter_is_errors_only() {
        let filter = filter_for(false, true).to_string().to_lowercase();
        assert!(filter.contains("error"));
        assert!(!filter.contains("info"));
    }
}

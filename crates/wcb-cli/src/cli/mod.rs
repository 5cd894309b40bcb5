//! Command-line interface definition for wcb.
//!
//! ```text
//! wcb [OPTIONS] [TASK]...
//! ```
//!
//! `TASK` is one of `assemble`, `minify`, `css` or `build` (the default).
//! Dependencies between tasks are expanded by [`wcb_bundler::TaskPlan`].


use std::path::PathBuf;

use clap::Parser;
use wcb_bundler::Task;

/// wcb - web component build pipeline
#[derive(Parser, Debug)]
#[command(
    name = "wcb",
    version,
    about = "Build web components into module, compatibility and loader bundles",
    long_about = "wcb bundles every component in a flat source directory into an ES module\n\
                  bundle, a syntax-lowered compatibility bundle, minified variants of both,\n\
                  and a small loader script that picks the right one at runtime.",
    after_help = "Tasks:\n  assemble  bundle, compat bundle and loader for every component\n  \
                  minify    assemble, plus .min variants\n  \
                  css       process the configured stylesheet\n  \
                  build     everything (default)"
)]
pub struct Cli {
    /// Tasks to run
    #[arg(value_name = "TASK", value_parser = parse_task)]
    pub tasks: Vec<Task>,

    /// Configuration file (TOML or JSON)
    ///
    /// Defaults to wcb.toml, wcb.config.toml or wcb.config.json in the
    /// project directory, then the "wcb" field of package.json. A missing
    /// file is reported and the defaults are used.
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Rebuild components as their sources change
    #[arg(short, long)]
    pub watch: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Requested tasks; `build` when none were named.
    pub fn tasks(&self) -> Vec<Task> {
        if self.tasks.is_empty() {
            vec![Task::Build]
        } else {
            self.tasks.clone()
        }
    }
}

/// Parse a task name, listing the valid names on failure.
pub fn parse_task(s: &str) -> Result<Task, String> {
    s.parse::<Task>().map_err(|_| {
        let names: Vec<&str> = Task::ALL.iter().map(|t| t.name()).collect();
        format!("unknown task '{s}' (expected one of: {})", names.join(", "))
    })
}

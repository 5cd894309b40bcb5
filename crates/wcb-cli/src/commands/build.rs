//! The build command.
//!
//! Loads the configuration, runs the requested tasks once and, with
//! `--watch`, hands the pipeline over to the watch loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use wcb_bundler::{Pipeline, RunReport, Task, TaskPlan};
use wcb_config::{ConfigDiscovery, ConfigSource};

use crate::cli::Cli;
use crate::error::{Result, ResultExt};
use crate::{ui, watch};

/// Execute the build command.
///
/// Per-component failures are reported but do not fail the command; only
/// configuration problems and an unusable source directory do.
pub async fn execute(cli: Cli) -> Result<()> {
    let root = resolve_root(cli.cwd.as_deref())?;
    let loaded = ConfigDiscovery::new(&root)
        .with_file(cli.config_file.as_deref())
        .load()?;
    describe_source(&loaded.source);

    let pipeline = Pipeline::new(Arc::new(loaded.config), &loaded.root)?;
    let tasks = cli.tasks();
    run(&pipeline, &tasks).await?;

    if cli.watch {
        watch::run(pipeline, TaskPlan::resolve(&tasks)).await?;
    }

    Ok(())
}

/// Run `tasks` once and print the summary.
pub async fn run(pipeline: &Pipeline, tasks: &[Task]) -> Result<RunReport> {
    let names: Vec<&str> = tasks.iter().map(|t| t.name()).collect();
    ui::info(&format!(
        "Running {} ({} -> {})",
        names.join(", "),
        pipeline.config().source_dir.display(),
        pipeline.config().dest_dir.display()
    ));

    let report = pipeline.run(tasks).await?;
    ui::print_run_summary(&report);

    if report.is_success() {
        ui::success(&format!(
            "Built {} component(s) in {}",
            report.succeeded(),
            ui::format_duration(report.duration)
        ));
    } else {
        ui::warning(&format!(
            "{} succeeded, {} failed (see errors above)",
            report.succeeded(),
            report.failed()
        ));
    }

    Ok(report)
}

/// The project directory: `--cwd` or the current directory, canonicalized so
/// watcher event paths compare equal to configured ones.
pub(crate) fn resolve_root(cwd: Option<&Path>) -> Result<PathBuf> {
    let dir = match cwd {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    dir.canonicalize().with_path(&dir)
}

fn describe_source(source: &ConfigSource) {
    match source {
        ConfigSource::Defaults => tracing::debug!("no configuration file, using defaults"),
        ConfigSource::File(path) => ui::info(&format!("Using config {}", path.display())),
        ConfigSource::PackageJson(path) => {
            ui::info(&format!("Using \"wcb\" field of {}", path.display()))
        }
    }
}

//! Formatting utilities for sizes, durations, and the build summary.

use std::time::Duration;

use console::Term;
use owo_colors::OwoColorize;
use wcb_bundler::{FileReport, RunReport, TaskReport};

use super::{colors_enabled, is_quiet};

/// Format file size in human-readable format.
///
/// ```
/// use wcb_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;
    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{bytes} B")
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format duration in human-readable format (`50ms`, `1.50s`, `1m 30s`).
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// One line of the build summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub label: String,
    pub artifacts: usize,
    pub size: u64,
    pub duration: Duration,
    pub error: Option<String>,
}

impl SummaryRow {
    fn for_file(file: &FileReport) -> Self {
        let label = file
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.source.display().to_string());
        Self {
            label,
            artifacts: file.artifacts().len(),
            size: file.artifacts().iter().map(|a| a.size).sum(),
            duration: file.duration,
            error: file.result.as_ref().err().map(ToString::to_string),
        }
    }

    fn for_task(task: &TaskReport) -> Self {
        let artifacts = task.result.as_deref().unwrap_or(&[]);
        Self {
            label: task.task.to_string(),
            artifacts: artifacts.len(),
            size: artifacts.iter().map(|a| a.size).sum(),
            duration: task.duration,
            error: task.result.as_ref().err().map(ToString::to_string),
        }
    }
}

/// Rows of the summary: one per component, then the stylesheet task.
pub fn summary_lines(report: &RunReport) -> Vec<SummaryRow> {
    report
        .files
        .iter()
        .map(SummaryRow::for_file)
        .chain(report.css.iter().map(SummaryRow::for_task))
        .collect()
}

/// Print the build summary to stderr.
pub fn print_run_summary(report: &RunReport) {
    if is_quiet() {
        return;
    }
    let rows = summary_lines(report);
    if rows.is_empty() {
        return;
    }

    let width = (Term::stderr().size().1 as usize).min(80);
    let color = colors_enabled();

    if color {
        eprintln!("\n{}", "Build Summary".bold().underline());
    } else {
        eprintln!("\nBuild Summary");
    }
    eprintln!("{}", "─".repeat(width));

    for row in &rows {
        let detail = match &row.error {
            Some(_) => "failed".to_string(),
            None => format!(
                "{} files, {}",
                row.artifacts,
                format_size(row.size)
            ),
        };
        let timing = format!("({})", format_duration(row.duration));
        match (&row.error, color) {
            (None, true) => eprintln!(
                "  {} {} {} {}",
                "▸".blue(),
                row.label.bright_white().bold(),
                detail.dimmed(),
                timing.dimmed()
            ),
            (Some(_), true) => eprintln!(
                "  {} {} {} {}",
                "✗".red(),
                row.label.bright_white().bold(),
                detail.red(),
                timing.dimmed()
            ),
            (None, false) => eprintln!("  ▸ {} {} {}", row.label, detail, timing),
            (Some(_), false) => eprintln!("  ✗ {} {} {}", row.label, detail, timing),
        }
    }

    eprintln!("{}", "─".repeat(width));
    let total = format!(
        "{} in {}",
        format_size(report.total_bytes()),
        format_duration(report.duration)
    );
    if color {
        eprintln!("  {} {}", "Total:".bold(), total.green());
    } else {
        eprintln!("  Total: {total}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use wcb_bundler::pipeline::WrittenArtifact;
    use wcb_bundler::Task;

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_larger_units() {
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1_048_576), "1.00 MB");
        assert_eq!(format_size(2_147_483_648), "2.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
    }

    #[test]
    fn test_summary_lines_cover_files_and_css() {
        let report = RunReport {
            tasks: vec![Task::Assemble, Task::Css],
            files: vec![
                FileReport {
                    source: PathBuf::from("/p/components/card.js"),
                    result: Ok(vec![
                        WrittenArtifact {
                            path: PathBuf::from("/p/dist/card-bundle.js"),
                            size: 100,
                        },
                        WrittenArtifact {
                            path: PathBuf::from("/p/dist/card.js"),
                            size: 20,
                        },
                    ]),
                    duration: Duration::from_millis(5),
                },
                FileReport {
                    source: PathBuf::from("/p/components/broken.js"),
                    result: Err(wcb_bundler::Error::Loader("boom".to_string())),
                    duration: Duration::from_millis(1),
                },
            ],
            css: Some(TaskReport {
                task: Task::Css,
                result: Ok(Vec::new()),
                duration: Duration::ZERO,
            }),
            duration: Duration::from_millis(7),
        };

        let rows = summary_lines(&report);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].label, "card.js");
        assert_eq!(rows[0].artifacts, 2);
        assert_eq!(rows[0].size, 120);
        assert!(rows[0].error.is_none());
        assert_eq!(rows[1].label, "broken.js");
        assert!(rows[1].error.as_deref().is_some_and(|e| e.contains("boom")));
        assert_eq!(rows[2].label, "css");
    }
}

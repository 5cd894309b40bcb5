//! # wcb-bundler
//!
//! The web component build pipeline.
//!
//! Every eligible file in a flat source directory is turned into a set of
//! distributable artifacts:
//!
//! - `<name>-bundle.js`: the module graph bundled as ESM (rolldown)
//! - `<name>-bundle-compat.js`: the same code lowered for older browsers and
//!   wrapped in an IIFE (oxc transformer + rolldown)
//! - `.min` variants of both (oxc minifier)
//! - `<name>.js`: a loader that picks the right bundle at runtime and pulls in
//!   the polyfills first when the browser needs them
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use wcb_bundler::{Pipeline, Task};
//! use wcb_config::BuildConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(Arc::new(BuildConfig::default()), ".")?;
//! let report = pipeline.run(&[Task::Build]).await?;
//! println!("{} built, {} failed", report.succeeded(), report.failed());
//! # Ok(()) }
//! ```

pub mod diagnostics;
pub mod names;
pub mod pipeline;
pub mod scan;
pub mod steps;
pub mod tasks;
pub mod writer;

pub use names::{min_file, ArtifactNames};
pub use pipeline::{FileReport, Pipeline, RunReport, TaskReport};
pub use scan::{scan_sources, SourceFile};
pub use tasks::{Task, TaskPlan};

/// Error types for wcb-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error from the rolldown bundler.
    #[error("Bundler error: {}", format_bundler_error(.0))]
    Bundler(Vec<diagnostics::ExtractedDiagnostic>),

    /// Syntax lowering for the compatibility bundle failed.
    #[error("Transform error in {file}: {message}")]
    Transform { file: String, message: String },

    /// Minification failed.
    #[error("Minify error in {file}: {message}")]
    Minify { file: String, message: String },

    /// Stylesheet processing failed.
    #[error("CSS error in {file}: {message}")]
    Css { file: String, message: String },

    /// Loader generation failed.
    #[error("Loader generation failed: {0}")]
    Loader(String),

    /// The source directory could not be listed.
    #[error("Cannot read source directory {}: {source}", .path.display())]
    SourceDir {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two sources would write the same artifact.
    #[error("Output collision: '{artifact}' is produced by both {first} and {second}")]
    OutputCollision {
        artifact: String,
        first: String,
        second: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// A build task panicked or was cancelled.
    #[error("Build task failed: {0}")]
    Task(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] wcb_config::ConfigError),
}

/// Result type alias for wcb-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a bundler error from a rolldown error.
    ///
    /// Extracts structured diagnostics from rolldown's error types.
    pub fn from_rolldown_batch(error: &dyn std::fmt::Debug) -> Self {
        Error::Bundler(diagnostics::extract_from_rolldown_error(error))
    }

    /// Errors that stop a run before any file is built.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::SourceDir { .. }
                | Error::OutputCollision { .. }
                | Error::InvalidConfig(_)
                | Error::Config(_)
        )
    }
}

fn format_bundler_error(diagnostics: &[diagnostics::ExtractedDiagnostic]) -> String {
    match diagnostics {
        [] => "Unknown bundler error".to_string(),
        [diag] => format!("{}: {}", diag.kind, diag.message),
        many => format!(
            "{} errors: {}",
            many.len(),
            many.iter()
                .map(|d| format!("{}: {}", d.kind, d.message))
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Bundler(_) => "BUNDLER_ERROR",
            Error::Transform { .. } => "TRANSFORM_ERROR",
            Error::Minify { .. } => "MINIFY_ERROR",
            Error::Css { .. } => "CSS_ERROR",
            Error::Loader(_) => "LOADER_ERROR",
            Error::SourceDir { .. } => "SOURCE_DIR",
            Error::OutputCollision { .. } => "OUTPUT_COLLISION",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::Task(_) => "TASK_FAILED",
            Error::Io(_) => "IO_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::SourceDir { path, .. } => Some(Box::new(format!(
                "Create '{}' or point `source_dir` at the directory holding your components.",
                path.display()
            ))),
            Error::OutputCollision { .. } => Some(Box::new(
                "Rename one of the sources, or make the `output` templates distinguish them.",
            )),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{path}' must stay inside the destination directory."
            ))),
            Error::WriteFailure(_) => Some(Box::new(
                "Failed to write file. Check disk space and permissions.",
            )),
            Error::Task(_) => Some(Box::new("This is a bug in wcb. Please report it.")),
            Error::Transform { .. } => Some(Box::new(
                "Check `compat.target`, or disable the compatibility bundle with `compat.enabled = false`.",
            )),
            Error::Bundler(diagnostics) => match diagnostics.as_slice() {
                [diag] => diag
                    .help
                    .as_ref()
                    .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>),
                _ => Some(Box::new(
                    "Multiple bundler errors occurred. See details above.",
                )),
            },
            _ => None,
        }
    }
}

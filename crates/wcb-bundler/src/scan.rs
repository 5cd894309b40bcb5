//! Source directory scanning.

use std::fs;
use std::path::{Path, PathBuf};

use wcb_config::BuildConfig;

use crate::{Error, Result};

/// One eligible component source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File name without its extension; expands `[name]` in output templates.
    pub stem: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, stem }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// List the eligible sources directly inside `config.source_dir`.
///
/// The directory is not searched recursively. Entries are sorted by file
/// name so runs are reproducible. A missing or unreadable directory is a
/// fatal error; an empty one is not.
pub fn scan_sources(config: &BuildConfig) -> Result<Vec<SourceFile>> {
    let dir = &config.source_dir;
    let entries = fs::read_dir(dir).map_err(|source| Error::SourceDir {
        path: dir.clone(),
        source,
    })?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::SourceDir {
            path: dir.clone(),
            source,
        })?;
        let path = entry.path();
        if is_eligible(config, &path) {
            sources.push(SourceFile::new(path));
        }
    }

    sources.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    tracing::debug!(count = sources.len(), dir = %dir.display(), "scanned sources");
    Ok(sources)
}

/// True when `path` is a regular file with an eligible extension.
pub fn is_eligible(config: &BuildConfig, path: &Path) -> bool {
    config.is_eligible_extension(path) && path.is_file()
}

/// True when `path` sits directly in the source directory and has an eligible
/// extension. Does not touch the filesystem, so it also matches removed files.
pub fn is_source_path(config: &BuildConfig, path: &Path) -> bool {
    path.parent() == Some(config.source_dir.as_path()) && config.is_eligible_extension(path)
}

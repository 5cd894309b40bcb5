//! Atomic artifact writing.
//!
//! Artifacts are written to temporary siblings first and renamed into place
//! once every write succeeded, so a reader never sees a half-written bundle
//! and a failed step leaves the previous artifacts untouched. Every name is
//! checked to stay inside the destination directory.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::{Error, Result};

/// One file to write, named relative to the destination directory.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub contents: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

const TEMP_SUFFIX: &str = ".wcb-tmp";

/// Write `artifacts` into `dest_dir`, creating it when missing.
///
/// Returns the final paths in the order given.
pub fn write_artifacts(dest_dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    let dest_dir = dest_dir.to_path_buf().clean();
    fs::create_dir_all(&dest_dir).map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {}",
            dest_dir.display(),
            e
        ))
    })?;

    let operations = artifacts
        .iter()
        .map(|artifact| {
            validate_output_path(&dest_dir, &artifact.name)
                .map(|path| (path, artifact.contents.as_slice()))
        })
        .collect::<Result<Vec<_>>>()?;

    write_files_atomic(&operations)?;
    Ok(operations.into_iter().map(|(path, _)| path).collect())
}

/// Delete the named artifacts that exist. Missing files are skipped.
pub fn remove_artifacts(dest_dir: &Path, names: &[String]) -> Result<Vec<PathBuf>> {
    let dest_dir = dest_dir.to_path_buf().clean();
    let mut removed = Vec::new();

    for name in names {
        let path = validate_output_path(&dest_dir, name)?;
        match fs::remove_file(&path) {
            Ok(()) => removed.push(path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::WriteFailure(format!(
                    "Failed to remove '{}': {}",
                    path.display(),
                    e
                )));
            }
        }
    }

    Ok(removed)
}

/// Resolve `filename` under `base_dir`, rejecting anything that escapes it.
pub fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.is_empty() {
        return Err(Error::InvalidOutputPath("empty file name".to_string()));
    }
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();

    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            filename,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

/// Two-phase write: every temp file first, then every rename.
fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut temp_files = Vec::with_capacity(operations.len());

    for (target_path, content) in operations {
        let temp_path = temp_path_for(target_path);
        if let Err(e) = fs::write(&temp_path, content) {
            cleanup_temp_files(&temp_files);
            return Err(Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {}",
                temp_path.display(),
                e
            )));
        }
        temp_files.push((temp_path, target_path.clone()));
    }

    // A rename can only fail part way through for a target that is not a
    // file, so refuse before anything is moved into place.
    if let Some((_, blocked)) = temp_files.iter().find(|(_, target)| target.is_dir()) {
        let blocked = blocked.clone();
        cleanup_temp_files(&temp_files);
        return Err(Error::WriteFailure(format!(
            "Cannot write '{}': a directory is in the way",
            blocked.display()
        )));
    }

    for (index, (temp_path, target_path)) in temp_files.iter().enumerate() {
        if let Err(e) = fs::rename(temp_path, target_path) {
            cleanup_temp_files(&temp_files[index..]);
            return Err(Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                temp_path.display(),
                target_path.display(),
                e
            )));
        }
    }

    Ok(())
}

fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Best-effort cleanup; we are already reporting an error.
fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp_path, _) in temp_files {
        if temp_path.exists() {
            if let Err(e) = fs::remove_file(temp_path) {
                tracing::warn!(
                    "Failed to clean up temporary file '{}': {}",
                    temp_path.display(),
                    e
                );
            }
        }
    }
}

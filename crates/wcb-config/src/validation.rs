//! Schema checks run after a configuration is extracted.
//!
//! These never touch the filesystem. Whether the source directory exists is
//! decided by the pipeline when it scans, since a watch session may start
//! before the directory does.

use std::path::{Component, Path};

use crate::config::{BuildConfig, NAME_PLACEHOLDER};
use crate::error::{ConfigError, Result};

/// Lowest syntax level the compatibility step can emit.
pub const MIN_COMPAT_TARGET: &str = "es2015";

/// Validate a configuration.
pub fn validate(config: &BuildConfig) -> Result<()> {
    if config.source_dir.as_os_str().is_empty() {
        return Err(ConfigError::invalid("source_dir", "must not be empty"));
    }
    if config.dest_dir.as_os_str().is_empty() {
        return Err(ConfigError::invalid("dest_dir", "must not be empty"));
    }
    if same_dir(&config.source_dir, &config.dest_dir) {
        return Err(ConfigError::invalid(
            "dest_dir",
            "must differ from source_dir, or outputs would be picked up as sources",
        ));
    }

    if config.extensions.is_empty() {
        return Err(ConfigError::invalid(
            "extensions",
            "list at least one extension, e.g. [\"js\"]",
        ));
    }
    if let Some(ext) = config
        .extensions
        .iter()
        .find(|ext| ext.is_empty() || ext.starts_with('.'))
    {
        return Err(ConfigError::invalid(
            "extensions",
            format!("'{ext}' is not valid; write extensions without the leading dot"),
        ));
    }

    if config.concurrency == Some(0) {
        return Err(ConfigError::invalid(
            "concurrency",
            "must be at least 1, or omitted to use the number of CPUs",
        ));
    }

    check_template("output.bundle", &config.output.bundle)?;
    check_template("output.loader", &config.output.loader)?;
    if let Some(compat) = &config.output.compat_bundle {
        check_template("output.compat_bundle", compat)?;
    }

    if config.compat.target.trim().is_empty() {
        return Err(ConfigError::invalid(
            "compat.target",
            format!("set a target such as \"{MIN_COMPAT_TARGET}\""),
        ));
    }

    if let Some(css) = &config.css {
        if css.input.as_os_str().is_empty() {
            return Err(ConfigError::invalid("css.input", "must not be empty"));
        }
        check_file_name("css.output", &css.output)?;
    }

    for (alias, target) in &config.bundler.alias {
        if alias.is_empty() || target.is_empty() {
            return Err(ConfigError::invalid(
                "bundler.alias",
                "alias keys and targets must be non-empty",
            ));
        }
    }

    for external in &config.bundler.external {
        if external.trim().is_empty() {
            return Err(ConfigError::invalid(
                "bundler.external",
                "remove empty strings from the list",
            ));
        }
    }

    let bundler = &config.bundler;
    for (field, list) in [
        ("bundler.text_extensions", &bundler.text_extensions),
        ("bundler.dataurl_extensions", &bundler.dataurl_extensions),
    ] {
        if let Some(ext) = list.iter().find(|ext| ext.is_empty() || ext.starts_with('.')) {
            return Err(ConfigError::invalid(
                field,
                format!("'{ext}' is not valid; write extensions without the leading dot"),
            ));
        }
    }
    if let Some(ext) = bundler
        .text_extensions
        .iter()
        .find(|ext| bundler.dataurl_extensions.contains(ext))
    {
        return Err(ConfigError::invalid(
            "bundler.dataurl_extensions",
            format!("'{ext}' is also listed in bundler.text_extensions"),
        ));
    }

    Ok(())
}

fn check_template(field: &str, template: &str) -> Result<()> {
    if !template.contains(NAME_PLACEHOLDER) {
        return Err(ConfigError::invalid(
            field,
            format!("'{template}' must contain {NAME_PLACEHOLDER} so every component gets its own file"),
        ));
    }
    check_file_name(field, template)
}

fn check_file_name(field: &str, name: &str) -> Result<()> {
    if name.contains('/') || name.contains('\\') {
        return Err(ConfigError::invalid(
            field,
            format!("'{name}' must be a plain file name without directories"),
        ));
    }
    Ok(())
}

fn same_dir(a: &Path, b: &Path) -> bool {
    fn clean(p: &Path) -> Vec<Component<'_>> {
        p.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    }
    clean(a) == clean(b)
}

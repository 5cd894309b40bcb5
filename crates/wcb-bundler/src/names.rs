//! Deterministic artifact naming.
//!
//! Every source file maps to a fixed set of output names derived from the
//! configured templates. Two sources that would write the same name are a
//! configuration error, detected before anything is built.

use std::collections::HashMap;
use std::path::Path;

use wcb_config::{BuildConfig, NAME_PLACEHOLDER};

use crate::scan::SourceFile;
use crate::{Error, Result};

/// Output file names for one source file, relative to the destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub bundle: String,
    pub bundle_min: String,
    pub compat: String,
    pub compat_min: String,
    pub loader: String,
}

impl ArtifactNames {
    /// Expand the configured templates for a component named `stem`.
    pub fn for_stem(config: &BuildConfig, stem: &str) -> Self {
        let bundle = expand(&config.output.bundle, stem);
        let compat = match &config.output.compat_bundle {
            Some(template) => expand(template, stem),
            None => compat_file(&bundle),
        };

        Self {
            bundle_min: min_file(&bundle),
            compat_min: min_file(&compat),
            loader: expand(&config.output.loader, stem),
            bundle,
            compat,
        }
    }

    /// Source map written next to the primary bundle.
    pub fn bundle_map(&self) -> String {
        format!("{}.map", self.bundle)
    }

    /// The names a run with these settings writes.
    pub fn planned(&self, config: &BuildConfig, minify: bool) -> Vec<String> {
        let mut names = vec![self.bundle.clone(), self.loader.clone()];
        if config.sourcemap {
            names.push(self.bundle_map());
        }
        if config.compat.enabled {
            names.push(self.compat.clone());
        }
        if minify {
            names.push(self.bundle_min.clone());
            if config.compat.enabled {
                names.push(self.compat_min.clone());
            }
        }
        names
    }

    /// Everything this source could have produced under any setting.
    pub fn all(&self) -> Vec<String> {
        vec![
            self.bundle.clone(),
            self.bundle_map(),
            self.bundle_min.clone(),
            self.compat.clone(),
            self.compat_min.clone(),
            self.loader.clone(),
        ]
    }
}

/// Replace every `[name]` in `template` with `stem`.
pub fn expand(template: &str, stem: &str) -> String {
    template.replace(NAME_PLACEHOLDER, stem)
}

/// Insert `.min` before the extension: `a-bundle.js` becomes `a-bundle.min.js`.
pub fn min_file(name: &str) -> String {
    with_suffix(name, ".min")
}

/// Default compatibility bundle name: `a-bundle.js` becomes `a-bundle-compat.js`.
pub fn compat_file(bundle: &str) -> String {
    with_suffix(bundle, "-compat")
}

fn with_suffix(name: &str, suffix: &str) -> String {
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => {
            format!("{}{suffix}.{}", stem.to_string_lossy(), ext.to_string_lossy())
        }
        _ => format!("{name}{suffix}"),
    }
}

/// Fail when two producers would write an artifact with the same name.
///
/// A single source whose own templates overlap (say `bundle` equal to
/// `loader`) is reported too.
pub fn check_collisions(config: &BuildConfig, sources: &[SourceFile], minify: bool) -> Result<()> {
    let mut owners: HashMap<String, String> = HashMap::new();

    let mut claim = |artifact: String, owner: String| -> Result<()> {
        if let Some(first) = owners.get(&artifact) {
            return Err(Error::OutputCollision {
                artifact,
                first: first.clone(),
                second: owner,
            });
        }
        owners.insert(artifact, owner);
        Ok(())
    };

    for source in sources {
        let names = ArtifactNames::for_stem(config, &source.stem);
        for artifact in names.planned(config, minify) {
            claim(artifact, source.file_name())?;
        }
    }

    if let Some(css) = &config.css {
        let input = css.input.display().to_string();
        claim(css.output.clone(), input.clone())?;
        if config.minify {
            claim(min_file(&css.output), input)?;
        }
    }

    Ok(())
}

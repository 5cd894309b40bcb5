//! File-based config discovery for CLI use.
//!
//! Finds an optional configuration file and layers it, together with `WCB_*`
//! environment variables, over the built-in defaults.
//!
//! A missing file is not an error: the defaults simply stand. A file that
//! exists but cannot be parsed is.

use std::fs;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};
use serde_json::Value;

use crate::config::{BuildConfig, CONFIG_KEYS};
use crate::error::{ConfigError, Result};
use crate::validation::validate;

/// Conventional config file names, in lookup order.
pub const CONFIG_FILE_NAMES: &[&str] = &["wcb.toml", "wcb.config.toml", "wcb.config.json"];

/// Field holding the configuration inside `package.json`.
pub const PACKAGE_JSON_FIELD: &str = "wcb";

/// Prefix for environment overrides (`WCB_DEST_DIR`, `WCB_COMPAT__TARGET`).
pub const ENV_PREFIX: &str = "WCB_";

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// No file was used.
    Defaults,
    /// A dedicated config file.
    File(PathBuf),
    /// The `wcb` field of a `package.json`.
    PackageJson(PathBuf),
}

/// A validated configuration with paths rebased onto the project root.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: BuildConfig,
    pub root: PathBuf,
    pub source: ConfigSource,
}

/// File-based configuration discovery.
///
/// # Example
///
/// ```no_run
/// use wcb_config::ConfigDiscovery;
///
/// let loaded = ConfigDiscovery::new(".").load().unwrap();
/// println!("building {}", loaded.config.source_dir.display());
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
    explicit: Option<PathBuf>,
    use_env: bool,
}

impl ConfigDiscovery {
    /// Create a discovery rooted at the project directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            explicit: None,
            use_env: true,
        }
    }

    /// Use this file instead of searching. Relative paths are taken from the root.
    pub fn with_file(mut self, path: Option<impl AsRef<Path>>) -> Self {
        self.explicit = path.map(|p| {
            let p = p.as_ref();
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                self.root.join(p)
            }
        });
        self
    }

    /// Skip `WCB_*` environment overrides.
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Find the configuration source.
    ///
    /// Searches in this order:
    /// 1. the explicit file, when it exists
    /// 2. `wcb.toml`, `wcb.config.toml`, `wcb.config.json`
    /// 3. `package.json` with a `wcb` field
    pub fn find(&self) -> ConfigSource {
        if let Some(path) = &self.explicit {
            return if path.is_file() {
                ConfigSource::File(path.clone())
            } else {
                tracing::warn!(
                    "config file {} not found, using defaults",
                    path.display()
                );
                ConfigSource::Defaults
            };
        }

        for name in CONFIG_FILE_NAMES {
            let candidate = self.root.join(name);
            if candidate.is_file() {
                return ConfigSource::File(candidate);
            }
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.is_file() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed
                        .get(PACKAGE_JSON_FIELD)
                        .is_some_and(|field| !field.is_null())
                    {
                        return ConfigSource::PackageJson(pkg_path);
                    }
                }
            }
        }

        ConfigSource::Defaults
    }

    /// Load, validate and root the configuration.
    pub fn load(&self) -> Result<LoadedConfig> {
        let source = self.find();
        let figment = self.figment(&source)?;

        let path = match &source {
            ConfigSource::File(p) | ConfigSource::PackageJson(p) => Some(p.clone()),
            ConfigSource::Defaults => None,
        };

        let config: BuildConfig = figment.extract().map_err(|e| ConfigError::Load {
            path: path.clone(),
            message: e.to_string(),
        })?;
        validate(&config)?;

        // Relative paths in a config file are relative to that file.
        let root = path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        tracing::debug!(?source, root = %root.display(), "configuration loaded");

        Ok(LoadedConfig {
            config: config.rooted_at(&root),
            root,
            source,
        })
    }

    fn figment(&self, source: &ConfigSource) -> Result<Figment> {
        let mut figment = Figment::new();

        match source {
            ConfigSource::Defaults => {}
            ConfigSource::File(path) => {
                figment = match path.extension().and_then(|e| e.to_str()) {
                    Some("toml") => figment.merge(Toml::file_exact(path)),
                    Some("json") => figment.merge(Json::file_exact(path)),
                    _ => return Err(ConfigError::UnsupportedFormat(path.clone())),
                };
            }
            ConfigSource::PackageJson(path) => {
                figment =
                    figment.merge(Figment::from(Json::file_exact(path)).focus(PACKAGE_JSON_FIELD));
            }
        }

        if self.use_env {
            figment = figment.merge(
                Env::prefixed(ENV_PREFIX)
                    .filter(|key| is_config_key(key.as_str()))
                    .split("__"),
            );
        }

        Ok(figment)
    }
}

/// Whether a prefix-stripped variable name targets a configuration field.
///
/// Other `WCB_*` variables (tokens and the like) are left alone instead of
/// failing the strict schema.
fn is_config_key(key: &str) -> bool {
    let head = key.split("__").next().unwrap_or(key);
    CONFIG_KEYS.iter().any(|known| head.eq_ignore_ascii_case(known))
}

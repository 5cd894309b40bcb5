//! Configuration for the web component build pipeline.
//!
//! [`BuildConfig`] is the single value every other part of the workspace
//! reads. [`ConfigDiscovery`] finds and loads it for command-line use;
//! library callers can also build one directly.

pub mod config;
pub mod discovery;
pub mod error;
pub mod validation;

pub use config::*;
pub use discovery::{ConfigDiscovery, ConfigSource, LoadedConfig, CONFIG_FILE_NAMES, ENV_PREFIX};
pub use error::{ConfigError, Result};
pub use validation::validate;

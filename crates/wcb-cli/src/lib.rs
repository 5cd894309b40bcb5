//! wcb CLI - the command-line front end of the web component build pipeline.
//!
//! The binary loads a [`wcb_config::BuildConfig`], hands it to a
//! [`wcb_bundler::Pipeline`] and reports what was written. With `--watch` it
//! keeps running and rebuilds single components as their sources change.
//!
//! # Modules
//!
//! - [`cli`] - argument definitions (clap)
//! - [`commands`] - the build command and its watch follow-up
//! - [`error`] - CLI error types and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines and the build summary
//! - [`watch`] - filesystem watcher and rebuild loop

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;
pub mod watch;

pub use error::{CliError, Result, ResultExt};

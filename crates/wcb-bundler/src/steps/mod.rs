//! The individual build steps.
//!
//! Each step is a plain function over strings and paths; the pipeline decides
//! which ones run and writes their results.

pub mod bundle;
pub mod compat;
pub mod css;
pub mod loader;
pub mod minify;

pub use bundle::{bundle_esm, bundle_iife, BundledCode};
pub use compat::{global_name, lower, validate_target};
pub use css::{process_css, CssOutput};
pub use loader::{render_loader, LoaderContext};
pub use minify::{minify_module, minify_script};

//! Command implementations.
//!
//! wcb has a single command: run the requested tasks, then optionally keep
//! watching. See [`build`].

pub mod build;

pub use build::execute;

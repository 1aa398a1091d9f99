//! This crate contains the logging setup shared between the binaries of the
//! workspace.
pub mod config;
pub mod tracing;

pub use config::Config;

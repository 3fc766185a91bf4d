//! # Muundo command line
//!
//! Library half of the `muundo` binary:
//! - **cli**: argument definitions
//! - **commands**: command dispatch against the store and the asset proxy
//! - **self_test**: storage and export/import self-checks
//! - **tracing**: subscriber setup and log prefixes

pub mod cli;
pub mod commands;
pub mod self_test;
pub mod tracing;

/// Error type returned by commands.
pub type CliError = Box<dyn std::error::Error + Send + Sync>;

pub type CliResult<T> = Result<T, CliError>;

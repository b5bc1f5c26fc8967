//! Quill CLI - API documentation for framework-style JavaScript and SCSS.
//!
//! A thin shell over `quill-docs`:
//!
//! - [`cli`] - Argument definitions (clap)
//! - [`config`] - Layered configuration (figment)
//! - [`commands`] - Input discovery, extraction and JSON output
//! - [`error`] - Error types and miette reporting
//! - [`logger`] - `tracing` subscriber setup
//! - [`ui`] - Status messages on stderr

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use config::QuillConfig;
pub use error::{CliError, ConfigError, Result};

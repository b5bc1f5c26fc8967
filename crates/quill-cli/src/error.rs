//! Error handling for the Quill CLI.
//!
//! Library failures arrive as [`DocsError`] and are wrapped into [`CliError`]
//! together with configuration and output problems. `main` turns the result
//! into a `miette` report, which also gives the nonzero exit status.

use std::path::PathBuf;

use quill_docs::DocsError;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (bad file, bad value)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Extraction failures that abort the whole run
    #[error(transparent)]
    Docs(#[from] DocsError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Input file or directory not found
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Nothing to document after walking the inputs
    #[error("No .js, .css or .scss files found\n\nHint: Pass files or directories, or set `inputs` in quill.toml")]
    NoInputs,

    /// Failure while walking an input directory
    #[error("Failed to walk {}: {error}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        error: walkdir::Error,
    },

    /// Failure writing the output file
    #[error("Failed to write {}: {error}\n\nHint: Check that the directory exists and is writable", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// I/O errors from writing to stdout
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Explicit `--config` file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create a quill.toml file or fix the --config path", .0.display())]
    NotFound(PathBuf),

    /// Config sources could not be merged into a valid configuration
    #[error("{0}\n\nHint: Check quill.toml syntax, QUILL_* variables and field types")]
    Invalid(#[from] Box<figment::Error>),

    /// Effective configuration could not be printed
    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Convert a [`CliError`] to a miette report.
pub fn cli_error_to_miette(err: CliError) -> miette::Report {
    match err {
        CliError::Docs(DocsError::VersionImport { path, message }) => miette::miette!(
            help = "Each --import must point at an existing snapshot JSON file",
            "Failed to import version snapshot {}: {}",
            path.display(),
            message
        ),
        CliError::Docs(DocsError::Io { path, error }) => miette::miette!(
            help = "Check that the file exists and is readable",
            "Failed to read {}: {}",
            path.display(),
            error
        ),
        other => miette::miette!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound(PathBuf::from("quill.toml"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("quill.toml"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_cli_error_from_docs_error() {
        let docs = DocsError::Config {
            message: "unknown warning type 'x'".to_string(),
        };
        let cli: CliError = docs.into();
        assert!(matches!(cli, CliError::Docs(_)));
        assert!(cli.to_string().contains("unknown warning type"));
    }

    #[test]
    fn test_version_import_report_names_the_file() {
        let err = CliError::Docs(DocsError::VersionImport {
            path: PathBuf::from("old/1.0.json"),
            message: "missing".to_string(),
        });
        let report = cli_error_to_miette(err);
        assert!(report.to_string().contains("old/1.0.json"));
    }

    #[test]
    fn test_no_inputs_has_hint() {
        assert!(CliError::NoInputs.to_string().contains("Hint:"));
    }
}

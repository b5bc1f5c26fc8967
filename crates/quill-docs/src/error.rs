use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for extraction and resolution operations.
pub type Result<T> = std::result::Result<T, DocsError>;

/// Error variants for documentation extraction and class-graph resolution.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to read or access a source file.
    #[error("failed to read source '{path}': {error}")]
    Io {
        /// Path to the source file that caused the error.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        error: std::io::Error,
    },

    /// The source could not be scanned at all. Aborts processing of that file only.
    #[error("failed to parse '{path}' at {line}:{column}: {message}")]
    Parse {
        /// Path to the source file.
        path: PathBuf,
        /// One-based line of the first diagnostic.
        line: u32,
        /// One-based column of the first diagnostic.
        column: u32,
        /// Aggregated parser error message.
        message: String,
    },

    /// A historical version snapshot could not be loaded.
    #[error("failed to import version snapshot '{path}': {message}")]
    VersionImport {
        /// Path of the snapshot file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Invalid run configuration.
    #[error("invalid configuration: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
    },

    /// JSON serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DocsError {
    /// Helper to create a parse error from multiple diagnostic strings.
    pub fn parse_error(path: PathBuf, line: u32, column: u32, diagnostics: &[String]) -> Self {
        let message = diagnostics.join("; ");
        Self::Parse {
            path,
            line,
            column,
            message,
        }
    }

    /// Whether the error only affects a single file and the run may continue.
    pub fn is_file_local(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

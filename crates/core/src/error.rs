//! Error types for matrix loading and pipeline generation.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a build matrix or generating pipelines.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A branch was requested that the branch mapping does not declare.
    #[error("Unknown branch: {branch}")]
    #[diagnostic(code(pipegen::core::unknown_branch), help("Known branches: {known}"))]
    UnknownBranch {
        /// The requested branch
        branch: String,
        /// Comma-separated list of declared branches
        known: String,
    },

    /// A platform was requested that the platform mapping does not declare.
    #[error("Unknown platform: {platform}")]
    #[diagnostic(
        code(pipegen::core::unknown_platform),
        help("Known platforms: {known}")
    )]
    UnknownPlatform {
        /// The requested platform image
        platform: String,
        /// Comma-separated list of declared platforms
        known: String,
    },

    /// The matrix is structurally invalid.
    #[error("Invalid build matrix: {message}")]
    #[diagnostic(code(pipegen::core::invalid_matrix))]
    InvalidMatrix {
        /// The error message
        message: String,
    },

    /// A matrix file could not be parsed.
    #[error("Failed to parse {}: {message}", path.display())]
    #[diagnostic(
        code(pipegen::core::config),
        help("Matrix files may be TOML (.toml), YAML (.yaml, .yml) or JSON (.json)")
    )]
    Config {
        /// The file being parsed
        path: PathBuf,
        /// The parser message
        message: String,
    },

    /// Reading a matrix file failed.
    #[error("I/O error on {}: {source}", path.display())]
    #[diagnostic(code(pipegen::core::io))]
    Io {
        /// The path that caused the error
        path: PathBuf,
        /// The underlying source error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an invalid matrix error.
    #[must_use]
    pub fn invalid_matrix(message: impl Into<String>) -> Self {
        Self::InvalidMatrix {
            message: message.into(),
        }
    }

    /// Create a config parse error for the given file.
    #[must_use]
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

//! CI Configuration Emitter Trait
//!
//! Defines the interface for rendering generated pipelines into a CI engine's
//! native configuration format.

use crate::pipeline::Pipeline;
use thiserror::Error;

/// Error types for emitter operations
#[derive(Debug, Error, miette::Diagnostic)]
pub enum EmitterError {
    /// YAML/JSON serialization failed
    #[error("Serialization failed: {0}")]
    #[diagnostic(code(pipegen::emitter::serialization))]
    Serialization(String),

    /// Pipelines violate a constraint of the target format
    #[error("Invalid pipeline '{pipeline}': {message}")]
    #[diagnostic(code(pipegen::emitter::invalid_pipeline))]
    InvalidPipeline {
        /// Name of the offending pipeline
        pipeline: String,
        /// What is wrong with it
        message: String,
    },

    /// IO error during emission
    #[error("IO error: {0}")]
    #[diagnostic(code(pipegen::emitter::io))]
    Io(#[from] std::io::Error),
}

impl EmitterError {
    /// Create an invalid pipeline error
    #[must_use]
    pub fn invalid(pipeline: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPipeline {
            pipeline: pipeline.into(),
            message: message.into(),
        }
    }
}

/// Result type for emitter operations
pub type EmitterResult<T> = std::result::Result<T, EmitterError>;

/// Trait for CI configuration emitters
///
/// # Example
///
/// ```ignore
/// use pipegen_core::emitter::{Emitter, EmitterResult};
/// use pipegen_core::Pipeline;
///
/// struct NamesEmitter;
///
/// impl Emitter for NamesEmitter {
///     fn emit(&self, pipelines: &[Pipeline]) -> EmitterResult<String> {
///         Ok(pipelines.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join("\n"))
///     }
///
///     fn format_name(&self) -> &'static str {
///         "names"
///     }
///
///     fn file_extension(&self) -> &'static str {
///         "txt"
///     }
/// }
/// ```
pub trait Emitter: Send + Sync {
    /// Render the pipelines into a configuration document
    ///
    /// # Errors
    /// Returns `EmitterError` if the pipelines cannot be serialized
    fn emit(&self, pipelines: &[Pipeline]) -> EmitterResult<String>;

    /// Format identifier, used for CLI flag matching
    fn format_name(&self) -> &'static str;

    /// File extension for output files
    fn file_extension(&self) -> &'static str;

    /// Human-readable description of this emitter
    fn description(&self) -> &'static str {
        "CI configuration emitter"
    }

    /// Validate the pipelines before emission
    ///
    /// # Errors
    /// Returns `EmitterError::InvalidPipeline` if validation fails
    fn validate(&self, pipelines: &[Pipeline]) -> EmitterResult<()> {
        let _ = pipelines;
        Ok(())
    }
}

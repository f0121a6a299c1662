//! Command implementations.
//!
//! Every command returns the text to print on stdout; the binary decides how
//! to print it and which exit code to use.

pub mod generate;
pub mod list;
pub mod show;
pub mod validate;

use crate::cli::{CliError, OutputFormat};
use pipegen_core::{BuildMatrix, MatrixSource};
use pipegen_drone::DroneEmitter;
use std::path::{Path, PathBuf};

/// Comment placed above generated YAML
pub const GENERATED_HEADER: &str =
    "Generated by pipegen. Do not edit by hand.\nRegenerate with: pipegen generate --output <file>";

/// An executable command
#[derive(Debug, Clone)]
pub enum Command {
    /// Generate every target
    Generate {
        /// Output encoding
        format: OutputFormat,
        /// Destination file, stdout when absent
        output: Option<PathBuf>,
        /// Compare with `output` instead of writing it
        check: bool,
    },
    /// Generate a single pipeline
    Show {
        /// Branch name
        branch: String,
        /// Platform image
        platform: String,
        /// Output encoding
        format: OutputFormat,
    },
    /// List the matrix
    List {
        /// Emit a JSON envelope
        json: bool,
    },
    /// Validate the matrix and generated pipelines
    Validate,
}

impl Command {
    /// Command name for logging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Generate { .. } => "generate",
            Self::Show { .. } => "show",
            Self::List { .. } => "list",
            Self::Validate => "validate",
        }
    }
}

/// The loaded matrix and where it came from
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Build matrix
    pub matrix: BuildMatrix,
    /// Origin of `matrix`
    pub source: MatrixSource,
}

impl CommandContext {
    /// Resolve and load the matrix.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the matrix file cannot be loaded.
    pub fn load(config: Option<&Path>, dir: &Path) -> Result<Self, CliError> {
        let (matrix, source) = BuildMatrix::discover(config, dir)?;
        tracing::info!(source = %source, "Using build matrix");
        Ok(Self { matrix, source })
    }

    /// Wrap an in-memory matrix
    #[must_use]
    pub fn from_matrix(matrix: BuildMatrix) -> Self {
        Self {
            matrix,
            source: MatrixSource::Builtin,
        }
    }
}

/// Execute a command against a loaded matrix.
///
/// # Errors
///
/// Returns the command's error, already mapped to a [`CliError`].
pub fn execute(command: Command, ctx: &CommandContext) -> Result<String, CliError> {
    let span = tracing::info_span!(
        "command",
        command = command.name(),
        correlation_id = %crate::tracing::correlation_id()
    );
    let _guard = span.enter();

    match command {
        Command::Generate {
            format,
            output,
            check,
        } => generate::execute_generate(ctx, format, output.as_deref(), check),
        Command::Show {
            branch,
            platform,
            format,
        } => show::execute_show(ctx, &branch, &platform, format),
        Command::List { json } => list::execute_list(ctx, json),
        Command::Validate => validate::execute_validate(ctx),
    }
}

/// Emitter configured for the requested output encoding
pub(crate) fn emitter_for(format: OutputFormat) -> DroneEmitter {
    DroneEmitter::new()
        .with_format(format.into())
        .with_header(GENERATED_HEADER)
}

//! `pipegen show`

use super::{CommandContext, emitter_for};
use crate::cli::{CliError, OutputFormat};
use pipegen_core::{Emitter, generator};

/// Render the pipeline for a single branch and platform.
///
/// # Errors
///
/// Returns a configuration error for an unknown branch or platform, or for
/// template settings that would produce a broken pipeline.
pub fn execute_show(
    ctx: &CommandContext,
    branch: &str,
    platform: &str,
    format: OutputFormat,
) -> Result<String, CliError> {
    ctx.matrix.template.validate()?;
    let pipeline = generator::pipeline(&ctx.matrix, branch, platform)?;
    Ok(emitter_for(format).emit(std::slice::from_ref(&pipeline))?)
}

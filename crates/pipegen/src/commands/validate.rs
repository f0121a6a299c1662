//! `pipegen validate`

use super::CommandContext;
use crate::cli::CliError;
use pipegen_core::{Emitter, generator};
use pipegen_drone::DroneEmitter;

/// Validate the matrix, then the pipelines it expands to.
///
/// # Errors
///
/// Returns a configuration error for matrix problems and a generation error
/// for pipelines Drone would reject.
pub fn execute_validate(ctx: &CommandContext) -> Result<String, CliError> {
    let matrix = &ctx.matrix;
    matrix.validate()?;

    let pipelines = generator::generate_all(matrix)?;
    DroneEmitter::new().validate(&pipelines)?;

    Ok(format!(
        "Matrix {} is valid: {} branches, {} platforms, {} pipelines",
        ctx.source,
        matrix.branches.len(),
        matrix.platforms.len(),
        pipelines.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipegen_core::BuildMatrix;

    #[test]
    fn test_builtin_is_valid() {
        let ctx = CommandContext::from_matrix(BuildMatrix::builtin());
        assert_eq!(
            execute_validate(&ctx).unwrap(),
            "Matrix built-in is valid: 2 branches, 7 platforms, 7 pipelines"
        );
    }

    #[test]
    fn test_dangling_target_is_config_error() {
        let mut matrix = BuildMatrix::builtin();
        matrix.platforms.remove("ubuntu:20.04");
        let ctx = CommandContext::from_matrix(matrix);

        assert!(matches!(
            execute_validate(&ctx),
            Err(CliError::Config { .. })
        ));
    }

    #[test]
    fn test_empty_image_is_generation_error() {
        let mut matrix = BuildMatrix::builtin();
        matrix.template.git_image = String::new();
        let ctx = CommandContext::from_matrix(matrix);

        assert!(matches!(
            execute_validate(&ctx),
            Err(CliError::Generate { .. })
        ));
    }
}

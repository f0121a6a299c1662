//! `pipegen generate`

use super::{CommandContext, emitter_for};
use crate::cli::{CliError, OutputFormat};
use pipegen_core::{Emitter, generator};
use similar::TextDiff;
use std::path::Path;

/// Generate every target and print, write or check the result.
///
/// # Errors
///
/// Returns a configuration error if the matrix does not validate, and an
/// error if generation fails, the output cannot be written, or (with
/// `check`) the file on disk differs from the generated content.
pub fn execute_generate(
    ctx: &CommandContext,
    format: OutputFormat,
    output: Option<&Path>,
    check: bool,
) -> Result<String, CliError> {
    ctx.matrix.validate()?;
    let pipelines = generator::generate_all(&ctx.matrix)?;
    let content = emitter_for(format).emit(&pipelines)?;

    let Some(path) = output else {
        if check {
            return Err(CliError::config("--check requires --output"));
        }
        return Ok(content);
    };

    if check {
        return check_file(path, &content).map(|()| format!("{} is up to date", path.display()));
    }

    write_file(path, &content)?;
    Ok(format!(
        "Wrote {} pipelines to {}",
        pipelines.len(),
        path.display()
    ))
}

fn write_file(path: &Path, content: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error("create", parent, &e))?;
    }
    std::fs::write(path, content).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to write output");
        io_error("write", path, &e)
    })?;

    tracing::info!(path = %path.display(), "Generated pipeline configuration");
    Ok(())
}

fn check_file(path: &Path, expected: &str) -> Result<(), CliError> {
    let current = match std::fs::read_to_string(path) {
        Ok(current) => current,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(io_error("read", path, &e)),
    };

    if current == expected {
        tracing::debug!(path = %path.display(), "Generated configuration is up to date");
        return Ok(());
    }

    tracing::warn!(path = %path.display(), "Generated configuration differs from file");
    Err(CliError::Drift {
        message: format!("{} is out of date", path.display()),
        diff: format_unified_diff(&path.display().to_string(), &current, expected),
    })
}

fn format_unified_diff(path: &str, current: &str, expected: &str) -> String {
    let diff = TextDiff::from_lines(current, expected);
    let from = format!("a/{path}");
    let to = format!("b/{path}");
    diff.unified_diff().header(&from, &to).to_string()
}

fn io_error(operation: &str, path: &Path, err: &std::io::Error) -> CliError {
    CliError::other_with_help(
        format!("Failed to {operation} {}: {err}", path.display()),
        "Check file permissions and ensure the path exists",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipegen_core::BuildMatrix;
    use tempfile::TempDir;

    fn ctx() -> CommandContext {
        CommandContext::from_matrix(BuildMatrix::builtin())
    }

    #[test]
    fn test_generate_to_stdout() {
        let out = execute_generate(&ctx(), OutputFormat::Yaml, None, false).unwrap();
        assert!(out.starts_with("# Generated by pipegen."));
        assert_eq!(out.matches("kind: pipeline").count(), 7);
    }

    #[test]
    fn test_generate_writes_then_checks_clean() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ci").join(".drone.yml");

        let msg = execute_generate(&ctx(), OutputFormat::Yaml, Some(&path), false).unwrap();
        assert!(msg.starts_with("Wrote 7 pipelines to"));
        assert!(path.is_file());

        let msg = execute_generate(&ctx(), OutputFormat::Yaml, Some(&path), true).unwrap();
        assert!(msg.ends_with("is up to date"));
    }

    #[test]
    fn test_check_reports_drift_with_diff() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".drone.yml");
        execute_generate(&ctx(), OutputFormat::Yaml, Some(&path), false).unwrap();

        let mut matrix = BuildMatrix::builtin();
        matrix.template.clone_depth = 1;
        let ctx = CommandContext::from_matrix(matrix);

        match execute_generate(&ctx, OutputFormat::Yaml, Some(&path), true) {
            Err(CliError::Drift { diff, .. }) => {
                assert!(diff.contains("-  depth: 10"));
                assert!(diff.contains("+  depth: 1"));
            }
            other => panic!("expected drift, got {other:?}"),
        }
    }

    #[test]
    fn test_check_missing_file_is_drift() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".drone.yml");
        assert!(matches!(
            execute_generate(&ctx(), OutputFormat::Json, Some(&path), true),
            Err(CliError::Drift { .. })
        ));
    }

    #[test]
    fn test_invalid_matrix_is_rejected_before_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".drone.yml");

        let mut matrix = BuildMatrix::builtin();
        matrix.template.clone_depth = 0;
        let ctx = CommandContext::from_matrix(matrix);
        assert!(matches!(
            execute_generate(&ctx, OutputFormat::Yaml, Some(&path), false),
            Err(CliError::Config { .. })
        ));
        assert!(!path.exists());

        let mut matrix = BuildMatrix::builtin();
        matrix.template.mount_path = "mdb".to_string();
        if let Some(entry) = matrix.branches.get_mut("develop") {
            entry.checkout = String::new();
        }
        let ctx = CommandContext::from_matrix(matrix);
        assert!(matches!(
            execute_generate(&ctx, OutputFormat::Yaml, None, false),
            Err(CliError::Config { .. })
        ));
    }

    #[test]
    fn test_duplicate_target_is_config_error() {
        let mut matrix = BuildMatrix::builtin();
        if let Some(entry) = matrix.branches.get_mut("develop-1.4") {
            entry.platforms.push("centos:7".to_string());
        }
        let ctx = CommandContext::from_matrix(matrix);

        match execute_generate(&ctx, OutputFormat::Yaml, None, false) {
            Err(CliError::Config { message, .. }) => assert!(message.contains("more than once")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_check_without_output_is_config_error() {
        assert!(matches!(
            execute_generate(&ctx(), OutputFormat::Yaml, None, true),
            Err(CliError::Config { .. })
        ));
    }
}

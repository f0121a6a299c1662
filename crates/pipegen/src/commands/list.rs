//! `pipegen list`

use super::CommandContext;
use crate::cli::{CliError, OkEnvelope};
use pipegen_core::Target;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Serialize)]
struct MatrixListing<'a> {
    source: String,
    branches: Vec<&'a str>,
    platforms: Vec<&'a str>,
    targets: Vec<Target>,
}

/// Describe the matrix's branches, platforms and targets.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn execute_list(ctx: &CommandContext, json: bool) -> Result<String, CliError> {
    let matrix = &ctx.matrix;
    let listing = MatrixListing {
        source: ctx.source.to_string(),
        branches: matrix.branches.keys().map(String::as_str).collect(),
        platforms: matrix.platforms.keys().map(String::as_str).collect(),
        targets: matrix.targets(),
    };

    if json {
        return serde_json::to_string_pretty(&OkEnvelope::new(listing))
            .map_err(|e| CliError::generate(format!("Failed to serialize listing: {e}")));
    }

    let mut out = String::new();
    let _ = writeln!(out, "Matrix: {}", listing.source);
    let _ = writeln!(out, "\nBranches:");
    for (name, entry) in &matrix.branches {
        let _ = writeln!(out, "  {name:<16} {}", entry.checkout);
    }
    let _ = writeln!(out, "\nPlatforms:");
    for (name, entry) in &matrix.platforms {
        let artifacts = entry.artifacts.as_deref().unwrap_or("-");
        let _ = writeln!(out, "  {name:<16} {artifacts}");
    }
    let _ = writeln!(out, "\nTargets ({}):", listing.targets.len());
    for target in &listing.targets {
        let _ = writeln!(out, "  {target}");
    }

    Ok(out)
}

//! Pipeline generator
//!
//! Expands one (branch, platform) pair into a [`Pipeline`] using a fixed
//! three-step template:
//!
//! 1. `submodules` - refresh this repository's submodules
//! 2. `clone-mdb` - clone the host server tree into the shared volume and
//!    replace its plugin directory with a symlink to this repository
//! 3. `build` - install dependencies, build packages, list the artifacts
//!
//! Steps run sequentially; the shared volume carries the server tree from
//! `clone-mdb` into `build`.

use crate::error::Result;
use crate::matrix::{BuildMatrix, Target};
use crate::pipeline::{CloneSettings, EnvValue, Pipeline, Step, Trigger, Volume};

/// Step names in execution order
pub const STEP_NAMES: [&str; 3] = [SUBMODULES_STEP, CLONE_STEP, BUILD_STEP];
/// Submodule refresh step
pub const SUBMODULES_STEP: &str = "submodules";
/// Host tree clone step
pub const CLONE_STEP: &str = "clone-mdb";
/// Build and package step
pub const BUILD_STEP: &str = "build";

/// Generate the pipeline for one branch on one platform.
///
/// # Errors
///
/// Returns [`crate::Error::UnknownBranch`] or [`crate::Error::UnknownPlatform`]
/// when either key is missing from the matrix.
pub fn pipeline(matrix: &BuildMatrix, branch: &str, platform: &str) -> Result<Pipeline> {
    let branch_entry = matrix.branch(branch)?;
    let platform_entry = matrix.platform(platform)?;
    let settings = &matrix.template;
    let work_dir = settings.work_dir();

    let submodules = Step::new(SUBMODULES_STEP, &settings.git_image)
        .with_command("git submodule update --init --recursive")
        .with_command("git config cmake.update-submodules no");

    let clone = Step::new(CLONE_STEP, &settings.git_image)
        .with_mount(&settings.volume, &settings.mount_path)
        .with_env(&settings.token_env, EnvValue::secret(&settings.token_secret))
        .with_command(format!("mkdir -p {work_dir} && cd {work_dir}"))
        .with_command(&branch_entry.checkout)
        .with_command("git config cmake.update-submodules no")
        .with_command(format!("rm -rf {}", settings.plugin_path))
        .with_command(format!(
            "ln -s {} {work_dir}/{}",
            settings.source_dir, settings.plugin_path
        ));

    let mut build = Step::new(BUILD_STEP, platform)
        .with_mount(&settings.volume, &settings.mount_path)
        .with_command(format!("cd {work_dir}"))
        .with_command(&platform_entry.build);
    for (key, value) in settings.build_env.iter().chain(&platform_entry.env) {
        build = build.with_env(key, EnvValue::literal(value));
    }
    if let Some(artifacts) = &platform_entry.artifacts {
        build = build.with_command(format!("ls -l {artifacts}"));
    }

    tracing::debug!(branch, platform, "Generated pipeline");

    Ok(Pipeline {
        kind: "pipeline".to_string(),
        pipeline_type: "docker".to_string(),
        name: Target::new(branch, platform).to_string(),
        clone: CloneSettings {
            depth: settings.clone_depth,
        },
        steps: vec![submodules, clone, build],
        volumes: vec![Volume::temp(&settings.volume)],
        trigger: Trigger {
            branch: vec![branch.to_string()],
            event: settings.events.clone(),
        },
    })
}

/// Generate one pipeline per target, in [`BuildMatrix::targets`] order.
///
/// # Errors
///
/// Returns the first lookup error encountered.
pub fn generate_all(matrix: &BuildMatrix) -> Result<Vec<Pipeline>> {
    let pipelines = matrix
        .targets()
        .iter()
        .map(|target| pipeline(matrix, &target.branch, &target.platform))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(count = pipelines.len(), "Generated pipelines");
    Ok(pipelines)
}

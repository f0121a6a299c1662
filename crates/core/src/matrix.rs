//! Build matrix configuration
//!
//! A [`BuildMatrix`] holds the two lookup tables the generator works from:
//! branch name to checkout command, and platform image to build command.
//! Each branch also lists the platforms it is built on; those (branch,
//! platform) pairs are the [`Target`]s that expand into pipelines.
//!
//! Matrices come from the built-in tables ([`BuildMatrix::builtin`]) or from a
//! TOML, YAML or JSON file which replaces them entirely.

use crate::defaults;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default matrix file name looked up in the working directory
pub const DEFAULT_MATRIX_FILE: &str = "pipegen.toml";

/// The complete set of tables a pipeline is generated from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildMatrix {
    /// Settings shared by every generated pipeline
    #[serde(default)]
    pub template: TemplateSettings,

    /// Branch mapping
    pub branches: BTreeMap<String, BranchEntry>,

    /// Platform mapping
    pub platforms: BTreeMap<String, PlatformEntry>,
}

/// A branch of the plugin and the external source tree it builds against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchEntry {
    /// Shell command cloning the host source tree into the current directory
    pub checkout: String,

    /// Platforms this branch is built on, in pipeline order
    #[serde(default)]
    pub platforms: Vec<String>,
}

/// A container image and the command that builds packages inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformEntry {
    /// Shell command installing dependencies and running the native build
    pub build: String,

    /// Glob matching the produced packages, listed after the build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<String>,

    /// Extra environment for the build step
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// Settings applied to every pipeline the template produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateSettings {
    /// Directory (under `mount_path`) the host source tree is cloned into
    pub build_dir: String,
    /// Clone depth for the plugin repository
    pub clone_depth: u32,
    /// Image used for the git steps
    pub git_image: String,
    /// Name of the shared volume
    pub volume: String,
    /// Mount point of the shared volume
    pub mount_path: String,
    /// Where the CI engine checks out this repository
    pub source_dir: String,
    /// Path inside the host tree the plugin is spliced into
    pub plugin_path: String,
    /// CI secret holding the source host token
    pub token_secret: String,
    /// Environment variable the token secret is exposed as
    pub token_env: String,
    /// Trigger events (any event when empty)
    pub events: Vec<String>,
    /// Environment applied to every build step
    pub build_env: BTreeMap<String, String>,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            build_dir: defaults::BUILD_DIR.to_string(),
            clone_depth: defaults::CLONE_DEPTH,
            git_image: defaults::GIT_IMAGE.to_string(),
            volume: defaults::VOLUME.to_string(),
            mount_path: defaults::MOUNT_PATH.to_string(),
            source_dir: defaults::SOURCE_DIR.to_string(),
            plugin_path: defaults::PLUGIN_PATH.to_string(),
            token_secret: defaults::TOKEN_SECRET.to_string(),
            token_env: defaults::TOKEN_ENV.to_string(),
            events: Vec::new(),
            build_env: BTreeMap::new(),
        }
    }
}

impl TemplateSettings {
    /// Check the settings every pipeline is built from.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMatrix`] for a zero clone depth, a relative
    /// mount path, or an empty build directory or plugin path.
    pub fn validate(&self) -> Result<()> {
        if self.clone_depth == 0 {
            return Err(Error::invalid_matrix("template.clone_depth must be at least 1"));
        }
        if !self.mount_path.starts_with('/') {
            return Err(Error::invalid_matrix(format!(
                "template.mount_path must be absolute, got '{}'",
                self.mount_path
            )));
        }
        if self.build_dir.trim_matches('/').trim().is_empty() {
            return Err(Error::invalid_matrix("template.build_dir must not be empty"));
        }
        if self.plugin_path.trim_matches('/').trim().is_empty() {
            return Err(Error::invalid_matrix("template.plugin_path must not be empty"));
        }
        Ok(())
    }

    /// Absolute path of the host source tree inside the shared volume
    #[must_use]
    pub fn work_dir(&self) -> String {
        format!(
            "{}/{}",
            self.mount_path.trim_end_matches('/'),
            self.build_dir.trim_matches('/')
        )
    }
}

/// One (branch, platform) pair
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Target {
    /// Branch name
    pub branch: String,
    /// Platform image
    pub platform: String,
}

impl Target {
    /// Create a new target
    pub fn new(branch: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            platform: platform.into(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.branch, self.platform)
    }
}

/// Where a matrix was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixSource {
    /// Compiled-in tables
    Builtin,
    /// A matrix file
    File(PathBuf),
}

impl fmt::Display for MatrixSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "built-in"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl BuildMatrix {
    /// The compiled-in matrix
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            template: TemplateSettings::default(),
            branches: defaults::branches(),
            platforms: defaults::platforms(),
        }
    }

    /// Resolve the matrix to use.
    ///
    /// An explicit path wins; otherwise `pipegen.toml` in `dir` is used when it
    /// exists; otherwise the built-in tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<(Self, MatrixSource)> {
        if let Some(path) = explicit {
            return Ok((Self::from_path(path)?, MatrixSource::File(path.to_path_buf())));
        }

        let candidate = dir.join(DEFAULT_MATRIX_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "Found matrix file");
            return Ok((Self::from_path(&candidate)?, MatrixSource::File(candidate)));
        }

        tracing::debug!("No matrix file found, using built-in tables");
        Ok((Self::builtin(), MatrixSource::Builtin))
    }

    /// Load a matrix file, choosing the parser from the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unsupported
    /// extension, or does not parse.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let matrix = match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&content),
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(format!(
                "unsupported extension {}",
                other.map_or_else(|| "(none)".to_string(), |e| format!(".{e}"))
            )),
        }
        .map_err(|message| Error::config(path, message))?;

        tracing::debug!(
            path = %path.display(),
            branches = matrix.branches.len(),
            platforms = matrix.platforms.len(),
            "Loaded matrix file"
        );
        Ok(matrix)
    }

    fn from_toml_str(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    fn from_yaml_str(content: &str) -> std::result::Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    fn from_json_str(content: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    /// Look up a branch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBranch`] if the branch is not declared.
    pub fn branch(&self, branch: &str) -> Result<&BranchEntry> {
        self.branches
            .get(branch)
            .ok_or_else(|| Error::UnknownBranch {
                branch: branch.to_string(),
                known: join_keys(self.branches.keys()),
            })
    }

    /// Look up a platform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPlatform`] if the platform is not declared.
    pub fn platform(&self, platform: &str) -> Result<&PlatformEntry> {
        self.platforms
            .get(platform)
            .ok_or_else(|| Error::UnknownPlatform {
                platform: platform.to_string(),
                known: join_keys(self.platforms.keys()),
            })
    }

    /// Every (branch, platform) pair, branches sorted, platforms in declared order
    #[must_use]
    pub fn targets(&self) -> Vec<Target> {
        self.branches
            .iter()
            .flat_map(|(branch, entry)| {
                entry
                    .platforms
                    .iter()
                    .map(move |platform| Target::new(branch.clone(), platform.clone()))
            })
            .collect()
    }

    /// Check the matrix for structural problems.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPlatform`] when a branch targets an undeclared
    /// platform and [`Error::InvalidMatrix`] for every other problem.
    pub fn validate(&self) -> Result<()> {
        if self.branches.is_empty() {
            return Err(Error::invalid_matrix("no branches declared"));
        }
        if self.platforms.is_empty() {
            return Err(Error::invalid_matrix("no platforms declared"));
        }
        self.template.validate()?;

        for (name, entry) in &self.branches {
            if entry.checkout.trim().is_empty() {
                return Err(Error::invalid_matrix(format!(
                    "branch '{name}' has an empty checkout command"
                )));
            }

            let mut seen = BTreeSet::new();
            for platform in &entry.platforms {
                self.platform(platform)?;
                if !seen.insert(platform.as_str()) {
                    return Err(Error::invalid_matrix(format!(
                        "branch '{name}' lists platform '{platform}' more than once"
                    )));
                }
            }
        }

        for (name, entry) in &self.platforms {
            if entry.build.trim().is_empty() {
                return Err(Error::invalid_matrix(format!(
                    "platform '{name}' has an empty build command"
                )));
            }
        }

        if self.targets().is_empty() {
            tracing::warn!("Build matrix has no targets; no pipelines will be generated");
        }

        Ok(())
    }
}

fn join_keys<'a>(keys: impl Iterator<Item = &'a String>) -> String {
    keys.map(String::as_str).collect::<Vec<_>>().join(", ")
}

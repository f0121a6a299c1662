use crate::commands::Command;
use clap::{Parser, Subcommand, ValueEnum};
use miette::{Diagnostic, Report};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// Generated output differs from the file on disk
pub const EXIT_DRIFT: i32 = 1;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Generation or emission error exit code
pub const EXIT_GENERATE: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(pipegen::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Pipeline generation or emission error (exit code 3)
    #[error("Generation error: {message}")]
    #[diagnostic(code(pipegen::cli::generate))]
    Generate {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Checked-in configuration is out of date (exit code 1)
    #[error("{message}")]
    #[diagnostic(
        code(pipegen::cli::drift),
        help("Run `pipegen generate --output <file>` to regenerate it")
    )]
    Drift {
        /// The error message
        message: String,
        /// Unified diff from the file on disk to the generated content
        diff: String,
    },
    /// Other unexpected error (exit code 3)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(pipegen::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new generation error
    #[must_use]
    pub fn generate(message: impl Into<String>) -> Self {
        Self::Generate {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new other error with help text
    #[must_use]
    pub fn other_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

/// Convert `pipegen_core::Error` to the matching `CliError` variant.
///
/// Lookup and matrix problems are configuration errors (exit code 2); I/O
/// failures are unexpected (exit code 3).
impl From<pipegen_core::Error> for CliError {
    fn from(err: pipegen_core::Error) -> Self {
        use pipegen_core::Error;

        let help = err.help().map(|h| h.to_string());
        match err {
            Error::UnknownBranch { .. }
            | Error::UnknownPlatform { .. }
            | Error::InvalidMatrix { .. }
            | Error::Config { .. } => Self::Config {
                message: err.to_string(),
                help,
            },
            Error::Io { path, source } => Self::other_with_help(
                format!("I/O failed on {}: {source}", path.display()),
                "Check file permissions and ensure the path exists",
            ),
        }
    }
}

impl From<pipegen_core::EmitterError> for CliError {
    fn from(err: pipegen_core::EmitterError) -> Self {
        Self::generate(err.to_string())
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Drift { .. } => EXIT_DRIFT,
        CliError::Config { .. } => EXIT_CLI,
        CliError::Generate { .. } | CliError::Other { .. } => EXIT_GENERATE,
    }
}

/// Render error appropriately based on JSON flag
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let mut details = serde_json::json!({
            "code": match err {
                CliError::Config { .. } => "config",
                CliError::Generate { .. } => "generate",
                CliError::Drift { .. } => "drift",
                CliError::Other { .. } => "other",
            },
            "message": err.to_string()
        });
        if let CliError::Drift { diff, .. } = err {
            details["diff"] = serde_json::Value::String(diff.clone());
        }

        match serde_json::to_string(&ErrorEnvelope::new(details)) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        if let CliError::Drift { diff, .. } = err {
            eprint!("{diff}");
        }
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Output format for generated configuration
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum, Default)]
pub enum OutputFormat {
    /// Multi-document YAML (`.drone.yml`)
    #[default]
    Yaml,
    /// JSON array of pipelines
    Json,
}

impl From<OutputFormat> for pipegen_drone::DroneFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => Self::Yaml,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Generate Drone pipelines for a branch × platform build matrix.
#[derive(Parser, Debug)]
#[command(name = "pipegen")]
#[command(about = "Generate Drone build-matrix pipelines for plugin packages")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: crate::tracing::LogLevel,

    /// Log output format.
    #[arg(long, global = true, default_value = "compact", value_enum)]
    pub log_format: crate::tracing::TracingFormat,

    /// Tracing filter directive, overriding `--level` and `RUST_LOG`.
    #[arg(
        long,
        global = true,
        help = "Tracing filter directive, e.g. pipegen_core=trace"
    )]
    pub log_filter: Option<String>,

    /// Emit JSON envelopes for listings and errors.
    #[arg(long, global = true, help = "Emit JSON envelope for listings and errors")]
    pub json: bool,

    /// Build matrix file (TOML, YAML or JSON).
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "PIPEGEN_CONFIG",
        help = "Build matrix file; defaults to ./pipegen.toml, then the built-in matrix"
    )]
    pub config: Option<PathBuf>,

    /// Directory searched for `pipegen.toml`.
    #[arg(long, short = 'C', global = true, default_value = ".")]
    pub dir: PathBuf,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate pipelines for every target in the matrix.
    #[command(about = "Generate pipelines for every target in the matrix")]
    Generate {
        /// Output encoding.
        #[arg(long, short = 'f', default_value = "yaml", value_enum)]
        format: OutputFormat,

        /// Write to this file instead of stdout.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Fail if the output file differs from the generated content.
        #[arg(long, requires = "output")]
        check: bool,
    },

    /// Generate the pipeline for one branch and platform.
    #[command(about = "Generate the pipeline for one branch and platform")]
    Show {
        /// Branch name
        branch: String,

        /// Platform image
        platform: String,

        /// Output encoding.
        #[arg(long, short = 'f', default_value = "yaml", value_enum)]
        format: OutputFormat,
    },

    /// List branches, platforms and targets.
    #[command(about = "List branches, platforms and targets")]
    List,

    /// Validate the matrix and the generated pipelines.
    #[command(about = "Validate the matrix and the generated pipelines")]
    Validate,
}

impl Cli {
    /// Convert parsed arguments into an executable command
    #[must_use]
    pub fn into_command(self) -> Command {
        match self.command {
            Commands::Generate {
                format,
                output,
                check,
            } => Command::Generate {
                format,
                output,
                check,
            },
            Commands::Show {
                branch,
                platform,
                format,
            } => Command::Show {
                branch,
                platform,
                format,
            },
            Commands::List => Command::List { json: self.json },
            Commands::Validate => Command::Validate,
        }
    }
}

/// Parse command line arguments
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&CliError::config("bad")), EXIT_CLI);
        assert_eq!(exit_code_for(&CliError::generate("bad")), EXIT_GENERATE);
        assert_eq!(
            exit_code_for(&CliError::Drift {
                message: "stale".to_string(),
                diff: String::new(),
            }),
            EXIT_DRIFT
        );
    }

    #[test]
    fn test_unknown_branch_maps_to_config_with_help() {
        let err = CliError::from(pipegen_core::Error::UnknownBranch {
            branch: "main".to_string(),
            known: "develop".to_string(),
        });
        match err {
            CliError::Config { message, help } => {
                assert_eq!(message, "Unknown branch: main");
                assert_eq!(help.as_deref(), Some("Known branches: develop"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_generate_check() {
        let cli = Cli::try_parse_from([
            "pipegen", "generate", "--format", "json", "-o", ".drone.json", "--check",
        ])
        .unwrap();
        match cli.into_command() {
            Command::Generate {
                format,
                output,
                check,
            } => {
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(output, Some(PathBuf::from(".drone.json")));
                assert!(check);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_log_filter() {
        let cli = Cli::try_parse_from([
            "pipegen",
            "list",
            "--log-filter",
            "pipegen_core=trace",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_filter.as_deref(), Some("pipegen_core=trace"));
        assert_eq!(cli.log_format, crate::tracing::TracingFormat::Json);

        let cli = Cli::try_parse_from(["pipegen", "list"]).unwrap();
        assert!(cli.log_filter.is_none());
    }

    #[test]
    fn test_check_requires_output() {
        assert!(Cli::try_parse_from(["pipegen", "generate", "--check"]).is_err());
    }

    #[test]
    fn test_config_from_environment() {
        temp_env::with_var("PIPEGEN_CONFIG", Some("/etc/pipegen/matrix.yml"), || {
            let cli = Cli::try_parse_from(["pipegen", "list"]).unwrap();
            assert_eq!(cli.config, Some(PathBuf::from("/etc/pipegen/matrix.yml")));
        });
        temp_env::with_var_unset("PIPEGEN_CONFIG", || {
            let cli = Cli::try_parse_from(["pipegen", "--json", "list"]).unwrap();
            assert!(cli.config.is_none());
            assert!(matches!(cli.into_command(), Command::List { json: true }));
        });
    }
}

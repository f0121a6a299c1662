//! pipegen CLI Application
//!
//! Generates Drone pipeline configuration from a build matrix.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use pipegen::cli::{self, CliError, EXIT_OK, exit_code_for, render_error};
use pipegen::commands::{self, CommandContext};
use pipegen::tracing::{TracingConfig, init_tracing};

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing
    // may not be initialized yet when a panic happens.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    let json = cli.json;

    let tracing_config = TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
        filter: cli.log_filter.clone(),
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("Warning: {e}");
    }

    let code = match run(cli) {
        Ok(output) => {
            if !output.is_empty() {
                if output.ends_with('\n') {
                    print!("{output}");
                } else {
                    println!("{output}");
                }
            }
            EXIT_OK
        }
        Err(err) => {
            render_error(&err, json);
            exit_code_for(&err)
        }
    };

    std::process::exit(code);
}

fn run(cli: cli::Cli) -> Result<String, CliError> {
    let ctx = CommandContext::load(cli.config.as_deref(), &cli.dir)?;
    commands::execute(cli.into_command(), &ctx)
}

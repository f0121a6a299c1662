//! pipegen - build-matrix pipeline generator
//!
//! Expands a branch × platform build matrix into Drone pipelines that build
//! installable packages of a storage-engine plugin against host server
//! sources.
//!
//! The binary is a thin wrapper: [`cli`] parses arguments, [`commands`]
//! loads the matrix and produces output, [`tracing`] sets up logging.

// CLI rendering writes to stdout/stderr directly
#![allow(clippy::print_stdout, clippy::print_stderr)]

/// CLI argument parsing, errors and exit codes.
pub mod cli;
/// Command implementations.
pub mod commands;
/// Tracing configuration.
pub mod tracing;

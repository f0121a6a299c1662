//! # pipegen-core
//!
//! Build matrix tables and the pipeline generator.
//!
//! A [`BuildMatrix`] maps branches to checkout commands and platform images
//! to build commands. [`generator::pipeline`] expands one (branch, platform)
//! pair into a [`Pipeline`] record; [`generator::generate_all`] expands every
//! target the matrix declares. Rendering records into a CI engine's format is
//! the job of an [`Emitter`].
//!
//! ```ignore
//! use pipegen_core::{BuildMatrix, generator};
//!
//! let matrix = BuildMatrix::builtin();
//! let pipeline = generator::pipeline(&matrix, "develop-1.4", "centos:7")?;
//! assert_eq!(pipeline.trigger.branch, vec!["develop-1.4"]);
//! ```

pub mod defaults;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod matrix;
pub mod pipeline;

pub use emitter::{Emitter, EmitterError, EmitterResult};
pub use error::{Error, Result};
pub use matrix::{BuildMatrix, MatrixSource, Target, TemplateSettings};
pub use pipeline::{EnvValue, Pipeline, Step};

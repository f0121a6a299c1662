//! Drone CI Pipeline Emitter for pipegen
//!
//! Renders generated [`Pipeline`](pipegen_core::Pipeline) records as a
//! `.drone.yml` (one YAML document per pipeline) or as a JSON array, the
//! shape a `.drone.jsonnet` evaluation produces.
//!
//! # Example
//!
//! ```ignore
//! use pipegen_core::{BuildMatrix, Emitter, generator};
//! use pipegen_drone::DroneEmitter;
//!
//! let pipelines = generator::generate_all(&BuildMatrix::builtin())?;
//! let yaml = DroneEmitter::new().emit(&pipelines)?;
//! ```
//!
//! # Record to Drone Mapping
//!
//! | Record field | Drone YAML |
//! |--------------|------------|
//! | `pipeline_type` | `type` |
//! | `clone.depth` | `clone: { depth }` |
//! | `step.environment` secret | `{ from_secret: name }` |
//! | `volumes[].temp` | `temp: {}` |
//! | `trigger.branch` | `trigger: { branch: [...] }` |

pub mod emitter;

pub use emitter::{DroneEmitter, DroneFormat};

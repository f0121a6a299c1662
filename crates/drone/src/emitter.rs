//! Drone Pipeline Emitter
//!
//! Transforms generated pipeline records into Drone configuration.

use pipegen_core::emitter::{Emitter, EmitterError, EmitterResult};
use pipegen_core::Pipeline;
use std::collections::HashSet;

/// Output encoding for Drone configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DroneFormat {
    /// Multi-document YAML (`.drone.yml`)
    #[default]
    Yaml,
    /// A JSON array of pipelines
    Json,
}

/// Drone pipeline emitter
#[derive(Debug, Clone, Default)]
pub struct DroneEmitter {
    /// Output encoding
    pub format: DroneFormat,
    /// Comment written above the first YAML document
    pub header: Option<String>,
}

impl DroneEmitter {
    /// Create a new Drone emitter producing YAML
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the output encoding
    #[must_use]
    pub const fn with_format(mut self, format: DroneFormat) -> Self {
        self.format = format;
        self
    }

    /// Prefix YAML output with a comment block. Ignored for JSON.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    fn emit_yaml(&self, pipelines: &[Pipeline]) -> EmitterResult<String> {
        let mut out = String::new();

        if let Some(header) = &self.header {
            for line in header.lines() {
                if line.is_empty() {
                    out.push_str("#\n");
                } else {
                    out.push_str("# ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }

        for pipeline in pipelines {
            let doc = serde_yaml::to_string(pipeline)
                .map_err(|e| EmitterError::Serialization(e.to_string()))?;
            out.push_str("---\n");
            out.push_str(&doc);
        }

        Ok(out)
    }

    fn emit_json(pipelines: &[Pipeline]) -> EmitterResult<String> {
        let mut json = serde_json::to_string_pretty(pipelines)
            .map_err(|e| EmitterError::Serialization(e.to_string()))?;
        json.push('\n');
        Ok(json)
    }
}

impl Emitter for DroneEmitter {
    fn emit(&self, pipelines: &[Pipeline]) -> EmitterResult<String> {
        self.validate(pipelines)?;

        tracing::debug!(
            count = pipelines.len(),
            format = ?self.format,
            "Emitting Drone configuration"
        );

        match self.format {
            DroneFormat::Yaml => self.emit_yaml(pipelines),
            DroneFormat::Json => Self::emit_json(pipelines),
        }
    }

    fn format_name(&self) -> &'static str {
        "drone"
    }

    fn file_extension(&self) -> &'static str {
        match self.format {
            DroneFormat::Yaml => "yml",
            DroneFormat::Json => "json",
        }
    }

    fn description(&self) -> &'static str {
        "Drone CI pipeline configuration"
    }

    fn validate(&self, pipelines: &[Pipeline]) -> EmitterResult<()> {
        let mut names = HashSet::new();

        for pipeline in pipelines {
            if pipeline.name.trim().is_empty() {
                return Err(EmitterError::invalid(
                    &pipeline.name,
                    "pipeline name must not be empty",
                ));
            }
            if !names.insert(pipeline.name.as_str()) {
                return Err(EmitterError::invalid(
                    &pipeline.name,
                    "pipeline name is used more than once",
                ));
            }
            if pipeline.steps.is_empty() {
                return Err(EmitterError::invalid(&pipeline.name, "pipeline has no steps"));
            }
            if pipeline.trigger.branch.is_empty() {
                return Err(EmitterError::invalid(
                    &pipeline.name,
                    "trigger must name at least one branch",
                ));
            }

            let volumes: HashSet<&str> = pipeline.volumes.iter().map(|v| v.name.as_str()).collect();
            let mut steps = HashSet::new();

            for step in &pipeline.steps {
                if !steps.insert(step.name.as_str()) {
                    return Err(EmitterError::invalid(
                        &pipeline.name,
                        format!("step '{}' is declared more than once", step.name),
                    ));
                }
                if step.image.trim().is_empty() {
                    return Err(EmitterError::invalid(
                        &pipeline.name,
                        format!("step '{}' has no image", step.name),
                    ));
                }
                if let Some(mount) = step.volumes.iter().find(|m| !volumes.contains(m.name.as_str())) {
                    return Err(EmitterError::invalid(
                        &pipeline.name,
                        format!(
                            "step '{}' mounts undeclared volume '{}'",
                            step.name, mount.name
                        ),
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipegen_core::generator::{generate_all, pipeline};
    use pipegen_core::pipeline::Step;
    use pipegen_core::BuildMatrix;

    fn enterprise_centos7() -> Pipeline {
        pipeline(&BuildMatrix::builtin(), "develop-1.4", "centos:7").unwrap()
    }

    #[test]
    fn test_simple_pipeline() {
        let yaml = DroneEmitter::new().emit(&[enterprise_centos7()]).unwrap();

        assert!(yaml.starts_with("---\nkind: pipeline\ntype: docker\nname: develop-1.4 centos:7\n"));
        assert!(yaml.contains("clone:\n  depth: 10\n"));
        assert!(yaml.contains("from_secret: github_token"));
        assert!(yaml.contains("temp: {}"));
        assert!(yaml.contains("trigger:\n  branch:\n  - develop-1.4\n"));
    }

    #[test]
    fn test_one_document_per_pipeline() {
        let pipelines = generate_all(&BuildMatrix::builtin()).unwrap();
        let yaml = DroneEmitter::new().emit(&pipelines).unwrap();

        assert_eq!(yaml.matches("---\n").count(), pipelines.len());
        assert_eq!(yaml.matches("kind: pipeline").count(), pipelines.len());
    }

    #[test]
    fn test_header_is_commented() {
        let yaml = DroneEmitter::new()
            .with_header("Generated by pipegen.\n\nDo not edit.")
            .emit(&[enterprise_centos7()])
            .unwrap();

        assert!(yaml.starts_with("# Generated by pipegen.\n#\n# Do not edit.\n---\n"));
    }

    #[test]
    fn test_json_array() {
        let emitter = DroneEmitter::new()
            .with_format(DroneFormat::Json)
            .with_header("ignored");
        let json = emitter.emit(&[enterprise_centos7()]).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert_eq!(value[0]["type"], "docker");
        assert_eq!(value[0]["steps"][1]["name"], "clone-mdb");
        assert!(!json.contains("ignored"));
        assert_eq!(emitter.file_extension(), "json");
    }

    #[test]
    fn test_format_name() {
        let emitter = DroneEmitter::new();
        assert_eq!(emitter.format_name(), "drone");
        assert_eq!(emitter.file_extension(), "yml");
    }

    #[test]
    fn test_validation_duplicate_pipeline_name() {
        let p = enterprise_centos7();
        let result = DroneEmitter::new().emit(&[p.clone(), p]);
        assert!(matches!(result, Err(EmitterError::InvalidPipeline { .. })));
    }

    #[test]
    fn test_validation_duplicate_step() {
        let mut p = enterprise_centos7();
        p.steps.push(Step::new("build", "centos:7").with_command("true"));

        let err = DroneEmitter::new().validate(&[p]).unwrap_err();
        assert!(err.to_string().contains("step 'build' is declared more than once"));
    }

    #[test]
    fn test_validation_undeclared_volume() {
        let mut p = enterprise_centos7();
        p.volumes.clear();

        let err = DroneEmitter::new().validate(&[p]).unwrap_err();
        assert!(err.to_string().contains("undeclared volume 'mdb'"));
    }

    #[test]
    fn test_validation_empty_trigger() {
        let mut p = enterprise_centos7();
        p.trigger.branch.clear();
        assert!(DroneEmitter::new().validate(&[p]).is_err());
    }
}

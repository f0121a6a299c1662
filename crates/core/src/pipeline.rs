//! Pipeline record types
//!
//! These structs mirror the subset of the Drone pipeline schema that the
//! generator produces. Field order matches the order keys are serialized in.
//! See: <https://docs.drone.io/pipeline/docker/syntax/>

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single Drone pipeline document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Resource kind, always `pipeline`
    pub kind: String,

    /// Runner type (e.g. `docker`)
    #[serde(rename = "type")]
    pub pipeline_type: String,

    /// Pipeline name, unique within a configuration file
    pub name: String,

    /// Clone settings for the repository under build
    pub clone: CloneSettings,

    /// Steps, executed sequentially in declared order
    pub steps: Vec<Step>,

    /// Volumes shared between steps
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,

    /// Condition under which the pipeline runs
    pub trigger: Trigger,
}

impl Pipeline {
    /// Look up a step by name
    #[must_use]
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Step names in execution order
    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name.as_str())
    }
}

/// Clone settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneSettings {
    /// Git clone depth
    pub depth: u32,
}

/// A container step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Step name
    pub name: String,

    /// Container image the commands run in
    pub image: String,

    /// Volume mounts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<VolumeMount>,

    /// Environment variables
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, EnvValue>,

    /// Shell commands, executed in order
    pub commands: Vec<String>,
}

impl Step {
    /// Create a step with no mounts or environment
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            volumes: Vec::new(),
            environment: BTreeMap::new(),
            commands: Vec::new(),
        }
    }

    /// Mount a named volume at `path`
    #[must_use]
    pub fn with_mount(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.volumes.push(VolumeMount {
            name: name.into(),
            path: path.into(),
        });
        self
    }

    /// Set an environment variable
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: EnvValue) -> Self {
        self.environment.insert(key.into(), value);
        self
    }

    /// Append a shell command
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    /// All commands joined with newlines
    #[must_use]
    pub fn script(&self) -> String {
        self.commands.join("\n")
    }
}

/// Environment value: either a literal or a reference to a CI secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    /// Plain string value
    Literal(String),
    /// Value resolved by the CI engine from a named secret
    Secret {
        /// Secret name
        from_secret: String,
    },
}

impl EnvValue {
    /// Literal environment value
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// Secret reference
    pub fn secret(name: impl Into<String>) -> Self {
        Self::Secret {
            from_secret: name.into(),
        }
    }
}

/// A volume mounted into a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    /// Name of a pipeline-level volume
    pub name: String,
    /// Mount point inside the container
    pub path: String,
}

/// A pipeline-level volume declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Volume name
    pub name: String,

    /// Temporary volume, discarded after the pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<TempVolume>,
}

impl Volume {
    /// Declare a temporary volume
    pub fn temp(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            temp: Some(TempVolume {}),
        }
    }
}

/// Marker for a temporary volume (serializes as `{}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempVolume {}

/// Trigger condition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    /// Branches the pipeline runs for
    pub branch: Vec<String>,

    /// Events the pipeline runs for (any event when empty)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_builder_preserves_command_order() {
        let step = Step::new("build", "centos:7")
            .with_command("cd /mdb")
            .with_command("make")
            .with_command("ls -l *.rpm");

        assert_eq!(step.commands, vec!["cd /mdb", "make", "ls -l *.rpm"]);
        assert_eq!(step.script(), "cd /mdb\nmake\nls -l *.rpm");
    }

    #[test]
    fn test_env_value_serialization() {
        let literal = serde_json::to_string(&EnvValue::literal("noninteractive")).unwrap();
        assert_eq!(literal, r#""noninteractive""#);

        let secret = serde_json::to_string(&EnvValue::secret("github_token")).unwrap();
        assert_eq!(secret, r#"{"from_secret":"github_token"}"#);
    }

    #[test]
    fn test_temp_volume_serializes_as_empty_map() {
        let json = serde_json::to_string(&Volume::temp("mdb")).unwrap();
        assert_eq!(json, r#"{"name":"mdb","temp":{}}"#);
    }

    #[test]
    fn test_empty_optional_fields_are_skipped() {
        let step = Step::new("submodules", "alpine/git").with_command("git submodule update");
        let json = serde_json::to_value(&step).unwrap();

        assert!(json.get("volumes").is_none());
        assert!(json.get("environment").is_none());

        let trigger = serde_json::to_value(Trigger {
            branch: vec!["develop".to_string()],
            event: vec![],
        })
        .unwrap();
        assert!(trigger.get("event").is_none());
    }

    #[test]
    fn test_type_field_rename() {
        let pipeline = Pipeline {
            kind: "pipeline".to_string(),
            pipeline_type: "docker".to_string(),
            name: "develop centos:7".to_string(),
            clone: CloneSettings { depth: 10 },
            steps: vec![],
            volumes: vec![],
            trigger: Trigger::default(),
        };
        let json = serde_json::to_value(&pipeline).unwrap();
        assert_eq!(json["type"], "docker");
        assert!(json.get("pipeline_type").is_none());
    }
}

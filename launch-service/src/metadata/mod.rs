// Definition Metadata
// Models for loaded pipeline/workflow definitions

pub mod loader;

pub use loader::{DefinitionLoader, FileLookup, LookupStrategy, MetadataError};

use crate::config::LogLevel;

use serde::{Deserialize, Serialize};

/// The two kinds of runnable definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Pipeline,
    Workflow,
}

impl DefinitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pipeline => "pipeline",
            Self::Workflow => "workflow",
        }
    }
}

/// A named parameter declared by a definition, with an optional default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Configuration defaults embedded in a definition. Lowest precedence in
/// the resolver; administrative and caller settings override them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DefinitionDefaults {
    pub log_level: LogLevel,
    pub safe_mode: bool,
    pub clear_log: bool,
    pub gather_metrics: bool,
}

/// A loaded pipeline or workflow definition.
///
/// The engine interprets the stage graph or entry list; this layer only
/// needs the name, kind, declared parameters and embedded defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub kind: DefinitionKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub defaults: DefinitionDefaults,
}

impl Definition {
    /// Looks up a declared parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_from_yaml() {
        let yaml = r#"
name: daily-load
kind: pipeline
description: Loads the daily extract
parameters:
  - name: n
    default: "1"
defaults:
  log_level: debug
  safe_mode: true
"#;
        let def: Definition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.name, "daily-load");
        assert_eq!(def.kind, DefinitionKind::Pipeline);
        assert_eq!(def.parameter("n").unwrap().default.as_deref(), Some("1"));
        assert_eq!(def.defaults.log_level, LogLevel::Debug);
        assert!(def.defaults.safe_mode);
        assert!(!def.defaults.clear_log);
    }

    #[test]
    fn test_defaults_default_to_basic_level() {
        let defaults = DefinitionDefaults::default();
        assert_eq!(defaults.log_level, LogLevel::Basic);
        assert!(!defaults.safe_mode);
    }
}

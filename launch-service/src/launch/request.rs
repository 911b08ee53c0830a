// Run Request
// Immutable input to one execution, validated before anything runs

use crate::error::LaunchError;
use crate::metadata::DefinitionKind;
use crate::rows::Row;

use std::collections::HashMap;

/// A free-form extra input. Scheduler front-ends sometimes duplicate
/// request parameters into lists; only the first element is significant.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraInput {
    Scalar(String),
    List(Vec<String>),
}

impl ExtraInput {
    /// The effective value: the scalar, or the first list element.
    pub fn first_value(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::List(values) => values.first().map(String::as_str),
        }
    }
}

impl From<&str> for ExtraInput {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

/// Everything one call to `execute()` runs with. Built from the launcher's
/// setters and never mutated once execution begins.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub directory: Option<String>,
    pub pipeline: Option<String>,
    pub workflow: Option<String>,
    /// Positional arguments handed to the engine's prepare phase.
    pub arguments: Vec<String>,
    pub parameters: HashMap<String, String>,
    pub variables: HashMap<String, String>,
    pub extra_inputs: HashMap<String, ExtraInput>,
    pub monitor_stage: Option<String>,
    pub inject_stage: Option<String>,
    pub rows_to_inject: Option<Vec<Row>>,
}

impl RunRequest {
    /// Which kind of definition this request names. The pipeline name wins
    /// when both are set, matching the execute dispatch order.
    pub fn kind(&self) -> Option<DefinitionKind> {
        if self.pipeline.is_some() {
            Some(DefinitionKind::Pipeline)
        } else if self.workflow.is_some() {
            Some(DefinitionKind::Workflow)
        } else {
            None
        }
    }

    pub fn definition_name(&self) -> Option<&str> {
        self.pipeline.as_deref().or(self.workflow.as_deref())
    }

    /// Checks the request has everything a run needs. All failures here are
    /// fatal and never retried automatically.
    pub fn validate(&self) -> Result<(), LaunchError> {
        if self.directory.is_none() {
            return Err(LaunchError::validation(
                "no directory set to load the definition from",
            ));
        }

        if self.pipeline.is_none() && self.workflow.is_none() {
            return Err(LaunchError::validation(
                "neither a pipeline nor a workflow name is set",
            ));
        }

        if let Some(stage) = &self.inject_stage {
            if self.rows_to_inject.is_none() {
                return Err(LaunchError::validation(format!(
                    "inject stage '{stage}' is set but no rows to inject were supplied"
                )));
            }
        }

        Ok(())
    }
}

// Launch Errors
// The fatal error taxonomy; prepare failures and row errors are not here

use crate::engine::EngineError;
use crate::metadata::MetadataError;
use crate::rows::InjectionError;

use thiserror::Error;

/// Fatal launch failures. When `execute()` returns one of these, no outcome
/// was produced and no result accessors are meaningful.
///
/// Two failure modes are deliberately absent: a prepare failure is recorded
/// on the launcher and reported through `is_prepare_failed()`, and a run
/// that completes with row errors is reported through the outcome. Neither
/// raises an error, so a scheduler can retry either without special-casing.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("invalid launch request: {0}")]
    Validation(String),

    #[error("not authorized to perform '{action}'")]
    NotAuthorized { action: String },

    #[error("definition not found: {source}")]
    DefinitionNotFound {
        #[source]
        source: MetadataError,
    },

    #[error("failed to create engine instance: {source}")]
    EngineCreation {
        #[source]
        source: EngineError,
    },

    #[error("failed to wire {context}: {source}")]
    Wiring {
        context: &'static str,
        #[source]
        source: EngineError,
    },

    #[error("row injection failed: {0}")]
    Injection(#[from] InjectionError),

    #[error("execution failed with {errors} error(s): {source}")]
    Execution {
        errors: u64,
        #[source]
        source: EngineError,
    },
}

impl LaunchError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = LaunchError::Wiring {
            context: "row listener",
            source: EngineError::new("no such stage 'out'"),
        };
        let message = err.to_string();
        assert!(message.contains("row listener"));

        let err = LaunchError::Execution {
            errors: 3,
            source: EngineError::new("boom"),
        };
        assert!(err.to_string().contains("3 error(s)"));
    }
}

// Engine Seam
// Traits the external execution engine is consumed through

use crate::config::EffectiveConfig;
use crate::launch::LogBuffer;
use crate::metadata::Definition;
use crate::rows::{RowInjector, RowSchema, RowSink};

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// The shared variable space seeded into every run: resolved caller
/// variables, parameter overrides and flattened extra inputs.
pub type VariableSpace = HashMap<String, String>;

/// Opaque failure reported by the engine. The engine is a black box; its
/// message is all this layer forwards.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// One in-flight engine instance executing a pipeline or workflow.
///
/// The engine runs its stage graph on threads it manages itself; this layer
/// only sequences `prepare`/`start`/`wait_until_finished` and reads the
/// post-run counters. Row listener and producer registration must happen
/// between `prepare` and `start`.
#[async_trait]
pub trait EngineInstance: Send {
    /// Declared output schema of a stage, used to type the monitor buffers.
    fn output_schema(&self, stage: &str) -> Result<RowSchema, EngineError>;

    /// Subscribes the sink to every row the named stage emits.
    fn add_row_listener(&mut self, stage: &str, sink: RowSink) -> Result<(), EngineError>;

    /// Opens a producer into the named stage's input queue.
    fn add_row_producer(&mut self, stage: &str) -> Result<RowInjector, EngineError>;

    /// Prepares execution (pipeline only; workflows have no prepare phase).
    async fn prepare(&mut self, arguments: &[String]) -> Result<(), EngineError>;

    /// Starts the engine's threads.
    async fn start(&mut self) -> Result<(), EngineError>;

    /// Blocks until the engine signals completion.
    async fn wait_until_finished(&mut self) -> Result<(), EngineError>;

    /// Post-run error count.
    fn error_count(&self) -> u64;

    /// The engine's own status string, e.g. "Finished".
    fn status(&self) -> String;

    /// The engine's own exit status.
    fn exit_status(&self) -> i32;
}

/// Creates engine instances from loaded definitions.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn create_pipeline(
        &self,
        definition: &Definition,
        config: &EffectiveConfig,
        variables: &VariableSpace,
        log: LogBuffer,
    ) -> Result<Box<dyn EngineInstance>, EngineError>;

    async fn create_workflow(
        &self,
        definition: &Definition,
        config: &EffectiveConfig,
        variables: &VariableSpace,
        log: LogBuffer,
    ) -> Result<Box<dyn EngineInstance>, EngineError>;
}

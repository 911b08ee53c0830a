// Launch Service Library
// Orchestrates pipeline/workflow execution against an external engine

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod launch;
pub mod metadata;
pub mod rows;

// Re-export commonly used types
pub use error::LaunchError;

// Re-export configuration types
pub use config::{
    CallerSettings, ConfigResolver, EffectiveConfig, EnvStore, LogLevel, MapStore, SettingsStore,
};

// Re-export metadata types
pub use metadata::{
    Definition, DefinitionDefaults, DefinitionKind, DefinitionLoader, FileLookup, LookupStrategy,
    MetadataError, ParameterDefinition,
};

// Re-export engine seam types
pub use engine::{EngineError, EngineFactory, EngineInstance, VariableSpace};

// Re-export row types
pub use rows::{
    ColumnMeta, EmittedRow, InjectionError, ResultBuffers, Row, RowBridge, RowClass, RowInjector,
    RowSchema, RowSink, RowValue, ValueKind,
};

// Re-export launch types
pub use launch::{
    ExtraInput, Launcher, LogBuffer, NoopRegistry, Outcome, RunHandle, RunOutcome, RunRegistry,
    RunRequest,
};

// Re-export authorization types
pub use auth::{AllowAll, AuthorizationGate, EXECUTE_ACTION};

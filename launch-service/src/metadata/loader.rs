// Definition Loader
// Ordered lookup strategies with a path-based YAML fallback

use crate::metadata::{Definition, DefinitionKind};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors from definition lookup.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("no {kind} named '{name}' in '{directory}'")]
    NotFound {
        directory: String,
        name: String,
        kind: &'static str,
    },

    #[error("definition '{path}' is a {found}, expected a {expected}")]
    KindMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("failed to parse definition '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to read definition '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl MetadataError {
    fn not_found(directory: &str, name: &str, kind: DefinitionKind) -> Self {
        Self::NotFound {
            directory: directory.to_string(),
            name: name.to_string(),
            kind: kind.as_str(),
        }
    }
}

/// One way of resolving a definition from a directory and name.
///
/// Strategies are tried in registration order; returning an error makes the
/// loader move on to the next strategy.
pub trait LookupStrategy: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    fn load(
        &self,
        directory: &str,
        name: &str,
        kind: DefinitionKind,
    ) -> Result<Definition, MetadataError>;
}

/// Tries an ordered list of lookup strategies and surfaces only the final
/// failure. Intermediate failures are logged at debug level and swallowed.
pub struct DefinitionLoader {
    strategies: Vec<Box<dyn LookupStrategy>>,
}

impl DefinitionLoader {
    /// Loader with only the path-based file fallback registered.
    pub fn new() -> Self {
        Self {
            strategies: vec![Box::new(FileLookup)],
        }
    }

    /// Loader with no strategies; callers push their own.
    pub fn empty() -> Self {
        Self { strategies: Vec::new() }
    }

    /// Registers a strategy ahead of the ones already present. A structured
    /// repository lookup typically goes in front of the file fallback.
    pub fn with_primary(mut self, strategy: Box<dyn LookupStrategy>) -> Self {
        self.strategies.insert(0, strategy);
        self
    }

    /// Registers a strategy after the ones already present.
    pub fn with_fallback(mut self, strategy: Box<dyn LookupStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn load(
        &self,
        directory: &str,
        name: &str,
        kind: DefinitionKind,
    ) -> Result<Definition, MetadataError> {
        let mut last_error = MetadataError::not_found(directory, name, kind);

        for strategy in &self.strategies {
            match strategy.load(directory, name, kind) {
                Ok(definition) => {
                    debug!(
                        strategy = strategy.name(),
                        name, "definition resolved"
                    );
                    return Ok(definition);
                }
                Err(e) => {
                    debug!(
                        strategy = strategy.name(),
                        name,
                        error = %e,
                        "lookup strategy failed, trying next"
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

impl Default for DefinitionLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Path-based lookup: reads `<directory>/<name>` as a YAML definition,
/// also trying a kind-specific extension when the bare name does not exist.
pub struct FileLookup;

impl FileLookup {
    fn candidates(directory: &str, name: &str, kind: DefinitionKind) -> Vec<PathBuf> {
        let dir = Path::new(directory);
        vec![
            dir.join(name),
            dir.join(format!("{}.{}.yml", name, kind.as_str())),
            dir.join(format!("{}.{}.yaml", name, kind.as_str())),
        ]
    }

    fn read(path: &Path, kind: DefinitionKind) -> Result<Definition, MetadataError> {
        let display = path.display().to_string();

        let contents = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: display.clone(),
            source,
        })?;

        let definition: Definition =
            serde_yaml::from_str(&contents).map_err(|source| MetadataError::Parse {
                path: display.clone(),
                source,
            })?;

        if definition.kind != kind {
            return Err(MetadataError::KindMismatch {
                path: display,
                expected: kind.as_str(),
                found: definition.kind.as_str(),
            });
        }

        Ok(definition)
    }
}

impl LookupStrategy for FileLookup {
    fn name(&self) -> &str {
        "file"
    }

    fn load(
        &self,
        directory: &str,
        name: &str,
        kind: DefinitionKind,
    ) -> Result<Definition, MetadataError> {
        for candidate in Self::candidates(directory, name, kind) {
            if candidate.is_file() {
                return Self::read(&candidate, kind);
            }
        }

        Err(MetadataError::not_found(directory, name, kind))
    }
}

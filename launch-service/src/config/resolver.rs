// Configuration Resolver
// Merges administrative overrides, caller settings and definition defaults

use crate::config::store::{keys, SettingsStore};
use crate::metadata::DefinitionDefaults;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Engine log verbosity, ordered from silent to per-row tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Nothing,
    Error,
    Minimal,
    #[default]
    Basic,
    Detailed,
    Debug,
    Rowlevel,
}

impl LogLevel {
    /// Parses a level code, falling back to `Basic` for anything
    /// unrecognized. Configuration corruption must not block a run.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "nothing" => Self::Nothing,
            "error" => Self::Error,
            "minimal" => Self::Minimal,
            "basic" => Self::Basic,
            "detailed" | "detail" => Self::Detailed,
            "debug" => Self::Debug,
            "rowlevel" => Self::Rowlevel,
            _ => Self::Basic,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Nothing => "nothing",
            Self::Error => "error",
            Self::Minimal => "minimal",
            Self::Basic => "basic",
            Self::Detailed => "detailed",
            Self::Debug => "debug",
            Self::Rowlevel => "rowlevel",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Raw configuration strings supplied by the caller, all optional.
///
/// Values are kept as strings until resolution so that an absent setting is
/// distinguishable from an explicit `"false"`.
#[derive(Debug, Clone, Default)]
pub struct CallerSettings {
    pub log_level: Option<String>,
    pub safe_mode: Option<String>,
    pub clear_log: Option<String>,
    pub gather_metrics: Option<String>,
    /// Workflow-only: expand remote workflow entries when starting.
    pub expand_remote_workflow: Option<String>,
    /// Workflow-only: the entry to start from instead of the first one.
    pub start_entry: Option<String>,
}

/// The configuration one run actually executes with. Recomputed on every
/// run, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub log_level: LogLevel,
    pub safe_mode: bool,
    pub clear_log: bool,
    pub gather_metrics: bool,
    pub expand_remote_workflow: bool,
    pub start_entry: Option<String>,
}

/// Resolves run configuration from three overlapping sources and decides
/// per-variable precedence between stored and environment values.
///
/// The administrative store is consulted on every resolve, so operators can
/// change overrides between runs without a restart.
#[derive(Clone)]
pub struct ConfigResolver {
    admin: Arc<dyn SettingsStore>,
    env: Arc<dyn SettingsStore>,
}

impl ConfigResolver {
    pub fn new(admin: Arc<dyn SettingsStore>, env: Arc<dyn SettingsStore>) -> Self {
        Self { admin, env }
    }

    /// Merge settings per field: administrative override, then the caller's
    /// explicit setting, then the default embedded in the definition.
    ///
    /// A present-but-unparseable boolean override resolves to `false`, and
    /// an unrecognized log-level code resolves to `Basic`; resolution never
    /// fails.
    pub fn resolve(&self, caller: &CallerSettings, defaults: &DefinitionDefaults) -> EffectiveConfig {
        let log_level = match self.admin.get(keys::LOG_LEVEL) {
            Some(code) => {
                let level = LogLevel::from_code(&code);
                debug!(level = %level, "log level overridden by administrative settings");
                level
            }
            None => caller
                .log_level
                .as_deref()
                .map(LogLevel::from_code)
                .unwrap_or(defaults.log_level),
        };

        let safe_mode = match self.admin.get(keys::SAFE_MODE) {
            Some(value) => {
                let enabled = parse_bool(&value);
                debug!(enabled, "safe mode overridden by administrative settings");
                enabled
            }
            None => caller
                .safe_mode
                .as_deref()
                .map(parse_bool)
                .unwrap_or(defaults.safe_mode),
        };

        let gather_metrics = match self.admin.get(keys::GATHER_METRICS) {
            Some(value) => {
                let enabled = parse_bool(&value);
                debug!(enabled, "metrics gathering overridden by administrative settings");
                enabled
            }
            None => caller
                .gather_metrics
                .as_deref()
                .map(parse_bool)
                .unwrap_or(defaults.gather_metrics),
        };

        // No administrative override exists for the remaining fields.
        let clear_log = caller
            .clear_log
            .as_deref()
            .map(parse_bool)
            .unwrap_or(defaults.clear_log);

        let expand_remote_workflow = caller
            .expand_remote_workflow
            .as_deref()
            .map(parse_bool)
            .unwrap_or(false);

        EffectiveConfig {
            log_level,
            safe_mode,
            clear_log,
            gather_metrics,
            expand_remote_workflow,
            start_entry: caller.start_entry.clone(),
        }
    }

    /// Whether caller-supplied ("stored") variable values take precedence
    /// over the environment store. Off unless the flag reads `Y` or `true`,
    /// case-insensitively.
    pub fn use_stored_variables(&self) -> bool {
        self.env
            .get(keys::USE_STORED_VARIABLES)
            .map(|v| v.eq_ignore_ascii_case("y") || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Resolves one variable value.
    ///
    /// With the stored-variables flag on, the stored value is returned
    /// exactly, including absence. With the flag off, the environment store
    /// wins when it has the name at all; an empty string found there is a
    /// valid value, not a miss.
    pub fn resolve_variable(&self, name: &str, stored: Option<&str>) -> Option<String> {
        if self.use_stored_variables() {
            return stored.map(str::to_string);
        }

        match self.env.get(name) {
            Some(value) => Some(value),
            None => stored.map(str::to_string),
        }
    }
}

// Strict boolean: anything other than "true" (any case) is false.
fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

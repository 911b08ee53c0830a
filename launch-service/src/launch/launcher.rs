// Launcher
// The state machine that sequences one run against the external engine

use crate::auth::{AllowAll, AuthorizationGate, EXECUTE_ACTION};
use crate::config::{CallerSettings, ConfigResolver};
use crate::engine::{EngineFactory, EngineInstance, VariableSpace};
use crate::error::LaunchError;
use crate::launch::handle::{LogBuffer, NoopRegistry, RunHandle, RunRegistry};
use crate::launch::outcome::{classify, RunOutcome, EXIT_NOT_RUN};
use crate::launch::request::{ExtraInput, RunRequest};
use crate::metadata::{Definition, DefinitionKind, DefinitionLoader};
use crate::rows::{ResultBuffers, Row, RowBridge};

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, warn};

/// Status string reported before any run has been executed.
const STATUS_NOT_LOADED: &str = "not loaded";

/// Launches pipelines and workflows on behalf of a caller.
///
/// One launcher holds one request at a time: populate it through the
/// setters, call `execute()`, then read the result accessors. A thrown
/// error means no outcome was produced; a prepare failure and a run that
/// completed with row errors both return normally and are reported through
/// `is_prepare_failed()` and `is_execution_successful()`, so a scheduler
/// can retry either without catching anything.
pub struct Launcher {
    factory: Arc<dyn EngineFactory>,
    loader: DefinitionLoader,
    resolver: ConfigResolver,
    gate: Arc<dyn AuthorizationGate>,
    registry: Arc<dyn RunRegistry>,

    request: RunRequest,
    settings: CallerSettings,

    log: LogBuffer,
    prepare_failed: bool,
    outcome: Option<RunOutcome>,
    buffers: Option<ResultBuffers>,
}

impl Launcher {
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        loader: DefinitionLoader,
        resolver: ConfigResolver,
    ) -> Self {
        Self {
            factory,
            loader,
            resolver,
            gate: Arc::new(AllowAll),
            registry: Arc::new(NoopRegistry),
            request: RunRequest::default(),
            settings: CallerSettings::default(),
            log: LogBuffer::new(),
            prepare_failed: false,
            outcome: None,
            buffers: None,
        }
    }

    /// Set the authorization gate consulted at the start of every run.
    pub fn with_authorization(mut self, gate: Arc<dyn AuthorizationGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Set the external run registry in-flight runs are visible in.
    pub fn with_registry(mut self, registry: Arc<dyn RunRegistry>) -> Self {
        self.registry = registry;
        self
    }

    // --- request setters -------------------------------------------------

    /// Sets the directory definitions are loaded from.
    pub fn set_directory(&mut self, directory: impl Into<String>) {
        self.request.directory = Some(directory.into());
    }

    /// Sets the name of the pipeline to run.
    pub fn set_pipeline(&mut self, name: impl Into<String>) {
        self.request.pipeline = Some(name.into());
    }

    /// Sets the name of the workflow to run.
    pub fn set_workflow(&mut self, name: impl Into<String>) {
        self.request.workflow = Some(name.into());
    }

    pub fn set_arguments(&mut self, arguments: Vec<String>) {
        self.request.arguments = arguments;
    }

    pub fn set_parameters(&mut self, parameters: HashMap<String, String>) {
        self.request.parameters = parameters;
    }

    pub fn set_variables(&mut self, variables: HashMap<String, String>) {
        self.request.variables = variables;
    }

    pub fn set_extra_inputs(&mut self, extra_inputs: HashMap<String, ExtraInput>) {
        self.request.extra_inputs = extra_inputs;
    }

    /// Names the stage whose output rows are captured into the success and
    /// error buffers.
    pub fn set_monitor_stage(&mut self, stage: impl Into<String>) {
        self.request.monitor_stage = Some(stage.into());
    }

    /// Names the stage externally supplied rows are injected into. Requires
    /// `set_rows_to_inject`.
    pub fn set_inject_stage(&mut self, stage: impl Into<String>) {
        self.request.inject_stage = Some(stage.into());
    }

    pub fn set_rows_to_inject(&mut self, rows: Vec<Row>) {
        self.request.rows_to_inject = Some(rows);
    }

    // --- caller settings -------------------------------------------------

    pub fn set_log_level(&mut self, level: impl Into<String>) {
        self.settings.log_level = Some(level.into());
    }

    pub fn set_safe_mode(&mut self, safe_mode: impl Into<String>) {
        self.settings.safe_mode = Some(safe_mode.into());
    }

    pub fn set_clear_log(&mut self, clear_log: impl Into<String>) {
        self.settings.clear_log = Some(clear_log.into());
    }

    pub fn set_gather_metrics(&mut self, gather_metrics: impl Into<String>) {
        self.settings.gather_metrics = Some(gather_metrics.into());
    }

    pub fn set_expand_remote_workflow(&mut self, expand: impl Into<String>) {
        self.settings.expand_remote_workflow = Some(expand.into());
    }

    pub fn set_start_entry(&mut self, entry: impl Into<String>) {
        self.settings.start_entry = Some(entry.into());
    }

    // --- execution -------------------------------------------------------

    /// Runs the configured pipeline or workflow to completion.
    ///
    /// Sequence: authorization, validation, metadata load, configuration
    /// resolution, engine creation, prepare (pipelines), row wiring, start,
    /// row injection, blocking wait, outcome classification. A prepare
    /// failure is recorded and returns `Ok(())`; everything else that goes
    /// wrong is fatal.
    pub async fn execute(&mut self) -> Result<(), LaunchError> {
        self.prepare_failed = false;
        self.outcome = None;
        self.buffers = None;
        self.log.clear();

        if !self.gate.is_allowed(EXECUTE_ACTION) {
            return Err(LaunchError::NotAuthorized {
                action: EXECUTE_ACTION.to_string(),
            });
        }

        self.request.validate()?;

        let kind = match self.request.kind() {
            Some(kind) => kind,
            None => {
                return Err(LaunchError::validation(
                    "neither a pipeline nor a workflow name is set",
                ))
            }
        };
        let name = self.request.definition_name().unwrap_or_default().to_string();
        let directory = self.request.directory.clone().unwrap_or_default();

        let definition = self
            .loader
            .load(&directory, &name, kind)
            .map_err(|source| LaunchError::DefinitionNotFound { source })?;

        // Resolution never fails; corrupt overrides degrade, they don't block.
        let config = self.resolver.resolve(&self.settings, &definition.defaults);
        let variables = self.seed_variables(&definition);

        debug!(
            name = %definition.name,
            kind = kind.as_str(),
            log_level = %config.log_level,
            safe_mode = config.safe_mode,
            gather_metrics = config.gather_metrics,
            "starting run"
        );

        let mut engine = match kind {
            DefinitionKind::Pipeline => {
                self.factory
                    .create_pipeline(&definition, &config, &variables, self.log.clone())
                    .await
            }
            DefinitionKind::Workflow => {
                self.factory
                    .create_workflow(&definition, &config, &variables, self.log.clone())
                    .await
            }
        }
        .map_err(|source| LaunchError::EngineCreation { source })?;

        let handle = RunHandle::new(kind, &definition.name);
        self.registry.register(&handle);

        let result = self.run(kind, engine.as_mut()).await;

        // Deregister on every path out, error paths included.
        self.registry.deregister(handle.id);

        result
    }

    /// Drives one created engine instance through its lifecycle.
    async fn run(
        &mut self,
        kind: DefinitionKind,
        engine: &mut dyn EngineInstance,
    ) -> Result<(), LaunchError> {
        // Workflows have no separate prepare phase.
        if kind == DefinitionKind::Pipeline {
            if let Err(e) = engine.prepare(&self.request.arguments).await {
                // Recorded, not thrown: the scheduler may retry this run.
                error!(error = %e, "engine prepare failed, run not started");
                self.log.append(format!("prepare failed: {e}"));
                self.prepare_failed = true;
                self.outcome = Some(classify(true, 0, "", 0));
                return Ok(());
            }
        }

        let mut bridge = None;
        let mut injector = None;

        if kind == DefinitionKind::Pipeline {
            if let Some(stage) = self.request.monitor_stage.clone() {
                let schema = engine.output_schema(&stage).map_err(|source| {
                    LaunchError::Wiring {
                        context: "row listener",
                        source,
                    }
                })?;
                let (b, sink) = RowBridge::new(schema);
                engine
                    .add_row_listener(&stage, sink)
                    .map_err(|source| LaunchError::Wiring {
                        context: "row listener",
                        source,
                    })?;
                bridge = Some(b);
            }

            if let Some(stage) = self.request.inject_stage.clone() {
                injector = Some(engine.add_row_producer(&stage).map_err(|source| {
                    LaunchError::Wiring {
                        context: "row producer",
                        source,
                    }
                })?);
            }
        }

        engine
            .start()
            .await
            .map_err(|source| LaunchError::Wiring {
                context: "engine start",
                source,
            })?;

        // The input sequence is drained completely, then end-of-input is
        // signalled, before the blocking wait begins.
        if let Some(mut injector) = injector {
            let rows = self.request.rows_to_inject.clone().unwrap_or_default();
            debug!(rows = rows.len(), "injecting rows");
            for row in rows {
                injector.put_row(row).await?;
            }
            injector.finished();
        }

        if let Err(source) = engine.wait_until_finished().await {
            let errors = engine.error_count();
            return Err(LaunchError::Execution { errors, source });
        }

        if let Some(bridge) = bridge {
            self.buffers = Some(bridge.collect());
        }

        let errors = engine.error_count();
        if errors > 0 {
            warn!(errors, "run completed with errors");
        }
        self.outcome = Some(classify(false, errors, &engine.status(), engine.exit_status()));

        Ok(())
    }

    /// Seeds the run's shared variable space: parameter defaults from the
    /// definition, caller parameter overrides, variables under the
    /// stored/environment policy, then extra inputs flattened to their
    /// first value.
    fn seed_variables(&self, definition: &Definition) -> VariableSpace {
        let mut space = VariableSpace::new();

        for parameter in &definition.parameters {
            if let Some(default) = &parameter.default {
                space.insert(parameter.name.clone(), default.clone());
            }
        }

        for (name, value) in &self.request.parameters {
            if definition.parameter(name).is_none() {
                warn!(parameter = %name, "unknown parameter, skipped");
                continue;
            }
            space.insert(name.clone(), value.clone());
        }

        for (name, stored) in &self.request.variables {
            if let Some(value) = self.resolver.resolve_variable(name, Some(stored)) {
                space.insert(name.clone(), value);
            }
        }

        for (name, input) in &self.request.extra_inputs {
            if let Some(value) = input.first_value() {
                space.insert(name.clone(), value.to_string());
            }
        }

        space
    }

    // --- result accessors ------------------------------------------------

    /// The status string of the last run, or "not loaded" before any run.
    pub fn status(&self) -> String {
        match &self.outcome {
            Some(outcome) => outcome.status.clone(),
            None => STATUS_NOT_LOADED.to_string(),
        }
    }

    /// The exit code of the last run; -1 before any run produced one.
    pub fn exit_code(&self) -> i32 {
        match &self.outcome {
            Some(outcome) => outcome.exit_code,
            None => EXIT_NOT_RUN,
        }
    }

    pub fn is_prepare_failed(&self) -> bool {
        self.prepare_failed
    }

    /// True only when a run completed without a prepare failure and with a
    /// zero error count.
    pub fn is_execution_successful(&self) -> bool {
        self.outcome
            .as_ref()
            .map(RunOutcome::is_successful)
            .unwrap_or(false)
    }

    /// The classified outcome of the last run, if one was produced.
    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }

    /// Success rows captured at the monitor stage. `None` when no monitor
    /// stage was named, as distinct from an empty capture.
    pub fn success_rows(&self) -> Option<&[Row]> {
        self.buffers.as_ref().map(|b| b.written.as_slice())
    }

    /// Error rows captured at the monitor stage.
    pub fn error_rows(&self) -> Option<&[Row]> {
        self.buffers.as_ref().map(|b| b.errors.as_slice())
    }

    /// The engine log captured during the last run.
    pub fn log(&self) -> String {
        self.log.contents()
    }
}

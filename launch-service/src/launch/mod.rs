// Launch
// Request model, run handle, outcome classification and the orchestrator

pub mod handle;
pub mod launcher;
pub mod outcome;
pub mod request;

pub use handle::{LogBuffer, NoopRegistry, RunHandle, RunRegistry};
pub use launcher::Launcher;
pub use outcome::{classify, Outcome, RunOutcome};
pub use request::{ExtraInput, RunRequest};

// Outcome Classification
// Maps terminal engine state to the three-way result callers depend on

/// Exit code reported when no run produced a result.
pub const EXIT_NOT_RUN: i32 = -1;

/// Status string reported for a run that never started.
pub const STATUS_NOT_RUN: &str = "not run";

/// The three terminal outcomes of a run that returned from execute().
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The engine rejected the prepared definition; the run never started.
    PrepareFailed,
    /// The engine finished but reported row errors.
    CompletedWithErrors(u64),
    Succeeded,
}

/// A classified terminal outcome with the stable status string and exit
/// code downstream callers consume literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub outcome: Outcome,
    pub status: String,
    pub exit_code: i32,
}

impl RunOutcome {
    pub fn is_successful(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded)
    }
}

/// Classifies the terminal engine state.
///
/// Prepare failure takes precedence and uses the reserved status/exit pair;
/// otherwise the engine's own status string is kept, with the exit code
/// forced to zero on a clean run.
pub fn classify(
    prepare_failed: bool,
    error_count: u64,
    engine_status: &str,
    engine_exit: i32,
) -> RunOutcome {
    if prepare_failed {
        return RunOutcome {
            outcome: Outcome::PrepareFailed,
            status: STATUS_NOT_RUN.to_string(),
            exit_code: EXIT_NOT_RUN,
        };
    }

    if error_count > 0 {
        return RunOutcome {
            outcome: Outcome::CompletedWithErrors(error_count),
            status: engine_status.to_string(),
            exit_code: engine_exit,
        };
    }

    RunOutcome {
        outcome: Outcome::Succeeded,
        status: engine_status.to_string(),
        exit_code: 0,
    }
}

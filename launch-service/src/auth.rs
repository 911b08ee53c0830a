// Authorization Gate
// Permission check consulted once at the start of every launch

/// The action name checked before any launch is allowed to proceed.
pub const EXECUTE_ACTION: &str = "repository.execute";

/// External authorization policy, consulted by the launcher before it
/// touches metadata or the engine. A denied check is fatal to the run.
pub trait AuthorizationGate: Send + Sync {
    fn is_allowed(&self, action: &str) -> bool;
}

/// Gate that permits everything. The default for embedded use where the
/// hosting application enforces its own policy up front.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl AuthorizationGate for AllowAll {
    fn is_allowed(&self, _action: &str) -> bool {
        true
    }
}

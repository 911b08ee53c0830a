// Run Handle
// Per-run identity, external run registry and the captured engine log

use crate::metadata::DefinitionKind;

use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// Identity of one in-flight run, visible to external monitoring for the
/// duration of execute().
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    pub id: Uuid,
    pub kind: DefinitionKind,
    pub name: String,
}

impl RunHandle {
    pub fn new(kind: DefinitionKind, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.into(),
        }
    }
}

/// External registry of in-flight runs, so monitoring tools can see them.
/// Registration is a side effect only; this layer registers at engine
/// creation and deregisters on every path out of execute().
pub trait RunRegistry: Send + Sync {
    fn register(&self, handle: &RunHandle);
    fn deregister(&self, id: Uuid);
}

/// Registry that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRegistry;

impl RunRegistry for NoopRegistry {
    fn register(&self, _handle: &RunHandle) {}
    fn deregister(&self, _id: Uuid) {}
}

/// Clonable log buffer the engine appends to while it runs.
///
/// Written from the engine's threads while the launcher thread is blocked
/// in the wait; read back only after the run has left the engine.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, line: impl Into<String>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.into());
        }
    }

    /// The whole captured log, newline-joined.
    pub fn contents(&self) -> String {
        match self.lines.lock() {
            Ok(lines) => lines.join("\n"),
            Err(_) => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_ids_are_unique() {
        let a = RunHandle::new(DefinitionKind::Pipeline, "p");
        let b = RunHandle::new(DefinitionKind::Pipeline, "p");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_log_buffer_appends_across_clones() {
        let log = LogBuffer::new();
        let writer = log.clone();
        writer.append("starting");
        writer.append("finished");
        assert_eq!(log.contents(), "starting\nfinished");

        log.clear();
        assert_eq!(log.contents(), "");
    }

    #[test]
    fn test_log_buffer_concurrent_writers() {
        let log = LogBuffer::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let writer = log.clone();
                std::thread::spawn(move || {
                    for j in 0..25 {
                        writer.append(format!("w{i}-{j}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(log.contents().lines().count(), 100);
    }
}

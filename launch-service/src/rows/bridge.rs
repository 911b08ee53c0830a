// Row Bridge
// Adapts the engine's row listener/producer callbacks to buffered sequences

use crate::rows::{convert_row, Row, RowSchema};

use serde_json::Value as Cell;
use thiserror::Error;
use tokio::sync::mpsc;

/// How the engine classified an emitted row at emission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    /// Row written successfully by the monitored stage.
    Written,
    /// Row routed to the stage's error handling.
    Error,
}

/// One row as emitted by the engine: classification plus untyped cells.
#[derive(Debug, Clone)]
pub struct EmittedRow {
    pub class: RowClass,
    pub cells: Vec<Cell>,
}

/// Sender handed to the engine's row listener registration. Clonable, safe
/// to call from the engine's own threads while the launcher is waiting.
/// Unbounded: buffers grow with the monitored stage's output, limited only
/// by memory, matching the uncapped in-memory result sets callers expect.
#[derive(Debug, Clone)]
pub struct RowSink {
    tx: mpsc::UnboundedSender<EmittedRow>,
}

impl RowSink {
    /// Emits a successfully written row. Fire-and-forget: once the bridge
    /// is gone there is nobody left to care.
    pub fn emit_written(&self, cells: Vec<Cell>) {
        let _ = self.tx.send(EmittedRow {
            class: RowClass::Written,
            cells,
        });
    }

    /// Emits an error-routed row.
    pub fn emit_error(&self, cells: Vec<Cell>) {
        let _ = self.tx.send(EmittedRow {
            class: RowClass::Error,
            cells,
        });
    }
}

/// Captures rows emitted at a monitored stage while the engine runs and
/// freezes them into `ResultBuffers` once it has finished.
pub struct RowBridge {
    schema: RowSchema,
    rx: mpsc::UnboundedReceiver<EmittedRow>,
}

impl RowBridge {
    /// Creates a bridge for the given output schema, returning the sink to
    /// register with the engine.
    pub fn new(schema: RowSchema) -> (Self, RowSink) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { schema, rx }, RowSink { tx })
    }

    /// Drains everything emitted so far into frozen buffers, preserving
    /// emission order within each classification. Call only after the
    /// engine has finished; rows emitted afterwards are dropped.
    pub fn collect(mut self) -> ResultBuffers {
        self.rx.close();

        let mut written = Vec::new();
        let mut errors = Vec::new();

        while let Ok(emitted) = self.rx.try_recv() {
            let row = convert_row(&self.schema, &emitted.cells);
            match emitted.class {
                RowClass::Written => written.push(row),
                RowClass::Error => errors.push(row),
            }
        }

        ResultBuffers {
            schema: self.schema,
            written,
            errors,
        }
    }
}

/// Frozen result of monitoring a stage: success and error rows in emission
/// order, sharing one column schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultBuffers {
    pub schema: RowSchema,
    pub written: Vec<Row>,
    pub errors: Vec<Row>,
}

impl ResultBuffers {
    pub fn written_count(&self) -> usize {
        self.written.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Error delivering a row to the inject stage.
#[derive(Debug, Error)]
pub enum InjectionError {
    #[error("inject stage rejected a row after {delivered} delivered")]
    Rejected { delivered: usize },
}

/// Producer handle for an inject stage, returned by the engine.
///
/// The channel bound is the engine's input queue for the stage; `put_row`
/// blocks (backpressure) while the queue is full.
#[derive(Debug)]
pub struct RowInjector {
    tx: mpsc::Sender<Row>,
    delivered: usize,
}

impl RowInjector {
    /// Wraps a sender obtained from the engine's producer registration.
    pub fn new(tx: mpsc::Sender<Row>) -> Self {
        Self { tx, delivered: 0 }
    }

    /// Delivers one row in sequence order, waiting while the engine's input
    /// queue is full. A closed queue means the stage rejected the row.
    pub async fn put_row(&mut self, row: Row) -> Result<(), InjectionError> {
        self.tx.send(row).await.map_err(|_| InjectionError::Rejected {
            delivered: self.delivered,
        })?;
        self.delivered += 1;
        Ok(())
    }

    /// Signals end-of-input by closing the channel.
    pub fn finished(self) {
        drop(self.tx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{ColumnMeta, RowValue, ValueKind};
    use serde_json::json;

    fn schema() -> RowSchema {
        RowSchema::new(vec![
            ColumnMeta::new("id", ValueKind::Integer),
            ColumnMeta::new("name", ValueKind::String),
        ])
    }

    #[tokio::test]
    async fn test_bridge_preserves_emission_order() {
        let (bridge, sink) = RowBridge::new(schema());

        sink.emit_written(vec![json!(1), json!("a")]);
        sink.emit_error(vec![json!(2), json!("b")]);
        sink.emit_written(vec![json!(3), json!("c")]);

        let buffers = bridge.collect();
        assert_eq!(buffers.written_count(), 2);
        assert_eq!(buffers.error_count(), 1);
        assert_eq!(buffers.written[0][0], RowValue::Integer(1));
        assert_eq!(buffers.written[1][0], RowValue::Integer(3));
        assert_eq!(buffers.errors[0][0], RowValue::Integer(2));
    }

    #[tokio::test]
    async fn test_bridge_empty() {
        let (bridge, _sink) = RowBridge::new(schema());
        let buffers = bridge.collect();
        assert!(buffers.written.is_empty());
        assert!(buffers.errors.is_empty());
    }

    #[tokio::test]
    async fn test_sink_survives_dropped_bridge() {
        let (bridge, sink) = RowBridge::new(schema());
        drop(bridge);
        // Must not panic.
        sink.emit_written(vec![json!(1), json!("a")]);
    }

    #[tokio::test]
    async fn test_injector_delivers_in_order_with_backpressure() {
        let (tx, mut rx) = mpsc::channel::<Row>(1);
        let mut injector = RowInjector::new(tx);

        let producer = tokio::spawn(async move {
            for i in 0..5i64 {
                injector.put_row(vec![RowValue::Integer(i)]).await.unwrap();
            }
            injector.finished();
        });

        let mut received = Vec::new();
        while let Some(row) = rx.recv().await {
            received.push(row);
        }
        producer.await.unwrap();

        assert_eq!(received.len(), 5);
        for (i, row) in received.iter().enumerate() {
            assert_eq!(row[0], RowValue::Integer(i as i64));
        }
    }

    #[tokio::test]
    async fn test_injector_rejection_reports_delivered_count() {
        let (tx, rx) = mpsc::channel::<Row>(4);
        let mut injector = RowInjector::new(tx);

        injector.put_row(vec![RowValue::Integer(1)]).await.unwrap();
        drop(rx);

        let err = injector.put_row(vec![RowValue::Integer(2)]).await.unwrap_err();
        match err {
            InjectionError::Rejected { delivered } => assert_eq!(delivered, 1),
        }
    }
}

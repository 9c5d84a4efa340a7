use crate::domain::model::{RecordBatch, SinkTarget, StoreReceipt, WriteReport};
use crate::domain::ports::{PrimaryStore, SpreadsheetSink};
use crate::utils::error::{SinkError, WriteError};

/// Result of writing one batch to both sinks.
#[derive(Debug)]
pub enum WriteOutcome {
    /// Both sinks accepted every record.
    Complete(WriteReport),
    /// Store committed, mirror failed. The store rows are kept.
    Partial {
        store: StoreReceipt,
        records: usize,
        error: SinkError,
    },
    /// Store rejected the batch; the mirror was never called.
    Failed(SinkError),
}

impl WriteOutcome {
    pub fn into_result(self) -> Result<WriteReport, WriteError> {
        match self {
            WriteOutcome::Complete(report) => Ok(report),
            WriteOutcome::Partial { records, error, .. } => Err(WriteError::MirrorFailed {
                stored: records,
                source: error,
            }),
            WriteOutcome::Failed(error) => Err(WriteError::PrimaryStoreFailed(error)),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, WriteOutcome::Complete(_))
    }
}

/// Writes to the store first and mirrors to the spreadsheet only after the
/// store has committed.
pub struct DualSinkWriter<P: PrimaryStore, M: SpreadsheetSink> {
    store: P,
    mirror: M,
}

impl<P: PrimaryStore, M: SpreadsheetSink> DualSinkWriter<P, M> {
    pub fn new(store: P, mirror: M) -> Self {
        Self { store, mirror }
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    pub async fn write(&self, target: SinkTarget<'_>, batch: &RecordBatch) -> WriteOutcome {
        if batch.is_empty() {
            tracing::info!(table = target.table, "No records to write, skipping both sinks");
            return WriteOutcome::Complete(WriteReport::default());
        }

        let records = batch.len();

        let store = match self.store.insert(target.table, &batch.store_rows).await {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::error!(table = target.table, records, error = %e, "❌ Primary store write failed");
                return WriteOutcome::Failed(e);
            }
        };
        tracing::info!(table = target.table, records, "Data inserted into primary store");

        match self.mirror.append(target.range, &batch.sheet_rows).await {
            Ok(mirror) => {
                tracing::info!(
                    range = target.range,
                    updated_range = mirror.updated_range.as_deref().unwrap_or("unknown"),
                    "✅ Data appended to spreadsheet"
                );
                WriteOutcome::Complete(WriteReport {
                    records,
                    store,
                    mirror: Some(mirror),
                })
            }
            Err(e) => {
                tracing::error!(
                    range = target.range,
                    records,
                    error = %e,
                    "❌ Spreadsheet mirror failed, store rows are kept"
                );
                WriteOutcome::Partial {
                    store,
                    records,
                    error: e,
                }
            }
        }
    }
}

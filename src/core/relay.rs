use crate::config::EndpointConfig;
use crate::core::normalizer::{self, Limits};
use crate::core::writer::{DualSinkWriter, WriteOutcome};
use crate::domain::model::{RecordBatch, SubmissionKind};
use crate::domain::ports::{PrimaryStore, SpreadsheetSink};
use crate::utils::error::ValidationError;
use serde_json::Value;

/// Normalizes a submission and hands the resulting batch to the writer.
pub struct RelayEngine<P: PrimaryStore, M: SpreadsheetSink> {
    writer: DualSinkWriter<P, M>,
    limits: Limits,
}

impl<P: PrimaryStore, M: SpreadsheetSink> RelayEngine<P, M> {
    pub fn new(writer: DualSinkWriter<P, M>, limits: Limits) -> Self {
        Self { writer, limits }
    }

    pub fn writer(&self) -> &DualSinkWriter<P, M> {
        &self.writer
    }

    pub fn prepare(&self, kind: SubmissionKind, raw: Value) -> Result<RecordBatch, ValidationError> {
        let batch = match kind {
            SubmissionKind::Order => {
                let records = normalizer::normalize_order(raw, &self.limits)?;
                RecordBatch::from_records(&records)
            }
            SubmissionKind::Lead => {
                let lead = normalizer::normalize_lead(&raw)?;
                RecordBatch::from_records(std::slice::from_ref(&lead))
            }
        };

        batch.map_err(|e| ValidationError::InvalidBody(e.to_string()))
    }

    /// Validation errors return before either sink is called.
    pub async fn submit(
        &self,
        endpoint: &EndpointConfig,
        raw: Value,
    ) -> Result<WriteOutcome, ValidationError> {
        let batch = self.prepare(endpoint.kind, raw)?;
        tracing::debug!(
            path = %endpoint.path,
            records = batch.len(),
            rows = ?batch.store_rows,
            "Prepared records"
        );

        Ok(self.writer.write(endpoint.target(), &batch).await)
    }
}

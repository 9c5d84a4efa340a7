#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use submission_relay::core::normalizer::Limits;
use submission_relay::core::{PrimaryStore, SpreadsheetSink};
use submission_relay::domain::model::{MirrorReceipt, StoreReceipt};
use submission_relay::utils::error::SinkError;
use submission_relay::{DualSinkWriter, RelayEngine};
use tokio::sync::Mutex;

/// Records every insert; committed rows only grow on success.
#[derive(Clone, Default)]
pub struct SpyStore {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub committed: Arc<Mutex<Vec<Value>>>,
    pub fail: bool,
}

impl SpyStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub async fn committed(&self) -> Vec<Value> {
        self.committed.lock().await.clone()
    }
}

impl PrimaryStore for SpyStore {
    async fn insert(&self, table: &str, rows: &[Value]) -> Result<StoreReceipt, SinkError> {
        self.calls.lock().await.push(table.to_string());

        if self.fail {
            return Err(SinkError::Rejected {
                status: 409,
                body: json!({ "message": "duplicate key value violates unique constraint" }),
            });
        }

        let mut committed = self.committed.lock().await;
        let mut echoed = Vec::with_capacity(rows.len());
        for row in rows {
            let mut row = row.clone();
            if let Value::Object(map) = &mut row {
                map.insert("id".to_string(), json!(committed.len() + 1));
            }
            committed.push(row.clone());
            echoed.push(row);
        }

        Ok(StoreReceipt { rows: echoed })
    }
}

#[derive(Clone, Default)]
pub struct SpyMirror {
    pub calls: Arc<Mutex<Vec<(String, Vec<Vec<Value>>)>>>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl SpyMirror {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Sleeps before answering, like a slow spreadsheet API.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub async fn rows(&self) -> Vec<Vec<Value>> {
        self.calls
            .lock()
            .await
            .iter()
            .flat_map(|(_, rows)| rows.clone())
            .collect()
    }
}

impl SpreadsheetSink for SpyMirror {
    async fn append(&self, range: &str, rows: &[Vec<Value>]) -> Result<MirrorReceipt, SinkError> {
        self.calls
            .lock()
            .await
            .push((range.to_string(), rows.to_vec()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(SinkError::Rejected {
                status: 403,
                body: json!({ "error": { "message": "The caller does not have permission" } }),
            });
        }

        Ok(MirrorReceipt {
            updated_range: Some(format!("{}!A2:K{}", range, rows.len() + 1)),
            updated_rows: Some(rows.len() as u64),
        })
    }
}

pub fn engine(store: SpyStore, mirror: SpyMirror) -> RelayEngine<SpyStore, SpyMirror> {
    RelayEngine::new(DualSinkWriter::new(store, mirror), Limits::default())
}

pub fn widget_order() -> Value {
    json!({
        "OrderReceived": "2024-05-01T10:00:00Z",
        "email": "buyer@example.com",
        "company": "Acme",
        "ContactName": "Jo Smith",
        "ContractNumber": "C-42",
        "StartDate": "2024-06-01",
        "EndDate": "2025-06-01",
        "products": [
            {"ProductDescription": "Widget", "NewRenewal": "New", "Term": "12mo", "Quantity": 3},
            {"ProductDescription": "", "NewRenewal": "New", "Term": "1mo", "Quantity": 5}
        ]
    })
}

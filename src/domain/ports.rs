use crate::domain::model::{MirrorReceipt, StoreReceipt};
use crate::utils::error::SinkError;
use async_trait::async_trait;
use serde_json::Value;

/// Authoritative relational store.
pub trait PrimaryStore: Send + Sync {
    fn insert(
        &self,
        table: &str,
        rows: &[Value],
    ) -> impl std::future::Future<Output = Result<StoreReceipt, SinkError>> + Send;
}

/// Best-effort spreadsheet mirror.
pub trait SpreadsheetSink: Send + Sync {
    fn append(
        &self,
        range: &str,
        rows: &[Vec<Value>],
    ) -> impl std::future::Future<Output = Result<MirrorReceipt, SinkError>> + Send;
}

/// Supplies bearer tokens for the spreadsheet API.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, SinkError>;
}

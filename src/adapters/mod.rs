// Adapters layer: concrete sink clients and the spreadsheet credential provider.

pub mod credentials;
pub mod postgrest;
pub mod sheets;

use crate::config::AppConfig;
use crate::core::relay::RelayEngine;
use crate::core::writer::DualSinkWriter;
use crate::utils::error::{RelayError, Result};
use credentials::{ServiceAccountTokens, StaticToken};
use postgrest::PostgrestStore;
use sheets::SheetsClient;

use serde_json::Value;
use std::time::Duration;

/// Shared client for one sink; every call is bounded by `timeout`.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("submission-relay/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Error body from a sink, kept as JSON when the sink sent JSON.
pub(crate) async fn error_body(response: reqwest::Response) -> Value {
    match response.text().await {
        Ok(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        Err(e) => Value::String(format!("unreadable body: {}", e)),
    }
}

pub fn build_sheets_client(config: &AppConfig) -> Result<SheetsClient> {
    let client = http_client(config.sink_timeout())?;
    let sheets = &config.sheets;

    let sheets_client = match (&sheets.access_token, &sheets.credentials) {
        (Some(token), _) if !token.trim().is_empty() => {
            tracing::info!("Using pre-issued spreadsheet access token");
            SheetsClient::new(
                client,
                &sheets.api_base,
                sheets.spreadsheet_id.clone(),
                StaticToken(token.clone()),
            )
        }
        (_, Some(raw)) => SheetsClient::new(
            client,
            &sheets.api_base,
            sheets.spreadsheet_id.clone(),
            ServiceAccountTokens::new(raw.clone()),
        ),
        _ => Err(RelayError::MissingConfigError {
            field: "sheets.credentials".to_string(),
        }),
    }?;

    Ok(sheets_client.with_token_timeout(config.sink_timeout()))
}

/// Wires the real store and spreadsheet clients from configuration.
pub fn build_engine(config: &AppConfig) -> Result<RelayEngine<PostgrestStore, SheetsClient>> {
    let store = PostgrestStore::new(
        http_client(config.sink_timeout())?,
        &config.store.url,
        config.store.api_key.clone(),
    )?;
    let sheets = build_sheets_client(config)?;
    let limits = config.normalizer_limits();

    Ok(RelayEngine::new(DualSinkWriter::new(store, sheets), limits))
}

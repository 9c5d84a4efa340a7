use crate::adapters::error_body;
use crate::domain::model::MirrorReceipt;
use crate::domain::ports::{SpreadsheetSink, TokenProvider};
use crate::utils::error::{CredentialError, RelayError, Result, SinkError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SHEETS_API: &str = "https://sheets.googleapis.com";
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    updated_range: Option<String>,
    updated_rows: Option<u64>,
}

/// Appends rows to one spreadsheet via `values.append` (USER_ENTERED).
pub struct SheetsClient {
    client: Client,
    api_base: Url,
    spreadsheet_id: String,
    tokens: Box<dyn TokenProvider>,
    token_timeout: Duration,
}

impl SheetsClient {
    pub fn new(
        client: Client,
        api_base: &str,
        spreadsheet_id: impl Into<String>,
        tokens: impl TokenProvider + 'static,
    ) -> Result<Self> {
        let api_base = Url::parse(api_base).map_err(|e| RelayError::InvalidConfigValueError {
            field: "sheets.api_base".to_string(),
            value: api_base.to_string(),
            reason: e.to_string(),
        })?;
        if api_base.cannot_be_a_base() {
            return Err(RelayError::InvalidConfigValueError {
                field: "sheets.api_base".to_string(),
                value: api_base.to_string(),
                reason: "URL cannot be a base".to_string(),
            });
        }

        Ok(Self {
            client,
            api_base,
            spreadsheet_id: spreadsheet_id.into(),
            tokens: Box::new(tokens),
            token_timeout: DEFAULT_TOKEN_TIMEOUT,
        })
    }

    /// Bounds the token fetch; the HTTP client timeout only covers the append.
    pub fn with_token_timeout(mut self, timeout: Duration) -> Self {
        self.token_timeout = timeout;
        self
    }

    pub fn append_url(&self, range: &str) -> Url {
        let action = format!("{}:append", range);
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                action.as_str(),
            ]);
        }
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        url
    }
}

impl SpreadsheetSink for SheetsClient {
    async fn append(
        &self,
        range: &str,
        rows: &[Vec<Value>],
    ) -> std::result::Result<MirrorReceipt, SinkError> {
        let token = tokio::time::timeout(self.token_timeout, self.tokens.access_token())
            .await
            .map_err(|_| CredentialError::Timeout(self.token_timeout))??;
        let url = self.append_url(range);
        tracing::debug!("Appending {} rows to {}", rows.len(), range);

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": rows }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        let body: AppendResponse = response.json().await.map_err(|e| SinkError::InvalidResponse {
            message: format!("unexpected append response: {}", e),
        })?;
        let updates = body.updates;

        Ok(MirrorReceipt {
            updated_range: updates.as_ref().and_then(|u| u.updated_range.clone()),
            updated_rows: updates.as_ref().and_then(|u| u.updated_rows),
        })
    }
}

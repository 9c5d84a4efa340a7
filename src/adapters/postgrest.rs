use crate::adapters::error_body;
use crate::domain::model::StoreReceipt;
use crate::domain::ports::PrimaryStore;
use crate::utils::error::{RelayError, Result, SinkError};
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// Inserts rows through a PostgREST endpoint (`{base}/rest/v1/{table}`),
/// the interface Supabase exposes.
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    client: Client,
    rest_url: Url,
    api_key: String,
}

impl PostgrestStore {
    pub fn new(client: Client, base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let invalid = |reason: String| RelayError::InvalidConfigValueError {
            field: "store.url".to_string(),
            value: base_url.to_string(),
            reason,
        };

        let mut rest_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        rest_url
            .path_segments_mut()
            .map_err(|_| invalid("URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["rest", "v1"]);

        Ok(Self {
            client,
            rest_url,
            api_key: api_key.into(),
        })
    }

    pub fn table_url(&self, table: &str) -> Url {
        let mut url = self.rest_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(table);
        }
        url
    }
}

impl PrimaryStore for PostgrestStore {
    async fn insert(&self, table: &str, rows: &[Value]) -> std::result::Result<StoreReceipt, SinkError> {
        let url = self.table_url(table);
        tracing::debug!("Inserting {} rows into {}", rows.len(), url);

        let response = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Primary store response status: {}", status);

        if !status.is_success() {
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(StoreReceipt::default());
        }

        let rows = match serde_json::from_str(&text) {
            Ok(Value::Array(rows)) => rows,
            Ok(other) => vec![other],
            Err(e) => {
                return Err(SinkError::InvalidResponse {
                    message: format!("store returned non-JSON body: {}", e),
                })
            }
        };

        Ok(StoreReceipt { rows })
    }
}

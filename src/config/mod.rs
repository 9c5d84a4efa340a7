#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::sheets::DEFAULT_SHEETS_API;
use crate::core::normalizer::{Limits, DEFAULT_MAX_RECORDS};
use crate::domain::model::{SinkTarget, SubmissionKind};
use crate::utils::error::{RelayError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_RANGE: &str = "Sheet1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<EndpointConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("api_key", &"***")
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// Service account key JSON, raw or base64.
    #[serde(default)]
    pub credentials: Option<String>,
    /// Pre-issued bearer token; used instead of `credentials` when set.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_sheets_api")]
    pub api_base: String,
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("SheetsConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("credentials", &mask(&self.credentials))
            .field("access_token", &mask(&self.access_token))
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    #[serde(default = "default_sink_timeout")]
    pub sink_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
            sink_timeout_secs: default_sink_timeout(),
        }
    }
}

/// One webhook route: payload variant plus where its rows are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub path: String,
    pub kind: SubmissionKind,
    pub table: String,
    #[serde(default = "default_range")]
    pub range: String,
    /// Answer CORS preflight and add `Access-Control-*` headers.
    #[serde(default)]
    pub cors: bool,
}

impl EndpointConfig {
    pub fn new(path: &str, kind: SubmissionKind, table: &str) -> Self {
        Self {
            path: path.to_string(),
            kind,
            table: table.to_string(),
            range: default_range(),
            cors: false,
        }
    }

    pub fn with_cors(mut self, cors: bool) -> Self {
        self.cors = cors;
        self
    }

    pub fn target(&self) -> SinkTarget<'_> {
        SinkTarget {
            table: &self.table,
            range: &self.range,
        }
    }
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_sheets_api() -> String {
    DEFAULT_SHEETS_API.to_string()
}

fn default_max_records() -> usize {
    DEFAULT_MAX_RECORDS
}

fn default_sink_timeout() -> u64 {
    10
}

fn default_range() -> String {
    DEFAULT_RANGE.to_string()
}

/// 預設端點：訂單表單 (含 CORS)、訂單表單、SalesIQ 名單
pub fn default_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig::new("/api/email", SubmissionKind::Order, "EmailTest").with_cors(true),
        EndpointConfig::new("/api/Zmail", SubmissionKind::Order, "EmailTest"),
        EndpointConfig::new("/api/salesiq", SubmissionKind::Lead, "Leads"),
    ]
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| RelayError::MissingConfigError {
                    field: key.to_string(),
                })
        };

        Ok(Self {
            server: ServerConfig {
                bind_addr: lookup("BIND_ADDR").unwrap_or_else(default_bind_addr),
            },
            store: StoreConfig {
                url: required("SUPABASE_URL")?,
                api_key: required("SUPABASE_KEY")?,
            },
            sheets: SheetsConfig {
                spreadsheet_id: required("SPREADSHEET_ID")?,
                credentials: lookup("GOOGLE_SERVICE_ACCOUNT_CREDENTIALS"),
                access_token: lookup("SHEETS_ACCESS_TOKEN"),
                api_base: lookup("SHEETS_API_BASE").unwrap_or_else(default_sheets_api),
            },
            limits: LimitsConfig {
                max_records: parse_var(&lookup, "MAX_RECORDS", default_max_records())?,
                sink_timeout_secs: parse_var(&lookup, "SINK_TIMEOUT_SECS", default_sink_timeout())?,
            },
            endpoints: default_endpoints(),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| RelayError::InvalidConfigValueError {
                field: "server.bind_addr".to_string(),
                value: self.server.bind_addr.clone(),
                reason: e.to_string(),
            })
    }

    pub fn normalizer_limits(&self) -> Limits {
        Limits {
            max_records: self.limits.max_records,
        }
    }

    pub fn sink_timeout(&self) -> Duration {
        Duration::from_secs(self.limits.sink_timeout_secs)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| RelayError::InvalidConfigValueError {
                field: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        validation::validate_url("store.url", &self.store.url)?;
        validation::validate_non_empty_string("store.api_key", &self.store.api_key)?;

        validation::validate_non_empty_string("sheets.spreadsheet_id", &self.sheets.spreadsheet_id)?;
        validation::validate_url("sheets.api_base", &self.sheets.api_base)?;
        let has_secret = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !has_secret(&self.sheets.credentials) && !has_secret(&self.sheets.access_token) {
            return Err(RelayError::MissingConfigError {
                field: "sheets.credentials".to_string(),
            });
        }

        validation::validate_positive_number("limits.max_records", self.limits.max_records, 1)?;
        validation::validate_range("limits.sink_timeout_secs", self.limits.sink_timeout_secs, 1, 300)?;

        validation::validate_endpoint_paths(
            "endpoints",
            self.endpoints.iter().map(|e| e.path.as_str()),
        )?;
        for endpoint in &self.endpoints {
            validation::validate_non_empty_string("endpoints.table", &endpoint.table)?;
            validation::validate_non_empty_string("endpoints.range", &endpoint.range)?;
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn base_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_KEY", "service-key"),
            ("SPREADSHEET_ID", "sheet-123"),
            ("GOOGLE_SERVICE_ACCOUNT_CREDENTIALS", "eyJ9"),
        ]
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = AppConfig::from_lookup(lookup(&base_vars())).unwrap();

        assert_eq!(config.server.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.sheets.api_base, DEFAULT_SHEETS_API);
        assert_eq!(config.limits.max_records, DEFAULT_MAX_RECORDS);
        assert_eq!(config.sink_timeout(), Duration::from_secs(10));
        assert_eq!(config.endpoints, default_endpoints());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_missing_required() {
        let vars: Vec<_> = base_vars()
            .into_iter()
            .filter(|(k, _)| *k != "SPREADSHEET_ID")
            .collect();
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, RelayError::MissingConfigError { field } if field == "SPREADSHEET_ID"));
    }

    #[test]
    fn test_from_lookup_bad_number() {
        let mut vars = base_vars();
        vars.push(("SINK_TIMEOUT_SECS", "soon"));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, RelayError::InvalidConfigValueError { field, .. } if field == "SINK_TIMEOUT_SECS"));
    }

    #[test]
    fn test_validate_requires_sheet_secret() {
        let vars: Vec<_> = base_vars()
            .into_iter()
            .filter(|(k, _)| *k != "GOOGLE_SERVICE_ACCOUNT_CREDENTIALS")
            .collect();
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(config.validate().is_err());

        let mut vars = vars;
        vars.push(("SHEETS_ACCESS_TOKEN", "ya29.token"));
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_masks_secrets() {
        let config = AppConfig::from_lookup(lookup(&base_vars())).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("service-key"));
        assert!(!printed.contains("eyJ9"));
        assert!(printed.contains("sheet-123"));
    }
}

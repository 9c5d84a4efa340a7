use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::config::EndpointConfig;
use crate::core::relay::RelayEngine;
use crate::core::writer::WriteOutcome;
use crate::domain::model::SubmissionKind;
use crate::domain::ports::{PrimaryStore, SpreadsheetSink};
use crate::utils::error::ValidationError;

/// Per-route state: the shared engine plus this route's endpoint config.
pub struct EndpointState<P: PrimaryStore, M: SpreadsheetSink> {
    engine: Arc<RelayEngine<P, M>>,
    endpoint: Arc<EndpointConfig>,
}

impl<P: PrimaryStore, M: SpreadsheetSink> EndpointState<P, M> {
    pub fn new(engine: Arc<RelayEngine<P, M>>, endpoint: EndpointConfig) -> Self {
        Self {
            engine,
            endpoint: Arc::new(endpoint),
        }
    }
}

impl<P: PrimaryStore, M: SpreadsheetSink> Clone for EndpointState<P, M> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            endpoint: Arc::clone(&self.endpoint),
        }
    }
}

/// Handles every verb on a submission route.
///
/// - `POST`: normalize, write to both sinks, report per-sink status
/// - `OPTIONS` (CORS endpoints only): preflight, 200 with no body
/// - anything else: 405 with an `Allow` header
pub async fn handle_submission<P, M>(
    State(state): State<EndpointState<P, M>>,
    method: Method,
    body: Bytes,
) -> Response
where
    P: PrimaryStore + 'static,
    M: SpreadsheetSink + 'static,
{
    let endpoint = &state.endpoint;
    let preflight = endpoint.cors && method == Method::OPTIONS;

    let mut response = if preflight {
        StatusCode::OK.into_response()
    } else if method == Method::POST {
        process(&state, &body).await
    } else {
        tracing::warn!(path = %endpoint.path, method = %method, "Method not allowed");
        method_not_allowed(endpoint, &method)
    };

    if endpoint.cors {
        apply_cors_headers(response.headers_mut(), preflight);
    }
    response
}

async fn process<P, M>(state: &EndpointState<P, M>, body: &[u8]) -> Response
where
    P: PrimaryStore,
    M: SpreadsheetSink,
{
    let endpoint = &state.endpoint;

    let raw: Value = match serde_json::from_slice(body) {
        Ok(raw) => raw,
        Err(e) => {
            let err = ValidationError::InvalidBody(e.to_string());
            tracing::warn!(path = %endpoint.path, error = %err, "Rejected submission");
            return validation_response(endpoint.kind, &err);
        }
    };
    tracing::debug!(path = %endpoint.path, body = %raw, "Incoming request body");

    match state.engine.submit(endpoint, raw).await {
        Ok(outcome) => outcome_response(endpoint.kind, outcome),
        Err(err) => {
            tracing::warn!(path = %endpoint.path, error = %err, "Rejected submission");
            validation_response(endpoint.kind, &err)
        }
    }
}

fn outcome_response(kind: SubmissionKind, outcome: WriteOutcome) -> Response {
    match outcome {
        WriteOutcome::Complete(report) => match kind {
            SubmissionKind::Order => json_response(
                kind,
                StatusCode::OK,
                json!({
                    "message": "Data saved successfully",
                    "data": report.store.rows,
                }),
            ),
            SubmissionKind::Lead => json_response(
                kind,
                StatusCode::OK,
                json!({ "message": "Data successfully saved to primary store and spreadsheet" }),
            ),
        },
        WriteOutcome::Partial { records, error, .. } => json_response(
            kind,
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "error": "Failed to save to spreadsheet",
                "details": error.details(),
                "partial": true,
                "stored": records,
            }),
        ),
        WriteOutcome::Failed(error) => json_response(
            kind,
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "error": "Failed to save to primary store",
                "details": error.details(),
            }),
        ),
    }
}

fn validation_response(kind: SubmissionKind, err: &ValidationError) -> Response {
    json_response(kind, StatusCode::BAD_REQUEST, json!({ "error": err.to_string() }))
}

/// Lead endpoints additionally carry a `success` flag.
fn json_response(kind: SubmissionKind, status: StatusCode, mut body: Value) -> Response {
    if kind == SubmissionKind::Lead {
        if let Value::Object(map) = &mut body {
            map.insert("success".to_string(), Value::Bool(status.is_success()));
        }
    }
    (status, Json(body)).into_response()
}

fn allowed_methods(endpoint: &EndpointConfig) -> &'static str {
    if endpoint.cors {
        "POST, OPTIONS"
    } else {
        "POST"
    }
}

fn method_not_allowed(endpoint: &EndpointConfig, method: &Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, allowed_methods(endpoint))],
        format!("Method {} Not Allowed", method),
    )
        .into_response()
}

fn apply_cors_headers(headers: &mut HeaderMap, preflight: bool) {
    let methods = if preflight { "POST, OPTIONS" } else { "POST" };
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(methods),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}

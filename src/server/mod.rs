//! HTTP surface: one route per configured endpoint plus `/health`.
//!
//! Every endpoint shares the same handler; the per-route state carries the
//! endpoint's variant, table, sheet range and CORS policy.
//!
//! There is no request-wide deadline. Each sink call carries its own
//! timeout, so a handler always runs to the point where it can report
//! whether the store rows were kept.

pub mod handler;

use std::sync::Arc;

use axum::{
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::EndpointConfig;
use crate::core::relay::RelayEngine;
use crate::domain::ports::{PrimaryStore, SpreadsheetSink};

pub use handler::{handle_submission, EndpointState};

pub fn create_router<P, M>(
    engine: Arc<RelayEngine<P, M>>,
    endpoints: &[EndpointConfig],
) -> Router
where
    P: PrimaryStore + 'static,
    M: SpreadsheetSink + 'static,
{
    let mut router = Router::new().route("/health", get(health_check));

    for endpoint in endpoints {
        let state = EndpointState::new(Arc::clone(&engine), endpoint.clone());
        router = router.route(
            &endpoint.path,
            any(handle_submission::<P, M>).with_state(state),
        );
        tracing::info!(path = %endpoint.path, kind = ?endpoint.kind, table = %endpoint.table, "Registered endpoint");
    }

    router.layer(TraceLayer::new_for_http())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}

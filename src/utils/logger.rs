use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins; otherwise our own crate at info (debug when verbose) and
/// request spans from tower-http only when verbose.
fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = if verbose {
            "submission_relay=debug,tower_http=debug,info"
        } else {
            "submission_relay=info,tower_http=warn,warn"
        };
        EnvFilter::new(directives)
    })
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .compact(),
        )
        .init();
}

/// JSON 格式輸出，給 log 收集器使用；每行帶上目前的 request span
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();
}

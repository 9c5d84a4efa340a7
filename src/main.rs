use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use submission_relay::adapters::{build_engine, credentials::decode_credentials};
use submission_relay::config::cli::Command;
use submission_relay::utils::{logger, validation::Validate};
use submission_relay::{create_router, server, AppConfig, Cli};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting submission-relay");

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?,
        None => AppConfig::from_env().context("failed to load config from environment")?,
    };
    if let Some(bind) = &cli.bind {
        config.server.bind_addr = bind.clone();
    }
    tracing::debug!("Config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    if cli.command() == Command::CheckConfig {
        check_credentials(&config)?;
        println!("✅ Configuration OK");
        return Ok(());
    }

    let engine = Arc::new(build_engine(&config)?);
    let router = create_router(engine, &config.endpoints);

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Ready to receive submissions");

    server::serve(listener, router).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Decodes the service account key up front instead of on the first request.
fn check_credentials(config: &AppConfig) -> anyhow::Result<()> {
    match &config.sheets.credentials {
        Some(raw) if !raw.trim().is_empty() => {
            let key = decode_credentials(raw).context("spreadsheet credentials are invalid")?;
            tracing::info!(client_email = %key.client_email, "✅ Service account key decoded");
        }
        _ => tracing::info!("No service account key configured, using access token"),
    }
    Ok(())
}

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use adapters::{
    credentials::{ServiceAccountTokens, StaticToken},
    postgrest::PostgrestStore,
    sheets::SheetsClient,
};
pub use config::{AppConfig, EndpointConfig};
pub use core::{relay::RelayEngine, writer::DualSinkWriter, writer::WriteOutcome};
pub use server::create_router;
pub use utils::error::{RelayError, Result};

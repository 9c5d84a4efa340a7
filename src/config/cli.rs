use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "submission-relay")]
#[command(about = "Webhook relay that stores form submissions and mirrors them to a spreadsheet")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// TOML config file; environment variables are used when omitted
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long)]
    pub bind: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve the webhook endpoints (default)
    Serve,
    /// Load the config, decode the credentials and exit
    CheckConfig,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::parse_from(["submission-relay"]);
        assert_eq!(cli.command(), Command::Serve);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_check_config_with_file() {
        let cli = Cli::parse_from([
            "submission-relay",
            "--config",
            "relay.toml",
            "--bind",
            "127.0.0.1:9000",
            "check-config",
        ]);
        assert_eq!(cli.command(), Command::CheckConfig);
        assert_eq!(cli.config, Some(PathBuf::from("relay.toml")));
        assert_eq!(cli.bind.as_deref(), Some("127.0.0.1:9000"));
    }
}

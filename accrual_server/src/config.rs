use std::env;

use clap::Parser;
use thiserror::Error;

const DEFAULT_RUN_ADDRESS: &str = ":8081";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, Debug, Default)]
#[command(name = "accrual", about = "Merchant-facing accrual service")]
pub struct Cli {
    /// Address and port to listen on
    #[arg(short = 'a', long = "run-address")]
    pub run_address: Option<String>,
    /// Postgres connection URI
    #[arg(short = 'd', long = "database-uri")]
    pub database_uri: Option<String>,
}

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("The database URI cannot be empty; pass -d or set DATABASE_URI")]
    MissingDatabaseUri,
}

/// Immutable service configuration, fixed at startup. Command-line flags are read first; a non-empty
/// environment variable overrides the matching flag.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub run_address: String,
    pub database_uri: String,
    pub log_level: String,
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let run_address =
            env_override("RUN_ADDRESS").or(cli.run_address).unwrap_or_else(|| DEFAULT_RUN_ADDRESS.to_string());
        let database_uri = env_override("DATABASE_URI").or(cli.database_uri).ok_or(ConfigError::MissingDatabaseUri)?;
        let log_level = env_override("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        Ok(Self { run_address, database_uri, log_level })
    }
}

fn env_override(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

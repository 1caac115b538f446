use std::env;

use clap::Parser;
use log::warn;
use lp_common::Secret;
use thiserror::Error;

const DEFAULT_RUN_ADDRESS: &str = ":8080";
const DEFAULT_JWT_SECRET: &str = "test-secret-key";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, Debug, Default)]
#[command(name = "gophermart", about = "Customer-facing loyalty service")]
pub struct Cli {
    /// Address and port to listen on
    #[arg(short = 'a', long = "run-address")]
    pub run_address: Option<String>,
    /// Postgres connection URI
    #[arg(short = 'd', long = "database-uri")]
    pub database_uri: Option<String>,
    /// Base URL of the accrual system
    #[arg(short = 'r', long = "accrual-address")]
    pub accrual_address: Option<String>,
}

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("The database URI cannot be empty; pass -d or set DATABASE_URI")]
    MissingDatabaseUri,
    #[error("The accrual system address cannot be empty; pass -r or set ACCRUAL_SYSTEM_ADDRESS")]
    MissingAccrualAddress,
}

/// Immutable service configuration, fixed at startup. Command-line flags are read first; a non-empty
/// environment variable overrides the matching flag.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub run_address: String,
    pub database_uri: String,
    pub accrual_address: String,
    pub jwt_secret: Secret<String>,
    pub log_level: String,
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let run_address =
            env_override("RUN_ADDRESS").or(cli.run_address).unwrap_or_else(|| DEFAULT_RUN_ADDRESS.to_string());
        let database_uri =
            env_override("DATABASE_URI").or(cli.database_uri).ok_or(ConfigError::MissingDatabaseUri)?;
        let accrual_address =
            env_override("ACCRUAL_SYSTEM_ADDRESS").or(cli.accrual_address).ok_or(ConfigError::MissingAccrualAddress)?;
        let jwt_secret = env_override("JWT_SECRET").unwrap_or_else(|| {
            warn!("🔑️ JWT_SECRET is not set; falling back to the built-in development secret");
            DEFAULT_JWT_SECRET.to_string()
        });
        let log_level = env_override("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        Ok(Self {
            run_address,
            database_uri,
            accrual_address,
            jwt_secret: Secret::new(jwt_secret),
            log_level,
        })
    }
}

fn env_override(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod test {
    use super::{Cli, ConfigError, ServerConfig};

    // Environment access is process-global, so every env-sensitive assertion lives in this one test.
    #[test]
    fn flags_then_environment() {
        std::env::remove_var("RUN_ADDRESS");
        std::env::remove_var("DATABASE_URI");
        std::env::remove_var("ACCRUAL_SYSTEM_ADDRESS");

        let cli = Cli {
            run_address: Some("localhost:9090".to_string()),
            database_uri: Some("postgres://flag".to_string()),
            accrual_address: Some("http://flag".to_string()),
        };
        let config = ServerConfig::from_cli(cli).unwrap();
        assert_eq!(config.run_address, "localhost:9090");
        assert_eq!(config.database_uri, "postgres://flag");

        std::env::set_var("DATABASE_URI", "postgres://env");
        std::env::set_var("RUN_ADDRESS", "");
        let cli = Cli {
            run_address: Some("localhost:9090".to_string()),
            database_uri: Some("postgres://flag".to_string()),
            accrual_address: Some("http://flag".to_string()),
        };
        let config = ServerConfig::from_cli(cli).unwrap();
        // A set, non-empty variable wins; an empty one does not.
        assert_eq!(config.database_uri, "postgres://env");
        assert_eq!(config.run_address, "localhost:9090");
        std::env::remove_var("DATABASE_URI");
        std::env::remove_var("RUN_ADDRESS");

        let err = ServerConfig::from_cli(Cli::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDatabaseUri));
    }
}

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::LedgerError;

/// Environment variable prefix, e.g. `RISK_LEDGER__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "RISK_LEDGER";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub ledger: LedgerConfig,
    pub server: ServerConfig,
    pub verification: VerificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Identity allowed to append records when the ledger is first created.
    pub owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub simulate: bool,
}

impl VerificationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional TOML file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, LedgerError> {
        let mut builder = Config::builder()
            .set_default("database_url", "sqlite://risk-ledger.db")?
            .set_default("ledger.owner", "owner")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("verification.timeout_secs", 30)?
            .set_default("verification.simulate", false)?;

        if let Some(path) = path {
            if !path.exists() {
                return Err(LedgerError::ConfigError(format!(
                    "Configuration file not found: {:?}",
                    path
                )));
            }
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), LedgerError> {
        if self.ledger.owner.trim().is_empty() {
            return Err(LedgerError::ConfigError(
                "ledger.owner must not be empty".to_string(),
            ));
        }
        if self.verification.timeout_secs == 0 {
            return Err(LedgerError::ConfigError(
                "verification.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::error::{AppError, Result};

/// Config file picked up from the working directory when present.
pub const CONFIG_FILE: &str = "ordersight.toml";

/// Environment variable prefix, e.g. ORDERSIGHT_DATABASE_PATH.
pub const ENV_PREFIX: &str = "ORDERSIGHT_";

/// Application configuration. Sources are layered: built-in defaults, then
/// the TOML config file, then prefixed environment variables. CLI flags
/// override the loaded values last.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Path of the SQLite analytics database.
    #[validate(length(min = 1))]
    pub database_path: String,

    /// Address the dashboard server binds to.
    #[validate(length(min = 1))]
    pub host: String,

    /// Port the dashboard server listens on.
    #[validate(range(min = 1))]
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "data/ordersight.db".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // .env is optional; absence is not an error.
        dotenvy::dotenv().ok();

        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load configuration: {e}")))?;

        config
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 3001);
    }

    #[test]
    fn rejects_blank_paths_and_zero_port() {
        let config = AppConfig {
            database_path: String::new(),
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        assert!(config.validate().is_err());
    }
}

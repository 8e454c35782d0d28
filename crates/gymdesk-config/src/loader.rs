//! Configuration loader with layered sources.

use crate::{AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use gymdesk_core::GymdeskError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Environment variable selecting the `config/{environment}.toml` layer.
pub const ENVIRONMENT_VAR: &str = "GYMDESK_ENV";

const DEFAULT_JWT_SECRET: &str = "change-me-in-production-please-32chars";

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides, not committed
    /// 4. Environment variables such as `GYMDESK__DATABASE__URL`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a source cannot be parsed or the
    /// merged configuration fails validation.
    pub fn new(config_dir: impl Into<PathBuf>) -> Result<Self, GymdeskError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::new`].
    pub fn from_default_location() -> Result<Self, GymdeskError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    ///
    /// # Errors
    ///
    /// Keeps the previous configuration and returns the error if the new one is invalid.
    pub async fn reload(&self) -> Result<(), GymdeskError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &Path) -> Result<AppConfig, GymdeskError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {}", e);
        }

        let environment = std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string());
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = config_dir.join(format!("{name}.toml"));
            if path.exists() {
                debug!("Loading config layer from: {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder
            .set_override("app.environment", environment.clone())
            .map_err(config_error_to_gymdesk_error)?;

        builder = builder.add_source(
            Environment::with_prefix("GYMDESK")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.cors_origins"),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(|c| c.try_deserialize::<AppConfig>())
            .map_err(config_error_to_gymdesk_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    /// Validates the configuration.
    fn validate_config(config: &AppConfig) -> Result<(), GymdeskError> {
        if config.app.is_production() && config.security.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("Using default JWT secret in production! This is a security risk.");
        }

        ConfigValidator::validate(config).map_err(|errors| {
            let message = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
            GymdeskError::Configuration(message)
        })
    }
}

fn config_error_to_gymdesk_error(err: ConfigError) -> GymdeskError {
    GymdeskError::Configuration(err.to_string())
}

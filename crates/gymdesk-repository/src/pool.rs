//! Database connection pool management.

use crate::traits::HealthProbe;
use async_trait::async_trait;
use gymdesk_config::DatabaseConfig;
use gymdesk_core::{GymdeskError, GymdeskResult};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::{ConnectOptions, MySql, Transaction};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// A MySQL transaction. Dropping it without calling `commit()` rolls back.
pub type Tx = Transaction<'static, MySql>;

/// Database pool wrapper.
#[derive(Clone)]
pub struct DatabasePool {
    pool: MySqlPool,
}

impl DatabasePool {
    /// Creates a new database pool from configuration.
    ///
    /// # Errors
    ///
    /// Returns a database error if the URL is invalid or no connection can be
    /// opened within the connect timeout.
    pub async fn connect(config: &DatabaseConfig) -> GymdeskResult<Self> {
        info!("Connecting to MySQL database...");

        let mut options = MySqlConnectOptions::from_str(&config.url)
            .map_err(|e| GymdeskError::Configuration(format!("Invalid database URL: {e}")))?;
        if !config.log_queries {
            options = options.disable_statement_logging();
        }

        let pool = MySqlPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                GymdeskError::Database(format!("Failed to connect: {e}"))
            })?;

        info!("MySQL connection pool established");
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn with_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn inner(&self) -> &MySqlPool {
        &self.pool
    }

    /// Starts a transaction.
    ///
    /// # Errors
    ///
    /// Returns a database error if no connection is available.
    pub async fn begin(&self) -> GymdeskResult<Tx> {
        Ok(self.pool.begin().await?)
    }

    /// Runs database migrations.
    ///
    /// # Errors
    ///
    /// Returns a database error if a migration fails to apply.
    pub async fn run_migrations(&self) -> GymdeskResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| GymdeskError::Database(format!("Migration failed: {e}")))?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Closes the database pool.
    pub async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

#[async_trait]
impl HealthProbe for DatabasePool {
    async fn health_check(&self) -> GymdeskResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| GymdeskError::Unavailable(format!("Database health check failed: {e}")))?;
        Ok(())
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}

/// Creates a shared database pool.
///
/// # Errors
///
/// See [`DatabasePool::connect`].
pub async fn create_pool(config: &DatabaseConfig) -> GymdeskResult<Arc<DatabasePool>> {
    let pool = DatabasePool::connect(config).await?;
    Ok(Arc::new(pool))
}

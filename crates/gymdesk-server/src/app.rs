//! Application assembly.

use axum::Router;
use gymdesk_config::AppConfig;
use gymdesk_core::{Clock, GymdeskError, GymdeskResult, SystemClock};
use gymdesk_repository::{create_pool, DatabasePool, Repositories};
use gymdesk_rest::create_router;
use gymdesk_service::Services;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

/// A fully wired server: configuration, services and the storage they use.
pub struct Application {
    config: AppConfig,
    services: Services,
    pool: Option<Arc<DatabasePool>>,
}

impl Application {
    /// Connects to MySQL, applies migrations when enabled and wires the
    /// services on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable, a migration fails
    /// or the bootstrap admin cannot be created.
    pub async fn build(config: AppConfig) -> GymdeskResult<Self> {
        let pool = create_pool(&config.database).await?;

        if config.database.run_migrations {
            pool.run_migrations().await?;
        } else {
            info!("Skipping database migrations");
        }

        let repos = Repositories::mysql(Arc::clone(&pool));
        let mut app = Self::with_repositories(config, &repos, Arc::new(SystemClock)).await?;
        app.pool = Some(pool);
        Ok(app)
    }

    /// Wires the services over an existing set of repositories.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured bootstrap admin cannot be created.
    pub async fn with_repositories(
        config: AppConfig,
        repos: &Repositories,
        clock: Arc<dyn Clock>,
    ) -> GymdeskResult<Self> {
        let services = Services::new(
            repos,
            Arc::new(config.security.clone()),
            config.gym.clone(),
            clock,
        );

        if let Some(admin) = &config.security.bootstrap_admin {
            match services.auth.bootstrap_admin(admin).await? {
                Some(user) => info!("Bootstrap admin created: {}", user.email),
                None => info!("Bootstrap admin already present"),
            }
        }

        Ok(Self {
            config,
            services,
            pool: None,
        })
    }

    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Builds the HTTP router.
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(self.services.clone(), &self.config.server)
    }

    /// Serves HTTP until Ctrl+C or SIGTERM, then drains in-flight requests
    /// and closes the database pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server fails.
    pub async fn run(self) -> GymdeskResult<()> {
        let addr = self.config.server.addr();
        let router = self.router();

        info!("Starting REST server on http://{}", addr);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| GymdeskError::Internal(format!("Failed to bind {addr}: {e}")))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| GymdeskError::Internal(format!("REST server error: {e}")))?;

        if let Some(pool) = self.pool {
            pool.close().await;
        }

        info!("Server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymdesk_config::BootstrapAdmin;
    use gymdesk_repository::memory::MemoryStore;
    use gymdesk_service::LoginRequest;

    fn config_with_admin() -> AppConfig {
        let mut config = AppConfig::default();
        config.security.password_memory_cost_kib = 64;
        config.security.password_time_cost = 1;
        config.security.bootstrap_admin = Some(BootstrapAdmin {
            email: "owner@gym.test".to_string(),
            password: "Secret123".to_string(),
            first_name: "Olga".to_string(),
            last_name: "Owner".to_string(),
        });
        config
    }

    #[tokio::test]
    async fn test_bootstrap_admin_can_log_in() {
        let repos = Repositories::memory(Arc::new(MemoryStore::new()));
        let app = Application::with_repositories(config_with_admin(), &repos, Arc::new(SystemClock))
            .await
            .unwrap();

        let auth = app
            .services()
            .auth
            .login(LoginRequest {
                email: "owner@gym.test".to_string(),
                password: "Secret123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(auth.user.email, "owner@gym.test");
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let repos = Repositories::memory(Arc::new(MemoryStore::new()));
        Application::with_repositories(config_with_admin(), &repos, Arc::new(SystemClock))
            .await
            .unwrap();
        let again = Application::with_repositories(config_with_admin(), &repos, Arc::new(SystemClock)).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn test_without_bootstrap_admin() {
        let repos = Repositories::memory(Arc::new(MemoryStore::new()));
        let app = Application::with_repositories(AppConfig::default(), &repos, Arc::new(SystemClock))
            .await
            .unwrap();
        let _router = app.router();
    }
}

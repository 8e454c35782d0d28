//! Server startup output.

use gymdesk_config::AppConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(
        r#"
   ______                     __          __
  / ____/_  ______ ___  ____/ /__  _____/ /__
 / / __/ / / / __ `__ \/ __  / _ \/ ___/ //_/
/ /_/ / /_/ / / / / / / /_/ /  __(__  ) ,<
\____/\__, /_/ /_/ /_/\__,_/\___/____/_/|_|
     /____/
    "#
    );
}

/// Prints where the server can be reached.
pub fn print_startup_info(config: &AppConfig) {
    let addr = config.server.addr();
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("Environment: {}", config.app.environment);
    info!("REST API:    http://{}/api/v1", addr);
    info!("Health:      http://{}/health", addr);
    if config.server.swagger_enabled {
        info!("API Docs:    http://{}/swagger-ui", addr);
    }
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_banner_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_banner();
    }

    #[test]
    fn test_print_startup_info_without_swagger() {
        let _ = tracing_subscriber::fmt::try_init();
        let mut config = AppConfig::default();
        config.server.swagger_enabled = false;
        print_startup_info(&config);
    }
}

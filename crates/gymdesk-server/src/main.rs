//! # Gymdesk Server
//!
//! Entry point: loads configuration, installs logging, connects to MySQL
//! and serves the REST API until shutdown.

use gymdesk_config::ConfigLoader;
use gymdesk_core::GymdeskResult;
use gymdesk_server::app::Application;
use gymdesk_server::{startup, telemetry};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ConfigLoader::from_default_location() {
        Ok(loader) => loader.get().await,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = telemetry::init_logging(&config.observability) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    startup::print_banner();
    info!("Starting Gymdesk Server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(config).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: gymdesk_config::AppConfig) -> GymdeskResult<()> {
    let app = Application::build(config.clone()).await?;
    startup::print_startup_info(&config);
    app.run().await
}

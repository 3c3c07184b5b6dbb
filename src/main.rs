// Main entry point - Dependency injection and console setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::refresh_controller::RefreshController;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_client::HttpDashboardClient;
use crate::presentation::console;
use crate::presentation::view::ViewOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the rendered dashboard owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = load_dashboard_config()?;
    tracing::info!(
        base_url = %config.api.base_url,
        interval_secs = config.refresh.interval_secs,
        failure_backoff = config.refresh.failure_backoff,
        "Starting sales KPI dashboard"
    );

    // Create the data client (infrastructure layer)
    let source = Arc::new(HttpDashboardClient::new(config.api.base_url.clone()));

    // Start the refresh loop (application layer)
    let controller = RefreshController::spawn(source, config.refresh.clone());

    // Hand over to the console (presentation layer)
    let options = ViewOptions {
        color: config.display.color,
        interval_secs: config.refresh.interval_secs,
    };
    console::run(controller, options).await
}

mod bootstrap;
mod http;

use anyhow::Result;
use sci_core::settings::Settings;
use sci_core::time_utils::resolve_timezone;
use sci_runtime::service::DashboardService;

use crate::http::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("SCI dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    let timezone = resolve_timezone(&settings.timezone);
    tracing::info!("month window anchored in {}", timezone);

    // A missing backend does not stop the server; dashboard requests report it.
    let state = match bootstrap::build_store(&settings) {
        Ok(store) => AppState::ready(DashboardService::new(store, timezone)),
        Err(e) => {
            tracing::warn!(error = %e, "record store unavailable; dashboard requests will fail");
            AppState::unconfigured(e.to_string())
        }
    };

    let app = http::router(state);

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Ctrl+C received; shutting down"),
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for Ctrl+C; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}

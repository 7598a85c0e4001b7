use std::net::SocketAddr;

use blog_api::{config::Settings, db, logging, rest, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    let _log_guard = logging::init(&settings)?;
    tracing::info!(run_mode = ?settings.run_mode, "configuration loaded");

    let pool = db::connect(&settings.database).await?;
    let state = AppState::new(pool, &settings)?;

    let app = rest::router(state, settings.server.request_timeout());
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST API listening on {} (pid {})", addr, std::process::id());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exiting");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown Server ...");
}

//! Axum web server binary.

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use kaabil_core::{Tutor, TutorConfig};
use kaabil_web::{AppState, ServerConfig, create_router};

fn init_tracing() {
    // Colored output for dev, JSON when LOG_FORMAT=json
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kaabil_web=info,kaabil_core=info,tower_http=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let server = ServerConfig::from_env();
    let config = TutorConfig::from_env();

    let tutor = match Tutor::from_config(&config) {
        Ok(tutor) => tutor,
        Err(e) => {
            error!("Failed to create tutor: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(tutor, server.session_store())?;
    let app = create_router(state);

    let addr = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

use listening_dashboard::{load_document, router, AppState, ServerConfig};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = ServerConfig::from_env();
    let document = match load_document(&config.data_path).await {
        Ok(document) => document,
        Err(err) => {
            error!("failed to load {}: {err}", config.data_path.display());
            return Err(err.into());
        }
    };

    info!(
        "loaded {}: {} top songs, {} daily points",
        config.data_path.display(),
        document.section1.top_songs.len(),
        document.section2.daily_hours.len()
    );
    if let Some((first, last)) = document.daily_span() {
        info!("listening history spans {first} to {last}");
    }

    let app = router(AppState::new(document));
    let addr = config.addr();

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

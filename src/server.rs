use std::net::{Ipv4Addr, SocketAddrV4};

use tracing_subscriber::EnvFilter;

/// Installs the log subscriber and loads `.env`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .init();

    match dotenvy::dotenv() {
        Ok(p) => tracing::info!(path = %p.display(), "Loaded environment variables from .env file"),
        Err(e) => tracing::warn!("Failed to load environment variables from .env: {e}"),
    };
}

/// Serves `app` on every interface until ctrl-c.
pub async fn serve(name: &str, app: axum::Router, port: u16) -> std::io::Result<()> {
    let app = app.layer(tower_http::trace::TraceLayer::new_for_http());
    let listener =
        tokio::net::TcpListener::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)).await?;

    tracing::info!("{name} serving on port {port}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}

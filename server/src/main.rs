use catalog_server::{AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "catalog server listening");
    catalog_server::run(listener, AppState::new(&config)).await
}

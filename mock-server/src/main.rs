use mock_server::MockConfig;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let mut config = MockConfig::default();
    if let Ok(digest) = std::env::var("MOCK_DIGEST") {
        config.digest = digest;
    }
    if let Ok(lists) = std::env::var("MOCK_LISTS") {
        config.lists = lists.split(',').map(|l| l.trim().to_string()).collect();
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, lists = ?config.lists, "listening");
    mock_server::serve(listener, config).await
}

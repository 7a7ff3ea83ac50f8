use docindex::config::{ServerConfig, usage};
use docindex::server::listener::IndexServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("docindex");

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", usage(program));
        return Ok(());
    }

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            eprintln!("{}", usage(program));
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    tracing::info!("Starting document index server on {}", config.bind);
    tracing::info!("Storage directory: {}", config.storage_dir.display());
    tracing::info!(
        "Index pool: {} workers, queue capacity {}",
        config.index_workers,
        config.index_queue_capacity
    );
    tracing::info!(
        "Connection pool: {} workers, queue capacity {}",
        config.connection_workers,
        config.connection_queue_capacity
    );

    let server = IndexServer::bind(&config).await?;

    tracing::info!("Press Ctrl+C to shutdown");
    server.run().await
}

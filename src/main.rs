use easy_kvs::config::KvsConfig;
use easy_kvs::service::handlers::router;
use easy_kvs::service::orchestrator::KvsService;
use easy_kvs::store::bootstrap::prepare_storage_root;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        // .with_max_level(tracing::Level::DEBUG)
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut bind_addr: SocketAddr = "127.0.0.1:8080".parse()?;
    let mut data_dir: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" if i + 1 < args.len() => {
                bind_addr = args[i + 1].parse()?;
                i += 2;
            }
            "--data-dir" if i + 1 < args.len() => {
                data_dir = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--help" | "-h" => {
                eprintln!("Usage: {} [--bind <addr:port>] [--data-dir <path>]", args[0]);
                eprintln!("Example: {} --bind 127.0.0.1:8080 --data-dir ./data", args[0]);
                std::process::exit(1);
            }
            _ => {
                i += 1;
            }
        }
    }

    let mut config = KvsConfig::from_env()?;
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }

    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!(
        "Limits: value={} bytes, record={} bytes",
        config.max_value_length,
        config.max_data_size
    );
    tracing::info!(
        "Record life time {}s (not enforced)",
        config.life_time.as_secs()
    );

    prepare_storage_root(&config)?;

    let service = Arc::new(KvsService::new(config));
    let app = router(service);

    tracing::info!("HTTP server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

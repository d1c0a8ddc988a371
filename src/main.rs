use distributed_cracker::config::CentralConfig;
use distributed_cracker::cracking::handlers::router;
use distributed_cracker::cracking::service::CrackingService;
use distributed_cracker::pool::service::WorkerPool;
use distributed_cracker::rpc::client::{HttpWorkerClient, WorkerRpc};
use distributed_cracker::worker::credentials::CredentialStore;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        // .with_max_level(tracing::Level::DEBUG)
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        eprintln!(
            "Usage: central [--bind <addr:port>] [--dictionary-dir <dir>] [--granularity <lines>]"
        );
        eprintln!(
            "               [--credentials <file>] [--metrics-dir <dir>] [--portion-only]"
        );
        eprintln!(
            "               [--health-timeout-ms <ms>] [--dispatch-timeout-secs <s>] [--backoff-ms <ms>]"
        );
        std::process::exit(1);
    }

    let config = CentralConfig::from_args(&args)?;
    tracing::info!("Starting central node on {}", config.bind_addr);
    tracing::info!(
        "Dictionary directory: {} (granularity {})",
        config.dictionary_dir.display(),
        config.granularity
    );

    // 1. Optional username pre-check:
    let credentials = match &config.credentials_file {
        Some(path) => Some(Arc::new(CredentialStore::from_file(path)?)),
        None => {
            tracing::info!("No credential file configured, usernames are checked by workers");
            None
        }
    };

    // 2. Pool and worker client:
    let pool = WorkerPool::new();
    let rpc: Arc<dyn WorkerRpc> = Arc::new(HttpWorkerClient::new(
        config.coordinator.dispatch_timeout,
        config.coordinator.health_timeout,
    ));

    let bind_addr = config.bind_addr;
    let service = CrackingService::new(pool.clone(), rpc, config, credentials);

    // 3. Spawn pool reporter:
    let stats_pool = pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));

        loop {
            interval.tick().await;
            let members = stats_pool.members();
            tracing::info!("Pool stats: {} calculating servers", members.len());
            for worker in members {
                tracing::debug!("  - {}", worker);
            }
        }
    });

    // 4. Start HTTP server:
    let app = router(service);
    tracing::info!("HTTP server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

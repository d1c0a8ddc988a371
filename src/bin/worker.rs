use distributed_cracker::config::WorkerConfig;
use distributed_cracker::rpc::client::register_with_central;
use distributed_cracker::storage::DictionaryStorage;
use distributed_cracker::worker::credentials::CredentialStore;
use distributed_cracker::worker::handlers::{WorkerContext, router};
use std::sync::Arc;

const REGISTRATION_ATTEMPTS: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        eprintln!("Usage: worker [--bind <addr:port>] [--central <addr:port>] [--advertise <addr:port>]");
        eprintln!("              [--dictionary-dir <dir>] [--credentials <file>] [--budget-secs <s>]");
        eprintln!("Example: worker --bind 127.0.0.1:5099 --central 127.0.0.1:5000");
        std::process::exit(1);
    }

    let config = WorkerConfig::from_args(&args)?;
    tracing::info!("Starting calculating server on {}", config.bind_addr);

    let credentials = Arc::new(CredentialStore::from_file(&config.credentials_file)?);
    let context = Arc::new(WorkerContext {
        credentials,
        storage: DictionaryStorage::new(config.dictionary_dir.clone()),
        dictionary_budget: config.dictionary_budget,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    // Register once the listener accepts, so the central health probe succeeds
    if let Some(central) = config.central_addr.clone() {
        let advertised = config.advertised();
        tokio::spawn(async move {
            match register_with_central(&central, &advertised, REGISTRATION_ATTEMPTS).await {
                Ok(resp) => tracing::info!(
                    "Registered with central {} as {} (registered: {}, pool size: {})",
                    central,
                    advertised,
                    resp.registered,
                    resp.pool_size
                ),
                Err(e) => tracing::error!("Could not register with central {}: {}", central, e),
            }
        });
    } else {
        tracing::info!("No --central given, waiting for manual registration");
    }

    tracing::info!("HTTP server listening on {}", config.bind_addr);
    axum::serve(listener, router(context)).await?;

    Ok(())
}

use std::collections::BTreeMap;
use std::sync::Arc;

use clap::Parser;
use pollsync_core::Store;
use pollsync_local::config::Config;
use pollsync_local::{DirectorySource, FileEntry, MemoryStore, Poller};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    let source = DirectorySource::new(config.dir.clone())
        .include_hidden(config.include_hidden)
        .extension(config.extension.clone())
        .hash_contents(config.hash_contents);

    let store: Arc<MemoryStore<FileEntry>> = Arc::new(MemoryStore::new());
    info!("Starting pollsync-local");
    info!("  Directory: {}", source.root().display());

    let poller = Poller::new(source, config.period(), store.clone() as Arc<dyn Store<FileEntry>>)?;
    info!("  Poll interval: {:?}", poller.period());

    if config.once {
        let stats = poller.poll_once().await?;
        info!(
            "Synced {} entries ({} added, {} deleted)",
            stats.listed, stats.added, stats.deleted
        );
        let entries: BTreeMap<String, FileEntry> = store.snapshot().into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let handle = poller.start();

    wait_for_shutdown().await?;

    let status = handle.status();
    handle.stop().await?;

    info!(
        "Poller shutdown complete ({} cycles, {} failures, {} entries cached)",
        status.cycles,
        status.failures,
        store.len()
    );
    Ok(())
}

/// Wait for Ctrl+C or, on unix, SIGTERM.
async fn wait_for_shutdown() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, stopping poller");
            }
            _ = sigterm.recv() => info!("Received SIGTERM, stopping poller"),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, stopping poller");
    }

    Ok(())
}

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use rcisco::api;
use rcisco::config::ServerConfig;
use rcisco::service::DeviceManager;
use rcisco::store::{MemoryStore, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env().context("load server configuration")?;
    let store: Arc<dyn RecordStore> = match &config.data_file {
        Some(path) => Arc::new(
            MemoryStore::open(path)
                .await
                .with_context(|| format!("open snapshot {}", path.display()))?,
        ),
        None => Arc::new(MemoryStore::new()),
    };

    let manager = DeviceManager::new(store);
    let app = api::router(manager);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!("rcisco listening on http://{addr}/api/");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;

    info!("rcisco stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("failed to listen for ctrl-c: {e}");
    }
}

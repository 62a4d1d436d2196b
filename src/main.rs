mod config;
mod controller;
mod datastore;
mod log;
mod model;
mod shell;

use std::env;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::io::BufReader;
use tracing::{event, Level};
use tracing_subscriber::EnvFilter;

use config::{Config, StorageConfig};
use controller::{Backends, TaskController};
use datastore::{FileStore, LocalDataService, MemoryStore, RemoteDataService, TaskDataService};

fn load_config() -> anyhow::Result<Config> {
    match env::var("TASKFLOW_CONFIG") {
        Ok(path) => Config::from_file(&path).with_context(|| format!("loading config {}", path)),
        Err(_) => Ok(Config::default()),
    }
}

fn build_backends(config: &Config) -> anyhow::Result<Backends> {
    let local: Arc<dyn TaskDataService> = match &config.storage {
        StorageConfig::File { path } => Arc::new(LocalDataService::new(FileStore::new(path))),
        StorageConfig::Memory => Arc::new(LocalDataService::new(MemoryStore::new())),
    };
    let api = RemoteDataService::new(config.api.base_url.clone())?;
    Ok(Backends {
        local,
        api: Arc::new(api),
    })
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = load_config()?;
    let env_filter = EnvFilter::try_from_env("TASKFLOW_LOG");
    log::setup(env_filter, &config.log)?;

    event!(
        Level::INFO,
        mode = %config.mode,
        "Starting taskflow: {}",
        env!("CARGO_PKG_VERSION")
    );

    let backends = build_backends(&config)?;
    let controller = TaskController::new(backends, config.mode);

    // every backend call resolves on this one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let input = BufReader::new(tokio::io::stdin());
        let mut shell = shell::Shell::new(controller, input, tokio::io::stdout());
        shell.run().await
    })?;
    Ok(())
}

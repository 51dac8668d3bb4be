use std::sync::Arc;

use anyhow::Context;
use taskmasters_backend::config::AppConfig;
use taskmasters_backend::rocket_instance;
use taskmasters_backend::services::{DynStore, SqliteStore};

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    let store = SqliteStore::open(&config.database_url, config.pool_size)?;
    let store: DynStore = Arc::new(store);

    let _rocket = rocket_instance(store, config)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("server failed: {}", e))?;
    Ok(())
}

//! Entry point for the withholding server binary.
//!
//! Loads one tax year's dataset and serves `POST /calculate`. The dataset
//! directory is read from `WITHHOLDING_CONFIG_DIR` (default `config/qc-2020`)
//! and the listen address from `WITHHOLDING_BIND_ADDR` (default
//! `127.0.0.1:3000`). Log verbosity follows `RUST_LOG`.

use tracing::info;
use tracing_subscriber::EnvFilter;

use withholding_engine::api::{AppState, create_router};
use withholding_engine::config::ConfigLoader;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_dir =
        std::env::var("WITHHOLDING_CONFIG_DIR").unwrap_or_else(|_| "config/qc-2020".to_string());
    let addr =
        std::env::var("WITHHOLDING_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    let loader = ConfigLoader::load(&config_dir)?;
    let router = create_router(AppState::new(loader));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, config_dir = %config_dir, "Withholding server listening");
    axum::serve(listener, router).await?;

    Ok(())
}

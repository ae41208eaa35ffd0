use anyhow::{Context, Result};
use inventory_server::{api, bootstrap, config::Config, inventory::InventoryService, logging};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    // Held until `main` returns so the file writer flushes the final error.
    let _log_guard = logging::init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = Config::load().context("invalid configuration")?;
    bootstrap::prepare_directories(&config)?;

    let service = Arc::new(InventoryService::from_config(&config));
    let app = api::create_router(service, &config.uploads_dir);

    let listener = bootstrap::bind_listener(&config).await?;
    tracing::info!(
        "Listening on http://{}",
        listener
            .local_addr()
            .context("failed to read bound address")?
    );
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")?;
    Ok(())
}

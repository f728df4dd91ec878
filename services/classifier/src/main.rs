use adc_classifier::{create_app, AppState, NluClient, PdfProcessor};
use adc_models::EntityRules;
use adc_utils::{init_logging, AppConfig};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.logging)?;
    config.validate()?;
    info!("Starting ADC document classifier");

    let rules = EntityRules::load(
        &config.rules.entity_types_path,
        &config.rules.entity_names_path,
    )
    .context("Failed to load entity rules")?;
    info!(
        entity_types = rules.pattern_count(),
        entity_names = rules.name_count(),
        "Entity rules loaded"
    );

    tokio::fs::create_dir_all(&config.upload.tmp_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.upload.tmp_dir))?;

    let analyzer = NluClient::new(&config.nlu)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState::new(
        config,
        rules,
        Arc::new(PdfProcessor::new()),
        Arc::new(analyzer),
    )?;
    let app = create_app(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("ADC classifier listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

//! Sales Forecast Dashboard - Main Entry Point
//!
//! Loads the sales history and the pre-trained regressor, then runs the
//! interactive session on stdin/stdout. Logs go to stderr.

use anyhow::Result;
use sales_forecast::{
    config::{AppConfig, LoggingConfig},
    dataset::SalesDataset,
    feature_extractor::FeatureBuilder,
    metrics::SessionMetrics,
    models::inference::InferenceEngine,
    session::Session,
};
use std::io;
use tracing::info;

fn main() -> Result<()> {
    // Load configuration: optional path as first argument
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };

    init_logging(&config.logging)?;
    info!("Starting Sales Forecast Dashboard");

    let dataset = SalesDataset::load_file(&config.dataset.path)?;
    if let (Some(stores), Some(items)) = (dataset.store_range(), dataset.item_range()) {
        info!(
            records = dataset.len(),
            stores = ?stores,
            items = ?items,
            "Dataset ready"
        );
    }

    let engine = InferenceEngine::new(&config)?;
    let schema = engine.schema();
    let builder = FeatureBuilder::with_convention(config.model.weekday_origin);
    schema.ensure_compatible(&builder)?;
    info!(
        model = %engine.model_name(),
        features = ?schema.features,
        "Model ready"
    );

    let metrics = SessionMetrics::new();
    let stdin = io::stdin();
    let mut session = Session::new(&dataset, &engine, &metrics, stdin.lock(), io::stdout())
        .with_settings(config.session.clone())
        .with_builder(builder);
    session.run()?;

    metrics.print_summary();
    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("sales_forecast={}", logging.level).parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

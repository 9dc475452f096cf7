//! `logcodec run` — the streaming pipeline.

use anyhow::{Context, Result};
use logcodec_observability::init_tracing;
use logcodec_pipeline::{source_from_config, Pipeline, PipelineConfig};
use std::path::Path;
use tracing::{info, warn};

pub async fn run(config_path: &Path) -> Result<()> {
    let config = PipelineConfig::load(config_path)
        .with_context(|| format!("load config '{}'", config_path.display()))?;
    init_tracing(&config.log)?;

    let source = source_from_config(&config)?;
    let mut pipeline = Pipeline::from_config(&config)
        .await
        .context("start pipeline")?;

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl-C"),
            Err(e) => {
                warn!(error = %e, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await
            }
        }
    };

    let metrics = pipeline.run_until(source.as_ref(), shutdown).await?;
    eprintln!("Results:");
    eprintln!("  Received:      {}", metrics.received);
    eprintln!("  Emitted:       {}", metrics.emitted);
    eprintln!("  Duplicates:    {}", metrics.duplicates);
    eprintln!("  Unmatched:     {}", metrics.unmatched);
    eprintln!("  Decode errors: {}", metrics.decode_errors);
    eprintln!("  Unhandled:     {}", metrics.unhandled);
    eprintln!("  Reconnections: {}", metrics.reconnections);
    Ok(())
}

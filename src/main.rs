use std::time::Duration;

use anyhow::Result;
use shoresquad_core::{AppError, Config};
use shoresquad_forecast::{
    FileStore, ForecastCache, ForecastPipeline, HostPage, HttpForecastSource, PipelineOutcome,
    RenderTarget,
};

#[tokio::main]
async fn main() -> Result<()> {
    shoresquad_core::init()?;

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        eprintln!("{}", e.user_message());
        return Err(e.into());
    }
    Ok(())
}

async fn run() -> Result<(), AppError> {
    let config = Config::load_validated()?;
    let forecast = &config.forecast;

    let source = HttpForecastSource::with_options(
        forecast.endpoint_url.clone(),
        Duration::from_secs(forecast.request_timeout_secs),
        &forecast.user_agent,
    )?;

    let ttl_millis =
        i64::try_from(forecast.cache_ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
    let cache = ForecastCache::new(FileStore::new(config.cache_dir()), forecast.cache_key.clone())
        .with_ttl_millis(ttl_millis);
    let pipeline = ForecastPipeline::new(source, cache);

    let input = &config.page.input_path;
    let mut page = HostPage::load(input)
        .map_err(|e| AppError::Page(format!("{}: {}", input.display(), e)))?;

    let outcome = match page.container(&config.page.container_id) {
        Some(mut container) => pipeline.run(Some(&mut container as &mut dyn RenderTarget)).await,
        None => pipeline.run(None).await,
    };

    match outcome {
        PipelineOutcome::NoTarget => {
            tracing::info!(
                "No #{} element in {}, page left unchanged",
                config.page.container_id,
                input.display()
            );
            return Ok(());
        }
        PipelineOutcome::Fallback => {
            tracing::warn!("Forecast unavailable, wrote fallback message");
        }
        PipelineOutcome::FromCache | PipelineOutcome::FromNetwork => {}
    }

    let output = config.page.effective_output_path();
    page.save(output)
        .map_err(|e| AppError::Page(format!("{}: {}", output.display(), e)))?;
    tracing::info!("Wrote forecast to {}", output.display());

    Ok(())
}

//! Cache-or-fetch forecast pipeline.
//!
//! One run walks `CheckingCache -> Rendered(cache)` on a fresh entry, or
//! `Loading -> Fetching -> Rendered(network) | Fallback` otherwise. Every
//! terminal state leaves the target showing something valid.

use crate::cache::{Clock, ForecastCache, KeyValueStore, SystemClock};
use crate::page::RenderTarget;
use crate::provider::ForecastSource;
use crate::render::{self, LOADING_MARKUP, UNAVAILABLE_MARKUP};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// No target to render into; nothing was done.
    NoTarget,
    FromCache,
    FromNetwork,
    /// Fetch failed; the unavailable message was rendered.
    Fallback,
}

pub struct ForecastPipeline<F, S, C = SystemClock> {
    source: F,
    cache: ForecastCache<S, C>,
}

impl<F, S, C> ForecastPipeline<F, S, C>
where
    F: ForecastSource,
    S: KeyValueStore,
    C: Clock,
{
    pub fn new(source: F, cache: ForecastCache<S, C>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &ForecastCache<S, C> {
        &self.cache
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    /// Render a forecast into `target`, from cache when fresh and from the
    /// network otherwise. Never fails outward.
    pub async fn run(&self, target: Option<&mut dyn RenderTarget>) -> PipelineOutcome {
        let Some(target) = target else {
            tracing::debug!("No forecast container, skipping");
            return PipelineOutcome::NoTarget;
        };

        tracing::debug!("Checking forecast cache");
        if let Some(cached) = self.cache.load_fresh() {
            render::render(&cached, target);
            tracing::info!("Rendered forecast from cache");
            return PipelineOutcome::FromCache;
        }

        target.replace_content(LOADING_MARKUP);
        tracing::debug!("Fetching forecast");

        match self.source.fetch().await {
            Ok(data) => {
                if let Err(e) = self.cache.write(&data) {
                    tracing::warn!("Failed to cache forecast: {}", e);
                }
                render::render(&data, target);
                tracing::info!("Rendered forecast from network");
                PipelineOutcome::FromNetwork
            }
            Err(e) => {
                tracing::warn!("Forecast fetch failed: {}", e);
                target.replace_content(UNAVAILABLE_MARKUP);
                PipelineOutcome::Fallback
            }
        }
    }
}

//! Forecast pipeline for ShoreSquad
//!
//! Fetches the NEA 4-day forecast, keeps a short-lived cache of the last
//! good response, and renders forecast cards into a host page container.

pub mod cache;
pub mod error;
pub mod page;
pub mod payload;
pub mod pipeline;
pub mod provider;
pub mod render;

pub use cache::{
    CachedForecast, Clock, FileStore, ForecastCache, KeyValueStore, MemoryStore, SystemClock,
};
pub use error::{ForecastError, StoreError};
pub use page::{Container, HostPage, RenderTarget};
pub use pipeline::{ForecastPipeline, PipelineOutcome};
pub use provider::{ForecastSource, HttpForecastSource};
pub use render::{escape_html, render, render_markup, ForecastDay};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{AppError, ConfigError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One problem found by [`Config::validate`].
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    issues: Vec<ConfigIssue>,
}

impl ValidationResult {
    fn push(&mut self, severity: Severity, field: &'static str, message: impl Into<String>) {
        self.issues.push(ConfigIssue {
            severity,
            field,
            message: message.into(),
        });
    }

    pub fn errors(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    /// Warnings alone do not make a config invalid
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn error_summary(&self) -> String {
        self.errors()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Forecast fetch and cache settings
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Host page settings
    #[serde(default)]
    pub page: PageConfig,
}

pub const DEFAULT_FORECAST_URL: &str =
    "https://api.data.gov.sg/v1/environment/4-day-weather-forecast";
pub const DEFAULT_CACHE_KEY: &str = "ss_forecast_cache_v1";
pub const DEFAULT_CONTAINER_ID: &str = "forecastContainer";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// 4-day forecast endpoint
    pub endpoint_url: String,

    /// Key the cached response is stored under
    pub cache_key: String,

    /// Cache freshness window in seconds
    pub cache_ttl_secs: u64,

    /// Transport timeout for the forecast request
    pub request_timeout_secs: u64,

    pub user_agent: String,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_FORECAST_URL.to_string(),
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            cache_ttl_secs: 600,
            request_timeout_secs: 10,
            user_agent: concat!("ShoreSquad/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// HTML page holding the forecast container
    pub input_path: PathBuf,

    /// Where the rendered page is written (defaults to `input_path`)
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// `id` attribute of the element the forecast is rendered into
    pub container_id: String,
}

impl PageConfig {
    pub fn effective_output_path(&self) -> &Path {
        self.output_path.as_deref().unwrap_or(&self.input_path)
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("index.html"),
            output_path: None,
            container_id: DEFAULT_CONTAINER_ID.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shoresquad");

        Self {
            config_dir,
            forecast: ForecastConfig::default(),
            page: PageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the platform config directory, creating a
    /// default file if none exists.
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, creating a default file
    /// there if it doesn't exist.
    pub fn load_from(config_path: &Path) -> Result<Self, AppError> {
        if !config_path.exists() {
            tracing::info!("No config at {}, writing defaults", config_path.display());
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)?;
        let config: Config =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Load configuration and validate it.
    ///
    /// Warnings are logged; any validation error fails the load.
    pub fn load_validated() -> Result<Self, AppError> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in validation.warnings() {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(config)
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.forecast.endpoint_url,
            "forecast.endpoint_url",
            &mut result,
        );

        if self.forecast.cache_key.trim().is_empty() {
            result.push(
                Severity::Error,
                "forecast.cache_key",
                "Cache key must not be empty",
            );
        }

        if self.forecast.cache_ttl_secs == 0 {
            result.push(
                Severity::Warning,
                "forecast.cache_ttl_secs",
                "Forecast caching disabled (0 seconds)",
            );
        } else if self.forecast.cache_ttl_secs > 86_400 {
            result.push(
                Severity::Warning,
                "forecast.cache_ttl_secs",
                "Forecast cache lifetime is more than 24 hours",
            );
        }

        if self.forecast.request_timeout_secs == 0 {
            result.push(
                Severity::Error,
                "forecast.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.page.container_id.trim().is_empty() {
            result.push(
                Severity::Error,
                "page.container_id",
                "Container id must not be empty",
            );
        }

        if !self.page.input_path.exists() {
            result.push(
                Severity::Warning,
                "page.input_path",
                format!("Path does not exist: {}", self.page.input_path.display()),
            );
        }

        result
    }

    fn validate_url(
        &self,
        url_str: &str,
        field_name: &'static str,
        result: &mut ValidationResult,
    ) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.push(
                        Severity::Error,
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.push(Severity::Error, field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.push(Severity::Error, field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Directory the file-backed forecast cache lives in
    pub fn cache_dir(&self) -> PathBuf {
        self.config_dir.join("cache")
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), AppError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(config_path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf, AppError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("shoresquad");

        Ok(config_dir.join("config.toml"))
    }
}

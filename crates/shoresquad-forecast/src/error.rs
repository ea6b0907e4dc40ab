//! Forecast pipeline error types.

use thiserror::Error;

/// Failure of the backing key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store rejected write: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ForecastError {
    /// Cached entry missing, corrupt or unreadable. Always recovered as a miss.
    #[error("Cache read error: {0}")]
    CacheRead(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Forecast endpoint returned status {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Best-effort cache write failed. Never affects rendering.
    #[error("Cache write error: {0}")]
    CacheWrite(#[from] StoreError),
}

impl ForecastError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::CacheRead(_) | Self::CacheWrite(_) => "Forecast cache unavailable.",
            Self::Network(e) if e.is_builder() => {
                "The forecast client could not be set up. Check the endpoint settings."
            }
            Self::Network(e) if e.is_timeout() => {
                "The forecast request timed out. Please try again."
            }
            Self::Network(_) => "Network error. Check your connection.",
            Self::Status(status) if *status >= 500 => {
                "The forecast service is having issues. Please try again later."
            }
            Self::Status(_) => "The forecast request was rejected.",
            Self::Parse(_) => "Received an unexpected forecast response.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_user_messages() {
        assert!(ForecastError::Status(503).user_message().contains("later"));
        assert!(ForecastError::Status(404).user_message().contains("rejected"));
        assert!(ForecastError::Parse("eof".into()).user_message().contains("unexpected"));
        assert_eq!(
            ForecastError::CacheWrite(StoreError::Rejected("quota".into())).user_message(),
            "Forecast cache unavailable."
        );
    }

    #[test]
    fn test_store_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: ForecastError = StoreError::from(io).into();
        assert!(err.to_string().contains("read-only"));
    }
}

//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `BOOKSTORE_API_URL` - Backend base URL (default: `http://localhost:8000`)
//! - `BOOKSTORE_PROFILE_DIR` - Directory holding local storage (default: `.bookstore`)
//! - `BOOKSTORE_CURRENCY` - Display currency code (default: RUB)
//! - `BOOKSTORE_CATALOG_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `BOOKSTORE_REQUEST_TIMEOUT_SECS` - HTTP timeout (default: none)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use bookstore_core::CurrencyCode;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_PROFILE_DIR: &str = ".bookstore";
const DEFAULT_CATALOG_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Directory backing local storage (cart, cookies)
    pub profile_dir: PathBuf,
    /// Currency used when rendering prices
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL the `/api/...` paths are resolved against
    pub base_url: Url,
    /// How long a fetched catalog is served from cache
    pub catalog_ttl: Duration,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
}

impl ApiConfig {
    /// Configuration pointing at `base_url` with default cache settings.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            catalog_ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
            request_timeout: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_url = parse_api_url(
            "BOOKSTORE_API_URL",
            &get("BOOKSTORE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )?;
        let catalog_ttl = get("BOOKSTORE_CATALOG_TTL_SECS")
            .map(|v| parse_secs("BOOKSTORE_CATALOG_TTL_SECS", &v))
            .transpose()?
            .unwrap_or(Duration::from_secs(DEFAULT_CATALOG_TTL_SECS));
        let request_timeout = get("BOOKSTORE_REQUEST_TIMEOUT_SECS")
            .map(|v| parse_secs("BOOKSTORE_REQUEST_TIMEOUT_SECS", &v))
            .transpose()?;
        let currency = get("BOOKSTORE_CURRENCY")
            .map(|v| {
                v.parse::<CurrencyCode>().map_err(|e| {
                    ConfigError::InvalidEnvVar("BOOKSTORE_CURRENCY".to_string(), e.to_string())
                })
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            api: ApiConfig {
                base_url,
                catalog_ttl,
                request_timeout,
            },
            profile_dir: get("BOOKSTORE_PROFILE_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_PROFILE_DIR), PathBuf::from),
            currency,
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the backend URL; only http(s) URLs with a host are usable.
fn parse_api_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL must have a host".to_string(),
        ));
    }

    Ok(url)
}

/// Parse a whole number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

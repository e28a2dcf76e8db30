//! Backend API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; one method per endpoint
//! - Every response is parsed into an envelope and validated before it
//!   reaches the stores, so a malformed body is an [`ApiError::Schema`]
//!   rather than a silently wrong value
//! - The session cookie lives in a `reqwest` cookie jar which the page
//!   persists between runs, like a browser's cookie store
//! - The product listing is cached via `moka` (TTL from configuration)
//!
//! # Endpoints
//!
//! | Endpoint | Method |
//! |---|---|
//! | `/api/user` | GET |
//! | `/api/login` | POST |
//! | `/api/register` | POST |
//! | `/api/logout` | GET |
//! | `/api/product/all` | GET |
//! | `/api/orders` | POST |

pub mod types;

use std::sync::Arc;

use bookstore_core::Email;
use moka::future::Cache;
use reqwest::cookie::{CookieStore, Jar};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ApiConfig;
use crate::models::{Product, User};

use types::{
    AuthEnvelope, Authenticated, LoginRequest, LogoutEnvelope, OrderEnvelope, OrderPlaced,
    OrderRequest, RegisterRequest, SchemaViolation, UserStatusEnvelope, validate_products,
};

const USER_PATH: &str = "api/user";
const LOGIN_PATH: &str = "api/login";
const REGISTER_PATH: &str = "api/register";
const LOGOUT_PATH: &str = "api/logout";
const PRODUCTS_PATH: &str = "api/product/all";
const ORDERS_PATH: &str = "api/orders";

/// Longest body excerpt written to logs.
const LOG_BODY_LIMIT: usize = 500;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, timeout, unreadable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status without a usable JSON body.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },

    /// Body did not have the expected shape.
    #[error("malformed response from {endpoint}: {reason}")]
    Schema {
        endpoint: &'static str,
        reason: String,
    },

    /// The backend answered `success: false`; the message is shown verbatim.
    #[error("{0}")]
    Rejected(String),

    /// An endpoint path could not be resolved against the base URL.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Transport-level and malformed-response failures, as opposed to a
    /// business rejection from the backend.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    fn schema(endpoint: &'static str, violation: SchemaViolation) -> Self {
        Self::Schema {
            endpoint,
            reason: violation.0,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the bookstore backend.
///
/// Cheap to clone; clones share the HTTP connection pool, cookie jar and
/// catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cookies: Arc<Jar>,
    catalog: Cache<&'static str, Arc<Vec<Product>>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let cookies = Arc::new(Jar::default());

        let mut builder = reqwest::Client::builder().cookie_provider(Arc::clone(&cookies));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let catalog = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.catalog_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: with_trailing_slash(config.base_url.clone()),
                cookies,
                catalog,
            }),
        })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    // =========================================================================
    // Cookie jar
    // =========================================================================

    /// Cookies the jar would send to the backend, as a `Cookie` header value.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        self.inner
            .cookies
            .cookies(&self.inner.base_url)
            .and_then(|value| value.to_str().ok().map(str::to_owned))
    }

    /// Seed the jar from a previously saved `Cookie` header value.
    pub fn restore_cookies(&self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.inner.cookies.add_cookie_str(pair, &self.inner.base_url);
        }
    }

    // =========================================================================
    // Session Methods
    // =========================================================================

    /// Ask the backend who is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<Option<User>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint(USER_PATH)?)
            .send()
            .await?;
        let envelope: UserStatusEnvelope = read_json(USER_PATH, response).await?;
        let user = envelope
            .validate()
            .map_err(|v| ApiError::schema(USER_PATH, v))?;

        debug!(logged_in = user.is_some(), "Session checked");
        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the backend's message on bad
    /// credentials, or another variant if the exchange itself fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Authenticated, ApiError> {
        let body = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let response = self
            .inner
            .client
            .post(self.endpoint(LOGIN_PATH)?)
            .json(&body)
            .send()
            .await?;
        let envelope: AuthEnvelope = read_json(LOGIN_PATH, response).await?;

        envelope
            .validate()
            .map_err(|v| ApiError::schema(LOGIN_PATH, v))?
            .map_err(ApiError::Rejected)
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the backend's message (e.g. the
    /// email is taken), or another variant if the exchange itself fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<Authenticated, ApiError> {
        let body = RegisterRequest {
            name,
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let response = self
            .inner
            .client
            .post(self.endpoint(REGISTER_PATH)?)
            .json(&body)
            .send()
            .await?;
        let envelope: AuthEnvelope = read_json(REGISTER_PATH, response).await?;

        envelope
            .validate()
            .map_err(|v| ApiError::schema(REGISTER_PATH, v))?
            .map_err(ApiError::Rejected)
    }

    /// End the backend session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint(LOGOUT_PATH)?)
            .send()
            .await?;
        let envelope: LogoutEnvelope = read_json(LOGOUT_PATH, response).await?;
        envelope.validate().map_err(ApiError::Rejected)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Fetch the full product list, served from cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not a success,
    /// or the listing is malformed.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(products) = self.inner.catalog.get(PRODUCTS_PATH).await {
            debug!("Cache hit for product listing");
            return Ok(products);
        }

        let response = self
            .inner
            .client
            .get(self.endpoint(PRODUCTS_PATH)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "Product listing returned non-success status");
            return Err(ApiError::Status {
                endpoint: PRODUCTS_PATH,
                status: status.as_u16(),
            });
        }

        let products: Vec<Product> = read_json(PRODUCTS_PATH, response).await?;
        let products = Arc::new(
            validate_products(products).map_err(|v| ApiError::schema(PRODUCTS_PATH, v))?,
        );

        debug!(count = products.len(), "Fetched product listing");
        self.inner
            .catalog
            .insert(PRODUCTS_PATH, Arc::clone(&products))
            .await;
        Ok(products)
    }

    /// Drop the cached product listing so the next fetch hits the backend.
    pub fn invalidate_products(&self) {
        self.inner.catalog.invalidate_all();
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the backend's message when the
    /// order is refused, or another variant if the exchange itself fails.
    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total_amount))]
    pub async fn place_order(&self, order: &OrderRequest<'_>) -> Result<OrderPlaced, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(ORDERS_PATH)?)
            .json(order)
            .send()
            .await?;
        let envelope: OrderEnvelope = read_json(ORDERS_PATH, response).await?;

        envelope
            .validate()
            .map_err(|v| ApiError::schema(ORDERS_PATH, v))?
            .map_err(ApiError::Rejected)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Read a JSON body regardless of status.
///
/// The backend reports business failures as JSON envelopes, sometimes with a
/// 4xx/5xx status, so the body is tried first. A body that does not parse is
/// a status error on non-success responses and a schema error otherwise.
async fn read_json<T: DeserializeOwned>(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    match serde_json::from_str::<T>(&body) {
        Ok(value) => Ok(value),
        Err(e) if status.is_success() => {
            tracing::error!(
                endpoint,
                error = %e,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Failed to parse backend response"
            );
            Err(ApiError::Schema {
                endpoint,
                reason: e.to_string(),
            })
        }
        Err(_) => {
            tracing::error!(
                endpoint,
                status = %status,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Backend returned non-success status"
            );
            Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
            })
        }
    }
}

/// `Url::join` treats the last segment as a file unless the path ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

//! Integration tests for the Bookstore storefront.
//!
//! Every test runs a real [`Storefront`] against a `wiremock` backend and a
//! throwaway profile directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bookstore-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Session checks, login, registration, logout and cookies
//! - `catalog` - Listing, search, caching and failure views
//! - `checkout` - Order placement and every refusal path

#![allow(clippy::missing_panics_doc)]

use std::path::Path;
use std::sync::Arc;

use bookstore_core::CurrencyCode;
use bookstore_storefront::Storefront;
use bookstore_storefront::config::{ApiConfig, StorefrontConfig};
use bookstore_storefront::models::Product;
use bookstore_storefront::notify::Recorder;
use bookstore_storefront::storage::FileStorage;
use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Whether the sandbox lets us open a local port for the mock backend.
#[must_use]
pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Mock backend plus a profile directory for one test.
pub struct TestContext {
    pub server: MockServer,
    pub profile: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            profile: TempDir::new().expect("create temp profile"),
        }
    }

    /// Configuration pointing at the mock backend and the temp profile.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        config_for(&self.server.uri(), self.profile.path())
    }

    /// Open a page backed by the temp profile.
    pub async fn open(&self, notifier: Arc<Recorder>) -> Storefront {
        let storage = Arc::new(FileStorage::open(self.profile.path()).expect("open profile"));
        Storefront::open(&self.config(), storage, notifier)
            .await
            .expect("open storefront")
    }

    /// Backend reports no signed-in user.
    pub async fn mount_anonymous(&self) {
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"logged_in": false})))
            .mount(&self.server)
            .await;
    }

    /// Backend reports `name` as signed in.
    pub async fn mount_signed_in(&self, name: &str, is_admin: bool) {
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "logged_in": true,
                "user": user_json(name, is_admin),
            })))
            .mount(&self.server)
            .await;
    }

    /// Backend lists `products`.
    pub async fn mount_products(&self, products: Value) {
        Mock::given(method("GET"))
            .and(path("/api/product/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products))
            .mount(&self.server)
            .await;
    }
}

/// Configuration for a backend at `uri` with local storage under `profile`.
#[must_use]
pub fn config_for(uri: &str, profile: &Path) -> StorefrontConfig {
    StorefrontConfig {
        api: ApiConfig::new(Url::parse(uri).expect("mock server uri")),
        profile_dir: profile.to_path_buf(),
        currency: CurrencyCode::RUB,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

#[must_use]
pub fn user_json(name: &str, is_admin: bool) -> Value {
    json!({
        "name": name,
        "email": format!("{}@books.ru", name.to_lowercase()),
        "is_admin": is_admin,
    })
}

/// Three books as the backend sends them.
#[must_use]
pub fn catalog_json() -> Value {
    json!([
        {"id": 1, "name": "Book A", "description": "A gentle first book", "price": 10},
        {"id": 2, "name": "War and Peace", "description": "Tolstoy", "price": 1500.5},
        {"id": 3, "name": "Dead Souls", "description": null, "price": 820}
    ])
}

/// The first book of [`catalog_json`].
#[must_use]
pub fn book_a() -> Product {
    let first = catalog_json().get(0).cloned().expect("book fixture");
    serde_json::from_value(first).expect("book fixture")
}

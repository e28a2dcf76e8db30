//! Product catalog and client-side search.
//!
//! The full listing is fetched once per page (and served from the API
//! client's cache while fresh). Search never goes back to the server: every
//! term is matched against the full cached list.

use std::sync::Arc;

use bookstore_core::ProductId;
use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::Product;

/// Whether the listing has been fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogStatus {
    #[default]
    NotLoaded,
    Loaded,
    Failed,
}

/// Result of a search, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Products to show, in catalog order.
    Products(Vec<Product>),
    /// The catalog loaded but has no products at all.
    EmptyCatalog,
    /// No product matched `term`.
    NothingFound { term: String },
    /// The catalog could not be loaded.
    Unavailable,
}

/// Product catalog held by a page.
#[derive(Debug, Default)]
pub struct Catalog {
    products: Arc<Vec<Product>>,
    status: CatalogStatus,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn status(&self) -> CatalogStatus {
        self.status
    }

    /// All products, in backend order. Empty unless loaded.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Fetch the listing (cached by the API client).
    ///
    /// A failure empties the catalog and marks it failed.
    ///
    /// # Errors
    ///
    /// Returns the API error so the caller can log or report it.
    #[instrument(skip(self, api))]
    pub async fn load(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        match api.products().await {
            Ok(products) => {
                debug!(count = products.len(), "Catalog loaded");
                self.products = products;
                self.status = CatalogStatus::Loaded;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Catalog failed to load");
                self.products = Arc::default();
                self.status = CatalogStatus::Failed;
                Err(e)
            }
        }
    }

    /// Drop the cached listing and fetch it again.
    ///
    /// # Errors
    ///
    /// Returns the API error so the caller can log or report it.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        api.invalidate_products();
        self.load(api).await
    }

    /// Product with `id`, if the catalog has it.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Filter the full listing by `term`.
    ///
    /// The term is trimmed and lowercased; an empty term lists everything.
    /// Otherwise a product matches when its name or description contains
    /// the term, ignoring case.
    #[must_use]
    pub fn search(&self, term: &str) -> Listing {
        if self.status == CatalogStatus::Failed {
            return Listing::Unavailable;
        }

        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return if self.products.is_empty() {
                Listing::EmptyCatalog
            } else {
                Listing::Products(self.products.to_vec())
            };
        }

        let found: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.matches(&needle))
            .cloned()
            .collect();

        if found.is_empty() {
            Listing::NothingFound {
                term: term.trim().to_string(),
            }
        } else {
            Listing::Products(found)
        }
    }
}

#[cfg(test)]
impl Catalog {
    pub(crate) fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(products),
            status: CatalogStatus::Loaded,
        }
    }
}

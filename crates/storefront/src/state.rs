//! Page state.
//!
//! A [`Storefront`] is one page load: opening it loads the cart from local
//! storage, restores the session cookie and asks the backend who is signed
//! in. Every operation updates the stores it owns and leaves the views to be
//! re-rendered from scratch.

use std::sync::Arc;

use askama::Template;
use bookstore_core::{CurrencyCode, ProductId};
use secrecy::SecretString;
use tracing::{debug, info, instrument, warn};

use crate::api::ApiClient;
use crate::api::types::Authenticated;
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::{Product, SessionState, User};
use crate::notify::{NotificationKind, Notifier};
use crate::services::{
    AuthError, AuthService, CartStore, Catalog, Checkout, CheckoutDetails, CheckoutOutcome,
    Listing, OrderReceipt, QuantityChange,
};
use crate::storage::{FileStorage, LocalStorage, StorageError};
use crate::views::{
    CartBadgeTemplate, CartShowTemplate, CartView, NavTemplate, ProductsTemplate, ReceiptTemplate,
};

/// Local-storage key holding the backend session cookies.
pub const COOKIE_STORAGE_KEY: &str = "bookstore_cookies";

/// One storefront page: cart, session and catalog plus the collaborators
/// they talk to.
pub struct Storefront {
    api: ApiClient,
    storage: Arc<dyn LocalStorage>,
    notifier: Arc<dyn Notifier>,
    currency: CurrencyCode,
    cart: CartStore,
    session: SessionState,
    catalog: Catalog,
}

impl Storefront {
    /// Open a page backed by the profile directory from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile directory cannot be created or the
    /// saved cart cannot be read.
    pub async fn open_profile(
        config: &StorefrontConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let storage = Arc::new(FileStorage::open(&config.profile_dir)?);
        Self::open(config, storage, notifier).await
    }

    /// Open a page: load the cart, restore cookies and check the session.
    ///
    /// A failed session check is not fatal; the session stays
    /// [`SessionState::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the saved cart
    /// cannot be read.
    #[instrument(skip_all)]
    pub async fn open(
        config: &StorefrontConfig,
        storage: Arc<dyn LocalStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let api = ApiClient::new(&config.api)?;
        restore_cookies(&api, storage.as_ref());

        let cart = CartStore::load(Arc::clone(&storage))?;

        let mut page = Self {
            api,
            storage,
            notifier,
            currency: config.currency,
            cart,
            session: SessionState::Unknown,
            catalog: Catalog::new(),
        };
        page.refresh_session().await;
        Ok(page)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Ask the backend who is signed in. On failure the previous state is
    /// kept.
    pub async fn refresh_session(&mut self) -> &SessionState {
        match AuthService::new(&self.api).check_session().await {
            Ok(state) => {
                if let Some(user) = state.user() {
                    set_sentry_user(&user.name, user.email.as_deref());
                }
                self.session = state;
                self.save_cookies();
            }
            Err(e) => AppError::from(e).report(),
        }
        &self.session
    }

    /// Sign in. Success and failure are both announced through the notifier.
    ///
    /// # Errors
    ///
    /// Returns the validation, rejection or transport error; the session is
    /// unchanged in that case.
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<User> {
        add_breadcrumb("auth", "Login attempt", None);
        let result = AuthService::new(&self.api).login(email, password).await;
        let user = self.finish_auth(result, "Login failed")?;

        self.notifier
            .notify(NotificationKind::Success, &format!("Welcome, {}!", user.name));
        Ok(user)
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns the validation, rejection or transport error; the session is
    /// unchanged in that case.
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<User> {
        add_breadcrumb("auth", "Registration attempt", None);
        let result = AuthService::new(&self.api)
            .register(name, email, password)
            .await;
        let user = self.finish_auth(result, "Registration failed")?;

        self.notifier.notify(
            NotificationKind::Success,
            &format!("Registration successful! Welcome, {}!", user.name),
        );
        Ok(user)
    }

    /// End the session.
    ///
    /// # Errors
    ///
    /// Returns the rejection or transport error; the session is unchanged in
    /// that case.
    pub async fn logout(&mut self) -> Result<()> {
        add_breadcrumb("auth", "Logout", None);
        if let Err(e) = AuthService::new(&self.api).logout().await {
            let err = AppError::from(e);
            let message = match &err {
                AppError::Auth(AuthError::Rejected(message)) => message.clone(),
                _ => "Logout failed".to_string(),
            };
            self.notifier.notify(NotificationKind::Error, &message);
            err.report();
            return Err(err);
        }

        self.session = SessionState::Anonymous;
        clear_sentry_user();
        self.save_cookies();
        self.notifier
            .notify(NotificationKind::Info, "You have logged out");
        Ok(())
    }

    fn finish_auth(
        &mut self,
        result: std::result::Result<Authenticated, AuthError>,
        fallback: &str,
    ) -> Result<User> {
        match result {
            Ok(authenticated) => {
                let user = authenticated.user;
                set_sentry_user(&user.name, user.email.as_deref());
                self.session = SessionState::Authenticated(user.clone());
                self.save_cookies();
                Ok(user)
            }
            Err(e) => {
                let err = AppError::from(e);
                let message = match &err {
                    AppError::Auth(AuthError::Api(_)) => fallback.to_string(),
                    _ => err.user_message(),
                };
                self.notifier.notify(NotificationKind::Error, &message);
                err.report();
                Err(err)
            }
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the catalog. A failure is reported and leaves the catalog in
    /// its failed state, which the product view shows.
    pub async fn load_catalog(&mut self) -> &Catalog {
        if let Err(e) = self.catalog.load(&self.api).await {
            AppError::from(e).report();
        }
        &self.catalog
    }

    /// Re-fetch the catalog, bypassing the cache.
    pub async fn refresh_catalog(&mut self) -> &Catalog {
        if let Err(e) = self.catalog.refresh(&self.api).await {
            AppError::from(e).report();
        }
        &self.catalog
    }

    /// Client-side search over the loaded catalog.
    #[must_use]
    pub fn search(&self, term: &str) -> Listing {
        self.catalog.search(term)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one unit of `product` to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn add_to_cart(&mut self, product: &Product) -> Result<u32> {
        let id = product.id.to_string();
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));
        Ok(self.cart.add(product)?)
    }

    /// Add the catalog product with `id` and announce it. Unknown ids do
    /// nothing and return `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn add_to_cart_from_catalog(&mut self, id: ProductId) -> Result<Option<u32>> {
        let Some(product) = self.catalog.find(id).cloned() else {
            debug!(product_id = %id, "Product not in catalog");
            return Ok(None);
        };

        let quantity = self.add_to_cart(&product)?;
        self.notifier.notify(
            NotificationKind::Success,
            &format!("\"{}\" added to cart!", product.name),
        );
        Ok(Some(quantity))
    }

    /// Change a line's quantity by `delta`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn change_quantity(&mut self, id: ProductId, delta: i64) -> Result<QuantityChange> {
        let id_str = id.to_string();
        let delta_str = delta.to_string();
        add_breadcrumb(
            "cart",
            "Changed quantity",
            Some(&[("product_id", id_str.as_str()), ("delta", delta_str.as_str())]),
        );
        Ok(self.cart.change_quantity(id, delta)?)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn remove_from_cart(&mut self, id: ProductId) -> Result<bool> {
        let id_str = id.to_string();
        add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", id_str.as_str())]));
        Ok(self.cart.remove(id)?)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn clear_cart(&mut self) -> Result<()> {
        add_breadcrumb("cart", "Cleared cart", None);
        Ok(self.cart.clear()?)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Run checkout. Every outcome has already been announced through the
    /// notifier when this returns.
    #[instrument(skip_all)]
    pub async fn checkout(&mut self, details: &CheckoutDetails) -> CheckoutOutcome {
        add_breadcrumb("checkout", "Checkout started", None);

        let outcome = Checkout::new(&self.api, self.notifier.as_ref(), self.currency)
            .run(&mut self.cart, details)
            .await;

        match &outcome {
            CheckoutOutcome::NotLoggedIn => self.session = SessionState::Anonymous,
            CheckoutOutcome::Placed(receipt) => {
                let order_id = receipt.order_id.to_string();
                add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));
            }
            _ => {}
        }
        self.save_cookies();
        outcome
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Full cart view.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_cart(&self) -> Result<String> {
        Ok(CartShowTemplate {
            cart: CartView::new(self.cart.items(), self.currency),
        }
        .render()?)
    }

    /// Cart badge.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_badge(&self) -> Result<String> {
        Ok(CartBadgeTemplate {
            count: self.cart.badge_count(),
        }
        .render()?)
    }

    /// Product grid for `term` (empty lists everything).
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_products(&self, term: &str) -> Result<String> {
        Ok(ProductsTemplate::new(&self.search(term), self.currency).render()?)
    }

    /// Navigation bar for the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_nav(&self) -> Result<String> {
        Ok(NavTemplate::new(&self.session, self.cart.badge_count()).render()?)
    }

    /// Confirmation for a placed order.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_receipt(&self, receipt: &OrderReceipt) -> Result<String> {
        Ok(ReceiptTemplate::new(receipt, self.currency).render()?)
    }

    // =========================================================================
    // Cookies
    // =========================================================================

    /// Mirror the cookie jar to local storage. Failures are logged only.
    fn save_cookies(&self) {
        let result = match self.api.cookie_header() {
            Some(header) => serde_json::to_string(&header)
                .map_err(|source| StorageError::Corrupt {
                    key: COOKIE_STORAGE_KEY.to_string(),
                    source,
                })
                .and_then(|raw| self.storage.set_item(COOKIE_STORAGE_KEY, &raw)),
            None => self.storage.remove_item(COOKIE_STORAGE_KEY),
        };

        if let Err(e) = result {
            warn!(error = %e, "Failed to save session cookies");
        }
    }
}

/// Seed the API client's jar from local storage. Unreadable data is
/// dropped; the user simply starts signed out.
fn restore_cookies(api: &ApiClient, storage: &dyn LocalStorage) {
    match storage.get_item(COOKIE_STORAGE_KEY) {
        Ok(Some(raw)) => match serde_json::from_str::<String>(&raw) {
            Ok(header) => {
                api.restore_cookies(&header);
                info!("Restored session cookies");
            }
            Err(e) => warn!(error = %e, "Ignoring unreadable session cookies"),
        },
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Failed to read session cookies"),
    }
}

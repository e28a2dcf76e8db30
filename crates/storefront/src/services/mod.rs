//! Storefront services.
//!
//! # Services
//!
//! - `auth` - Session checks, login, registration and logout
//! - `cart` - Client-side cart mirrored to local storage
//! - `catalog` - Product listing and client-side search
//! - `checkout` - Order submission from the cart

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;

pub use auth::{AuthError, AuthService};
pub use cart::{CART_STORAGE_KEY, CartStore, QuantityChange};
pub use catalog::{Catalog, CatalogStatus, Listing};
pub use checkout::{Checkout, CheckoutDetails, CheckoutOutcome, OrderReceipt};

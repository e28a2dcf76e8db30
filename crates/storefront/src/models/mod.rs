//! Domain models for the storefront client.
//!
//! These are the validated shapes the rest of the crate works with; wire
//! envelopes live in [`crate::api::types`].

pub mod cart;
pub mod product;
pub mod user;

pub use cart::{CartItem, CartSummary, MAX_LINE_QUANTITY};
pub use product::{MAX_PRICE, Product, price_in_range};
pub use user::{SessionState, User};

//! Checkout: turn the cart into an order.
//!
//! Preconditions are checked in order and short-circuit: an empty cart never
//! reaches the network, and an anonymous session never reaches the order
//! endpoint. The cart is only cleared once the backend has confirmed the
//! order with an id.

use bookstore_core::{CurrencyCode, OrderId, Price};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{error, info, instrument, warn};

use crate::api::types::OrderRequest;
use crate::api::{ApiClient, ApiError};
use crate::notify::Notifier;

use super::cart::CartStore;

pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty!";
pub const LOGIN_REQUIRED_MESSAGE: &str = "You must log in to place an order!";
pub const SESSION_CHECK_FAILED_MESSAGE: &str = "Error checking authorization";
pub const ORDER_FAILED_MESSAGE: &str = "Error placing order";

/// Optional customer details sent with the order.
///
/// The backend fills in the account's name and email when these are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub shipping_address: Option<String>,
}

/// A confirmed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub total: Decimal,
    pub item_count: u32,
    pub placed_at: DateTime<Utc>,
    /// Message the backend sent along with the id, if any.
    pub message: Option<String>,
}

/// How a checkout attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Nothing to order; no request was made.
    EmptyCart,
    /// The backend reports no signed-in user.
    NotLoggedIn,
    /// The session check itself failed.
    SessionCheckFailed,
    /// The user did not confirm.
    Declined,
    /// The order was placed and the cart cleared.
    Placed(OrderReceipt),
    /// The backend refused the order with this message.
    Rejected(String),
    /// The order request failed in transport or returned garbage.
    Failed,
}

/// Checkout orchestrator.
pub struct Checkout<'a> {
    api: &'a ApiClient,
    notifier: &'a dyn Notifier,
    currency: CurrencyCode,
}

impl<'a> Checkout<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, notifier: &'a dyn Notifier, currency: CurrencyCode) -> Self {
        Self {
            api,
            notifier,
            currency,
        }
    }

    /// Run one checkout attempt against `cart`.
    ///
    /// Every outcome except `Declined` is announced through the notifier.
    /// The cart is left untouched unless the order is placed.
    #[instrument(skip_all, fields(lines = cart.items().len()))]
    pub async fn run(&self, cart: &mut CartStore, details: &CheckoutDetails) -> CheckoutOutcome {
        if cart.is_empty() {
            self.notifier.alert(EMPTY_CART_MESSAGE);
            return CheckoutOutcome::EmptyCart;
        }

        match self.api.current_user().await {
            Ok(Some(_)) => {}
            Ok(None) => {
                info!("Checkout refused: not logged in");
                self.notifier.alert(LOGIN_REQUIRED_MESSAGE);
                return CheckoutOutcome::NotLoggedIn;
            }
            Err(e) => {
                warn!(error = %e, "Session check before checkout failed");
                self.notifier.alert(SESSION_CHECK_FAILED_MESSAGE);
                return CheckoutOutcome::SessionCheckFailed;
            }
        }

        let summary = cart.summary();
        let total = Price::new(summary.total, self.currency);
        if !self
            .notifier
            .confirm(&format!("Confirm order for {}?", total.display()))
        {
            info!("Checkout declined");
            return CheckoutOutcome::Declined;
        }

        let order = OrderRequest {
            items: cart.items(),
            total_amount: summary.total,
            customer_name: details.customer_name.as_deref(),
            customer_email: details.customer_email.as_deref(),
            customer_phone: details.customer_phone.as_deref(),
            shipping_address: details.shipping_address.as_deref(),
        };

        let placed = match self.api.place_order(&order).await {
            Ok(placed) => placed,
            Err(ApiError::Rejected(message)) => {
                warn!(%message, "Order rejected");
                self.notifier
                    .alert(&format!("{ORDER_FAILED_MESSAGE}: {message}"));
                return CheckoutOutcome::Rejected(message);
            }
            Err(e) => {
                error!(error = %e, "Order request failed");
                self.notifier.alert(ORDER_FAILED_MESSAGE);
                return CheckoutOutcome::Failed;
            }
        };

        // The order exists on the backend now; a storage failure must not
        // turn that into a reported failure.
        if let Err(e) = cart.clear() {
            error!(error = %e, order_id = %placed.order_id, "Failed to clear cart after order");
        }

        info!(order_id = %placed.order_id, total = %summary.total, "Order placed");
        self.notifier.alert(&format!(
            "Order placed successfully! Your order number: {}",
            placed.order_id
        ));

        CheckoutOutcome::Placed(OrderReceipt {
            order_id: placed.order_id,
            total: summary.total,
            item_count: summary.item_count,
            placed_at: Utc::now(),
            message: placed.message,
        })
    }
}

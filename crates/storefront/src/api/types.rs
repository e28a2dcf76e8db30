//! Wire types for the backend API.
//!
//! Requests are serialized straight from these structs. Responses are
//! deserialized into envelopes and then validated into domain values; any
//! shape the client cannot act on becomes a [`SchemaViolation`].

use bookstore_core::OrderId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CartItem, Product, User, price_in_range};

/// A response that parsed as JSON but does not mean what it should.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation(pub String);

/// Fallback when the backend reports failure without a message.
pub const DEFAULT_REJECTION: &str = "Request was rejected";

// =============================================================================
// Requests
// =============================================================================

/// `POST /api/login` body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /api/register` body.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /api/orders` body.
///
/// The customer fields are optional; the backend falls back to the account's
/// name and email when they are absent.
#[derive(Debug, Serialize)]
pub struct OrderRequest<'a> {
    pub items: &'a [CartItem],
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<&'a str>,
}

// =============================================================================
// Response envelopes
// =============================================================================

/// `GET /api/user`.
#[derive(Debug, Deserialize)]
pub struct UserStatusEnvelope {
    pub logged_in: bool,
    #[serde(default)]
    pub user: Option<User>,
}

impl UserStatusEnvelope {
    /// The signed-in user, or `None` for an anonymous session.
    pub fn validate(self) -> Result<Option<User>, SchemaViolation> {
        match (self.logged_in, self.user) {
            (true, Some(user)) => Ok(Some(user)),
            (true, None) => Err(SchemaViolation(
                "logged_in is true but no user was sent".to_string(),
            )),
            (false, _) => Ok(None),
        }
    }
}

/// `POST /api/login` and `POST /api/register`.
#[derive(Debug, Deserialize)]
pub struct AuthEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// A successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub user: User,
    pub message: Option<String>,
}

impl AuthEnvelope {
    /// `Ok(Ok(..))` on success, `Ok(Err(message))` on a backend rejection.
    pub fn validate(self) -> Result<Result<Authenticated, String>, SchemaViolation> {
        if !self.success {
            return Ok(Err(rejection(self.message)));
        }
        let user = self.user.ok_or_else(|| {
            SchemaViolation("success is true but no user was sent".to_string())
        })?;
        Ok(Ok(Authenticated {
            user,
            message: self.message,
        }))
    }
}

/// `GET /api/logout`.
#[derive(Debug, Deserialize)]
pub struct LogoutEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl LogoutEnvelope {
    pub fn validate(self) -> Result<(), String> {
        if self.success {
            Ok(())
        } else {
            Err(rejection(self.message))
        }
    }
}

/// `POST /api/orders`.
#[derive(Debug, Deserialize)]
pub struct OrderEnvelope {
    pub success: bool,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A confirmed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub message: Option<String>,
}

impl OrderEnvelope {
    pub fn validate(self) -> Result<Result<OrderPlaced, String>, SchemaViolation> {
        if !self.success {
            return Ok(Err(rejection(self.message)));
        }
        let order_id = self.order_id.ok_or_else(|| {
            SchemaViolation("success is true but no order_id was sent".to_string())
        })?;
        Ok(Ok(OrderPlaced {
            order_id,
            message: self.message,
        }))
    }
}

/// Validate the bulk product listing.
pub fn validate_products(products: Vec<Product>) -> Result<Vec<Product>, SchemaViolation> {
    if let Some(bad) = products.iter().find(|p| !price_in_range(p.price)) {
        return Err(SchemaViolation(format!(
            "product {} has out-of-range price {}",
            bad.id, bad.price
        )));
    }
    Ok(products)
}

fn rejection(message: Option<String>) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REJECTION.to_string())
}

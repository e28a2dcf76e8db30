//! Catalog product.

use bookstore_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Highest unit price the client accepts from the backend or from storage.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Whether `price` is a usable unit price: not negative and at most
/// [`MAX_PRICE`].
#[must_use]
pub fn price_in_range(price: Decimal) -> bool {
    !price.is_sign_negative() && price <= MAX_PRICE
}

/// A purchasable product as returned by `/api/product/all`.
///
/// Read-only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl Product {
    /// Case-insensitive substring match against name or description.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_backend_shape() {
        let product: Product = serde_json::from_str(
            r#"{"id": 1, "name": "Война и мир", "description": null, "price": 1500.0}"#,
        )
        .unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Decimal::new(1500, 0));
        assert!(product.description.is_none());
        assert!(product.photo.is_none());
    }

    #[test]
    fn test_integer_price_accepted() {
        let product: Product =
            serde_json::from_str(r#"{"id": 2, "name": "Book A", "price": 10}"#).unwrap();
        assert_eq!(product.price, Decimal::new(10, 0));
    }

    #[test]
    fn test_price_range() {
        assert!(price_in_range(Decimal::ZERO));
        assert!(price_in_range(MAX_PRICE));
        assert!(!price_in_range(Decimal::new(-1, 2)));
        assert!(!price_in_range(MAX_PRICE + Decimal::ONE));
    }

    #[test]
    fn test_matches_name_and_description() {
        let product = Product {
            id: ProductId::new(3),
            name: "Мастер и Маргарита".to_string(),
            description: Some("Роман Михаила Булгакова".to_string()),
            price: Decimal::new(1300, 0),
            photo: None,
        };
        assert!(product.matches("маргарита"));
        assert!(product.matches("булгаков"));
        assert!(!product.matches("толстой"));
    }
}

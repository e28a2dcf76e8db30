//! Cart line items and totals.

use bookstore_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Product;

/// Largest quantity a single cart line can hold.
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// One product entry in the cart.
///
/// Display fields are copied from the catalog when the line is created, so a
/// later catalog price change does not touch lines already in the cart. This
/// is also the shape persisted to local storage and sent with an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Between 1 and [`MAX_LINE_QUANTITY`] while the line exists.
    pub quantity: u32,
}

impl CartItem {
    /// New line for `product` with quantity 1.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            photo: product.photo.clone(),
            quantity: 1,
        }
    }

    /// `price × quantity`, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(Decimal::MAX)
    }
}

/// Totals shown under the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    /// Sum of quantities (the badge number).
    pub item_count: u32,
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Amount charged; no tax or shipping is added.
    pub total: Decimal,
}

impl CartSummary {
    /// Compute totals over `items`.
    #[must_use]
    pub fn of(items: &[CartItem]) -> Self {
        let subtotal = items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, |acc, line| {
                acc.checked_add(line).unwrap_or(Decimal::MAX)
            });
        let item_count = items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity));
        Self {
            item_count,
            subtotal,
            total: subtotal,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn item(id: i64, price: Decimal, quantity: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: format!("Book {id}"),
            description: None,
            price,
            photo: None,
            quantity,
        }
    }

    #[test]
    fn test_summary_sums_lines() {
        let items = vec![
            item(1, Decimal::new(10, 0), 2),
            item(2, Decimal::new(1250, 2), 3),
        ];
        let summary = CartSummary::of(&items);
        assert_eq!(summary.item_count, 5);
        assert_eq!(summary.subtotal, Decimal::new(5750, 2));
        assert_eq!(summary.total, summary.subtotal);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let items = vec![item(1, Decimal::MAX, 2), item(2, Decimal::MAX, 1)];
        assert_eq!(items[0].line_total(), Decimal::MAX);
        assert_eq!(CartSummary::of(&items).subtotal, Decimal::MAX);
    }

    #[test]
    fn test_summary_of_empty_cart() {
        assert_eq!(CartSummary::of(&[]), CartSummary::default());
    }

    #[test]
    fn test_persisted_shape() {
        let json = serde_json::to_value(item(1, Decimal::new(10, 0), 2)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "name": "Book 1",
                "description": null,
                "price": 10.0,
                "quantity": 2
            })
        );
    }
}

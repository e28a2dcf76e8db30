//! Declarative view layer.
//!
//! Views are plain structs built from store state with every price already
//! formatted, rendered through askama text templates. A page re-renders the
//! whole view after each operation; there is no diffing.

use askama::Template;
use bookstore_core::{CurrencyCode, Price};
use rust_decimal::Decimal;

use crate::models::{CartItem, CartSummary, Product, SessionState};
use crate::services::{Listing, OrderReceipt};

const NO_DESCRIPTION: &str = "No description";

fn format_price(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).display()
}

// =============================================================================
// Cart
// =============================================================================

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn new(items: &[CartItem], currency: CurrencyCode) -> Self {
        let summary = CartSummary::of(items);
        Self {
            items: items
                .iter()
                .map(|item| CartItemView {
                    id: item.id.as_i64(),
                    name: item.name.clone(),
                    description: item
                        .description
                        .clone()
                        .filter(|d| !d.trim().is_empty())
                        .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                    quantity: item.quantity,
                    price: format_price(item.price, currency),
                    line_price: format_price(item.line_total(), currency),
                })
                .collect(),
            subtotal: format_price(summary.subtotal, currency),
            total: format_price(summary.total, currency),
            item_count: summary.item_count,
        }
    }
}

/// Cart page template.
#[derive(Template)]
#[template(path = "cart/show.txt")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart badge partial.
#[derive(Template)]
#[template(path = "partials/cart_badge.txt")]
pub struct CartBadgeTemplate {
    pub count: u32,
}

// =============================================================================
// Catalog
// =============================================================================

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: String,
}

impl ProductView {
    fn new(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            description: product
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            price: format_price(product.price, currency),
        }
    }
}

/// Message shown instead of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingNotice {
    pub title: String,
    pub detail: String,
}

/// Catalog page template.
#[derive(Template)]
#[template(path = "products/index.txt")]
pub struct ProductsTemplate {
    pub products: Vec<ProductView>,
    pub notice: Option<ListingNotice>,
}

impl ProductsTemplate {
    #[must_use]
    pub fn new(listing: &Listing, currency: CurrencyCode) -> Self {
        let notice = |title: &str, detail: &str| {
            Some(ListingNotice {
                title: title.to_string(),
                detail: detail.to_string(),
            })
        };

        match listing {
            Listing::Products(products) => Self {
                products: products
                    .iter()
                    .map(|p| ProductView::new(p, currency))
                    .collect(),
                notice: None,
            },
            Listing::EmptyCatalog => Self {
                products: Vec::new(),
                notice: notice(
                    "No products available",
                    "Check back later, new books are on their way!",
                ),
            },
            Listing::NothingFound { term } => Self {
                products: Vec::new(),
                notice: notice(
                    "Nothing found",
                    &format!("No books match \"{term}\". Try a different search."),
                ),
            },
            Listing::Unavailable => Self {
                products: Vec::new(),
                notice: notice(
                    "Error loading products",
                    "Please try again later or contact support.",
                ),
            },
        }
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// Navigation bar: guest controls or user controls, admin links for admins.
#[derive(Template)]
#[template(path = "partials/nav.txt")]
pub struct NavTemplate {
    pub user_name: Option<String>,
    pub is_admin: bool,
    pub cart_count: u32,
}

impl NavTemplate {
    #[must_use]
    pub fn new(session: &SessionState, cart_count: u32) -> Self {
        Self {
            user_name: session.user().map(|u| u.name.clone()),
            is_admin: session.is_admin(),
            cart_count,
        }
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Order confirmation template.
#[derive(Template)]
#[template(path = "checkout/receipt.txt")]
pub struct ReceiptTemplate {
    pub order_id: i64,
    pub item_count: u32,
    pub total: String,
    pub placed_at: String,
    pub message: Option<String>,
}

impl ReceiptTemplate {
    #[must_use]
    pub fn new(receipt: &OrderReceipt, currency: CurrencyCode) -> Self {
        Self {
            order_id: receipt.order_id.as_i64(),
            item_count: receipt.item_count,
            total: format_price(receipt.total, currency),
            placed_at: receipt.placed_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            message: receipt.message.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bookstore_core::{OrderId, ProductId};
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::User;

    fn line(id: i64, price: i64, quantity: u32, description: Option<&str>) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: format!("Book {id}"),
            description: description.map(str::to_string),
            price: Decimal::new(price, 0),
            photo: None,
            quantity,
        }
    }

    #[test]
    fn test_cart_view_formats_lines_and_totals() {
        let items = vec![line(1, 1500, 2, Some("Classic")), line(2, 250, 1, None)];
        let rendered = CartShowTemplate {
            cart: CartView::new(&items, CurrencyCode::RUB),
        }
        .render()
        .unwrap();

        assert!(rendered.contains("[1] Book 1"));
        assert!(rendered.contains("1500.00 руб. x 2 = 3000.00 руб."));
        assert!(rendered.contains("No description"));
        assert!(rendered.contains("Total:    3250.00 руб."));
        assert!(!rendered.contains("Your cart is empty"));
    }

    #[test]
    fn test_empty_cart_view() {
        let rendered = CartShowTemplate {
            cart: CartView::new(&[], CurrencyCode::RUB),
        }
        .render()
        .unwrap();
        assert!(rendered.contains("Your cart is empty."));
        assert!(!rendered.contains("Subtotal"));
    }

    #[test]
    fn test_badge() {
        let rendered = CartBadgeTemplate { count: 3 }.render().unwrap();
        assert_eq!(rendered.trim(), "Cart (3)");
    }

    #[test]
    fn test_products_view_states() {
        let nothing = ProductsTemplate::new(
            &Listing::NothingFound {
                term: "nonexistent".to_string(),
            },
            CurrencyCode::RUB,
        )
        .render()
        .unwrap();
        assert!(nothing.contains("Nothing found"));
        assert!(nothing.contains("nonexistent"));

        let empty = ProductsTemplate::new(&Listing::EmptyCatalog, CurrencyCode::RUB)
            .render()
            .unwrap();
        assert!(empty.contains("No products available"));

        let failed = ProductsTemplate::new(&Listing::Unavailable, CurrencyCode::RUB)
            .render()
            .unwrap();
        assert!(failed.contains("Error loading products"));
    }

    #[test]
    fn test_products_view_lists_prices() {
        let listing = Listing::Products(vec![Product {
            id: ProductId::new(7),
            name: "Dead Souls".to_string(),
            description: None,
            price: Decimal::new(1999, 2),
            photo: None,
        }]);
        let rendered = ProductsTemplate::new(&listing, CurrencyCode::USD)
            .render()
            .unwrap();
        assert!(rendered.contains("[7] Dead Souls"));
        assert!(rendered.contains("Price: $19.99"));
    }

    #[test]
    fn test_nav_guest_user_admin() {
        let guest = NavTemplate::new(&SessionState::Anonymous, 0).render().unwrap();
        assert!(guest.contains("Log in | Register"));
        assert!(!guest.contains("Admin"));

        let reader = SessionState::Authenticated(User {
            name: "Anna".to_string(),
            email: None,
            is_admin: false,
        });
        let rendered = NavTemplate::new(&reader, 2).render().unwrap();
        assert!(rendered.contains("Signed in as Anna"));
        assert!(rendered.contains("Cart (2)"));
        assert!(!rendered.contains("Admin"));

        let admin = SessionState::Authenticated(User {
            name: "Boss".to_string(),
            email: None,
            is_admin: true,
        });
        let rendered = NavTemplate::new(&admin, 0).render().unwrap();
        assert!(rendered.contains("Admin: Products | Orders"));
    }

    #[test]
    fn test_receipt() {
        let receipt = OrderReceipt {
            order_id: OrderId::new(42),
            total: Decimal::new(20, 0),
            item_count: 2,
            placed_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            message: None,
        };
        let rendered = ReceiptTemplate::new(&receipt, CurrencyCode::RUB)
            .render()
            .unwrap();
        assert!(rendered.contains("Order #42 confirmed"));
        assert!(rendered.contains("20.00 руб."));
        assert!(rendered.contains("2024-05-01 12:30 UTC"));
    }
}

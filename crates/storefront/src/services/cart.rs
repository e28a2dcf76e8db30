//! Cart store: the authoritative client-side cart, mirrored to local storage.
//!
//! Every mutation writes the whole cart back to storage before returning.
//! The in-memory cart upholds two invariants at all times: at most one line
//! per product id, and every line has a quantity between 1 and
//! [`MAX_LINE_QUANTITY`].

use std::sync::Arc;

use bookstore_core::ProductId;
use tracing::{debug, instrument, warn};

use crate::models::{CartItem, CartSummary, MAX_LINE_QUANTITY, Product, price_in_range};
use crate::storage::{LocalStorage, StorageError};

/// Local-storage key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "bookstore_cart";

/// What [`CartStore::change_quantity`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now has this quantity.
    Updated(u32),
    /// The quantity dropped to zero or below and the line was removed.
    Removed,
    /// No line with that id; nothing changed.
    NotFound,
}

/// Client-side cart backed by local storage.
pub struct CartStore {
    storage: Arc<dyn LocalStorage>,
    items: Vec<CartItem>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the persisted cart; a missing entry is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupt`] if the stored value is not a cart,
    /// [`StorageError::Invalid`] if a line carries an out-of-range price, or
    /// an I/O error if storage cannot be read.
    #[instrument(skip(storage))]
    pub fn load(storage: Arc<dyn LocalStorage>) -> Result<Self, StorageError> {
        let items = match storage.get_item(CART_STORAGE_KEY)? {
            Some(raw) => {
                let stored: Vec<CartItem> =
                    serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                        key: CART_STORAGE_KEY.to_string(),
                        source,
                    })?;
                if let Some(bad) = stored.iter().find(|item| !price_in_range(item.price)) {
                    return Err(StorageError::Invalid {
                        key: CART_STORAGE_KEY.to_string(),
                        reason: format!("line {} has out-of-range price {}", bad.id, bad.price),
                    });
                }
                normalize(stored)
            }
            None => Vec::new(),
        };

        debug!(lines = items.len(), "Cart loaded");
        Ok(Self { storage, items })
    }

    /// Delete the persisted cart without loading it.
    ///
    /// This is the way out of a [`StorageError::Corrupt`] cart.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn discard(storage: &dyn LocalStorage) -> Result<(), StorageError> {
        storage.remove_item(CART_STORAGE_KEY)
    }

    /// Cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Add one unit of `product`.
    ///
    /// An existing line is incremented up to [`MAX_LINE_QUANTITY`]; otherwise a new line is appended
    /// carrying a snapshot of the product's display fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add(&mut self, product: &Product) -> Result<u32, StorageError> {
        let quantity = if let Some(item) = self.items.iter_mut().find(|i| i.id == product.id) {
            item.quantity = item.quantity.saturating_add(1).min(MAX_LINE_QUANTITY);
            item.quantity
        } else {
            self.items.push(CartItem::from_product(product));
            1
        };

        self.persist()?;
        Ok(quantity)
    }

    /// Add `delta` to a line's quantity, removing the line if the result is
    /// zero or below and capping it at [`MAX_LINE_QUANTITY`]. Unknown ids are
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn change_quantity(
        &mut self,
        id: ProductId,
        delta: i64,
    ) -> Result<QuantityChange, StorageError> {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return Ok(QuantityChange::NotFound);
        };

        let current = self.items.get(index).map_or(0, |item| item.quantity);
        let next = i64::from(current).saturating_add(delta);

        let change = if next <= 0 {
            self.items.remove(index);
            QuantityChange::Removed
        } else {
            let quantity = u32::try_from(next)
                .unwrap_or(u32::MAX)
                .min(MAX_LINE_QUANTITY);
            if let Some(item) = self.items.get_mut(index) {
                item.quantity = quantity;
            }
            QuantityChange::Updated(quantity)
        };

        self.persist()?;
        Ok(change)
    }

    /// Remove the line for `id`. Returns whether a line was removed; the cart
    /// is persisted either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: ProductId) -> Result<bool, StorageError> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;

        self.persist()?;
        Ok(removed)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.persist()
    }

    /// Write the full cart to local storage.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn persist(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.items).map_err(|source| StorageError::Corrupt {
            key: CART_STORAGE_KEY.to_string(),
            source,
        })?;
        self.storage.set_item(CART_STORAGE_KEY, &raw)?;

        debug!(
            lines = self.items.len(),
            badge = self.badge_count(),
            "Cart persisted"
        );
        Ok(())
    }

    /// Subtotal, total and item count.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::of(&self.items)
    }

    /// Number shown on the cart badge: the sum of quantities.
    #[must_use]
    pub fn badge_count(&self) -> u32 {
        self.summary().item_count
    }
}

/// Restore the cart invariants on data read from storage: lines with
/// quantity 0 are dropped, repeated ids are merged into the first line and
/// quantities are capped at [`MAX_LINE_QUANTITY`].
fn normalize(stored: Vec<CartItem>) -> Vec<CartItem> {
    let stored_len = stored.len();
    let mut items: Vec<CartItem> = Vec::with_capacity(stored_len);

    for mut item in stored.into_iter().filter(|item| item.quantity > 0) {
        if let Some(existing) = items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing
                .quantity
                .saturating_add(item.quantity)
                .min(MAX_LINE_QUANTITY);
        } else {
            item.quantity = item.quantity.min(MAX_LINE_QUANTITY);
            items.push(item);
        }
    }

    if items.len() != stored_len {
        warn!(
            stored = stored_len,
            kept = items.len(),
            "Stored cart had empty or duplicate lines; normalized"
        );
    }
    items
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStorage;

    fn product(id: i64, name: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: Some(format!("About {name}")),
            price: Decimal::new(price, 0),
            photo: None,
        }
    }

    fn empty_store() -> (Arc<MemoryStorage>, CartStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::load(storage.clone()).unwrap();
        (storage, store)
    }

    fn assert_invariants(store: &CartStore) {
        for (i, item) in store.items().iter().enumerate() {
            assert!(item.quantity >= 1, "line {} has quantity 0", item.id);
            assert!(item.quantity <= MAX_LINE_QUANTITY, "line {} over the cap", item.id);
            assert!(
                store.items().iter().skip(i + 1).all(|other| other.id != item.id),
                "duplicate line for {}",
                item.id
            );
        }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let (_, store) = empty_store();
        assert!(store.is_empty());
        assert_eq!(store.badge_count(), 0);
    }

    #[test]
    fn test_adding_twice_merges_into_one_line() {
        let (_, mut store) = empty_store();
        let book = product(1, "Book A", 10);

        assert_eq!(store.add(&book).unwrap(), 1);
        assert_eq!(store.add(&book).unwrap(), 2);

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.get(ProductId::new(1)).unwrap().quantity, 2);
        assert_eq!(store.summary().subtotal, Decimal::new(20, 0));
        assert_eq!(store.summary().total, Decimal::new(20, 0));
    }

    #[test]
    fn test_line_is_a_snapshot_of_the_product() {
        let (_, mut store) = empty_store();
        let mut book = product(1, "Book A", 10);
        store.add(&book).unwrap();

        book.price = Decimal::new(99, 0);
        book.name = "Renamed".to_string();
        store.add(&book).unwrap();

        let line = store.get(ProductId::new(1)).unwrap();
        assert_eq!(line.price, Decimal::new(10, 0));
        assert_eq!(line.name, "Book A");
    }

    #[test]
    fn test_change_quantity_below_one_removes_line() {
        let (_, mut store) = empty_store();
        let book = product(1, "Book A", 10);
        store.add(&book).unwrap();
        store.add(&book).unwrap();

        assert_eq!(
            store.change_quantity(ProductId::new(1), -2).unwrap(),
            QuantityChange::Removed
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_change_quantity_up_and_down() {
        let (_, mut store) = empty_store();
        store.add(&product(1, "Book A", 10)).unwrap();

        assert_eq!(
            store.change_quantity(ProductId::new(1), 4).unwrap(),
            QuantityChange::Updated(5)
        );
        assert_eq!(
            store.change_quantity(ProductId::new(1), -1).unwrap(),
            QuantityChange::Updated(4)
        );
        assert_eq!(store.badge_count(), 4);
    }

    #[test]
    fn test_change_quantity_unknown_id_is_noop() {
        let (storage, mut store) = empty_store();
        assert_eq!(
            store.change_quantity(ProductId::new(404), 1).unwrap(),
            QuantityChange::NotFound
        );
        // Nothing was written.
        assert_eq!(storage.get_item(CART_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_remove() {
        let (_, mut store) = empty_store();
        store.add(&product(1, "Book A", 10)).unwrap();
        store.add(&product(2, "Book B", 12)).unwrap();

        assert!(store.remove(ProductId::new(1)).unwrap());
        assert!(!store.remove(ProductId::new(1)).unwrap());
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].id, ProductId::new(2));
    }

    #[test]
    fn test_persist_then_load_roundtrip() {
        let (storage, mut store) = empty_store();
        store.add(&product(1, "Book A", 10)).unwrap();
        store.add(&product(2, "Book B", 12)).unwrap();
        store.add(&product(1, "Book A", 10)).unwrap();

        let reloaded = CartStore::load(storage).unwrap();
        assert_eq!(reloaded.items(), store.items());
    }

    #[test]
    fn test_clear_persists_empty_cart() {
        let (storage, mut store) = empty_store();
        store.add(&product(1, "Book A", 10)).unwrap();
        store.clear().unwrap();

        assert!(CartStore::load(storage).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_storage_is_typed_error() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(CART_STORAGE_KEY, "{not json").unwrap();

        let err = CartStore::load(storage.clone()).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));

        CartStore::discard(storage.as_ref()).unwrap();
        assert!(CartStore::load(storage).unwrap().is_empty());
    }

    #[test]
    fn test_load_normalizes_stored_lines() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item(
                CART_STORAGE_KEY,
                r#"[
                    {"id": 1, "name": "A", "price": 10, "quantity": 1},
                    {"id": 2, "name": "B", "price": 5, "quantity": 0},
                    {"id": 1, "name": "A", "price": 10, "quantity": 2}
                ]"#,
            )
            .unwrap();

        let store = CartStore::load(storage).unwrap();
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].quantity, 3);
    }

    #[test]
    fn test_huge_delta_is_capped_and_totals_stay_exact() {
        let (_, mut store) = empty_store();
        let mut book = product(1, "Rare folio", 0);
        book.price = Decimal::from_i128_with_scale(20_000_000_000_000_000_000, 0);
        store.add(&book).unwrap();

        assert_eq!(
            store.change_quantity(ProductId::new(1), i64::MAX).unwrap(),
            QuantityChange::Updated(MAX_LINE_QUANTITY)
        );
        assert_eq!(
            store.summary().subtotal,
            Decimal::from_i128_with_scale(20_000_000_000_000_000_000 * 9_999, 0)
        );
        assert_eq!(store.badge_count(), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_load_rejects_out_of_range_price() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item(
                CART_STORAGE_KEY,
                r#"[{"id": 1, "name": "A", "price": 50000000000000000000000000000, "quantity": 2}]"#,
            )
            .unwrap();

        let err = CartStore::load(storage).unwrap_err();
        assert!(matches!(err, StorageError::Invalid { .. }));
    }

    #[test]
    fn test_load_caps_stored_quantity() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item(
                CART_STORAGE_KEY,
                r#"[
                    {"id": 1, "name": "A", "price": 10, "quantity": 4294967295},
                    {"id": 2, "name": "B", "price": 5, "quantity": 9000},
                    {"id": 2, "name": "B", "price": 5, "quantity": 9000}
                ]"#,
            )
            .unwrap();

        let store = CartStore::load(storage).unwrap();
        assert!(store.items().iter().all(|i| i.quantity == MAX_LINE_QUANTITY));
    }

    #[test]
    fn test_invariants_hold_over_operation_sequence() {
        let (storage, mut store) = empty_store();
        let books: Vec<Product> = (1..=4).map(|id| product(id, "Book", id * 3)).collect();

        // Deterministic pseudo-random walk over add / change / remove.
        let mut seed: u64 = 0x5eed;
        for _ in 0..500 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let book = &books[usize::try_from(seed >> 62).unwrap()];
            match (seed >> 40) % 4 {
                0 | 1 => {
                    store.add(book).unwrap();
                }
                2 => {
                    let delta = i64::try_from((seed >> 20) % 7).unwrap() - 4;
                    store.change_quantity(book.id, delta).unwrap();
                }
                _ => {
                    store.remove(book.id).unwrap();
                }
            }
            assert_invariants(&store);

            let expected: Decimal = store.items().iter().map(CartItem::line_total).sum();
            assert_eq!(store.summary().subtotal, expected);
        }

        let reloaded = CartStore::load(storage).unwrap();
        assert_eq!(reloaded.items(), store.items());
    }
}

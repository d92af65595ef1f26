//! The persisted cart.

use crate::cart::CartLineItem;
use crate::error::CommerceError;
use crate::ids::ProductId;
use dzaghik_cache::Cache;

/// Storage key of the cart snapshot.
pub const CART_STORAGE_KEY: &str = "flower_shop_cart";

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// The customer's cart, written through to a [`Cache`] on every mutation.
///
/// Line ids are unique and quantities are always positive. Lines keep the
/// order in which they were first added.
#[derive(Debug, Clone)]
pub struct CartStore {
    cache: Cache,
    items: Vec<CartLineItem>,
}

impl CartStore {
    /// Restore the cart from `cache`.
    ///
    /// A missing snapshot is an empty cart. So is an unreadable one; the
    /// failure is logged and otherwise ignored.
    pub fn load(cache: Cache) -> Self {
        let items = match cache.get::<Vec<CartLineItem>>(CART_STORAGE_KEY) {
            Ok(Some(items)) => normalize(items),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, key = CART_STORAGE_KEY, "discarding unreadable cart snapshot");
                Vec::new()
            }
        };
        tracing::debug!(lines = items.len(), "cart loaded");
        Self { cache, items }
    }

    /// Add `item.quantity` units of a product, merging with an existing line.
    pub fn add_item(&mut self, item: CartLineItem) -> Result<(), CommerceError> {
        let quantity = item.quantity;
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            let new_quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
            if new_quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::QuantityExceedsLimit(
                    new_quantity,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }
            existing.quantity = new_quantity;
        } else {
            if quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::QuantityExceedsLimit(
                    quantity,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }
            self.items.push(item);
        }

        self.persist();
        Ok(())
    }

    /// Remove a line. Returns whether it was present.
    pub fn remove_item(&mut self, id: &ProductId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.id != id);
        let removed = self.items.len() < len_before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Replace a line's quantity; `quantity <= 0` removes the line.
    ///
    /// Returns whether the line was present.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove_item(id));
        }
        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        match self.items.iter_mut().find(|i| &i.id == id) {
            Some(item) => {
                item.quantity = quantity;
                self.persist();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Empty the cart and erase the stored snapshot.
    pub fn clear(&mut self) {
        self.items.clear();
        if let Err(e) = self.cache.delete(CART_STORAGE_KEY) {
            tracing::warn!(error = %e, key = CART_STORAGE_KEY, "failed to erase cart snapshot");
        }
    }

    /// Sum of `unit_price * quantity` over all lines.
    pub fn total(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, item| acc.saturating_add(item.line_total()))
    }

    /// Sum of quantities, for the badge.
    pub fn count(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, item| acc.saturating_add(item.quantity))
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn get(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    fn persist(&self) {
        if let Err(e) = self.cache.set(CART_STORAGE_KEY, &self.items) {
            tracing::warn!(error = %e, key = CART_STORAGE_KEY, "failed to persist cart");
        }
    }
}

/// Drop non-positive lines and merge duplicate ids, keeping first-seen order.
fn normalize(items: Vec<CartLineItem>) -> Vec<CartLineItem> {
    let mut out: Vec<CartLineItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity <= 0 {
            continue;
        }
        match out.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .saturating_add(item.quantity)
                    .min(MAX_QUANTITY_PER_ITEM);
            }
            None => {
                let mut item = item;
                item.quantity = item.quantity.min(MAX_QUANTITY_PER_ITEM);
                out.push(item);
            }
        }
    }
    out
}

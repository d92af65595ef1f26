//! Shopping cart module.
//!
//! Contains the line item type and the persisted cart store.

mod item;
mod store;

pub use item::CartLineItem;
pub use store::{CartStore, CART_STORAGE_KEY, MAX_QUANTITY_PER_ITEM};

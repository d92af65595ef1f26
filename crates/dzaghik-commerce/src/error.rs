//! Commerce error types.

use thiserror::Error;

/// Errors raised by cart and currency operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// Quantity must be positive.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in quantity or price calculation")]
    Overflow,

    /// Currency code outside the supported set.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Order status outside the known set.
    #[error("Unknown order status: {0}")]
    UnknownOrderStatus(String),

    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),
}

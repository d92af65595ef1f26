//! Cart, currency and checkout logic for the Dzaghik flower shop.
//!
//! This crate holds everything the storefront decides locally:
//!
//! - **Money**: the display currency table, conversion from dram and formatting
//! - **Cart**: line items and the persisted cart store
//! - **Checkout**: the checkout form, the cash/card orchestrator and the order payload
//!
//! Network access happens only through the traits in [`checkout`]
//! ([`PaymentIntents`], [`PaymentProcessor`], [`OrderSink`]).
//!
//! # Example
//!
//! ```rust
//! use dzaghik_cache::{Cache, MemoryStore};
//! use dzaghik_commerce::prelude::*;
//! use rust_decimal::Decimal;
//!
//! let mut cart = CartStore::load(Cache::new(MemoryStore::new()));
//! cart.add_item(CartLineItem::new("1", "Red roses", 18000)).unwrap();
//! cart.add_item(CartLineItem::new("1", "Red roses", 18000).with_quantity(2)).unwrap();
//!
//! assert_eq!(cart.count(), 3);
//! assert_eq!(cart.total(), 54000);
//! assert_eq!(display_price(Decimal::from(cart.total()), Currency::USD), "$135.00");
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod checkout;

pub use error::CommerceError;
pub use ids::*;
pub use money::{convert, convert_back, display_price, Currency};

pub use checkout::{OrderSink, PaymentIntents, PaymentProcessor};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{convert, convert_back, display_price, Currency};

    // Cart
    pub use crate::cart::{CartLineItem, CartStore, CART_STORAGE_KEY, MAX_QUANTITY_PER_ITEM};

    // Checkout
    pub use crate::checkout::{
        BackendError, CardDetails, Checkout, CheckoutError, CheckoutForm, CheckoutPhase,
        CheckoutServices, CheckoutSuccess, OrderSink, OrderStatus, OrderSubmission, PaymentError,
        PaymentIntents, PaymentMethod, PaymentProcessor,
    };
}

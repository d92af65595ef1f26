//! Cart line items.

use crate::ids::ProductId;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

/// One product in the cart with its aggregated quantity.
///
/// Display fields are copied from the product when it is added and are not
/// refreshed afterwards. Prices are whole base-currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Regular unit price.
    #[serde(deserialize_with = "whole_amount")]
    pub price: i64,
    /// Sale unit price; overrides `price` wherever present.
    #[serde(default, deserialize_with = "optional_whole_amount")]
    pub price_on_sale: Option<i64>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

impl CartLineItem {
    /// A line for one unit of a product at its regular price.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            image: None,
            price,
            price_on_sale: None,
            quantity: 1,
        }
    }

    pub fn with_sale_price(mut self, price_on_sale: Option<i64>) -> Self {
        self.price_on_sale = price_on_sale;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    /// The price actually charged per unit.
    pub fn unit_price(&self) -> i64 {
        self.price_on_sale.unwrap_or(self.price)
    }

    /// Unit price times quantity, saturating instead of overflowing.
    pub fn line_total(&self) -> i64 {
        self.unit_price().saturating_mul(self.quantity)
    }

    /// Whether a sale price is in effect.
    pub fn is_on_sale(&self) -> bool {
        self.price_on_sale.is_some()
    }
}

// Stored snapshots may carry prices as JSON numbers or as the backend's
// decimal strings ("18000.00").
fn to_whole<E: serde::de::Error>(value: Decimal) -> Result<i64, E> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| E::custom(format!("amount out of range: {}", value)))
}

fn whole_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    to_whole(<Decimal as Deserialize>::deserialize(deserializer)?)
}

fn optional_whole_amount<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    Option::<Decimal>::deserialize(deserializer)?
        .map(to_whole)
        .transpose()
}

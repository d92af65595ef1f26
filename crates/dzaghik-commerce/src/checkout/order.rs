//! Order types.

use crate::cart::CartLineItem;
use crate::checkout::CheckoutForm;
use crate::error::CommerceError;
use crate::ids::{OrderId, PaymentIntentId, ProductId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cash,
    /// Card, confirmed with the payment processor before the order is placed.
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a card payment as reported to the backend. Only confirmed
/// payments ever reach an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Succeeded,
}

/// Order status, as managed from the admin console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting processing.
    #[default]
    Pending,
    /// Order confirmed by the shop.
    Confirmed,
    /// Bouquet being prepared.
    Processing,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl FromStr for OrderStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CommerceError::UnknownOrderStatus(s.to_string()))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an order as the backend expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub flower_id: ProductId,
    pub quantity: i64,
    /// Effective unit price in base currency.
    pub price: i64,
}

impl From<&CartLineItem> for OrderItem {
    fn from(item: &CartLineItem) -> Self {
        Self {
            flower_id: item.id.clone(),
            quantity: item.quantity,
            price: item.unit_price(),
        }
    }
}

/// The body of `POST /api/orders/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmission {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub delivery_city: String,
    pub notes: String,
    pub payment_method: PaymentMethod,
    /// Client-computed total in base currency.
    pub total_amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_payment_intent_id: Option<PaymentIntentId>,
    pub items: Vec<OrderItem>,
    /// Greeting card text.
    #[serde(rename = "bacik_erktox", default)]
    pub greeting_card: String,
}

impl OrderSubmission {
    /// Build the payload from a validated form.
    ///
    /// `payment` is the confirmed card payment; cash orders pass `None`.
    pub fn new(
        form: &CheckoutForm,
        items: &[CartLineItem],
        total_amount: i64,
        payment: Option<&PaymentIntentId>,
    ) -> Self {
        Self {
            customer_name: form.full_name.clone(),
            customer_email: form.email.clone(),
            customer_phone: form.phone.clone(),
            delivery_address: form.address.clone(),
            delivery_city: form.city.clone(),
            notes: form.notes.clone(),
            payment_method: form.payment_method,
            total_amount,
            stripe_payment_status: payment.map(|_| PaymentStatus::Succeeded),
            stripe_payment_intent_id: payment.cloned(),
            items: items.iter().map(OrderItem::from).collect(),
            greeting_card: form.greeting_card.clone(),
        }
    }

    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// What the backend answers to an accepted order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderConfirmation {
    #[serde(alias = "order_id")]
    pub id: OrderId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form() -> CheckoutForm {
        CheckoutForm {
            full_name: "Anna Petrosyan".into(),
            phone: "+374 91 000000".into(),
            address: "Abovyan 1".into(),
            greeting_card: "Happy birthday".into(),
            ..CheckoutForm::default()
        }
    }

    #[test]
    fn test_order_status_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }

    #[test]
    fn test_cash_submission_wire_format() {
        let items = vec![
            CartLineItem::new("1", "Roses", 18000).with_quantity(3),
            CartLineItem::new("2", "Tulips", 15000).with_sale_price(Some(12000)),
        ];
        let submission = OrderSubmission::new(&form(), &items, 66000, None);

        let wire = serde_json::to_value(&submission).unwrap();
        assert_eq!(wire["payment_method"], "cash");
        assert_eq!(wire["delivery_city"], "Երևան");
        assert_eq!(wire["bacik_erktox"], "Happy birthday");
        assert_eq!(wire["total_amount"], 66000);
        assert_eq!(
            wire["items"],
            json!([
                {"flower_id": "1", "quantity": 3, "price": 18000},
                {"flower_id": "2", "quantity": 1, "price": 12000}
            ])
        );
        assert!(wire.get("stripe_payment_status").is_none());
        assert!(wire.get("stripe_payment_intent_id").is_none());
        assert_eq!(submission.item_count(), 4);
    }

    #[test]
    fn test_card_submission_carries_payment() {
        let mut form = form();
        form.payment_method = PaymentMethod::Card;
        let intent = PaymentIntentId::new("pi_123");
        let items = vec![CartLineItem::new("1", "Roses", 18000)];

        let wire = serde_json::to_value(OrderSubmission::new(&form, &items, 18000, Some(&intent)))
            .unwrap();
        assert_eq!(wire["payment_method"], "card");
        assert_eq!(wire["stripe_payment_status"], "succeeded");
        assert_eq!(wire["stripe_payment_intent_id"], "pi_123");
        assert!(serde_json::from_value::<PaymentStatus>(json!("failed")).is_err());
    }

    #[test]
    fn test_confirmation_accepts_either_id_field() {
        let a: OrderConfirmation = serde_json::from_value(json!({"id": 17, "status": "pending"})).unwrap();
        let b: OrderConfirmation = serde_json::from_value(json!({"order_id": "17"})).unwrap();
        assert_eq!(a, b);
    }
}

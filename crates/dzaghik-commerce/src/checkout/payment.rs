//! Payment and order seams used by the checkout.
//!
//! The checkout only talks to the outside world through the three traits
//! here; the storefront crate implements them over HTTP and tests implement
//! them with fakes.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::checkout::{OrderConfirmation, OrderSubmission};
use crate::ids::PaymentIntentId;

/// A failed call to the shop backend. The message is the backend's own when
/// it sent one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
    pub status: Option<u16>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Errors reported by the payment processor.
///
/// Messages are shown to the customer exactly as the processor wrote them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The card was refused.
    #[error("{0}")]
    Declined(String),

    /// Any other processor-side failure, including a non-succeeded status.
    #[error("{0}")]
    Processor(String),

    /// The processor could not be reached.
    #[error("{0}")]
    Network(String),

    /// Card details are malformed.
    #[error("Invalid card details: {0}")]
    InvalidCard(String),
}

/// Card details entered by the customer. Sent to the processor only.
#[derive(Clone)]
pub struct CardDetails {
    number: SecretString,
    pub exp_month: u8,
    pub exp_year: u16,
    cvc: SecretString,
}

impl CardDetails {
    pub fn new(
        number: impl Into<String>,
        exp_month: u8,
        exp_year: u16,
        cvc: impl Into<String>,
    ) -> Result<Self, PaymentError> {
        let number: String = number.into().chars().filter(|c| !c.is_whitespace()).collect();
        let cvc: String = cvc.into().trim().to_string();

        if number.len() < 12 || number.len() > 19 || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::InvalidCard("card number".into()));
        }
        if !(1..=12).contains(&exp_month) {
            return Err(PaymentError::InvalidCard("expiry month".into()));
        }
        if !(3..=4).contains(&cvc.len()) || !cvc.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::InvalidCard("security code".into()));
        }

        Ok(Self {
            number: SecretString::from(number),
            exp_month,
            exp_year,
            cvc: SecretString::from(cvc),
        })
    }

    /// Parse an expiry written as `MM/YY` or `MM/YYYY`.
    pub fn parse_expiry(expiry: &str) -> Result<(u8, u16), PaymentError> {
        let invalid = || PaymentError::InvalidCard("expiry, expected MM/YY".into());
        let (month, year) = expiry.trim().split_once('/').ok_or_else(invalid)?;
        let month: u8 = month.trim().parse().map_err(|_| invalid())?;
        let year: u16 = year.trim().parse().map_err(|_| invalid())?;
        let year = if year < 100 { 2000 + year } else { year };
        Ok((month, year))
    }

    pub fn number(&self) -> &SecretString {
        &self.number
    }

    pub fn cvc(&self) -> &SecretString {
        &self.cvc
    }

    /// Last four digits, for receipts and logs.
    pub fn last4(&self) -> &str {
        let number = self.number.expose_secret();
        &number[number.len().saturating_sub(4)..]
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("last4", &self.last4())
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .finish_non_exhaustive()
    }
}

/// Billing details attached to a card payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingDetails {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub address_line1: String,
    pub city: String,
}

/// A backend-issued handle for one attempted charge.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub client_secret: SecretString,
    pub id: PaymentIntentId,
}

/// A card payment the processor reported as succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedPayment {
    pub intent_id: PaymentIntentId,
}

/// Creates payment intents on the shop backend.
#[async_trait]
pub trait PaymentIntents: Send + Sync {
    /// Create an intent for `amount` base-currency units.
    async fn create_payment_intent(&self, amount: i64) -> Result<PaymentIntent, BackendError>;
}

/// Confirms card payments directly with the payment processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Returns only when the processor reports the payment as succeeded.
    async fn confirm_card_payment(
        &self,
        client_secret: &SecretString,
        card: &CardDetails,
        billing: &BillingDetails,
    ) -> Result<ConfirmedPayment, PaymentError>;
}

/// Accepts finished orders.
#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn submit_order(&self, order: &OrderSubmission) -> Result<OrderConfirmation, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_details_validation() {
        let card = CardDetails::new("4242 4242 4242 4242", 12, 2030, "123").unwrap();
        assert_eq!(card.last4(), "4242");
        assert_eq!(card.number().expose_secret(), "4242424242424242");

        assert!(CardDetails::new("4242", 12, 2030, "123").is_err());
        assert!(CardDetails::new("4242424242424242", 13, 2030, "123").is_err());
        assert!(CardDetails::new("4242424242424242", 1, 2030, "12a").is_err());
    }

    #[test]
    fn test_card_debug_hides_secrets() {
        let card = CardDetails::new("4000000000000002", 1, 2031, "999").unwrap();
        let debug = format!("{:?}", card);
        assert!(debug.contains("0002"));
        assert!(!debug.contains("4000000000000002"));
        assert!(!debug.contains("999"));
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(CardDetails::parse_expiry("04/29").unwrap(), (4, 2029));
        assert_eq!(CardDetails::parse_expiry("4/2031").unwrap(), (4, 2031));
        assert!(CardDetails::parse_expiry("0429").is_err());
    }

    #[test]
    fn test_payment_error_message_is_verbatim() {
        let err = PaymentError::Declined("Your card was declined.".into());
        assert_eq!(err.to_string(), "Your card was declined.");
    }
}

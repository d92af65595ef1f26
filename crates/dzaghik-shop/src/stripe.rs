//! Card confirmation with Stripe.
//!
//! The shop backend creates the payment intent; the card itself only ever
//! goes to Stripe, authenticated with the publishable key.

use async_trait::async_trait;
use dzaghik_commerce::checkout::{
    BillingDetails, CardDetails, ConfirmedPayment, PaymentError, PaymentProcessor,
};
use dzaghik_commerce::PaymentIntentId;
use dzaghik_data::{FetchClient, FetchError};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

pub const NOT_CONFIGURED: &str = "Card payments are not configured";

#[derive(Deserialize)]
struct ConfirmResponse {
    id: PaymentIntentId,
    status: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: StripeError,
}

#[derive(Deserialize)]
struct StripeError {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: Option<String>,
}

/// The intent id is everything before `_secret_` in the client secret.
pub fn intent_id_from_secret(client_secret: &str) -> Option<&str> {
    client_secret
        .split_once("_secret_")
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
}

#[derive(Clone)]
pub struct StripeProcessor {
    client: FetchClient,
    publishable_key: Option<SecretString>,
}

impl std::fmt::Debug for StripeProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeProcessor")
            .field("api", &self.client.base_url())
            .field("configured", &self.publishable_key.is_some())
            .finish()
    }
}

impl StripeProcessor {
    /// `client` must be rooted at the Stripe API URL.
    pub fn new(client: FetchClient, publishable_key: Option<SecretString>) -> Self {
        Self {
            client,
            publishable_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.publishable_key.is_some()
    }
}

fn card_form(
    client_secret: &str,
    card: &CardDetails,
    billing: &BillingDetails,
) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("client_secret", client_secret.to_string()),
        ("payment_method_data[type]", "card".to_string()),
        ("payment_method_data[card][number]", card.number().expose_secret().to_string()),
        ("payment_method_data[card][exp_month]", card.exp_month.to_string()),
        ("payment_method_data[card][exp_year]", card.exp_year.to_string()),
        ("payment_method_data[card][cvc]", card.cvc().expose_secret().to_string()),
        ("payment_method_data[billing_details][name]", billing.name.clone()),
        ("payment_method_data[billing_details][phone]", billing.phone.clone()),
        ("payment_method_data[billing_details][address][line1]", billing.address_line1.clone()),
        ("payment_method_data[billing_details][address][city]", billing.city.clone()),
    ];
    if let Some(email) = &billing.email {
        form.push(("payment_method_data[billing_details][email]", email.clone()));
    }
    form
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn confirm_card_payment(
        &self,
        client_secret: &SecretString,
        card: &CardDetails,
        billing: &BillingDetails,
    ) -> Result<ConfirmedPayment, PaymentError> {
        let key = self
            .publishable_key
            .as_ref()
            .ok_or_else(|| PaymentError::Processor(NOT_CONFIGURED.into()))?;
        let secret = client_secret.expose_secret();
        let intent = intent_id_from_secret(secret)
            .ok_or_else(|| PaymentError::Processor("Malformed payment intent secret".into()))?;

        let response = self
            .client
            .post(format!("/v1/payment_intents/{}/confirm", intent))
            .bearer_auth(key.expose_secret())
            .form(card_form(secret, card, billing))
            .send()
            .await
            .map_err(|e: FetchError| PaymentError::Network(e.user_message()))?;

        if !response.is_success() {
            let fallback = format!("Payment failed (HTTP {})", response.status);
            return Err(match response.json::<ErrorBody>() {
                Ok(ErrorBody { error }) if error.kind == "card_error" => {
                    PaymentError::Declined(error.message.unwrap_or(fallback))
                }
                Ok(ErrorBody { error }) => PaymentError::Processor(error.message.unwrap_or(fallback)),
                Err(_) => PaymentError::Processor(fallback),
            });
        }

        let confirmed: ConfirmResponse = response
            .json()
            .map_err(|e| PaymentError::Processor(e.to_string()))?;
        if confirmed.status != "succeeded" {
            tracing::info!(intent = %confirmed.id, status = %confirmed.status, "card payment not completed");
            return Err(PaymentError::Processor(format!(
                "Payment was not completed (status: {})",
                confirmed.status
            )));
        }

        tracing::info!(intent = %confirmed.id, last4 = card.last4(), "card payment confirmed");
        Ok(ConfirmedPayment {
            intent_id: confirmed.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dzaghik_data::testing::MockTransport;
    use dzaghik_data::{Body, Method};
    use serde_json::json;

    const CONFIRM: &str = "/v1/payment_intents/pi_42/confirm";

    fn processor(mock: &MockTransport) -> StripeProcessor {
        StripeProcessor::new(
            FetchClient::new(mock.clone()).with_base_url("https://stripe.test"),
            Some(SecretString::from("pk_test_1".to_string())),
        )
    }

    fn card() -> CardDetails {
        CardDetails::new("4242424242424242", 4, 2030, "123").unwrap()
    }

    fn billing() -> BillingDetails {
        BillingDetails {
            name: "Anna".into(),
            email: None,
            phone: "+374 91 000000".into(),
            address_line1: "Abovyan 1".into(),
            city: "Երևան".into(),
        }
    }

    fn secret() -> SecretString {
        SecretString::from("pi_42_secret_xyz".to_string())
    }

    #[test]
    fn test_intent_id_from_secret() {
        assert_eq!(intent_id_from_secret("pi_42_secret_xyz"), Some("pi_42"));
        assert_eq!(intent_id_from_secret("pi_42"), None);
        assert_eq!(intent_id_from_secret("_secret_x"), None);
    }

    #[tokio::test]
    async fn test_confirm_succeeded() {
        let mock = MockTransport::new();
        mock.on_json(Method::Post, CONFIRM, 200, json!({"id": "pi_42", "status": "succeeded"}));

        let confirmed = processor(&mock)
            .confirm_card_payment(&secret(), &card(), &billing())
            .await
            .unwrap();

        assert_eq!(confirmed.intent_id.as_str(), "pi_42");
        let requests = mock.requests();
        let request = &requests[0];
        assert_eq!(request.header("authorization"), Some("Bearer pk_test_1"));
        let Body::Bytes(body) = &request.body else {
            panic!("expected form body");
        };
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(body).into_owned().collect();
        assert!(pairs.contains(&("client_secret".into(), "pi_42_secret_xyz".into())));
        assert!(pairs.contains(&("payment_method_data[card][exp_month]".into(), "4".into())));
        assert!(pairs.contains(&(
            "payment_method_data[billing_details][address][city]".into(),
            "Երևան".into()
        )));
        assert!(!pairs.iter().any(|(k, _)| k.ends_with("[email]")));
    }

    #[tokio::test]
    async fn test_card_error_is_declined_verbatim() {
        let mock = MockTransport::new();
        mock.on_json(
            Method::Post,
            CONFIRM,
            402,
            json!({"error": {"type": "card_error", "code": "card_declined", "message": "Your card was declined."}}),
        );

        let err = processor(&mock)
            .confirm_card_payment(&secret(), &card(), &billing())
            .await
            .unwrap_err();
        assert_eq!(err, PaymentError::Declined("Your card was declined.".into()));
    }

    #[tokio::test]
    async fn test_unfinished_status_is_failure() {
        let mock = MockTransport::new();
        mock.on_json(Method::Post, CONFIRM, 200, json!({"id": "pi_42", "status": "requires_action"}));

        let err = processor(&mock)
            .confirm_card_payment(&secret(), &card(), &billing())
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Processor(msg) if msg.contains("requires_action")));
    }

    #[tokio::test]
    async fn test_network_failure() {
        let mock = MockTransport::new();
        mock.on(Method::Post, CONFIRM, Err(FetchError::Timeout));
        let err = processor(&mock)
            .confirm_card_payment(&secret(), &card(), &billing())
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Network(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_sends_nothing() {
        let mock = MockTransport::new();
        let stripe = StripeProcessor::new(FetchClient::new(mock.clone()), None);
        let err = stripe
            .confirm_card_payment(&secret(), &card(), &billing())
            .await
            .unwrap_err();
        assert_eq!(err, PaymentError::Processor(NOT_CONFIGURED.into()));
        assert!(mock.requests().is_empty());
    }
}

//! Order and payment intent endpoints.

use async_trait::async_trait;
use dzaghik_commerce::checkout::{
    BackendError, OrderConfirmation, OrderSink, OrderSubmission, PaymentIntent, PaymentIntents,
};
use dzaghik_commerce::PaymentIntentId;
use dzaghik_data::{FetchClient, FetchError, Response};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

pub(crate) const ORDERS_PATH: &str = "/api/orders/";
pub(crate) const PAYMENT_INTENT_PATH: &str = "/api/create-payment-intent/";

pub const ORDER_FAILED: &str = "Failed to create order";
pub const PAYMENT_INTENT_FAILED: &str = "Failed to create payment intent";

fn unreachable_backend(e: FetchError) -> BackendError {
    BackendError::new(e.user_message())
}

fn rejected(response: &Response, fallback: &str) -> BackendError {
    BackendError::new(response.backend_message().unwrap_or_else(|| fallback.to_string()))
        .with_status(response.status)
}

/// Places orders on the shop backend.
#[derive(Debug, Clone)]
pub struct OrderClient {
    client: FetchClient,
}

impl OrderClient {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrderSink for OrderClient {
    async fn submit_order(&self, order: &OrderSubmission) -> Result<OrderConfirmation, BackendError> {
        let response = self
            .client
            .post(ORDERS_PATH)
            .json(order)
            .map_err(unreachable_backend)?
            .send()
            .await
            .map_err(unreachable_backend)?;

        if !response.is_success() {
            tracing::warn!(status = response.status, "order rejected");
            return Err(rejected(&response, ORDER_FAILED));
        }
        response
            .json()
            .map_err(|e| BackendError::new(format!("{}: {}", ORDER_FAILED, e)))
    }
}

#[derive(Serialize)]
struct IntentRequest {
    amount: i64,
}

#[derive(Deserialize)]
struct IntentResponse {
    client_secret: String,
    payment_intent_id: PaymentIntentId,
}

/// Asks the shop backend to open a card payment.
#[derive(Debug, Clone)]
pub struct PaymentIntentClient {
    client: FetchClient,
}

impl PaymentIntentClient {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PaymentIntents for PaymentIntentClient {
    async fn create_payment_intent(&self, amount: i64) -> Result<PaymentIntent, BackendError> {
        let response = self
            .client
            .post(PAYMENT_INTENT_PATH)
            .json(&IntentRequest { amount })
            .map_err(unreachable_backend)?
            .send()
            .await
            .map_err(unreachable_backend)?;

        if !response.is_success() {
            return Err(BackendError::new(PAYMENT_INTENT_FAILED).with_status(response.status));
        }
        let intent: IntentResponse = response
            .json()
            .map_err(|_| BackendError::new(PAYMENT_INTENT_FAILED))?;

        tracing::debug!(intent = %intent.payment_intent_id, amount, "payment intent created");
        Ok(PaymentIntent {
            client_secret: SecretString::from(intent.client_secret),
            id: intent.payment_intent_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dzaghik_commerce::cart::CartLineItem;
    use dzaghik_commerce::checkout::CheckoutForm;
    use dzaghik_data::testing::MockTransport;
    use dzaghik_data::Method;
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn fetch(mock: &MockTransport) -> FetchClient {
        FetchClient::new(mock.clone()).with_base_url("http://shop.test")
    }

    fn submission() -> OrderSubmission {
        let form = CheckoutForm {
            full_name: "Anna".into(),
            phone: "+374 91 000000".into(),
            address: "Abovyan 1".into(),
            ..CheckoutForm::default()
        };
        OrderSubmission::new(&form, &[CartLineItem::new("1", "Roses", 18000)], 18000, None)
    }

    #[tokio::test]
    async fn test_submit_order_posts_payload() {
        let mock = MockTransport::new();
        mock.on_json(Method::Post, ORDERS_PATH, 201, json!({"id": "a1b2", "status": "pending"}));

        let confirmation = OrderClient::new(fetch(&mock)).submit_order(&submission()).await.unwrap();

        assert_eq!(confirmation.id.as_str(), "a1b2");
        let sent: serde_json::Value = mock.requests()[0].json().unwrap();
        assert_eq!(sent["customer_name"], "Anna");
        assert_eq!(sent["items"][0]["flower_id"], "1");
    }

    #[tokio::test]
    async fn test_order_error_uses_backend_detail() {
        let mock = MockTransport::new();
        mock.on_json(Method::Post, ORDERS_PATH, 400, json!({"detail": "Flower is not available"}));
        let err = OrderClient::new(fetch(&mock)).submit_order(&submission()).await.unwrap_err();
        assert_eq!(err.message, "Flower is not available");
        assert_eq!(err.status, Some(400));

        let mock = MockTransport::new();
        mock.on(Method::Post, ORDERS_PATH, Ok(Response::new(500, Default::default(), b"oops".to_vec())));
        let err = OrderClient::new(fetch(&mock)).submit_order(&submission()).await.unwrap_err();
        assert_eq!(err.message, ORDER_FAILED);
    }

    #[tokio::test]
    async fn test_order_network_failure() {
        let mock = MockTransport::new();
        mock.on(Method::Post, ORDERS_PATH, Err(FetchError::Timeout));
        let err = OrderClient::new(fetch(&mock)).submit_order(&submission()).await.unwrap_err();
        assert_eq!(err.status, None);
    }

    #[tokio::test]
    async fn test_create_payment_intent() {
        let mock = MockTransport::new();
        mock.on_json(
            Method::Post,
            PAYMENT_INTENT_PATH,
            200,
            json!({"client_secret": "pi_9_secret_abc", "payment_intent_id": "pi_9"}),
        );

        let intent = PaymentIntentClient::new(fetch(&mock))
            .create_payment_intent(54000)
            .await
            .unwrap();

        assert_eq!(intent.id.as_str(), "pi_9");
        assert_eq!(intent.client_secret.expose_secret(), "pi_9_secret_abc");
        let sent: serde_json::Value = mock.requests()[0].json().unwrap();
        assert_eq!(sent, json!({"amount": 54000}));
    }

    #[tokio::test]
    async fn test_payment_intent_failure_is_generic() {
        let mock = MockTransport::new();
        mock.on_json(Method::Post, PAYMENT_INTENT_PATH, 500, json!({"error": "Stripe key missing"}));
        let err = PaymentIntentClient::new(fetch(&mock))
            .create_payment_intent(100)
            .await
            .unwrap_err();
        assert_eq!(err.message, PAYMENT_INTENT_FAILED);
        assert_eq!(err.status, Some(500));
    }
}

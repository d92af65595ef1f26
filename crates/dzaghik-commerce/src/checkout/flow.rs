//! Checkout orchestration.
//!
//! A [`Checkout`] lives as long as one visit to the checkout page. It owns
//! the form, drives the cash or card path through the [`CheckoutServices`]
//! seams, and clears the cart only after the backend accepted the order.

use std::time::Duration;

use thiserror::Error;

use crate::cart::{CartLineItem, CartStore};
use crate::checkout::{
    BackendError, CardDetails, CheckoutForm, FormField, OrderSubmission, OrderSink, PaymentError,
    PaymentIntents, PaymentMethod, PaymentProcessor,
};
use crate::ids::{OrderId, PaymentIntentId};

/// Delay before the front end navigates away after a successful order.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Why a checkout submission did not produce an order.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckoutError {
    /// Required fields are blank. Nothing was sent.
    #[error("Please fill in all required fields: {}", join_fields(.0))]
    Validation(Vec<FormField>),

    /// Nothing to order.
    #[error("Nothing to check out")]
    EmptyCheckout,

    /// Card payment selected without card details.
    #[error("Card details are required for card payment")]
    CardRequired,

    /// A submission is already in flight.
    #[error("Checkout is already being submitted")]
    AlreadySubmitting,

    /// This checkout already produced an order.
    #[error("Order has already been placed")]
    AlreadyCompleted,

    /// The backend rejected or never answered a request.
    #[error("{0}")]
    Network(String),

    /// The payment processor refused the payment; message is verbatim.
    #[error("{0}")]
    Payment(String),
}

fn join_fields(fields: &[FormField]) -> String {
    fields
        .iter()
        .map(FormField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<BackendError> for CheckoutError {
    fn from(e: BackendError) -> Self {
        CheckoutError::Network(e.message)
    }
}

impl From<PaymentError> for CheckoutError {
    fn from(e: PaymentError) -> Self {
        CheckoutError::Payment(e.to_string())
    }
}

/// Where the checkout items come from.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutSource {
    /// The whole persisted cart.
    Cart,
    /// A single item bought directly from the product page.
    BuyNow(CartLineItem),
}

/// Lifecycle of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    /// Form editable.
    #[default]
    Collecting,
    /// Waiting on the processor or the backend.
    Submitting,
    /// Order accepted.
    Succeeded,
}

/// The outside collaborators a checkout needs.
#[derive(Clone, Copy)]
pub struct CheckoutServices<'a> {
    pub intents: &'a dyn PaymentIntents,
    pub processor: &'a dyn PaymentProcessor,
    pub orders: &'a dyn OrderSink,
}

/// Result of an accepted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSuccess {
    pub order_id: OrderId,
    pub total: i64,
    pub payment_intent_id: Option<PaymentIntentId>,
    /// Whether the persisted cart was emptied.
    pub cart_cleared: bool,
    pub redirect_after: Duration,
}

/// One checkout page visit.
#[derive(Debug, Clone)]
pub struct Checkout {
    source: CheckoutSource,
    form: CheckoutForm,
    phase: CheckoutPhase,
    last_error: Option<CheckoutError>,
    redirect_delay: Duration,
}

impl Checkout {
    /// Check out the whole cart.
    pub fn from_cart() -> Self {
        Self::new(CheckoutSource::Cart)
    }

    /// Check out a single item, leaving the cart alone.
    pub fn buy_now(item: CartLineItem) -> Self {
        Self::new(CheckoutSource::BuyNow(item))
    }

    fn new(source: CheckoutSource) -> Self {
        Self {
            source,
            form: CheckoutForm::default(),
            phase: CheckoutPhase::Collecting,
            last_error: None,
            redirect_delay: DEFAULT_REDIRECT_DELAY,
        }
    }

    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    pub fn source(&self) -> &CheckoutSource {
        &self.source
    }

    pub fn form(&self) -> &CheckoutForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CheckoutForm {
        &mut self.form
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.form.payment_method = method;
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// The error from the last failed submission, cleared on the next one.
    pub fn last_error(&self) -> Option<&CheckoutError> {
        self.last_error.as_ref()
    }

    /// Return a submission whose future was dropped before it finished to
    /// [`CheckoutPhase::Collecting`], so the form can be submitted again.
    ///
    /// Returns whether anything changed. A completed checkout stays
    /// completed, and the cart and form are left as they are.
    pub fn reset(&mut self) -> bool {
        if self.phase != CheckoutPhase::Submitting {
            return false;
        }
        tracing::debug!("abandoned checkout submission reset");
        self.phase = CheckoutPhase::Collecting;
        true
    }

    /// The items being ordered.
    pub fn items<'a>(&'a self, cart: &'a CartStore) -> &'a [CartLineItem] {
        match &self.source {
            CheckoutSource::Cart => cart.items(),
            CheckoutSource::BuyNow(item) => std::slice::from_ref(item),
        }
    }

    /// Amount charged, in base currency.
    pub fn total(&self, cart: &CartStore) -> i64 {
        match &self.source {
            CheckoutSource::Cart => cart.total(),
            CheckoutSource::BuyNow(item) => item.line_total(),
        }
    }

    /// Validate, pay if needed, and place the order.
    ///
    /// On failure the checkout returns to [`CheckoutPhase::Collecting`] with
    /// the form and cart untouched. The order is submitted only after a card
    /// payment succeeded, and the cart is cleared only after the order was
    /// accepted.
    pub async fn submit(
        &mut self,
        cart: &mut CartStore,
        services: CheckoutServices<'_>,
        card: Option<&CardDetails>,
    ) -> Result<CheckoutSuccess, CheckoutError> {
        match self.phase {
            CheckoutPhase::Submitting => return Err(CheckoutError::AlreadySubmitting),
            CheckoutPhase::Succeeded => return Err(CheckoutError::AlreadyCompleted),
            CheckoutPhase::Collecting => {}
        }

        self.form.trim();
        let items = self.items(cart).to_vec();
        if items.is_empty() {
            return self.fail(CheckoutError::EmptyCheckout);
        }
        let missing = self.form.missing_fields();
        if !missing.is_empty() {
            return self.fail(CheckoutError::Validation(missing));
        }
        let card = match (self.form.payment_method, card) {
            (PaymentMethod::Card, None) => return self.fail(CheckoutError::CardRequired),
            (PaymentMethod::Card, Some(card)) => Some(card),
            (PaymentMethod::Cash, _) => None,
        };

        self.phase = CheckoutPhase::Submitting;
        self.last_error = None;
        let total = self.total(cart);
        let method = self.form.payment_method;

        let outcome = self.place_order(&items, total, services, card).await;
        match outcome {
            Ok((order_id, payment_intent_id)) => {
                let cart_cleared = matches!(self.source, CheckoutSource::Cart);
                if cart_cleared {
                    cart.clear();
                }
                self.form.reset();
                self.phase = CheckoutPhase::Succeeded;
                tracing::info!(
                    order_id = %order_id,
                    total,
                    payment_method = %method,
                    "order placed"
                );
                Ok(CheckoutSuccess {
                    order_id,
                    total,
                    payment_intent_id,
                    cart_cleared,
                    redirect_after: self.redirect_delay,
                })
            }
            Err(e) => self.fail(e),
        }
    }

    async fn place_order(
        &self,
        items: &[CartLineItem],
        total: i64,
        services: CheckoutServices<'_>,
        card: Option<&CardDetails>,
    ) -> Result<(OrderId, Option<PaymentIntentId>), CheckoutError> {
        let payment = match card {
            Some(card) => {
                tracing::debug!(total, card = card.last4(), "creating payment intent");
                let intent = services.intents.create_payment_intent(total).await?;
                let confirmed = services
                    .processor
                    .confirm_card_payment(&intent.client_secret, card, &self.form.billing_details())
                    .await?;
                tracing::debug!(intent = %confirmed.intent_id, "card payment succeeded");
                Some(confirmed.intent_id)
            }
            None => None,
        };

        let submission = OrderSubmission::new(&self.form, items, total, payment.as_ref());
        let confirmation = services.orders.submit_order(&submission).await?;
        Ok((confirmation.id, payment))
    }

    fn fail<T>(&mut self, error: CheckoutError) -> Result<T, CheckoutError> {
        tracing::debug!(error = %error, "checkout submission failed");
        self.phase = CheckoutPhase::Collecting;
        self.last_error = Some(error.clone());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{BillingDetails, ConfirmedPayment, OrderConfirmation, PaymentIntent};
    use async_trait::async_trait;
    use dzaghik_cache::{Cache, MemoryStore};
    use secrecy::{ExposeSecret, SecretString};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Log(Mutex<Vec<String>>);

    impl Log {
        fn push(&self, entry: impl Into<String>) {
            self.0.lock().unwrap().push(entry.into());
        }
        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct FakeBackend {
        log: Arc<Log>,
        order_result: Result<OrderConfirmation, BackendError>,
        submitted: Mutex<Vec<OrderSubmission>>,
    }

    #[async_trait]
    impl PaymentIntents for FakeBackend {
        async fn create_payment_intent(&self, amount: i64) -> Result<PaymentIntent, BackendError> {
            self.log.push(format!("intent:{}", amount));
            Ok(PaymentIntent {
                client_secret: SecretString::from("pi_42_secret_abc".to_string()),
                id: PaymentIntentId::new("pi_42"),
            })
        }
    }

    #[async_trait]
    impl OrderSink for FakeBackend {
        async fn submit_order(
            &self,
            order: &OrderSubmission,
        ) -> Result<OrderConfirmation, BackendError> {
            self.log.push("order");
            self.submitted.lock().unwrap().push(order.clone());
            self.order_result.clone()
        }
    }

    struct FakeProcessor {
        log: Arc<Log>,
        result: Result<ConfirmedPayment, PaymentError>,
    }

    #[async_trait]
    impl PaymentProcessor for FakeProcessor {
        async fn confirm_card_payment(
            &self,
            client_secret: &SecretString,
            _card: &CardDetails,
            billing: &BillingDetails,
        ) -> Result<ConfirmedPayment, PaymentError> {
            self.log
                .push(format!("confirm:{}:{}", client_secret.expose_secret(), billing.name));
            self.result.clone()
        }
    }

    struct Harness {
        log: Arc<Log>,
        backend: FakeBackend,
        processor: FakeProcessor,
        cart: CartStore,
    }

    impl Harness {
        fn new(
            order_result: Result<OrderConfirmation, BackendError>,
            payment_result: Result<ConfirmedPayment, PaymentError>,
        ) -> Self {
            let log = Arc::new(Log::default());
            let mut cart = CartStore::load(Cache::new(MemoryStore::new()));
            cart.add_item(CartLineItem::new("1", "Red roses", 18000).with_quantity(3))
                .unwrap();
            Self {
                backend: FakeBackend {
                    log: log.clone(),
                    order_result,
                    submitted: Mutex::new(Vec::new()),
                },
                processor: FakeProcessor {
                    log: log.clone(),
                    result: payment_result,
                },
                log,
                cart,
            }
        }

        fn ok() -> Self {
            Self::new(
                Ok(OrderConfirmation {
                    id: OrderId::new("17"),
                }),
                Ok(ConfirmedPayment {
                    intent_id: PaymentIntentId::new("pi_42"),
                }),
            )
        }

        fn split(&mut self) -> (&mut CartStore, CheckoutServices<'_>) {
            let services = CheckoutServices {
                intents: &self.backend,
                processor: &self.processor,
                orders: &self.backend,
            };
            (&mut self.cart, services)
        }
    }

    fn filled(mut checkout: Checkout) -> Checkout {
        let form = checkout.form_mut();
        form.full_name = " Anna Petrosyan ".into();
        form.phone = "+374 91 000000".into();
        form.address = "Abovyan 1".into();
        checkout
    }

    fn card() -> CardDetails {
        CardDetails::new("4242424242424242", 12, 2030, "123").unwrap()
    }

    #[tokio::test]
    async fn test_cash_checkout_places_order_and_clears_cart() {
        let mut h = Harness::ok();
        let mut checkout = filled(Checkout::from_cart());
        let (cart, services) = h.split();

        let success = checkout.submit(cart, services, None).await.unwrap();

        assert_eq!(success.order_id, OrderId::new("17"));
        assert_eq!(success.total, 54000);
        assert!(success.cart_cleared);
        assert_eq!(success.redirect_after, Duration::from_secs(2));
        assert_eq!(checkout.phase(), CheckoutPhase::Succeeded);
        assert!(h.cart.is_empty());
        assert_eq!(checkout.form(), &CheckoutForm::default());
        assert_eq!(h.log.entries(), vec!["order"]);

        let sent = h.backend.submitted.lock().unwrap()[0].clone();
        assert_eq!(sent.customer_name, "Anna Petrosyan");
        assert_eq!(sent.total_amount, 54000);
        assert_eq!(sent.stripe_payment_status, None);
    }

    #[tokio::test]
    async fn test_missing_phone_blocks_without_calls() {
        let mut h = Harness::ok();
        let mut checkout = filled(Checkout::from_cart());
        checkout.form_mut().phone = "  ".into();
        let (cart, services) = h.split();

        let err = checkout.submit(cart, services, None).await.unwrap_err();

        assert_eq!(err, CheckoutError::Validation(vec![FormField::Phone]));
        assert!(h.log.entries().is_empty());
        assert_eq!(h.cart.count(), 3);
        assert_eq!(checkout.phase(), CheckoutPhase::Collecting);
        assert_eq!(checkout.last_error(), Some(&err));
    }

    #[tokio::test]
    async fn test_card_declined_never_submits_order() {
        let mut h = Harness::new(
            Ok(OrderConfirmation {
                id: OrderId::new("17"),
            }),
            Err(PaymentError::Declined("Your card was declined.".into())),
        );
        let mut checkout = filled(Checkout::from_cart());
        checkout.set_payment_method(PaymentMethod::Card);
        let (cart, services) = h.split();

        let err = checkout
            .submit(cart, services, Some(&card()))
            .await
            .unwrap_err();

        assert_eq!(err, CheckoutError::Payment("Your card was declined.".into()));
        assert_eq!(err.to_string(), "Your card was declined.");
        assert_eq!(
            h.log.entries(),
            vec!["intent:54000", "confirm:pi_42_secret_abc:Anna Petrosyan"]
        );
        assert_eq!(h.cart.count(), 3);
        assert_eq!(checkout.phase(), CheckoutPhase::Collecting);
    }

    #[tokio::test]
    async fn test_order_failure_after_payment_keeps_cart() {
        let mut h = Harness::new(
            Err(BackendError::new("Failed to create order").with_status(500)),
            Ok(ConfirmedPayment {
                intent_id: PaymentIntentId::new("pi_42"),
            }),
        );
        let mut checkout = filled(Checkout::from_cart());
        checkout.set_payment_method(PaymentMethod::Card);
        let (cart, services) = h.split();

        let err = checkout
            .submit(cart, services, Some(&card()))
            .await
            .unwrap_err();

        assert_eq!(err, CheckoutError::Network("Failed to create order".into()));
        assert_eq!(h.log.entries().last().map(String::as_str), Some("order"));
        assert_eq!(h.cart.count(), 3);
        assert_eq!(checkout.form().full_name, "Anna Petrosyan");
    }

    #[tokio::test]
    async fn test_card_order_carries_intent() {
        let mut h = Harness::ok();
        let mut checkout = filled(Checkout::from_cart());
        checkout.set_payment_method(PaymentMethod::Card);
        let (cart, services) = h.split();

        let success = checkout
            .submit(cart, services, Some(&card()))
            .await
            .unwrap();

        assert_eq!(success.payment_intent_id, Some(PaymentIntentId::new("pi_42")));
        let sent = h.backend.submitted.lock().unwrap()[0].clone();
        assert_eq!(sent.payment_method, PaymentMethod::Card);
        assert_eq!(sent.stripe_payment_intent_id, Some(PaymentIntentId::new("pi_42")));
        assert_eq!(
            h.log.entries(),
            vec!["intent:54000", "confirm:pi_42_secret_abc:Anna Petrosyan", "order"]
        );
    }

    #[tokio::test]
    async fn test_card_without_details_is_rejected() {
        let mut h = Harness::ok();
        let mut checkout = filled(Checkout::from_cart());
        checkout.set_payment_method(PaymentMethod::Card);
        let (cart, services) = h.split();

        let err = checkout.submit(cart, services, None).await.unwrap_err();
        assert_eq!(err, CheckoutError::CardRequired);
        assert!(h.log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_buy_now_leaves_cart_alone() {
        let mut h = Harness::ok();
        let item = CartLineItem::new("2", "Tulips", 15000)
            .with_sale_price(Some(12000))
            .with_quantity(2);
        let mut checkout = filled(Checkout::buy_now(item));
        let (cart, services) = h.split();

        let success = checkout.submit(cart, services, None).await.unwrap();

        assert_eq!(success.total, 24000);
        assert!(!success.cart_cleared);
        assert_eq!(h.cart.count(), 3);
        let sent = h.backend.submitted.lock().unwrap()[0].clone();
        assert_eq!(sent.items.len(), 1);
        assert_eq!(sent.items[0].price, 12000);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let mut h = Harness::ok();
        h.cart.clear();
        let mut checkout = filled(Checkout::from_cart());
        let (cart, services) = h.split();

        let err = checkout.submit(cart, services, None).await.unwrap_err();
        assert_eq!(err, CheckoutError::EmptyCheckout);
        assert!(h.log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_completed_checkout_cannot_resubmit() {
        let mut h = Harness::ok();
        let mut checkout = filled(Checkout::buy_now(CartLineItem::new("1", "Roses", 18000)));
        let (cart, services) = h.split();

        checkout.submit(cart, services, None).await.unwrap();
        let err = checkout.submit(cart, services, None).await.unwrap_err();
        assert_eq!(err, CheckoutError::AlreadyCompleted);
    }

    struct StalledProcessor;

    #[async_trait]
    impl PaymentProcessor for StalledProcessor {
        async fn confirm_card_payment(
            &self,
            _client_secret: &SecretString,
            _card: &CardDetails,
            _billing: &BillingDetails,
        ) -> Result<ConfirmedPayment, PaymentError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_rejected() {
        let mut h = Harness::ok();
        let stalled = StalledProcessor;
        let services = CheckoutServices {
            intents: &h.backend,
            processor: &stalled,
            orders: &h.backend,
        };
        let mut checkout = filled(Checkout::from_cart());
        checkout.set_payment_method(PaymentMethod::Card);
        let card = card();

        let first = tokio::time::timeout(
            Duration::from_millis(20),
            checkout.submit(&mut h.cart, services, Some(&card)),
        )
        .await;
        assert!(first.is_err());
        assert_eq!(checkout.phase(), CheckoutPhase::Submitting);

        let err = checkout
            .submit(&mut h.cart, services, Some(&card))
            .await
            .unwrap_err();
        assert_eq!(err, CheckoutError::AlreadySubmitting);
        assert!(!h.log.entries().contains(&"order".to_string()));
    }

    #[tokio::test]
    async fn test_reset_recovers_dropped_submit() {
        let mut h = Harness::ok();
        let mut checkout = filled(Checkout::from_cart());
        checkout.set_payment_method(PaymentMethod::Card);
        let card = card();

        let stalled = StalledProcessor;
        let services = CheckoutServices {
            intents: &h.backend,
            processor: &stalled,
            orders: &h.backend,
        };
        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            checkout.submit(&mut h.cart, services, Some(&card)),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(checkout.phase(), CheckoutPhase::Submitting);

        assert!(checkout.reset());
        assert_eq!(checkout.phase(), CheckoutPhase::Collecting);
        assert!(!checkout.reset());
        assert_eq!(checkout.form().full_name, "Anna Petrosyan");
        assert_eq!(h.cart.count(), 3);

        let (cart, services) = h.split();
        let success = checkout.submit(cart, services, Some(&card)).await.unwrap();
        assert_eq!(success.order_id, OrderId::new("17"));
        assert_eq!(checkout.phase(), CheckoutPhase::Succeeded);
        assert!(!checkout.reset());
        assert_eq!(checkout.phase(), CheckoutPhase::Succeeded);
    }
}

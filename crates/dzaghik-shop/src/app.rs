//! The storefront session: everything one customer (or admin) works with,
//! wired to a backend and a storage directory.

use crate::admin::AdminConsole;
use crate::catalog::{CatalogClient, Flower};
use crate::config::ShopConfig;
use crate::content::ContentClient;
use crate::orders::{OrderClient, PaymentIntentClient};
use crate::preferences::{CurrencyPreference, LanguagePreference};
use crate::stripe::StripeProcessor;
use crate::ShopError;
use dzaghik_auth::{AdminSession, LocalCustomerSession};
use dzaghik_cache::{Cache, FileStore};
use dzaghik_commerce::cart::{CartLineItem, CartStore};
use dzaghik_commerce::checkout::{CardDetails, Checkout, CheckoutServices, CheckoutSuccess};
use dzaghik_data::{FetchClient, ReqwestTransport, Transport};
use std::sync::Arc;

pub struct Storefront {
    config: ShopConfig,
    cart: CartStore,
    currency: CurrencyPreference,
    language: LanguagePreference,
    customer: LocalCustomerSession,
    catalog: CatalogClient,
    content: ContentClient,
    orders: OrderClient,
    intents: PaymentIntentClient,
    stripe: StripeProcessor,
    admin: AdminConsole,
}

impl Storefront {
    /// Open the storefront with on-disk storage and a real HTTP client.
    pub fn open(config: ShopConfig) -> Result<Self, ShopError> {
        let cache = Cache::new(FileStore::open(config.storage_dir()?)?);
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::with_parts(config, cache, Arc::new(transport)))
    }

    /// Assemble from an explicit store and transport.
    pub fn with_parts(config: ShopConfig, cache: Cache, transport: Arc<dyn Transport>) -> Self {
        let backend = FetchClient::from_shared(Arc::clone(&transport))
            .with_base_url(config.backend_url.clone())
            .with_default_header("Accept", "application/json");
        let stripe_api = FetchClient::from_shared(transport).with_base_url(config.stripe_api_url.clone());

        Self {
            cart: CartStore::load(cache.clone()),
            currency: CurrencyPreference::load(cache.clone()),
            language: LanguagePreference::load(cache.clone()),
            customer: LocalCustomerSession::new(cache.clone()),
            catalog: CatalogClient::new(backend.clone()),
            content: ContentClient::new(backend.clone()),
            orders: OrderClient::new(backend.clone()),
            intents: PaymentIntentClient::new(backend.clone()),
            stripe: StripeProcessor::new(stripe_api, config.stripe_key()),
            admin: AdminConsole::new(AdminSession::new(backend, cache)),
            config,
        }
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub fn currency(&self) -> &CurrencyPreference {
        &self.currency
    }

    pub fn currency_mut(&mut self) -> &mut CurrencyPreference {
        &mut self.currency
    }

    pub fn language(&self) -> &LanguagePreference {
        &self.language
    }

    pub fn language_mut(&mut self) -> &mut LanguagePreference {
        &mut self.language
    }

    pub fn customer(&self) -> &LocalCustomerSession {
        &self.customer
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn content(&self) -> &ContentClient {
        &self.content
    }

    pub fn admin(&self) -> &AdminConsole {
        &self.admin
    }

    /// Price in the chosen display currency.
    pub fn display_price(&self, base_amount: i64) -> String {
        self.currency.display(base_amount)
    }

    /// Add `quantity` of a catalog flower to the cart.
    pub fn add_to_cart(&mut self, flower: &Flower, quantity: i64) -> Result<(), ShopError> {
        self.cart
            .add_item(CartLineItem::from(flower).with_quantity(quantity))?;
        Ok(())
    }

    /// A checkout over the whole cart, using the configured redirect delay.
    pub fn checkout(&self) -> Checkout {
        Checkout::from_cart().with_redirect_delay(self.config.redirect_delay())
    }

    /// A buy-now checkout for a single flower; the cart is left alone.
    pub fn buy_now(&self, flower: &Flower, quantity: i64) -> Checkout {
        Checkout::buy_now(CartLineItem::from(flower).with_quantity(quantity))
            .with_redirect_delay(self.config.redirect_delay())
    }

    /// Submit a checkout against this storefront's backend and processor.
    pub async fn place_order(
        &mut self,
        checkout: &mut Checkout,
        card: Option<&CardDetails>,
    ) -> Result<CheckoutSuccess, ShopError> {
        let services = CheckoutServices {
            intents: &self.intents,
            processor: &self.stripe,
            orders: &self.orders,
        };
        Ok(checkout.submit(&mut self.cart, services, card).await?)
    }

    pub fn card_payments_enabled(&self) -> bool {
        self.stripe.is_configured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::flower_json;
    use dzaghik_cache::MemoryStore;
    use dzaghik_commerce::checkout::{CheckoutError, CheckoutPhase, PaymentMethod};
    use dzaghik_commerce::Currency;
    use dzaghik_data::testing::MockTransport;
    use dzaghik_data::Method;
    use serde_json::json;

    fn storefront(mock: &MockTransport, config: ShopConfig) -> Storefront {
        Storefront::with_parts(config, Cache::new(MemoryStore::new()), Arc::new(mock.clone()))
    }

    fn config() -> ShopConfig {
        ShopConfig {
            backend_url: "http://shop.test".into(),
            stripe_api_url: "https://stripe.test".into(),
            redirect_delay_ms: 0,
            ..ShopConfig::default()
        }
        .with_stripe_key("pk_test_1")
    }

    fn roses() -> Flower {
        serde_json::from_value(flower_json("1", "18000.00", None)).unwrap()
    }

    fn fill(checkout: &mut Checkout, method: PaymentMethod) {
        let form = checkout.form_mut();
        form.full_name = "Anna Petrosyan".into();
        form.phone = "+374 91 000000".into();
        form.address = "Abovyan 1".into();
        checkout.set_payment_method(method);
    }

    #[tokio::test]
    async fn test_browse_add_and_cash_checkout() {
        let mock = MockTransport::new();
        mock.on_json(Method::Get, "/api/flowers/1/", 200, flower_json("1", "18000.00", None));
        mock.on_json(Method::Post, "/api/orders/", 201, json!({"id": "ord-1"}));
        let mut shop = storefront(&mock, config());

        let flower = shop.catalog().get(&"1".into()).await.unwrap();
        shop.add_to_cart(&flower, 3).unwrap();
        shop.currency_mut().set("USD").unwrap();
        assert_eq!(shop.display_price(shop.cart().total()), "$135.00");

        let mut checkout = shop.checkout();
        fill(&mut checkout, PaymentMethod::Cash);
        let success = shop.place_order(&mut checkout, None).await.unwrap();

        assert_eq!(success.order_id.as_str(), "ord-1");
        assert_eq!(success.total, 54000);
        assert!(shop.cart().is_empty());
        assert_eq!(shop.currency().get(), Currency::USD);
        assert_eq!(mock.calls(Method::Post, "/api/create-payment-intent/"), 0);
    }

    #[tokio::test]
    async fn test_card_checkout_end_to_end() {
        let mock = MockTransport::new();
        mock.on_json(
            Method::Post,
            "/api/create-payment-intent/",
            200,
            json!({"client_secret": "pi_7_secret_x", "payment_intent_id": "pi_7"}),
        );
        mock.on_json(
            Method::Post,
            "/v1/payment_intents/pi_7/confirm",
            200,
            json!({"id": "pi_7", "status": "succeeded"}),
        );
        mock.on_json(Method::Post, "/api/orders/", 201, json!({"id": "ord-2"}));
        let mut shop = storefront(&mock, config());
        shop.add_to_cart(&roses(), 1).unwrap();

        let mut checkout = shop.checkout();
        fill(&mut checkout, PaymentMethod::Card);
        let card = CardDetails::new("4242424242424242", 12, 2030, "123").unwrap();
        let success = shop.place_order(&mut checkout, Some(&card)).await.unwrap();

        assert_eq!(success.payment_intent_id.as_ref().map(|id| id.as_str()), Some("pi_7"));
        let order: serde_json::Value = mock.requests_to(Method::Post, "/api/orders/")[0].json().unwrap();
        assert_eq!(order["stripe_payment_intent_id"], "pi_7");
        assert_eq!(order["stripe_payment_status"], "succeeded");
        assert_eq!(checkout.phase(), CheckoutPhase::Succeeded);
    }

    #[tokio::test]
    async fn test_buy_now_keeps_cart() {
        let mock = MockTransport::new();
        mock.on_json(Method::Post, "/api/orders/", 201, json!({"id": "ord-3"}));
        let mut shop = storefront(&mock, config());
        shop.add_to_cart(&roses(), 2).unwrap();

        let mut checkout = shop.buy_now(&roses(), 1);
        fill(&mut checkout, PaymentMethod::Cash);
        let success = shop.place_order(&mut checkout, None).await.unwrap();

        assert_eq!(success.total, 18000);
        assert!(!success.cart_cleared);
        assert_eq!(shop.cart().count(), 2);
    }

    #[tokio::test]
    async fn test_card_without_key_fails_before_order() {
        let mock = MockTransport::new();
        mock.on_json(
            Method::Post,
            "/api/create-payment-intent/",
            200,
            json!({"client_secret": "pi_7_secret_x", "payment_intent_id": "pi_7"}),
        );
        let config = ShopConfig {
            backend_url: "http://shop.test".into(),
            ..ShopConfig::default()
        };
        let mut shop = storefront(&mock, config);
        assert!(!shop.card_payments_enabled());
        shop.add_to_cart(&roses(), 1).unwrap();

        let mut checkout = shop.checkout();
        fill(&mut checkout, PaymentMethod::Card);
        let card = CardDetails::new("4242424242424242", 12, 2030, "123").unwrap();
        let err = shop.place_order(&mut checkout, Some(&card)).await.unwrap_err();

        assert!(matches!(err, ShopError::Checkout(CheckoutError::Payment(_))));
        assert_eq!(mock.calls(Method::Post, "/api/orders/"), 0);
        assert_eq!(shop.cart().count(), 1);
    }
}

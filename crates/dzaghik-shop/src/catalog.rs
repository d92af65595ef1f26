//! Flower catalog.

use crate::ShopError;
use chrono::{DateTime, Utc};
use dzaghik_commerce::cart::CartLineItem;
use dzaghik_commerce::ProductId;
use dzaghik_data::FetchClient;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowerImage {
    pub url: String,
    #[serde(default)]
    pub is_main: bool,
}

/// A flower as listed by the backend. Prices are in dram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flower {
    pub id: ProductId,
    pub name: String,
    pub price_amd: Decimal,
    #[serde(default)]
    pub sale_price_amd: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub images: Vec<FlowerImage>,
    #[serde(default)]
    pub is_free_delivery: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub to_be_on_main_page: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_currency() -> String {
    "AMD".to_string()
}

fn default_true() -> bool {
    true
}

impl Flower {
    /// The image flagged as main, else the first one.
    pub fn main_image(&self) -> Option<&str> {
        self.images
            .iter()
            .find(|image| image.is_main)
            .or_else(|| self.images.first())
            .map(|image| image.url.as_str())
    }

    /// Price actually charged per unit.
    pub fn effective_price(&self) -> Decimal {
        self.sale_price_amd.unwrap_or(self.price_amd)
    }

    pub fn is_on_sale(&self) -> bool {
        self.sale_price_amd.is_some()
    }
}

pub(crate) fn whole_dram(amount: Decimal) -> i64 {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(i64::MAX)
}

impl From<&Flower> for CartLineItem {
    fn from(flower: &Flower) -> Self {
        let mut item = CartLineItem::new(flower.id.clone(), flower.name.clone(), whole_dram(flower.price_amd))
            .with_sale_price(flower.sale_price_amd.map(whole_dram))
            .with_image(flower.main_image().map(str::to_string));
        if !flower.category.is_empty() {
            item = item.with_category(flower.category.clone());
        }
        item
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

impl<T> From<Vec<T>> for Page<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            count: results.len() as u64,
            next: None,
            previous: None,
            results,
        }
    }
}

/// Some endpoints paginate and some return a bare array, depending on the
/// backend's settings.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Page(Page<T>),
    Plain(Vec<T>),
}

impl<T> From<Listing<T>> for Page<T> {
    fn from(listing: Listing<T>) -> Self {
        match listing {
            Listing::Page(page) => page,
            Listing::Plain(items) => items.into(),
        }
    }
}

/// Filters for the flower list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowerQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub search: Option<String>,
}

impl FlowerQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn price_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Query parameters in request order. Blank text filters are dropped.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        [
            ("page", self.page.map(|p| p.to_string())),
            ("page_size", self.page_size.map(|p| p.to_string())),
            ("category", text(&self.category)),
            ("color", text(&self.color)),
            ("min_price", self.min_price.map(|p| p.to_string())),
            ("max_price", self.max_price.map(|p| p.to_string())),
            ("search", text(&self.search)),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

/// Public catalog endpoints.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: FetchClient,
}

impl CatalogClient {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &FlowerQuery) -> Result<Page<Flower>, ShopError> {
        let mut request = self.client.get("/api/flowers/");
        for (key, value) in query.to_params() {
            request = request.query(key, value);
        }
        let listing: Listing<Flower> = request.send().await?.error_for_status()?.json()?;
        Ok(listing.into())
    }

    /// Flowers marked for the home page.
    pub async fn featured(&self) -> Result<Vec<Flower>, ShopError> {
        let listing: Listing<Flower> = self
            .client
            .get("/api/flowers/featured/")
            .send()
            .await?
            .error_for_status()?
            .json()?;
        Ok(Page::from(listing).results)
    }

    pub async fn get(&self, id: &ProductId) -> Result<Flower, ShopError> {
        Ok(self
            .client
            .get(format!("/api/flowers/{}/", id))
            .send()
            .await?
            .error_for_status()?
            .json()?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use dzaghik_data::testing::MockTransport;
    use dzaghik_data::Method;
    use serde_json::{json, Value};

    pub(crate) fn flower_json(id: &str, price: &str, sale: Option<&str>) -> Value {
        json!({
            "id": id,
            "name": "Red roses",
            "price_amd": price,
            "sale_price_amd": sale,
            "currency": "AMD",
            "description": "Fifteen red roses",
            "category": "roses",
            "colors": ["red"],
            "images": [
                {"url": "https://img.test/side.jpg", "is_main": false},
                {"url": "https://img.test/main.jpg", "is_main": true}
            ],
            "is_free_delivery": true,
            "is_active": true,
            "to_be_on_main_page": true,
            "created_at": "2025-03-01T10:00:00Z",
            "updated_at": "2025-03-02T10:00:00Z"
        })
    }

    fn client(mock: &MockTransport) -> CatalogClient {
        CatalogClient::new(FetchClient::new(mock.clone()).with_base_url("http://shop.test"))
    }

    #[test]
    fn test_flower_to_cart_line() {
        let flower: Flower =
            serde_json::from_value(flower_json("7f1c", "18000.00", Some("15000.50"))).unwrap();
        let item = CartLineItem::from(&flower);

        assert_eq!(item.id.as_str(), "7f1c");
        assert_eq!(item.price, 18000);
        assert_eq!(item.price_on_sale, Some(15001));
        assert_eq!(item.image.as_deref(), Some("https://img.test/main.jpg"));
        assert_eq!(item.category.as_deref(), Some("roses"));
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_main_image_falls_back_to_first() {
        let mut flower: Flower = serde_json::from_value(flower_json("1", "100", None)).unwrap();
        for image in &mut flower.images {
            image.is_main = false;
        }
        assert_eq!(flower.main_image(), Some("https://img.test/side.jpg"));
        flower.images.clear();
        assert_eq!(flower.main_image(), None);
    }

    #[test]
    fn test_query_params_skip_blanks() {
        let query = FlowerQuery::new()
            .page(2)
            .category("roses")
            .search("  ")
            .price_range(Some(Decimal::from(5000)), None);
        assert_eq!(
            query.to_params(),
            vec![
                ("page", "2".to_string()),
                ("category", "roses".to_string()),
                ("min_price", "5000".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_sends_filters_and_reads_page() {
        let mock = MockTransport::new();
        mock.on_json(
            Method::Get,
            "/api/flowers/",
            200,
            json!({
                "count": 11,
                "next": "http://shop.test/api/flowers/?page=3",
                "previous": null,
                "results": [flower_json("1", "18000.00", None)]
            }),
        );

        let page = client(&mock)
            .list(&FlowerQuery::new().page(2).color("white"))
            .await
            .unwrap();

        assert_eq!(page.count, 11);
        assert!(page.has_next());
        assert_eq!(page.results[0].price_amd, Decimal::from(18000));
        assert_eq!(
            mock.requests()[0].url,
            "http://shop.test/api/flowers/?page=2&color=white"
        );
    }

    #[tokio::test]
    async fn test_featured_accepts_plain_array() {
        let mock = MockTransport::new();
        mock.on_json(
            Method::Get,
            "/api/flowers/featured/",
            200,
            json!([flower_json("1", "100", None), flower_json("2", "200", None)]),
        );

        let featured = client(&mock).featured().await.unwrap();
        assert_eq!(featured.len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_flower() {
        let mock = MockTransport::new();
        let err = client(&mock).get(&ProductId::new("nope")).await.unwrap_err();
        assert!(matches!(err, ShopError::Fetch(e) if e.status() == Some(404)));
    }
}

//! Admin console: flowers, orders and home page content.
//!
//! Every call goes through [`AdminSession::send`], so an expired access
//! token is refreshed once and a dead session surfaces as
//! [`AuthError::SessionExpired`](dzaghik_auth::AuthError::SessionExpired).

use crate::catalog::{whole_dram, Flower, FlowerImage, FlowerQuery, Listing, Page};
use crate::content::{MainPageContent, MAIN_PAGE_PATH};
use crate::ShopError;
use chrono::{DateTime, Utc};
use dzaghik_auth::AdminSession;
use dzaghik_commerce::checkout::{OrderStatus, PaymentMethod};
use dzaghik_commerce::{OrderId, ProductId};
use dzaghik_data::{Method, Part, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const FLOWERS_PATH: &str = "/api/admin/flowers/";
const ORDERS_PATH: &str = "/api/admin/orders/";

/// Most images a flower can carry.
pub const MAX_FLOWER_IMAGES: usize = 5;

/// Fields sent when creating or replacing a flower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowerInput {
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
    pub is_free_delivery: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub to_be_on_main_page: bool,
    #[serde(default)]
    pub images_data: Vec<FlowerImage>,
}

fn default_currency() -> String {
    "AMD".to_string()
}

fn default_true() -> bool {
    true
}

impl FlowerInput {
    pub fn new(name: impl Into<String>, price_amd: Decimal) -> Self {
        Self {
            name: name.into(),
            price_amd,
            sale_price_amd: None,
            currency: default_currency(),
            description: String::new(),
            category: String::new(),
            colors: Vec::new(),
            is_free_delivery: false,
            is_active: true,
            to_be_on_main_page: false,
            images_data: Vec::new(),
        }
    }

    /// Checks the backend would otherwise reject.
    pub fn validate(&self) -> Result<(), ShopError> {
        let invalid = |msg: &str| Err(ShopError::Validation(msg.to_string()));

        if self.name.trim().is_empty() {
            return invalid("Name is required");
        }
        if self.price_amd.is_sign_negative() {
            return invalid("Price cannot be negative");
        }
        if self.sale_price_amd.is_some_and(|p| p.is_sign_negative()) {
            return invalid("Sale price cannot be negative");
        }
        if self.images_data.len() > MAX_FLOWER_IMAGES {
            return invalid("A flower can have at most 5 images");
        }
        let main = self.images_data.iter().filter(|i| i.is_main).count();
        if !self.images_data.is_empty() && main != 1 {
            return invalid("Exactly one image must be marked as main");
        }
        Ok(())
    }
}

impl From<&Flower> for FlowerInput {
    fn from(flower: &Flower) -> Self {
        Self {
            name: flower.name.clone(),
            price_amd: flower.price_amd,
            sale_price_amd: flower.sale_price_amd,
            currency: flower.currency.clone(),
            description: flower.description.clone(),
            category: flower.category.clone(),
            colors: flower.colors.clone(),
            is_free_delivery: flower.is_free_delivery,
            is_active: flower.is_active,
            to_be_on_main_page: flower.to_be_on_main_page,
            images_data: flower.images.clone(),
        }
    }
}

/// A line of an order as the admin sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminOrderItem {
    #[serde(default)]
    pub flower: Option<ProductId>,
    #[serde(default)]
    pub flower_name: Option<String>,
    pub quantity: i64,
    pub price: Decimal,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
}

/// An order as listed in the admin console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminOrder {
    pub id: OrderId,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub delivery_city: String,
    pub delivery_address: String,
    #[serde(default)]
    pub delivery_notes: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub stripe_payment_status: Option<String>,
    pub total_amount_amd: Decimal,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<AdminOrderItem>,
    #[serde(default)]
    pub bacik_erktox: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AdminOrder {
    pub fn total(&self) -> i64 {
        whole_dram(self.total_amount_amd)
    }
}

/// Home page fields an admin may change. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MainPageUpdate {
    pub title: String,
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_offer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_text: Option<String>,
}

impl From<&MainPageContent> for MainPageUpdate {
    fn from(content: &MainPageContent) -> Self {
        Self {
            title: content.title.clone(),
            subtitle: content.subtitle.clone().unwrap_or_default(),
            description: content.description.clone(),
            special_offer: content.special_offer.clone(),
            extra_text: content.extra_text.clone(),
        }
    }
}

#[derive(Deserialize)]
struct Uploaded {
    url: String,
}

/// An image file to upload.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageFile {
    /// Guess the content type from the file extension.
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let extension = file_name.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
        let content_type = match extension.as_str() {
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "image/jpeg",
        };
        Self {
            file_name,
            content_type: content_type.to_string(),
            data,
        }
    }

    fn into_part(self) -> Part {
        Part::file("image", self.file_name, self.content_type, self.data)
    }
}

#[derive(Debug, Clone)]
pub struct AdminConsole {
    session: AdminSession,
}

impl AdminConsole {
    pub fn new(session: AdminSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &AdminSession {
        &self.session
    }

    fn request(&self, method: Method, path: impl Into<String>) -> RequestBuilder {
        self.session.client().request(method, path).into_builder()
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ShopError> {
        Ok(self.session.send(request).await?.error_for_status()?)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ShopError> {
        Ok(self.send(request).await?.json()?)
    }

    // Flowers

    pub async fn flowers(&self, query: &FlowerQuery) -> Result<Page<Flower>, ShopError> {
        let mut request = self.request(Method::Get, FLOWERS_PATH);
        for (key, value) in query.to_params() {
            request = request.query(key, value);
        }
        let listing: Listing<Flower> = self.send_json(request).await?;
        Ok(listing.into())
    }

    pub async fn flower(&self, id: &ProductId) -> Result<Flower, ShopError> {
        self.send_json(self.request(Method::Get, flower_path(id))).await
    }

    pub async fn create_flower(&self, input: &FlowerInput) -> Result<Flower, ShopError> {
        input.validate()?;
        let flower: Flower = self
            .send_json(self.request(Method::Post, FLOWERS_PATH).json(input)?)
            .await?;
        tracing::info!(id = %flower.id, name = %flower.name, "flower created");
        Ok(flower)
    }

    /// Replace every field of a flower.
    pub async fn update_flower(&self, id: &ProductId, input: &FlowerInput) -> Result<Flower, ShopError> {
        input.validate()?;
        self.send_json(self.request(Method::Put, flower_path(id)).json(input)?)
            .await
    }

    /// Change only the given fields.
    pub async fn patch_flower(
        &self,
        id: &ProductId,
        fields: &serde_json::Value,
    ) -> Result<Flower, ShopError> {
        self.send_json(self.request(Method::Patch, flower_path(id)).json(fields)?)
            .await
    }

    pub async fn delete_flower(&self, id: &ProductId) -> Result<(), ShopError> {
        self.send(self.request(Method::Delete, flower_path(id))).await?;
        tracing::info!(%id, "flower deleted");
        Ok(())
    }

    /// Flip the flower's active flag and return it as saved.
    pub async fn toggle_active(&self, id: &ProductId) -> Result<Flower, ShopError> {
        let path = format!("{}{}/toggle-active/", FLOWERS_PATH, id);
        self.send_json(self.request(Method::Patch, path)).await
    }

    /// Upload a flower photo; returns its hosted URL.
    pub async fn upload_image(&self, image: ImageFile) -> Result<String, ShopError> {
        let path = format!("{}upload-image/", FLOWERS_PATH);
        self.upload(path, image).await
    }

    // Orders

    pub async fn orders(&self) -> Result<Vec<AdminOrder>, ShopError> {
        let listing: Listing<AdminOrder> = self.send_json(self.request(Method::Get, ORDERS_PATH)).await?;
        Ok(Page::from(listing).results)
    }

    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<AdminOrder, ShopError> {
        let request = self
            .request(Method::Patch, format!("{}{}/", ORDERS_PATH, id))
            .json(&serde_json::json!({ "status": status }))?;
        let order: AdminOrder = self.send_json(request).await?;
        tracing::info!(%id, status = %order.status, "order status updated");
        Ok(order)
    }

    // Home page

    pub async fn main_page(&self) -> Result<MainPageContent, ShopError> {
        self.send_json(self.request(Method::Get, MAIN_PAGE_PATH)).await
    }

    /// Title and subtitle must not be blank.
    pub async fn update_main_page(&self, update: &MainPageUpdate) -> Result<MainPageContent, ShopError> {
        if update.title.trim().is_empty() || update.subtitle.trim().is_empty() {
            return Err(ShopError::Validation("Title and subtitle are required".into()));
        }
        self.send_json(self.request(Method::Patch, MAIN_PAGE_PATH).json(update)?)
            .await
    }

    /// Upload a new hero image. The backend also makes it the current one.
    pub async fn upload_main_page_image(&self, image: ImageFile) -> Result<String, ShopError> {
        let path = format!("{}upload-image/", MAIN_PAGE_PATH);
        self.upload(path, image).await
    }

    async fn upload(&self, path: String, image: ImageFile) -> Result<String, ShopError> {
        if image.data.is_empty() {
            return Err(ShopError::Validation("Image file is empty".into()));
        }
        let request = self
            .request(Method::Post, path)
            .multipart(vec![image.into_part()]);
        let uploaded: Uploaded = self.send_json(request).await?;
        Ok(uploaded.url)
    }
}

fn flower_path(id: &ProductId) -> String {
    format!("{}{}/", FLOWERS_PATH, id)
}

//! Backend and payment clients for the Dzaghik flower shop.
//!
//! [`Storefront`] wires the cart, display preferences and checkout from
//! `dzaghik-commerce` to the shop's REST backend and to Stripe:
//!
//! - [`catalog`]: flower listing, featured flowers, flower detail
//! - [`content`]: home page text
//! - [`orders`]: order placement and payment intents
//! - [`stripe`]: card confirmation
//! - [`admin`]: the admin console
//! - [`preferences`]: display currency and language
//! - [`config`]: file and environment configuration

pub mod admin;
pub mod app;
pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod orders;
pub mod preferences;
pub mod stripe;

pub use admin::{AdminConsole, AdminOrder, FlowerInput, ImageFile, MainPageUpdate};
pub use app::Storefront;
pub use catalog::{CatalogClient, Flower, FlowerImage, FlowerQuery, Page};
pub use config::ShopConfig;
pub use content::{ContentClient, MainPageContent};
pub use error::ShopError;
pub use orders::{OrderClient, PaymentIntentClient};
pub use preferences::{CurrencyPreference, Language, LanguagePreference};
pub use stripe::StripeProcessor;

//! Home page content.

use crate::ShopError;
use dzaghik_data::FetchClient;
use serde::{Deserialize, Serialize};

pub(crate) const MAIN_PAGE_PATH: &str = "/api/main-page/";

/// The editable text and hero image on the home page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainPageContent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub special_offer: Option<String>,
    #[serde(default)]
    pub extra_text: Option<String>,
    #[serde(default)]
    pub main_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ContentClient {
    client: FetchClient,
}

impl ContentClient {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    pub async fn main_page(&self) -> Result<MainPageContent, ShopError> {
        Ok(self
            .client
            .get(MAIN_PAGE_PATH)
            .send()
            .await?
            .error_for_status()?
            .json()?)
    }
}

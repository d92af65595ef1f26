//! CLI execution context.

use std::path::Path;

use anyhow::{Context as _, Result};
use dzaghik_shop::{ShopConfig, ShopError, Storefront};

use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// The storefront, opened on the configured storage directory.
    pub shop: Storefront,
    /// Output handler.
    pub output: Output,
}

impl Context {
    /// Load configuration and open the storefront.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let config = ShopConfig::load(config_path.map(Path::new))
            .context("Failed to load configuration")?;
        output.debug(&format!("backend: {}", config.backend_url));
        let storage = config.storage_dir().context("Failed to resolve storage directory")?;
        output.debug(&format!("storage: {}", storage.display()));

        let shop = Storefront::open(config).context("Failed to open storefront")?;
        tracing::debug!(
            cart_lines = shop.cart().line_count(),
            currency = %shop.currency().get(),
            "storefront opened"
        );
        Ok(Self { shop, output })
    }

    /// Price in the chosen display currency.
    pub fn price(&self, base_amount: i64) -> String {
        self.shop.display_price(base_amount)
    }
}

/// Message for a failed command. Backend rejections are shown in the
/// backend's words; an expired admin session gets a hint.
pub fn describe(error: &anyhow::Error) -> String {
    match error.downcast_ref::<ShopError>() {
        Some(e) if e.needs_login() => {
            format!("{}. Run `dzaghik admin login` first.", e.user_message())
        }
        Some(e) => e.user_message(),
        None => format!("{:#}", error),
    }
}

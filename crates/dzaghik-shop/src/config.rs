//! Storefront configuration.
//!
//! Read from `dzaghik.toml` (or `.dzaghik.toml`, or a JSON file given
//! explicitly), then overridden by environment variables. A `.env` file in
//! the working directory is loaded first.

use crate::ShopError;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAMES: [&str; 2] = ["dzaghik.toml", ".dzaghik.toml"];

pub const ENV_BACKEND_URL: &str = "DZAGHIK_BACKEND_URL";
pub const ENV_STRIPE_KEY: &str = "DZAGHIK_STRIPE_KEY";
pub const ENV_STORAGE_DIR: &str = "DZAGHIK_STORAGE_DIR";

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Shop backend root, e.g. `http://localhost:8001`.
    pub backend_url: String,

    /// Publishable key for card payments. Card checkout is unavailable
    /// without it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stripe_publishable_key: Option<String>,

    pub stripe_api_url: String,

    /// Where the cart, preferences and sessions are kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    pub request_timeout_secs: u64,

    /// Pause before leaving the confirmation screen.
    pub redirect_delay_ms: u64,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8001".to_string(),
            stripe_publishable_key: None,
            stripe_api_url: "https://api.stripe.com".to_string(),
            storage_dir: None,
            request_timeout_secs: 30,
            redirect_delay_ms: 2000,
        }
    }
}

impl std::fmt::Debug for ShopConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopConfig")
            .field("backend_url", &self.backend_url)
            .field(
                "stripe_publishable_key",
                &self.stripe_publishable_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("stripe_api_url", &self.stripe_api_url)
            .field("storage_dir", &self.storage_dir)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("redirect_delay_ms", &self.redirect_delay_ms)
            .finish()
    }
}

impl ShopConfig {
    /// Load configuration.
    ///
    /// With `path`, that file must exist. Without it, the nearest
    /// `dzaghik.toml` walking up from the working directory is used, or the
    /// defaults when there is none. Environment overrides apply either way.
    pub fn load(path: Option<&Path>) -> Result<Self, ShopError> {
        let _ = dotenvy::dotenv();

        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir().ok().and_then(|dir| discover(&dir)),
        };

        let mut config = match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ShopError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ShopError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| ShopError::Config(format!("invalid JSON in {}: {}", path.display(), e)))
        } else {
            Self::from_toml(&content)
                .map_err(|e| ShopError::Config(format!("{} ({})", e, path.display())))
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ShopError> {
        toml::from_str(content).map_err(|e| ShopError::Config(format!("invalid TOML: {}", e)))
    }

    /// Apply `DZAGHIK_*` overrides. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var(ENV_BACKEND_URL) {
            self.backend_url = url;
        }
        if let Some(key) = var(ENV_STRIPE_KEY) {
            self.stripe_publishable_key = Some(key);
        }
        if let Some(dir) = var(ENV_STORAGE_DIR) {
            self.storage_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<(), ShopError> {
        for (name, value) in [
            ("backend_url", &self.backend_url),
            ("stripe_api_url", &self.stripe_api_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| ShopError::Config(format!("{} {:?} is not a URL: {}", name, value, e)))?;
        }
        if self.request_timeout_secs == 0 {
            return Err(ShopError::Config("request_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn with_stripe_key(mut self, key: impl Into<String>) -> Self {
        self.stripe_publishable_key = Some(key.into());
        self
    }

    pub fn stripe_key(&self) -> Option<SecretString> {
        self.stripe_publishable_key.clone().map(SecretString::from)
    }

    /// Configured storage directory, or `dzaghik` under the platform's
    /// local data directory (`~/.local/share/dzaghik` on Linux).
    pub fn storage_dir(&self) -> Result<PathBuf, ShopError> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_local_dir()
                .map(|dir| dir.join("dzaghik"))
                .ok_or_else(|| {
                    ShopError::Config(format!(
                        "no local data directory found; set {} or storage_dir",
                        ENV_STORAGE_DIR
                    ))
                }),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

/// Find the nearest config file in `start` or one of its ancestors.
pub fn discover(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

//! Storefront error type.

use dzaghik_auth::AuthError;
use dzaghik_cache::CacheError;
use dzaghik_commerce::checkout::CheckoutError;
use dzaghik_commerce::CommerceError;
use dzaghik_data::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ShopError {
    /// Message for the customer or admin: the backend's own wording for
    /// rejected requests.
    pub fn user_message(&self) -> String {
        match self {
            ShopError::Fetch(e) | ShopError::Auth(AuthError::Fetch(e)) => e.user_message(),
            other => other.to_string(),
        }
    }

    /// True when the admin must log in again.
    pub fn needs_login(&self) -> bool {
        matches!(
            self,
            ShopError::Auth(AuthError::SessionExpired | AuthError::NotLoggedIn)
        )
    }
}

//! Authentication errors.

use dzaghik_data::FetchError;
use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Login rejected. Carries the backend's message, or a generic one.
    #[error("{0}")]
    InvalidCredentials(String),

    /// The access token expired and could not be refreshed.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// No admin is logged in.
    #[error("not logged in")]
    NotLoggedIn,

    /// A required field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Cache error.
    #[error("cache error: {0}")]
    Cache(#[from] dzaghik_cache::CacheError),

    /// The backend could not be reached or answered with an error.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials(_) | AuthError::SessionExpired | AuthError::NotLoggedIn
        )
    }
}

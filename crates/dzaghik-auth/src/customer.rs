//! Local customer login.
//!
//! There is no customer account backend. Login and signup only record who is
//! browsing on this device; passwords are accepted and never checked.

use crate::user::CustomerProfile;
use crate::AuthError;
use dzaghik_cache::Cache;

pub const CUSTOMER_KEY: &str = "dzaghik_user";

/// Display name used when logging in without signing up first.
pub const DEFAULT_CUSTOMER_NAME: &str = "Օգտատեր";

#[derive(Debug, Clone)]
pub struct LocalCustomerSession {
    cache: Cache,
}

impl LocalCustomerSession {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    pub fn login(&self, email: &str, _password: &str) -> Result<CustomerProfile, AuthError> {
        self.store(email, DEFAULT_CUSTOMER_NAME)
    }

    pub fn signup(
        &self,
        name: &str,
        email: &str,
        _password: &str,
    ) -> Result<CustomerProfile, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        self.store(email, name)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        Ok(self.cache.delete(CUSTOMER_KEY)?)
    }

    /// The stored profile. An unreadable entry counts as logged out.
    pub fn current(&self) -> Option<CustomerProfile> {
        match self.cache.get(CUSTOMER_KEY) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable customer profile");
                None
            }
        }
    }

    fn store(&self, email: &str, name: &str) -> Result<CustomerProfile, AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        let profile = CustomerProfile::new(email, name);
        self.cache.set(CUSTOMER_KEY, &profile)?;
        tracing::info!(%email, "customer logged in");
        Ok(profile)
    }
}

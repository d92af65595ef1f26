//! Sign-in for the Dzaghik storefront.
//!
//! Two unrelated capabilities live here:
//!
//! - [`AdminSession`]: token login against the shop backend, with one
//!   refresh-and-retry on `401` and forced logout when that fails.
//! - [`LocalCustomerSession`]: a device-local customer profile with no
//!   backend and no password check.
//!
//! They share storage but not a trait; a customer login never grants admin
//! access.

mod admin;
mod customer;
mod error;
mod user;

pub use admin::{
    AdminSession, ACCESS_TOKEN_KEY, ADMIN_USER_KEY, GENERIC_LOGIN_ERROR, REFRESH_TOKEN_KEY,
};
pub use customer::{LocalCustomerSession, CUSTOMER_KEY, DEFAULT_CUSTOMER_NAME};
pub use error::AuthError;
pub use user::{AdminProfile, CustomerProfile};

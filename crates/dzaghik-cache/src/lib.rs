//! Type-safe key-value persistence layer for the Dzaghik storefront.
//!
//! Everything the storefront keeps between runs (cart snapshot, display
//! currency, language, customer profile, admin tokens) lives behind the
//! [`KeyValueStore`] trait, so the backing store can be swapped for an
//! in-memory fake in tests or a directory of files on disk.
//!
//! # Example
//!
//! ```rust
//! use dzaghik_cache::{Cache, MemoryStore};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Profile {
//!     email: String,
//! }
//!
//! let cache = Cache::new(MemoryStore::new());
//!
//! cache.set("dzaghik_user", &Profile { email: "anna@example.com".into() }).unwrap();
//! let profile: Option<Profile> = cache.get("dzaghik_user").unwrap();
//! assert_eq!(profile.unwrap().email, "anna@example.com");
//!
//! cache.delete("dzaghik_user").unwrap();
//! assert!(!cache.exists("dzaghik_user").unwrap());
//! ```

mod error;
mod file;
mod kv;
mod memory;

pub use error::CacheError;
pub use file::FileStore;
pub use kv::{Cache, KeyValueStore};
pub use memory::MemoryStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KeyValueStore, MemoryStore};
}

//! HTTP client utilities for the Dzaghik storefront.
//!
//! Provides a small builder API over a pluggable [`Transport`] with automatic
//! JSON handling. Production code uses [`ReqwestTransport`]; tests script
//! answers with `testing::MockTransport` (enable the `testing` feature from
//! other crates).
//!
//! # Example
//!
//! ```rust,ignore
//! use dzaghik_data::FetchClient;
//! use serde::Deserialize;
//! use std::time::Duration;
//!
//! #[derive(Deserialize)]
//! struct Flower {
//!     id: u64,
//!     name: String,
//! }
//!
//! let client = FetchClient::reqwest(Duration::from_secs(15))?
//!     .with_base_url("http://localhost:8001");
//!
//! let flower: Flower = client
//!     .get("/api/flowers/12/")
//!     .send()
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//! ```

mod error;
mod request;
mod response;
mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub use error::FetchError;
pub use request::{Body, Method, Part, Request, RequestBuilder};
pub use response::Response;
pub use transport::{ReqwestTransport, Transport};

/// HTTP client for making outbound requests.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct FetchClient {
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Create a client over the given transport.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Create a client over an already shared transport.
    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: None,
            default_headers: HashMap::new(),
            transport,
        }
    }

    /// Create a client backed by `reqwest`.
    pub fn reqwest(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self::new(ReqwestTransport::new(timeout)?))
    }

    /// Create a client with a base URL that will be prepended to all requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// The configured base URL.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) => {
                if url.starts_with("http://") || url.starts_with("https://") {
                    url
                } else {
                    format!("{}{}", base.trim_end_matches('/'), url)
                }
            }
            None => url,
        };

        let mut builder = RequestBuilder::new(method, full_url);
        for (key, value) in &self.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }

        ClientRequestBuilder {
            builder,
            transport: Arc::clone(&self.transport),
        }
    }

    /// Send a detached builder through this client's transport.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response, FetchError> {
        dispatch(self.transport.as_ref(), builder).await
    }
}

async fn dispatch(transport: &dyn Transport, builder: RequestBuilder) -> Result<Response, FetchError> {
    let request = builder.build()?;
    let method = request.method;
    let url = request.url.clone();

    tracing::debug!(method = method.as_str(), %url, "sending request");
    let result = transport.send(request).await;
    match &result {
        Ok(response) => tracing::debug!(
            method = method.as_str(),
            %url,
            status = response.status,
            "received response"
        ),
        Err(e) => tracing::debug!(method = method.as_str(), %url, error = %e, "request failed"),
    }
    result
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
}

impl ClientRequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Append a query parameter when present.
    pub fn query_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.builder = self.builder.query_opt(key, value);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Set a form-encoded body.
    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.builder = self.builder.form(pairs);
        self
    }

    /// Set a multipart body.
    pub fn multipart(mut self, parts: Vec<Part>) -> Self {
        self.builder = self.builder.multipart(parts);
        self
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_auth(token);
        self
    }

    /// Detach the underlying builder, e.g. to replay it later.
    pub fn into_builder(self) -> RequestBuilder {
        self.builder
    }

    /// Send the request and return the response.
    pub async fn send(self) -> Result<Response, FetchError> {
        dispatch(self.transport.as_ref(), self.builder).await
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Method, Response, Transport};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_base_url_joined() {
        let mock = MockTransport::new();
        mock.on_json(Method::Get, "/api/flowers/", 200, json!({"count": 0}));
        let client = FetchClient::new(mock.clone()).with_base_url("http://shop.test/");

        let response = client.get("/api/flowers/").query("page", 1).send().await.unwrap();

        assert!(response.is_success());
        let seen = mock.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "http://shop.test/api/flowers/?page=1");
    }

    #[tokio::test]
    async fn test_absolute_url_passes_through() {
        let mock = MockTransport::new();
        let client = FetchClient::new(mock.clone()).with_base_url("http://shop.test");

        let _ = client.post("https://pay.test/v1/x").send().await.unwrap();

        assert_eq!(mock.requests()[0].url, "https://pay.test/v1/x");
    }

    #[tokio::test]
    async fn test_default_headers_applied() {
        let mock = MockTransport::new();
        let client = FetchClient::new(mock.clone()).with_default_header("Accept", "application/json");

        client.get("http://shop.test/").send().await.unwrap();

        assert_eq!(mock.requests()[0].header("accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_unscripted_route_is_404() {
        let client = FetchClient::new(MockTransport::new());
        let err = client
            .get("http://shop.test/missing/")
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_queued_replies_in_order() {
        let mock = MockTransport::new();
        mock.on_json(Method::Get, "/a/", 401, json!({}));
        mock.on_json(Method::Get, "/a/", 200, json!({}));
        let client = FetchClient::new(mock.clone());

        let first = client.get("http://t/a/").send().await.unwrap();
        let second = client.get("http://t/a/").send().await.unwrap();
        let third = client.get("http://t/a/").send().await.unwrap();

        assert_eq!(first.status, 401);
        assert_eq!(second.status, 200);
        assert_eq!(third.status, 200);
        assert_eq!(mock.calls(Method::Get, "/a/"), 3);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mock = MockTransport::new();
        mock.on(Method::Get, "/slow/", Err(FetchError::Timeout));
        let client = FetchClient::new(mock);

        let err = client.get("http://t/slow/").send().await.unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }
}

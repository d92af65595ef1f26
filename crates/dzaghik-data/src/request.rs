//! HTTP request builder.

use crate::FetchError;
use serde::Serialize;
use std::collections::HashMap;

/// HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// One part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Form field name.
    pub name: String,
    /// File name reported to the server.
    pub file_name: Option<String>,
    /// MIME type of the part.
    pub content_type: Option<String>,
    /// Raw content.
    pub data: Vec<u8>,
}

impl Part {
    /// A file part.
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
            data,
        }
    }
}

/// A request body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// Raw bytes; the content type travels in the headers.
    Bytes(Vec<u8>),
    /// Multipart form; the transport picks the boundary.
    Multipart(Vec<Part>),
}

/// A fully built request, ready for a [`crate::Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Absolute URL including the query string.
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Body,
}

impl Request {
    /// Get a header value (case-insensitive).
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The URL path without scheme, host or query.
    pub fn path(&self) -> String {
        url::Url::parse(&self.url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| self.url.clone())
    }

    /// Decode a JSON body.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, FetchError> {
        match &self.body {
            Body::Bytes(bytes) => Ok(serde_json::from_slice(bytes)?),
            _ => Err(FetchError::ParseError("request has no byte body".into())),
        }
    }
}

/// A builder for constructing HTTP requests.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Body,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: HashMap::new(),
            body: Body::Empty,
        }
    }

    /// Add a header to the request, replacing any previous value.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value.into());
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter when the value is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, FetchError> {
        let json = serde_json::to_vec(value)?;
        self = self.header("Content-Type", "application/json");
        self.body = Body::Bytes(json);
        Ok(self)
    }

    /// Set the request body as `application/x-www-form-urlencoded`.
    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self = self.header("Content-Type", "application/x-www-form-urlencoded");
        self.body = Body::Bytes(encoded.into_bytes());
        self
    }

    /// Set a multipart body.
    pub fn multipart(mut self, parts: Vec<Part>) -> Self {
        self.headers
            .retain(|k, _| !k.eq_ignore_ascii_case("Content-Type"));
        self.body = Body::Multipart(parts);
        self
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// The HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Resolve the query string and produce the final request.
    pub fn build(self) -> Result<Request, FetchError> {
        let url = if self.query.is_empty() {
            self.url
        } else {
            let mut parsed = url::Url::parse(&self.url)?;
            parsed
                .query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            parsed.to_string()
        };

        Ok(Request {
            method: self.method,
            url,
            headers: self.headers,
            body: self.body,
        })
    }
}

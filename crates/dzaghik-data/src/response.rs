//! HTTP response handling.

use crate::FetchError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

/// Fields a backend error body is searched for, in order.
const MESSAGE_FIELDS: [&str; 3] = ["detail", "error", "message"];

/// An HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// The response headers.
    pub headers: HashMap<String, String>,
    /// The response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new response.
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response.
    pub fn from_json<T: Serialize + ?Sized>(status: u16, value: &T) -> Result<Self, FetchError> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Ok(Self::new(status, headers, serde_json::to_vec(value)?))
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String, FetchError> {
        String::from_utf8(self.body.clone())
            .map_err(|e| FetchError::ParseError(format!("Invalid UTF-8: {}", e)))
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::ParseError(e.to_string()))
    }

    /// Get the raw response body.
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Get a header value.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// Best-effort extraction of the backend's human-readable message.
    ///
    /// Looks at `detail`, `error` and `message`, then at the first
    /// field-level validation message (`{"phone": ["This field is required."]}`).
    pub fn backend_message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_slice(&self.body).ok()?;
        extract_message(&value)
    }

    /// Convert to a Result, returning an error for non-2xx status codes.
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            let message = self
                .backend_message()
                .unwrap_or_else(|| format!("HTTP {}", self.status));
            Err(FetchError::HttpError {
                status: self.status,
                message,
            })
        }
    }
}

fn extract_message(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => items.iter().find_map(extract_message),
        serde_json::Value::Object(map) => MESSAGE_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(extract_message))
            .or_else(|| {
                map.iter().find_map(|(field, v)| {
                    extract_message(v).map(|msg| format!("{}: {}", field, msg))
                })
            }),
        _ => None,
    }
}

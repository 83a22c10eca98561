use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::RedactedHeaders;
use crate::error::TransportError;

/// Timeout applied to every request dispatched by a client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Request body handed to a transport
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    Empty,
    Bytes(Bytes),
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => write!(f, "Body::Empty"),
            Body::Bytes(bytes) => f.debug_tuple("Body::Bytes").field(&bytes.len()).finish(),
        }
    }
}

impl Body {
    /// Serialize a value as JSON.
    ///
    /// # Errors
    /// Returns a [`TransportError`] of kind `Build` if the value cannot be
    /// serialized.
    pub fn from_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, TransportError> {
        let json = serde_json::to_vec(value).map_err(|e| {
            TransportError::build(format!("failed to serialize request body: {e}")).with_source(e)
        })?;
        Ok(Body::Bytes(Bytes::from(json)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Empty => &[],
            Body::Bytes(bytes) => bytes,
        }
    }
}

/// Fully resolved request: everything the transport needs, scoped to one call.
#[derive(Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Absolute URL without the merged query parameters
    pub url: String,
    pub body: Body,
    /// Lowercase header names mapped to values
    pub headers: BTreeMap<String, String>,
    /// Query parameters to append to `url`
    pub params: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl fmt::Debug for TransportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("body", &self.body)
            .field("headers", &RedactedHeaders(&self.headers))
            .field("params", &self.params)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TransportRequest {
    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Successful (2xx) response envelope.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    /// Decode the body as JSON, discarding the envelope.
    ///
    /// An empty body decodes as JSON `null`.
    ///
    /// # Errors
    /// Returns a [`TransportError`] of kind `Decode` if the body does not
    /// match `R`.
    pub fn json<R: DeserializeOwned>(&self) -> Result<R, TransportError> {
        let bytes: &[u8] = if self.body.is_empty() { b"null" } else { &self.body };
        serde_json::from_slice(bytes).map_err(|e| {
            TransportError::decode(format!("failed to decode response body: {e}")).with_source(e)
        })
    }
}

/// Capability that performs the network exchange.
///
/// Implementations must report non-2xx responses as
/// [`TransportErrorKind::HttpStatus`](crate::TransportErrorKind::HttpStatus)
/// errors and must not retain any state from a request beyond the call.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request.
    ///
    /// # Errors
    /// Returns a classified [`TransportError`] on timeout, network failure,
    /// non-2xx status, or when the request cannot be built.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

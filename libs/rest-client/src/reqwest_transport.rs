use std::collections::BTreeMap;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use reqwest::Url;

use crate::error::TransportError;
use crate::transport::{Body, Transport, TransportRequest, TransportResponse};

/// [`Transport`] backed by a shared `reqwest::Client`.
///
/// Holds no per-client defaults: headers, query parameters and timeout all
/// come from the request, so one instance can serve many clients.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default `reqwest` client.
    ///
    /// # Errors
    /// Returns a [`TransportError`] of kind `Build` if the TLS backend or
    /// resolver cannot be initialized.
    pub fn new() -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::build(e.to_string()).with_source(e))?;
        Ok(Self { http_client })
    }

    /// Wrap a preconfigured `reqwest` client.
    #[must_use]
    pub fn from_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = build_url(&request.url, &request.params)?;
        let headers = build_headers(&request.headers)?;

        let mut req_builder = self
            .http_client
            .request(request.method, url)
            .headers(headers)
            .timeout(request.timeout);

        if let Body::Bytes(bytes) = request.body {
            req_builder = req_builder.body(bytes);
        }

        let resp = req_builder.send().await.map_err(classify)?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(classify);
        tracing::trace!(%status, body_ok = body.is_ok(), "response received");

        into_response(status, headers, body)
    }
}

/// Non-2xx wins over a failed body read so the status code is never lost.
fn into_response(
    status: StatusCode,
    headers: HeaderMap,
    body: Result<Bytes, TransportError>,
) -> Result<TransportResponse, TransportError> {
    if !status.is_success() {
        return Err(TransportError::http_status(status, body.unwrap_or_default()));
    }
    Ok(TransportResponse {
        status,
        headers,
        body: body?,
    })
}

fn build_url(url: &str, params: &BTreeMap<String, String>) -> Result<Url, TransportError> {
    let mut url = Url::parse(url).map_err(|e| {
        TransportError::build(format!("invalid request URL {url:?}: {e}")).with_source(e)
    })?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter());
    }
    Ok(url)
}

fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            TransportError::build(format!("invalid header name {name:?}: {e}")).with_source(e)
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            TransportError::build(format!("invalid value for header {name:?}: {e}")).with_source(e)
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Map a `reqwest` failure onto the transport error taxonomy
fn classify(e: reqwest::Error) -> TransportError {
    let message = e.to_string();
    let err = if e.is_timeout() {
        TransportError::timeout(message)
    } else if e.is_builder() {
        TransportError::build(message)
    } else if e.is_decode() {
        TransportError::decode(message)
    } else {
        TransportError::network(message)
    };
    err.with_source(e)
}

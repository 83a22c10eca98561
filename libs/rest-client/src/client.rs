use std::sync::Arc;

use futures::future::{self, BoxFuture};
use http::Method;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{ClientConfig, ClientOptions, RequestOptions};
use crate::error::{EncodingError, TransportError};
use crate::reqwest_transport::ReqwestTransport;
use crate::transport::{Body, Transport};

/// REST client with mutable defaults over a pluggable [`Transport`].
///
/// Setters take `&self` and apply immediately. A verb call reads the
/// configuration when it is invoked, not when its future is first polled.
/// Nothing serializes a caller's multi-step update against dispatches from
/// another task.
pub struct ConfigurableClient {
    transport: Arc<dyn Transport>,
    config: RwLock<ClientConfig>,
}

impl std::fmt::Debug for ConfigurableClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurableClient")
            .field("config", &*self.config.read())
            .finish_non_exhaustive()
    }
}

impl ConfigurableClient {
    /// Create a client over an existing transport. Performs no I/O.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, options: ClientOptions) -> Self {
        Self {
            transport,
            config: RwLock::new(ClientConfig::new(options)),
        }
    }

    /// Create a client over a fresh [`ReqwestTransport`].
    ///
    /// # Errors
    /// Returns a [`TransportError`] of kind `Build` if the HTTP client cannot
    /// be constructed.
    pub fn from_options(options: ClientOptions) -> Result<Self, TransportError> {
        Ok(Self::new(Arc::new(ReqwestTransport::new()?), options))
    }

    /// Current base URL
    #[must_use]
    pub fn base_url(&self) -> String {
        self.config.read().base_url().to_owned()
    }

    /// Current request root: base URL plus the applied path
    #[must_use]
    pub fn target(&self) -> String {
        self.config.read().target().to_owned()
    }

    /// Snapshot of the current configuration.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        self.config.read().clone()
    }

    /// Replace the base URL, dropping any appended path
    pub fn set_base_url(&self, url: impl Into<String>) {
        let mut config = self.config.write();
        config.set_base_url(url);
        tracing::trace!(request_root = config.target(), "base url set");
    }

    /// Set the path appended to the current base URL
    pub fn set_path(&self, path: &str) {
        let mut config = self.config.write();
        config.set_path(path);
        tracing::trace!(request_root = config.target(), "path set");
    }

    /// Add a query parameter sent with every request
    pub fn set_api_key(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        tracing::trace!(param = %key, "default query parameter set");
        self.config.write().set_api_key(key, value);
    }

    /// Add a header sent with every request
    pub fn set_header(&self, key: &str, value: impl Into<String>) {
        tracing::trace!(header = key, "default header set");
        self.config.write().set_header(key, value);
    }

    /// Authorize with `Bearer <token>`, replacing any previous credential
    pub fn set_token(&self, token: impl Into<String>) {
        tracing::trace!("bearer authorization set");
        self.config.write().set_token(token);
    }

    /// Authorize with HTTP basic credentials, replacing any previous one
    ///
    /// # Errors
    /// Returns [`EncodingError`] if either credential contains a character
    /// outside Latin-1. The previous authorization stays in effect.
    pub fn set_basic_auth(&self, username: &str, password: &str) -> Result<(), EncodingError> {
        self.config.write().set_basic_auth(username, password)?;
        tracing::trace!("basic authorization set");
        Ok(())
    }

    /// GET `path` relative to the current target and decode the payload.
    pub fn get<R>(&self, path: &str) -> BoxFuture<'static, Result<R, TransportError>>
    where
        R: DeserializeOwned + Send + 'static,
    {
        self.get_with(path, RequestOptions::default())
    }

    /// GET with per-call headers and query parameters.
    pub fn get_with<R>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> BoxFuture<'static, Result<R, TransportError>>
    where
        R: DeserializeOwned + Send + 'static,
    {
        self.dispatch(Method::GET, path, Ok(Body::Empty), options)
    }

    /// POST `body` as JSON and decode the payload.
    pub fn post<T, R>(&self, path: &str, body: &T) -> BoxFuture<'static, Result<R, TransportError>>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned + Send + 'static,
    {
        self.dispatch(Method::POST, path, Body::from_json(body), RequestOptions::default())
    }

    /// PUT `body` as JSON and decode the payload.
    pub fn put<T, R>(&self, path: &str, body: &T) -> BoxFuture<'static, Result<R, TransportError>>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned + Send + 'static,
    {
        self.dispatch(Method::PUT, path, Body::from_json(body), RequestOptions::default())
    }

    fn dispatch<R>(
        &self,
        method: Method,
        path: &str,
        body: Result<Body, TransportError>,
        options: RequestOptions,
    ) -> BoxFuture<'static, Result<R, TransportError>>
    where
        R: DeserializeOwned + Send + 'static,
    {
        let body = match body {
            Ok(body) => body,
            Err(err) => return Box::pin(future::ready(Err(err))),
        };

        // Resolved now; the lock is released before the future runs.
        let request = self.config.read().request(method, path, body, options);
        let transport = Arc::clone(&self.transport);

        Box::pin(async move {
            let method = request.method.clone();
            let url = request.url.clone();
            tracing::debug!(%method, %url, "dispatching request");

            let result = transport.send(request).await.and_then(|resp| resp.json());
            if let Err(err) = &result {
                tracing::debug!(%method, %url, kind = %err.kind(), status = ?err.status(), "request failed");
            }
            result
        })
    }
}

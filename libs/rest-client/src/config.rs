use std::collections::BTreeMap;
use std::fmt;

use http::Method;
use serde::Deserialize;

use crate::auth::Authorization;
use crate::error::EncodingError;
use crate::transport::{Body, REQUEST_TIMEOUT, TransportRequest};

const AUTHORIZATION: &str = "authorization";
const JSON: &str = "application/json";

/// Construction options for a [`ConfigurableClient`](crate::ConfigurableClient)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    pub base_url: Option<String>,
    pub path: Option<String>,
}

impl ClientOptions {
    /// Options with a base URL and no path
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            path: None,
        }
    }

    /// Set the path appended to the base URL at construction
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Read options from the environment.
    ///
    /// Reads:
    /// - `REST_CLIENT_BASE_URL`: base URL (default: empty)
    /// - `REST_CLIENT_PATH`: path appended to the base URL (default: empty)
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("REST_CLIENT_BASE_URL").ok(),
            path: std::env::var("REST_CLIENT_PATH").ok(),
        }
    }
}

/// Per-call additions merged over the client defaults.
#[derive(Clone, Default)]
pub struct RequestOptions {
    headers: BTreeMap<String, String>,
    params: BTreeMap<String, String>,
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("headers", &RedactedHeaders(&self.headers))
            .field("params", &self.params)
            .finish()
    }
}

impl RequestOptions {
    /// Empty options; the call uses the client defaults only
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header for this call (name is case-insensitive)
    #[must_use]
    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.insert(key.to_ascii_lowercase(), value.into());
        self
    }

    /// Add a query parameter for this call
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Mutable configuration record of a client.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    target: String,
    default_params: BTreeMap<String, String>,
    default_headers: BTreeMap<String, String>,
    authorization: Option<Authorization>,
}

impl ClientConfig {
    /// Compose the initial target from the options and install the JSON
    /// `content-type`/`accept` defaults
    #[must_use]
    pub fn new(options: ClientOptions) -> Self {
        let base_url = options.base_url.unwrap_or_default();
        let target = format!("{base_url}{}", options.path.unwrap_or_default());

        let default_headers = BTreeMap::from([
            ("content-type".to_owned(), JSON.to_owned()),
            ("accept".to_owned(), JSON.to_owned()),
        ]);

        Self {
            base_url,
            target,
            default_params: BTreeMap::new(),
            default_headers,
            authorization: None,
        }
    }

    /// Authoritative root address; empty when unset
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request root verb paths are resolved against.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Query parameters merged into every request
    #[must_use]
    pub fn default_params(&self) -> &BTreeMap<String, String> {
        &self.default_params
    }

    /// Default headers keyed by lowercase name. The authorization slot is
    /// not included.
    #[must_use]
    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.default_headers
    }

    /// Current contents of the authorization slot
    #[must_use]
    pub fn authorization(&self) -> Option<&Authorization> {
        self.authorization.as_ref()
    }

    /// Replace the base URL and reset the target to it, dropping any path.
    pub fn set_base_url(&mut self, url: impl Into<String>) {
        self.base_url = url.into();
        self.target.clone_from(&self.base_url);
    }

    /// Re-derive the target as the base URL followed by `path`.
    pub fn set_path(&mut self, path: &str) {
        self.target.clone_from(&self.base_url);
        self.target.push_str(path);
    }

    /// Insert or overwrite a default query parameter.
    pub fn set_api_key(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.default_params.insert(key.into(), value.into());
    }

    /// Set a default header. An `Authorization` header takes over the
    /// authorization slot.
    pub fn set_header(&mut self, key: &str, value: impl Into<String>) {
        let key = key.to_ascii_lowercase();
        if key == AUTHORIZATION {
            self.authorization = None;
        }
        self.default_headers.insert(key, value.into());
    }

    /// Install a bearer token, replacing any previous authorization.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.set_authorization(Authorization::bearer(token));
    }

    /// Install a basic credential, replacing any previous authorization.
    ///
    /// # Errors
    /// Returns [`EncodingError`] if the credentials are not Latin-1; the
    /// current authorization is kept in that case.
    pub fn set_basic_auth(&mut self, username: &str, password: &str) -> Result<(), EncodingError> {
        let auth = Authorization::basic(username, password)?;
        self.set_authorization(auth);
        Ok(())
    }

    /// Fill the authorization slot, dropping a raw `Authorization` header.
    pub fn set_authorization(&mut self, auth: Authorization) {
        self.default_headers.remove(AUTHORIZATION);
        self.authorization = Some(auth);
    }

    /// Resolve a request against the current configuration.
    #[must_use]
    pub fn request(
        &self,
        method: Method,
        path: &str,
        body: Body,
        options: RequestOptions,
    ) -> TransportRequest {
        let mut headers = self.default_headers.clone();
        if let Some(auth) = &self.authorization {
            headers.insert(AUTHORIZATION.to_owned(), auth.header_value());
        }
        headers.extend(options.headers);

        let mut params = self.default_params.clone();
        params.extend(options.params);

        TransportRequest {
            method,
            url: resolve(&self.target, path),
            body,
            headers,
            params,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

/// Intentionally does not print credentials, whether they sit in the
/// authorization slot or in a raw `Authorization` header.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("target", &self.target)
            .field("default_params", &self.default_params)
            .field("default_headers", &RedactedHeaders(&self.default_headers))
            .field("authorization", &self.authorization)
            .finish()
    }
}

/// Header map `Debug` wrapper that masks the `authorization` value
pub(crate) struct RedactedHeaders<'a>(pub(crate) &'a BTreeMap<String, String>);

impl fmt::Debug for RedactedHeaders<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(name, value)| {
                let shown = if name == AUTHORIZATION { "[REDACTED]" } else { value.as_str() };
                (name, shown)
            }))
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(ClientOptions::default())
    }
}

/// Join a request path onto a target.
///
/// Absolute paths are used as-is. Otherwise at most two trailing `/` are
/// removed from the target, every leading `/` is removed from the path,
/// and the two are joined with a single `/`.
#[must_use]
pub fn resolve(target: &str, path: &str) -> String {
    if target.is_empty() || is_absolute(path) {
        return path.to_owned();
    }
    if path.is_empty() {
        return target.to_owned();
    }
    format!(
        "{}/{}",
        trim_trailing_slashes(target),
        path.trim_start_matches('/')
    )
}

fn trim_trailing_slashes(target: &str) -> &str {
    let once = target.strip_suffix('/').unwrap_or(target);
    once.strip_suffix('/').unwrap_or(once)
}

fn is_absolute(path: &str) -> bool {
    path.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str, path: &str) -> ClientConfig {
        ClientConfig::new(ClientOptions::new(base).with_path(path))
    }

    #[test]
    fn test_new_composes_target() {
        let cfg = config("https://api.example.com", "/v1");
        assert_eq!(cfg.base_url(), "https://api.example.com");
        assert_eq!(cfg.target(), "https://api.example.com/v1");
        assert!(cfg.default_params().is_empty());
        assert!(cfg.authorization().is_none());
    }

    #[test]
    fn test_default_is_empty_and_json() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.base_url(), "");
        assert_eq!(cfg.target(), "");
        assert_eq!(cfg.default_headers().get("content-type").map(String::as_str), Some(JSON));
        assert_eq!(cfg.default_headers().get("accept").map(String::as_str), Some(JSON));
    }

    #[test]
    fn test_set_base_url_drops_path() {
        let mut cfg = config("https://a.example", "/v1");
        cfg.set_base_url("https://b.example");
        assert_eq!(cfg.base_url(), "https://b.example");
        assert_eq!(cfg.target(), "https://b.example");

        cfg.set_base_url("");
        assert_eq!(cfg.target(), "");
    }

    #[test]
    fn test_set_base_url_then_path_is_base_plus_path() {
        let mut cfg = config("https://a.example", "/v1");
        for (base, path) in [
            ("https://b.example", "/v2"),
            ("https://c.example/api", "/v3"),
            ("", "/relative"),
            ("https://d.example", ""),
        ] {
            cfg.set_path("/ignored");
            cfg.set_base_url(base);
            cfg.set_path(path);
            assert_eq!(cfg.target(), format!("{base}{path}"));
        }
    }

    #[test]
    fn test_set_path_does_not_accumulate() {
        let mut cfg = config("https://api.example.com", "");
        cfg.set_path("/v1");
        cfg.set_path("/v1");
        assert_eq!(cfg.target(), "https://api.example.com/v1");

        cfg.set_path("/v2");
        assert_eq!(cfg.target(), "https://api.example.com/v2");
    }

    #[test]
    fn test_set_path_replaces_construction_path() {
        let mut cfg = config("https://api.example.com", "/v1");
        cfg.set_path("/v2");
        assert_eq!(cfg.target(), "https://api.example.com/v2");
    }

    #[test]
    fn test_set_path_has_no_slash_normalization() {
        let mut cfg = config("https://api.example.com/", "");
        cfg.set_path("/v1");
        assert_eq!(cfg.target(), "https://api.example.com//v1");
        cfg.set_path("v1");
        assert_eq!(cfg.target(), "https://api.example.com/v1");
    }

    #[test]
    fn test_token_then_basic_keeps_basic() {
        let mut cfg = ClientConfig::default();
        cfg.set_token("t0k3n");
        cfg.set_basic_auth("alice", "secret").unwrap();
        assert_eq!(
            cfg.authorization().map(Authorization::header_value).as_deref(),
            Some("Basic YWxpY2U6c2VjcmV0")
        );
    }

    #[test]
    fn test_basic_then_token_keeps_bearer() {
        let mut cfg = ClientConfig::default();
        cfg.set_basic_auth("alice", "secret").unwrap();
        cfg.set_token("t0k3n");
        assert_eq!(cfg.authorization(), Some(&Authorization::Bearer("t0k3n".to_owned())));
    }

    #[test]
    fn test_failed_basic_auth_keeps_previous_slot() {
        let mut cfg = ClientConfig::default();
        cfg.set_token("t0k3n");
        assert!(cfg.set_basic_auth("alice", "\u{2603}").is_err());
        assert_eq!(cfg.authorization(), Some(&Authorization::Bearer("t0k3n".to_owned())));
    }

    #[test]
    fn test_set_header_overrides_content_type_case_insensitively() {
        let mut cfg = ClientConfig::default();
        cfg.set_header("Content-Type", "text/plain");
        let req = cfg.request(Method::POST, "/x", Body::Empty, RequestOptions::new());
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn test_authorization_header_and_slot_are_last_write_wins() {
        let mut cfg = ClientConfig::default();
        cfg.set_token("t0k3n");
        cfg.set_header("Authorization", "Custom abc");
        assert!(cfg.authorization().is_none());
        let req = cfg.request(Method::GET, "/", Body::Empty, RequestOptions::new());
        assert_eq!(req.header("authorization"), Some("Custom abc"));

        cfg.set_token("t0k3n");
        let req = cfg.request(Method::GET, "/", Body::Empty, RequestOptions::new());
        assert_eq!(req.header("authorization"), Some("Bearer t0k3n"));
    }

    #[test]
    fn test_request_merges_defaults_and_options() {
        let mut cfg = config("https://api.example.com", "/v1");
        cfg.set_api_key("api_key", "k1");
        cfg.set_api_key("region", "eu");
        cfg.set_header("X-Trace", "default");
        cfg.set_token("t0k3n");

        let options = RequestOptions::new()
            .header("x-trace", "per-call")
            .param("region", "us")
            .param("page", "2");
        let req = cfg.request(Method::GET, "/users/1", Body::Empty, options);

        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url, "https://api.example.com/v1/users/1");
        assert_eq!(req.timeout, REQUEST_TIMEOUT);
        assert_eq!(req.header("X-Trace"), Some("per-call"));
        assert_eq!(req.header("authorization"), Some("Bearer t0k3n"));
        assert_eq!(req.params.get("api_key").map(String::as_str), Some("k1"));
        assert_eq!(req.params.get("region").map(String::as_str), Some("us"));
        assert_eq!(req.params.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_resolve_join_rules() {
        assert_eq!(resolve("https://a.example/v1", "/users"), "https://a.example/v1/users");
        assert_eq!(resolve("https://a.example/v1/", "users"), "https://a.example/v1/users");
        assert_eq!(resolve("https://a.example/v1/", "/users"), "https://a.example/v1/users");
        assert_eq!(resolve("https://a.example/v1", ""), "https://a.example/v1");
        assert_eq!(resolve("", "/users"), "/users");
        assert_eq!(resolve("https://a.example", "https://b.example/x"), "https://b.example/x");
        assert_eq!(resolve("https://a.example", "/redirect?to=http://b"), "https://a.example/redirect?to=http://b");
    }

    #[test]
    fn test_resolve_trims_at_most_two_trailing_slashes() {
        assert_eq!(resolve("https://a.example/v1//", "users"), "https://a.example/v1/users");
        assert_eq!(resolve("https://a.example/v1///", "users"), "https://a.example/v1//users");
        assert_eq!(resolve("https://a.example/v1", "///users"), "https://a.example/v1/users");
    }

    #[test]
    fn test_debug_redacts_raw_authorization_header() {
        let mut cfg = ClientConfig::default();
        cfg.set_header("Authorization", "Bearer very-secret");
        cfg.set_header("X-Trace", "visible");
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("\"authorization\": \"[REDACTED]\""));
        assert!(debug.contains("visible"));

        let options = RequestOptions::new().header("Authorization", "Basic c2VjcmV0");
        assert!(!format!("{options:?}").contains("c2VjcmV0"));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: ClientOptions =
            serde_json::from_str(r#"{"base_url":"https://api.example.com"}"#).unwrap();
        assert_eq!(opts, ClientOptions::new("https://api.example.com"));

        let opts: ClientOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, ClientOptions::default());
    }
}

//! Configurable REST client
//!
//! A thin facade over an HTTP [`Transport`] that keeps mutable request
//! defaults (base URL, path segment, query parameters, headers and a
//! single authorization slot) and exposes `get`, `post` and `put` calls
//! returning only the decoded JSON payload.
//!
//! - Path composition: `set_path` always re-derives the target from the
//!   current base URL, so repeating it never accumulates segments
//! - Authorization: bearer and basic credentials share one slot, last write wins
//! - Every request carries its own headers, parameters and the fixed
//!   [`REQUEST_TIMEOUT`], so many clients can share one transport
//!
//! # Example
//!
//! ```no_run
//! use rest_client::{ClientOptions, ConfigurableClient};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! # async fn example() -> Result<(), rest_client::ClientError> {
//! let client = ConfigurableClient::from_options(
//!     ClientOptions::new("https://api.example.com").with_path("/v1"),
//! )?;
//! client.set_basic_auth("alice", "secret")?;
//! client.set_api_key("api_key", "k-123");
//!
//! let user: User = client.get("/users/1").await?;
//! println!("{} {}", user.id, user.name);
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod error;
mod reqwest_transport;
mod transport;

// Re-export public API
pub use auth::Authorization;
pub use client::ConfigurableClient;
pub use config::{ClientConfig, ClientOptions, RequestOptions, resolve};
pub use error::{BoxError, ClientError, EncodingError, TransportError, TransportErrorKind};
pub use reqwest_transport::ReqwestTransport;
pub use transport::{Body, REQUEST_TIMEOUT, Transport, TransportRequest, TransportResponse};

// Re-export commonly used types from dependencies
pub use http::{Method, StatusCode};

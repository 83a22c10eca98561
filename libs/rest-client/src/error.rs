use std::fmt;

use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

/// Boxed error type carried as the underlying cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Basic-auth credentials contained a character that cannot be encoded.
///
/// Credentials are encoded one byte per character, so only the Latin-1
/// range (U+0000..=U+00FF) is representable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("credential contains a character outside the Latin-1 range: {character:?}")]
pub struct EncodingError {
    character: char,
}

impl EncodingError {
    pub(crate) fn new(character: char) -> Self {
        Self { character }
    }

    /// The first character that could not be encoded.
    #[must_use]
    pub fn character(&self) -> char {
        self.character
    }
}

/// Classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request did not complete within the request timeout
    Timeout,
    /// Connection failure or an I/O error while exchanging the request
    Network,
    /// The server answered with a non-2xx status
    HttpStatus,
    /// The response body could not be decoded into the requested type
    Decode,
    /// The request could not be constructed (bad URL, header, or body)
    Build,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::HttpStatus => "http status",
            Self::Decode => "decode",
            Self::Build => "request build",
        };
        f.write_str(name)
    }
}

/// Failure reported by a [`Transport`](crate::Transport) or while decoding
/// its response.
#[derive(Debug, Error)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    status: Option<StatusCode>,
    body: Bytes,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            body: Bytes::new(),
            message: message.into(),
            source: None,
        }
    }

    /// The request did not complete within its timeout
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    /// Connection or I/O failure
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    /// Response body did not decode into the requested type
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Decode, message)
    }

    /// The request could not be constructed
    #[must_use]
    pub fn build(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Build, message)
    }

    /// A non-2xx response. The body is kept for diagnostics.
    #[must_use]
    pub fn http_status(status: StatusCode, body: Bytes) -> Self {
        Self {
            status: Some(status),
            body,
            ..Self::new(TransportErrorKind::HttpStatus, format!("status={status}"))
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Classification of the failure
    #[must_use]
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// Status code of the response, present only for [`TransportErrorKind::HttpStatus`].
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Raw body of the failed response; empty unless the server sent one.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Shorthand for `kind() == TransportErrorKind::Timeout`
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

/// Any error produced by a [`ConfigurableClient`](crate::ConfigurableClient).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

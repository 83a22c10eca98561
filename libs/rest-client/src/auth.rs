use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::EncodingError;

/// Contents of the client's single authorization slot.
///
/// Bearer and basic credentials are mutually exclusive: installing one
/// replaces the other.
#[derive(Clone, PartialEq, Eq)]
pub enum Authorization {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// `Authorization: Basic <encoded>`, where `encoded` is the base64 form
    /// of `username:password`
    Basic(String),
}

impl Authorization {
    /// Encode a basic credential pair.
    ///
    /// # Errors
    /// Returns [`EncodingError`] if either part contains a character outside
    /// the Latin-1 range.
    pub fn basic(username: &str, password: &str) -> Result<Self, EncodingError> {
        let mut raw = Vec::with_capacity(username.len() + password.len() + 1);
        raw.extend(latin1_bytes(username)?);
        raw.push(b':');
        raw.extend(latin1_bytes(password)?);
        Ok(Self::Basic(STANDARD.encode(raw)))
    }

    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// The value sent in the `Authorization` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        match self {
            Self::Bearer(token) => format!("Bearer {token}"),
            Self::Basic(encoded) => format!("Basic {encoded}"),
        }
    }

    #[must_use]
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Bearer(_) => "Bearer",
            Self::Basic(_) => "Basic",
        }
    }
}

/// Intentionally does not print the credential.
impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(self.scheme()).field(&"[REDACTED]").finish()
    }
}

fn latin1_bytes(s: &str) -> Result<Vec<u8>, EncodingError> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| EncodingError::new(c)))
        .collect()
}

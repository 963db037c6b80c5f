//! Versioned payload casting.

use guestbridge_core::error::ProtocolError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A typed request that can be cast from any of its supported payload
/// versions.
///
/// Implementations switch on `version`, cast the payload into that
/// version's DTO with [`cast`], and normalize it into `Self`. A version
/// outside the supported set must return
/// [`ProtocolError::UnsupportedRequestVersion`] (see [`unsupported`]).
pub trait VersionedPayload: Sized {
    /// Stable wire identifier of the request type.
    const REQUEST_TYPE: &'static str;

    /// Every payload version this request can be decoded from.
    const SUPPORTED_VERSIONS: &'static [u32];

    /// Casts an untyped payload of the given version.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::UnsupportedRequestVersion` for an unknown
    /// version and `ProtocolError::UnableToParsePayload` when required
    /// fields are missing or mistyped.
    fn decode(version: u32, payload: Option<&Value>) -> Result<Self, ProtocolError>;
}

/// Casts a payload into a version DTO. An absent payload is treated as an
/// empty object, so DTOs whose fields are all optional still decode.
///
/// # Errors
///
/// Returns `ProtocolError::UnableToParsePayload` if deserialization fails.
pub fn cast<T: DeserializeOwned>(
    request_type: &str,
    version: u32,
    payload: Option<&Value>,
) -> Result<T, ProtocolError> {
    let value = payload
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));
    serde_json::from_value(value).map_err(|e| ProtocolError::UnableToParsePayload {
        request_type: request_type.to_owned(),
        version,
        reason: e.to_string(),
    })
}

/// Builds the error for a version outside a request's supported set.
#[must_use]
pub fn unsupported(request_type: &str, version: u32) -> ProtocolError {
    ProtocolError::UnsupportedRequestVersion {
        request_type: request_type.to_owned(),
        version,
    }
}

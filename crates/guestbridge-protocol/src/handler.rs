//! Request handlers.

use std::fmt;
use std::marker::PhantomData;

use guestbridge_core::error::ProtocolError;
use serde_json::Value;

use crate::codec::VersionedPayload;

/// Receives every request of one type.
pub trait RequestHandler {
    /// The request type this handler is registered under.
    fn request_type(&self) -> &str;

    /// Casts `payload` according to `version` and runs the handler's
    /// business behaviour.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::UnsupportedRequestVersion` or
    /// `ProtocolError::UnableToParsePayload` when casting fails, and
    /// `ProtocolError::ActionNotImplemented` when no behaviour is wired.
    fn handle_request(&self, version: u32, payload: Option<&Value>) -> Result<(), ProtocolError>;
}

/// Handler for a [`VersionedPayload`] request type: decodes the payload
/// for the envelope's version and passes the typed request to its action.
pub struct TypedHandler<R> {
    action: Option<Box<dyn Fn(R)>>,
    _request: PhantomData<fn(R)>,
}

impl<R: VersionedPayload> TypedHandler<R> {
    /// Creates a handler that runs `action` for every decoded request.
    pub fn new(action: impl Fn(R) + 'static) -> Self {
        Self {
            action: Some(Box::new(action)),
            _request: PhantomData,
        }
    }

    /// Creates a scaffold with no behaviour. Every request it receives
    /// fails with `ProtocolError::ActionNotImplemented`.
    #[must_use]
    pub fn unimplemented() -> Self {
        Self {
            action: None,
            _request: PhantomData,
        }
    }
}

impl<R: VersionedPayload> RequestHandler for TypedHandler<R> {
    fn request_type(&self) -> &str {
        R::REQUEST_TYPE
    }

    fn handle_request(&self, version: u32, payload: Option<&Value>) -> Result<(), ProtocolError> {
        let request = R::decode(version, payload)?;
        let action = self
            .action
            .as_ref()
            .ok_or_else(|| ProtocolError::ActionNotImplemented(R::REQUEST_TYPE.to_owned()))?;
        action(request);
        Ok(())
    }
}

impl<R: VersionedPayload> fmt::Debug for TypedHandler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedHandler")
            .field("request_type", &R::REQUEST_TYPE)
            .field("implemented", &self.action.is_some())
            .finish()
    }
}

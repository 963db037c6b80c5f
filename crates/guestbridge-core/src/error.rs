//! Error types.
//!
//! `ProtocolError` covers everything that can go wrong while routing and
//! casting a request. It never crosses the handler registry boundary: the
//! registry logs it and drops the message. `DomainError` covers authoring
//! failures surfaced to the host.

use thiserror::Error;

/// Failure while routing or handling a single request envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// No handler is registered for the request type.
    #[error("no handler registered for request type {0}")]
    UnregisteredRequestType(String),

    /// The request type is known but the payload version is not.
    #[error("unsupported version {version} for request type {request_type}")]
    UnsupportedRequestVersion {
        /// The request type that was handled.
        request_type: String,
        /// The version carried by the envelope.
        version: u32,
    },

    /// The version is known but the payload does not have the required shape.
    #[error("unable to parse {request_type} v{version} payload: {reason}")]
    UnableToParsePayload {
        /// The request type that was handled.
        request_type: String,
        /// The version carried by the envelope.
        version: u32,
        /// Why casting failed.
        reason: String,
    },

    /// A handler was registered without real behaviour wired to it.
    #[error("action not implemented for request type {0}")]
    ActionNotImplemented(String),
}

/// Authoring and content error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A state id does not name a state in the sequence.
    #[error("state not found: {0}")]
    StateNotFound(String),

    /// A state id is already present in the sequence.
    #[error("state already exists: {0}")]
    DuplicateState(String),

    /// The operation needs an active state and none is set.
    #[error("no active state")]
    NoActiveState,

    /// An edit session is already open.
    #[error("an edit session is already in progress")]
    EditInProgress,

    /// The operation requires an open edit session.
    #[error("no edit session is in progress")]
    NotEditing,

    /// Finalizing an edit is blocked by a validation message.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

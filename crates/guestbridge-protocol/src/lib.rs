//! Guestbridge — versioned request dispatch.
//!
//! Host and guest each own a [`registry::HandlerRegistry`] for inbound
//! requests and a [`dispatcher::Dispatcher`] for outbound ones. Payload
//! shapes are versioned per request type; [`codec`] casts an untyped payload
//! into the typed request for a given version, and [`messages`] holds the
//! catalog of request types exchanged in both directions.

pub mod codec;
pub mod dispatcher;
pub mod handler;
pub mod messages;
pub mod registry;

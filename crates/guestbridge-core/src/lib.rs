//! Guestbridge Core — shared protocol and domain abstractions.
//!
//! This crate defines the request envelope, the error taxonomy, and the
//! traits that the protocol and content crates depend on. It contains no
//! dispatch or state-machine logic of its own.

pub mod aggregate;
pub mod clock;
pub mod collaborator;
pub mod command;
pub mod envelope;
pub mod error;
pub mod event;
pub mod ids;
pub mod repository;

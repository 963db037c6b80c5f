//! Guestbridge — host-side composition.
//!
//! Builds [`scope::GuestScope`]s from a [`config::HostConfig`] and sets up
//! tracing.

pub mod config;
pub mod error;
pub mod scope;
pub mod telemetry;

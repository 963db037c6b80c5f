//! Guestbridge — content state machine and authoring lifecycle.
//!
//! Responsible for the ordered sequence of authored states, the active-state
//! pointer and next/previous derivation, the editing session that gates
//! authoring, and the use-cases that drive the guest through the dispatcher.

pub mod application;
pub mod domain;

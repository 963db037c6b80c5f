//! Ports to the collaborators that live outside this workspace.
//!
//! The core never touches the DOM, asset storage, or dialog rendering. It
//! talks to those concerns only through the narrow traits below, which the
//! embedding host implements.

use serde_json::Value;

use crate::envelope::RequestEnvelope;

/// A callable installed by the receiving side of a channel. It accepts one
/// envelope and performs the inbound half of request handling.
pub trait EntryPoint {
    /// Delivers an envelope synchronously.
    fn receive(&self, envelope: RequestEnvelope);
}

/// Modal used to surface a blocking validation message when finishing an
/// edit is rejected.
pub trait AlertPresenter {
    /// Shows the message; further authoring waits until it is acknowledged.
    fn present_validation_alert(&self, message: &str);
}

/// Receives activity-level signals from the content state machine.
pub trait ActivityObserver {
    /// Navigation moved past the last state.
    fn end_of_activity(&self, scope_id: &str);

    /// The guest submitted a result.
    fn results_submitted(
        &self,
        scope_id: &str,
        result_type: &str,
        result: &Value,
        description: Option<&str>,
    );
}

/// Mount and unmount signals for the container hosting a guest.
pub trait ContainerLifecycle {
    /// The guest container was mounted.
    fn mounted(&self, scope_id: &str);

    /// The guest container was torn down.
    fn unmounted(&self, scope_id: &str);
}

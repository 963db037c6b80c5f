//! Recording collaborators — mock ports that remember every call.
//!
//! Tests keep an `Rc` to the recorder and hand a clone to the code under
//! test, then inspect what was recorded.

use std::cell::RefCell;

use guestbridge_core::collaborator::{
    ActivityObserver, AlertPresenter, ContainerLifecycle, EntryPoint,
};
use guestbridge_core::envelope::RequestEnvelope;
use serde_json::Value;

/// An entry point that records every envelope delivered to it.
#[derive(Debug, Default)]
pub struct RecordingEntryPoint {
    received: RefCell<Vec<RequestEnvelope>>,
}

impl RecordingEntryPoint {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every envelope received so far.
    pub fn received(&self) -> Vec<RequestEnvelope> {
        self.received.borrow().clone()
    }

    /// Returns the request types received so far, in delivery order.
    pub fn received_types(&self) -> Vec<String> {
        self.received
            .borrow()
            .iter()
            .map(|envelope| envelope.request_type.clone())
            .collect()
    }

    /// Forgets everything received so far.
    pub fn clear(&self) {
        self.received.borrow_mut().clear();
    }
}

impl EntryPoint for RecordingEntryPoint {
    fn receive(&self, envelope: RequestEnvelope) {
        self.received.borrow_mut().push(envelope);
    }
}

/// An alert presenter that records every message it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingAlertPresenter {
    messages: RefCell<Vec<String>>,
}

impl RecordingAlertPresenter {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every message presented so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl AlertPresenter for RecordingAlertPresenter {
    fn present_validation_alert(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_owned());
    }
}

/// A signal received by [`RecordingActivityObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum ActivitySignal {
    /// Navigation ran past the last state.
    EndOfActivity {
        /// The scope that ended.
        scope_id: String,
    },
    /// The guest submitted a result.
    ResultsSubmitted {
        /// The scope the result came from.
        scope_id: String,
        /// The result type tag.
        result_type: String,
        /// The opaque result.
        result: Value,
        /// Optional description.
        description: Option<String>,
    },
}

/// An activity observer that records every signal.
#[derive(Debug, Default)]
pub struct RecordingActivityObserver {
    signals: RefCell<Vec<ActivitySignal>>,
}

impl RecordingActivityObserver {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every signal received so far.
    pub fn signals(&self) -> Vec<ActivitySignal> {
        self.signals.borrow().clone()
    }
}

impl ActivityObserver for RecordingActivityObserver {
    fn end_of_activity(&self, scope_id: &str) {
        self.signals.borrow_mut().push(ActivitySignal::EndOfActivity {
            scope_id: scope_id.to_owned(),
        });
    }

    fn results_submitted(
        &self,
        scope_id: &str,
        result_type: &str,
        result: &Value,
        description: Option<&str>,
    ) {
        self.signals
            .borrow_mut()
            .push(ActivitySignal::ResultsSubmitted {
                scope_id: scope_id.to_owned(),
                result_type: result_type.to_owned(),
                result: result.clone(),
                description: description.map(str::to_owned),
            });
    }
}

/// A container lifecycle signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerSignal {
    /// The scope was mounted.
    Mounted(String),
    /// The scope was unmounted.
    Unmounted(String),
}

/// A container lifecycle collaborator that records mount/unmount signals.
#[derive(Debug, Default)]
pub struct RecordingContainer {
    signals: RefCell<Vec<ContainerSignal>>,
}

impl RecordingContainer {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every signal received so far.
    pub fn signals(&self) -> Vec<ContainerSignal> {
        self.signals.borrow().clone()
    }
}

impl ContainerLifecycle for RecordingContainer {
    fn mounted(&self, scope_id: &str) {
        self.signals
            .borrow_mut()
            .push(ContainerSignal::Mounted(scope_id.to_owned()));
    }

    fn unmounted(&self, scope_id: &str) {
        self.signals
            .borrow_mut()
            .push(ContainerSignal::Unmounted(scope_id.to_owned()));
    }
}

//! The handler registry: routes inbound envelopes to exactly one handler
//! per request type.
//!
//! Nothing that goes wrong inside a handler escapes [`HandlerRegistry::handle`].
//! Unknown types, unsupported versions and malformed payloads are logged
//! as warnings and the message is dropped, so one bad message cannot take
//! down the channel.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use guestbridge_core::collaborator::EntryPoint;
use guestbridge_core::envelope::RequestEnvelope;
use guestbridge_core::error::ProtocolError;
use tracing::{debug, warn};

use crate::handler::RequestHandler;

/// Default nesting limit for re-entrant `handle` calls.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Registry behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Maximum nesting of `handle` calls before an envelope is dropped.
    pub max_depth: usize,
    /// Panic instead of logging when a handler has no action wired.
    pub strict: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
        }
    }
}

/// What happened to an envelope passed to [`HandlerRegistry::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum HandleOutcome {
    /// The handler ran to completion.
    Handled,
    /// The envelope was dropped; the error has already been logged.
    Dropped(ProtocolError),
    /// The envelope was dropped because handling nested too deeply.
    DepthExceeded,
}

impl HandleOutcome {
    /// Whether the handler ran to completion.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// Maps request types to handlers. At most one handler is live per type;
/// registering again replaces it.
pub struct HandlerRegistry {
    handlers: RefCell<HashMap<String, Rc<dyn RequestHandler>>>,
    depth: Cell<usize>,
    options: RegistryOptions,
}

impl HandlerRegistry {
    /// Creates an empty registry with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    /// Creates an empty registry with the given options.
    #[must_use]
    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            handlers: RefCell::new(HashMap::new()),
            depth: Cell::new(0),
            options,
        }
    }

    /// Returns the options this registry was built with.
    #[must_use]
    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    /// Stores `handler` under its request type. Returns `true` when an
    /// existing handler was replaced; replacement is logged as a warning.
    pub fn register(&self, handler: impl RequestHandler + 'static) -> bool {
        self.register_shared(Rc::new(handler))
    }

    /// Like [`register`](Self::register), for a handler that is already shared.
    pub fn register_shared(&self, handler: Rc<dyn RequestHandler>) -> bool {
        let request_type = handler.request_type().to_owned();
        let previous = self
            .handlers
            .borrow_mut()
            .insert(request_type.clone(), handler);
        if previous.is_some() {
            warn!(request_type = %request_type, "replacing existing handler for request type");
            true
        } else {
            debug!(request_type = %request_type, "registered handler");
            false
        }
    }

    /// Whether a handler is registered for `request_type`.
    #[must_use]
    pub fn contains(&self, request_type: &str) -> bool {
        self.handlers.borrow().contains_key(request_type)
    }

    /// Registered request types, sorted.
    #[must_use]
    pub fn request_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.borrow().keys().cloned().collect();
        types.sort();
        types
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Whether no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }

    /// Drops every handler. Used at scope teardown.
    pub fn clear(&self) {
        let drained: Vec<_> = self.handlers.borrow_mut().drain().collect();
        debug!(count = drained.len(), "cleared handlers");
    }

    /// Routes `envelope` to its handler.
    ///
    /// Never fails: every error is logged once as a warning and reported
    /// in the returned outcome.
    ///
    /// # Panics
    ///
    /// Panics when the registry is strict and the handler has no action
    /// wired, so that integration defects fail tests.
    pub fn handle(&self, envelope: &RequestEnvelope) -> HandleOutcome {
        let request_type = envelope.request_type.as_str();
        let version = envelope.version;

        // Clone the handler out so the table is not borrowed while it runs.
        let handler = self.handlers.borrow().get(request_type).cloned();
        let Some(handler) = handler else {
            warn!(request_type, version, "no handler registered for request type, dropping");
            return HandleOutcome::Dropped(ProtocolError::UnregisteredRequestType(
                request_type.to_owned(),
            ));
        };

        let Some(_guard) = DepthGuard::enter(&self.depth, self.options.max_depth) else {
            warn!(
                request_type,
                version,
                max_depth = self.options.max_depth,
                "re-entrant handling exceeded maximum depth, dropping"
            );
            return HandleOutcome::DepthExceeded;
        };

        match handler.handle_request(version, envelope.payload.as_ref()) {
            Ok(()) => {
                debug!(request_type, version, "handled request");
                HandleOutcome::Handled
            }
            Err(err) => {
                warn!(request_type, version, error = %err, "failed to handle request");
                if self.options.strict && matches!(err, ProtocolError::ActionNotImplemented(_)) {
                    panic!("{err}");
                }
                HandleOutcome::Dropped(err)
            }
        }
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("request_types", &self.request_types())
            .field("depth", &self.depth.get())
            .field("options", &self.options)
            .finish()
    }
}

impl EntryPoint for HandlerRegistry {
    fn receive(&self, envelope: RequestEnvelope) {
        let _ = self.handle(&envelope);
    }
}

/// Increments the nesting depth for the lifetime of one `handle` call.
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>, max_depth: usize) -> Option<Self> {
        let current = depth.get();
        if current >= max_depth {
            return None;
        }
        depth.set(current + 1);
        Some(Self { depth })
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use guestbridge_test_support::capture_logs;
    use serde_json::json;

    use super::*;
    use crate::handler::TypedHandler;
    use crate::messages::inbound::{
        GO_TO_NEXT_STATE, GoToNextState, SUBMIT_RESULTS, SubmitResults,
    };

    fn submit_results_envelope(version: u32) -> RequestEnvelope {
        RequestEnvelope::new(SUBMIT_RESULTS, version).with_payload(json!({
            "resultType": "HIT_V1",
            "result": { "success": true },
            "description": "Q1",
        }))
    }

    #[test]
    fn test_handle_unregistered_type_logs_one_warning_and_drops() {
        // Arrange
        let registry = HandlerRegistry::new();
        registry.register(TypedHandler::<GoToNextState>::new(|_| {}));

        // Act
        let (outcome, logs) =
            capture_logs(|| registry.handle(&RequestEnvelope::new("FROM_THE_FUTURE", 7)));

        // Assert
        assert_eq!(
            outcome,
            HandleOutcome::Dropped(ProtocolError::UnregisteredRequestType(
                "FROM_THE_FUTURE".to_owned()
            ))
        );
        assert_eq!(logs.warning_count(), 1);
    }

    #[test]
    fn test_handle_swallows_unsupported_version() {
        // Arrange
        let registry = HandlerRegistry::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        registry.register(TypedHandler::<SubmitResults>::new(move |_| {
            counter.set(counter.get() + 1);
        }));

        // Act
        let (outcome, logs) = capture_logs(|| registry.handle(&submit_results_envelope(99)));

        // Assert
        assert_eq!(
            outcome,
            HandleOutcome::Dropped(ProtocolError::UnsupportedRequestVersion {
                request_type: SUBMIT_RESULTS.to_owned(),
                version: 99,
            })
        );
        assert_eq!(calls.get(), 0);
        assert_eq!(logs.warning_count(), 1);
    }

    #[test]
    fn test_handle_swallows_malformed_payload() {
        let registry = HandlerRegistry::new();
        registry.register(TypedHandler::<SubmitResults>::new(|_| {}));
        let envelope =
            RequestEnvelope::new(SUBMIT_RESULTS, 2).with_payload(json!({ "result": true }));

        let outcome = registry.handle(&envelope);

        assert!(matches!(
            outcome,
            HandleOutcome::Dropped(ProtocolError::UnableToParsePayload { .. })
        ));
    }

    #[test]
    fn test_reregistration_replaces_handler_with_one_warning() {
        // Arrange
        let registry = HandlerRegistry::new();
        let first_calls = Rc::new(Cell::new(0));
        let second_calls = Rc::new(Cell::new(0));
        let first = Rc::clone(&first_calls);
        let second = Rc::clone(&second_calls);

        // Act
        let (replaced, logs) = capture_logs(|| {
            registry.register(TypedHandler::<SubmitResults>::new(move |_| {
                first.set(first.get() + 1);
            }));
            registry.register(TypedHandler::<SubmitResults>::new(move |_| {
                second.set(second.get() + 1);
            }))
        });
        let outcome = registry.handle(&submit_results_envelope(2));

        // Assert
        assert!(replaced);
        assert_eq!(logs.warning_count(), 1);
        assert!(outcome.is_handled());
        assert_eq!(first_calls.get(), 0);
        assert_eq!(second_calls.get(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unimplemented_action_is_dropped_when_lenient() {
        let registry = HandlerRegistry::new();
        registry.register(TypedHandler::<GoToNextState>::unimplemented());

        let outcome = registry.handle(&RequestEnvelope::new(GO_TO_NEXT_STATE, 1));

        assert_eq!(
            outcome,
            HandleOutcome::Dropped(ProtocolError::ActionNotImplemented(
                GO_TO_NEXT_STATE.to_owned()
            ))
        );
    }

    #[test]
    #[should_panic(expected = "action not implemented")]
    fn test_unimplemented_action_panics_when_strict() {
        let registry = HandlerRegistry::with_options(RegistryOptions {
            strict: true,
            ..RegistryOptions::default()
        });
        registry.register(TypedHandler::<GoToNextState>::unimplemented());

        let _ = registry.handle(&RequestEnvelope::new(GO_TO_NEXT_STATE, 1));
    }

    #[test]
    fn test_reentrant_handling_is_bounded_by_max_depth() {
        // Arrange
        let registry = Rc::new(HandlerRegistry::with_options(RegistryOptions {
            max_depth: 4,
            strict: false,
        }));
        let calls = Rc::new(Cell::new(0));
        let nested = Rc::new(RefCell::new(Vec::new()));
        let counter = Rc::clone(&calls);
        let nested_outcomes = Rc::clone(&nested);
        let weak = Rc::downgrade(&registry);
        registry.register(TypedHandler::<GoToNextState>::new(move |_| {
            counter.set(counter.get() + 1);
            if let Some(registry) = weak.upgrade() {
                let outcome = registry.handle(&RequestEnvelope::new(GO_TO_NEXT_STATE, 1));
                nested_outcomes.borrow_mut().push(outcome);
            }
        }));

        // Act
        let (outcome, logs) =
            capture_logs(|| registry.handle(&RequestEnvelope::new(GO_TO_NEXT_STATE, 1)));

        // Assert
        assert!(outcome.is_handled());
        assert_eq!(calls.get(), 4);
        assert_eq!(logs.warning_count(), 1);
        // Innermost call returns first.
        assert_eq!(
            *nested.borrow(),
            vec![
                HandleOutcome::DepthExceeded,
                HandleOutcome::Handled,
                HandleOutcome::Handled,
                HandleOutcome::Handled,
            ]
        );
        nested.borrow_mut().clear();

        // The depth counter unwinds, so the next message is handled normally.
        calls.set(0);
        let _ = registry.handle(&RequestEnvelope::new(GO_TO_NEXT_STATE, 1));
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_handler_may_register_while_being_handled() {
        let registry = Rc::new(HandlerRegistry::new());
        let weak = Rc::downgrade(&registry);
        registry.register(TypedHandler::<GoToNextState>::new(move |_| {
            if let Some(registry) = weak.upgrade() {
                registry.register(TypedHandler::<SubmitResults>::new(|_| {}));
            }
        }));

        let outcome = registry.handle(&RequestEnvelope::new(GO_TO_NEXT_STATE, 1));

        assert!(outcome.is_handled());
        assert!(registry.contains(SUBMIT_RESULTS));
    }

    #[test]
    fn test_clear_removes_all_handlers() {
        let registry = HandlerRegistry::new();
        registry.register(TypedHandler::<GoToNextState>::new(|_| {}));
        registry.register(TypedHandler::<SubmitResults>::new(|_| {}));
        assert_eq!(
            registry.request_types(),
            vec![GO_TO_NEXT_STATE.to_owned(), SUBMIT_RESULTS.to_owned()]
        );

        registry.clear();

        assert!(registry.is_empty());
    }
}

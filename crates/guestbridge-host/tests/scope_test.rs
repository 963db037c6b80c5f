//! Integration tests for guest scope wiring and the request protocol.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use guestbridge_core::envelope::RequestEnvelope;
use guestbridge_core::error::ProtocolError;
use guestbridge_host::config::HostConfig;
use guestbridge_protocol::handler::TypedHandler;
use guestbridge_protocol::messages::inbound::SubmitResults;
use guestbridge_protocol::registry::HandleOutcome;
use guestbridge_test_support::{ActivitySignal, ContainerSignal, capture_logs};
use serde_json::json;

use common::{build_scope, build_scope_with};

#[tokio::test]
async fn test_submit_results_reaches_activity_observer() {
    // Arrange
    let t = build_scope(&["q1"]).await;

    // Act
    t.guest.send(
        RequestEnvelope::new("SUBMIT_RESULTS", 2).with_payload(json!({
            "resultType": "HIT_V1",
            "result": { "success": true },
            "description": "Q1",
        })),
    );

    // Assert
    assert_eq!(
        t.activity.signals(),
        vec![ActivitySignal::ResultsSubmitted {
            scope_id: "scope-1".to_owned(),
            result_type: "HIT_V1".to_owned(),
            result: json!({ "success": true }),
            description: Some("Q1".to_owned()),
        }]
    );
}

#[tokio::test]
async fn test_version_one_results_use_generic_type() {
    let t = build_scope(&["q1"]).await;

    t.guest.send(RequestEnvelope::new("SUBMIT_RESULTS", 1).with_payload(json!({ "result": 3 })));

    match t.activity.signals().as_slice() {
        [ActivitySignal::ResultsSubmitted { result_type, .. }] => {
            assert_eq!(result_type, "GENERIC");
        }
        other => panic!("expected one ResultsSubmitted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unregistered_request_type_warns_once_and_drops() {
    let t = build_scope(&["q1"]).await;
    let envelope = RequestEnvelope::new("OPEN_DIALOG", 1);

    let (outcome, logs) = capture_logs(|| t.scope.registry().handle(&envelope));

    assert_eq!(
        outcome,
        HandleOutcome::Dropped(ProtocolError::UnregisteredRequestType(
            "OPEN_DIALOG".to_owned()
        ))
    );
    assert_eq!(logs.warning_count(), 1);
}

#[tokio::test]
async fn test_unsupported_version_is_contained() {
    let t = build_scope(&["q1"]).await;
    let envelope = RequestEnvelope::new("SUBMIT_RESULTS", 9).with_payload(json!({ "result": 1 }));

    let (outcome, logs) = capture_logs(|| t.scope.registry().handle(&envelope));

    match outcome {
        HandleOutcome::Dropped(ProtocolError::UnsupportedRequestVersion { version, .. }) => {
            assert_eq!(version, 9);
        }
        other => panic!("expected UnsupportedRequestVersion, got {other:?}"),
    }
    assert_eq!(logs.warning_count(), 1);
    assert!(t.activity.signals().is_empty());
}

#[tokio::test]
async fn test_malformed_payload_is_contained() {
    let t = build_scope(&["q1"]).await;
    let envelope =
        RequestEnvelope::new("SUBMIT_RESULTS", 2).with_payload(json!({ "result": true }));

    let (outcome, logs) = capture_logs(|| t.scope.registry().handle(&envelope));

    assert!(matches!(
        outcome,
        HandleOutcome::Dropped(ProtocolError::UnableToParsePayload { .. })
    ));
    assert_eq!(logs.warning_count(), 1);
}

#[tokio::test]
async fn test_mount_signals_container_and_presents_active_state() {
    // Arrange
    let t = build_scope(&["q1", "q2"]).await;

    // Act
    t.scope.mount();
    t.scope.mount();

    // Assert
    assert_eq!(
        t.container.signals(),
        vec![ContainerSignal::Mounted("scope-1".to_owned())]
    );
    let presented = t.guest.set_states();
    assert_eq!(presented.len(), 1);
    assert_eq!(presented[0].state.id, "q1");
    let hints = presented[0].navigation.unwrap();
    assert!(hints.has_next_slide);
    assert!(!hints.has_previous_slide);
    assert!(!hints.hide_navigation);
}

#[tokio::test]
async fn test_dropping_scope_tears_down_pairing() {
    // Arrange
    let t = build_scope(&["q1"]).await;
    t.scope.mount();
    let registry = t.scope.registry().clone();
    let dispatcher = t.scope.dispatcher().clone();
    let container = t.container.clone();

    // Act
    drop(t);

    // Assert
    assert!(registry.is_empty());
    assert!(!dispatcher.is_ready());
    assert_eq!(
        container.signals(),
        vec![
            ContainerSignal::Mounted("scope-1".to_owned()),
            ContainerSignal::Unmounted("scope-1".to_owned()),
        ]
    );
}

#[tokio::test]
async fn test_commands_before_guest_connects_are_dropped_silently() {
    let t = build_scope(&["q1"]).await;
    t.scope.disconnect_guest();

    let (presented, logs) = capture_logs(|| t.scope.present_active_state());

    assert!(presented);
    assert_eq!(logs.warning_count(), 0);
    assert!(t.guest.calls().is_empty());
}

#[tokio::test]
async fn test_configured_version_override_selects_older_shape() {
    let mut config = HostConfig::default();
    config.version_overrides.insert("SET_STATE".to_owned(), 2);
    let t = build_scope_with(&config, &["q1", "q2"]).await;

    t.scope.present_active_state();

    let presented = t.guest.set_states();
    assert_eq!(presented[0].state.id, "q1");
    assert!(presented[0].navigation.is_none());
}

#[tokio::test]
async fn test_announced_unsupported_version_falls_back_with_warning() {
    // Arrange
    let t = build_scope(&["q1", "q2"]).await;
    t.guest.send(
        RequestEnvelope::new("ANNOUNCE_VERSIONS", 1)
            .with_payload(json!({ "versions": { "SET_STATE": 7 } })),
    );

    // Act
    let (_, logs) = capture_logs(|| t.scope.present_active_state());

    // Assert
    assert_eq!(logs.warning_count(), 1);
    let presented = t.guest.set_states();
    assert!(presented[0].navigation.is_some());
}

#[tokio::test]
async fn test_reentrant_ping_pong_is_bounded_by_depth() {
    // Arrange
    let config = HostConfig {
        max_dispatch_depth: 4,
        ..HostConfig::default()
    };
    let t = build_scope_with(&config, &["q1", "q2"]).await;
    let outcomes = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&outcomes);
    let host_registry = Rc::downgrade(t.scope.registry());
    t.guest.on_set_state(move |request, _host| {
        let hints = request.navigation.unwrap_or_default();
        let request_type = if hints.has_next_slide {
            "GO_TO_NEXT_STATE"
        } else {
            "GO_TO_PREVIOUS_STATE"
        };
        if let Some(registry) = host_registry.upgrade() {
            let outcome = registry.handle(&RequestEnvelope::new(request_type, 1));
            recorded.borrow_mut().push(outcome);
        }
    });

    // Act
    let (_, logs) = capture_logs(|| t.scope.present_active_state());

    // Assert
    assert_eq!(logs.warning_count(), 1);
    assert_eq!(
        *outcomes.borrow(),
        vec![
            HandleOutcome::DepthExceeded,
            HandleOutcome::Handled,
            HandleOutcome::Handled,
            HandleOutcome::Handled,
            HandleOutcome::Handled,
        ]
    );
    let presented: Vec<_> = t
        .guest
        .set_states()
        .into_iter()
        .map(|request| request.state.id)
        .collect();
    assert_eq!(presented, vec!["q1", "q2", "q1", "q2", "q1"]);
    assert_eq!(t.scope.view().active_state_id.as_deref(), Some("q1"));
}

#[tokio::test]
#[should_panic(expected = "action not implemented for request type SUBMIT_RESULTS")]
async fn test_strict_scope_fails_on_unimplemented_handler() {
    let config = HostConfig {
        strict_handlers: true,
        ..HostConfig::default()
    };
    let t = build_scope_with(&config, &["q1"]).await;
    t.scope
        .registry()
        .register(TypedHandler::<SubmitResults>::unimplemented());

    let _ = t
        .scope
        .registry()
        .handle(&RequestEnvelope::new("SUBMIT_RESULTS", 1).with_payload(json!({ "result": 1 })));
}

#[tokio::test]
async fn test_lenient_scope_logs_unimplemented_handler() {
    let t = build_scope(&["q1"]).await;
    t.scope
        .registry()
        .register(TypedHandler::<SubmitResults>::unimplemented());
    let envelope = RequestEnvelope::new("SUBMIT_RESULTS", 1).with_payload(json!({ "result": 1 }));

    let (outcome, logs) = capture_logs(|| t.scope.registry().handle(&envelope));

    assert_eq!(
        outcome,
        HandleOutcome::Dropped(ProtocolError::ActionNotImplemented(
            "SUBMIT_RESULTS".to_owned()
        ))
    );
    assert_eq!(logs.warning_count(), 1);
    assert!(t.activity.signals().is_empty());
}

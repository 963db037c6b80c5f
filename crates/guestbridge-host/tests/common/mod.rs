//! Shared test helpers for host integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use guestbridge_core::collaborator::EntryPoint;
use guestbridge_core::envelope::RequestEnvelope;
use guestbridge_core::repository::StoredState;
use guestbridge_host::config::HostConfig;
use guestbridge_host::scope::{Collaborators, GuestScope};
use guestbridge_protocol::handler::TypedHandler;
use guestbridge_protocol::messages::outbound::{SetAuthoring, SetState};
use guestbridge_protocol::registry::HandlerRegistry;
use guestbridge_test_support::{
    FixedClock, RecordingActivityObserver, RecordingAlertPresenter, RecordingContainer,
    RecordingStateRepository, SequenceIds,
};
use serde_json::json;

/// A host command as the simulated guest decoded it.
#[derive(Debug, Clone, PartialEq)]
pub enum GuestCall {
    /// `SET_STATE` was received.
    SetState(SetState),
    /// `SET_AUTHORING` was received.
    SetAuthoring(bool),
}

type Reaction = Rc<dyn Fn(&SetState, &dyn EntryPoint)>;

/// A guest built from the same protocol pieces as the host: its own
/// registry with typed handlers for every host command.
pub struct SimulatedGuest {
    pub registry: Rc<HandlerRegistry>,
    calls: Rc<RefCell<Vec<GuestCall>>>,
    host: Rc<RefCell<Option<Rc<dyn EntryPoint>>>>,
    reaction: Rc<RefCell<Option<Reaction>>>,
}

impl SimulatedGuest {
    pub fn new() -> Self {
        let registry = Rc::new(HandlerRegistry::new());
        let calls = Rc::new(RefCell::new(Vec::new()));
        let host: Rc<RefCell<Option<Rc<dyn EntryPoint>>>> = Rc::new(RefCell::new(None));
        let reaction: Rc<RefCell<Option<Reaction>>> = Rc::new(RefCell::new(None));

        let sink = Rc::clone(&calls);
        let host_ref = Rc::clone(&host);
        let reaction_ref = Rc::clone(&reaction);
        registry.register(TypedHandler::<SetState>::new(move |request: SetState| {
            sink.borrow_mut().push(GuestCall::SetState(request.clone()));
            let host = host_ref.borrow().clone();
            let reaction = reaction_ref.borrow().clone();
            if let (Some(host), Some(reaction)) = (host, reaction) {
                reaction(&request, host.as_ref());
            }
        }));

        let sink = Rc::clone(&calls);
        registry.register(TypedHandler::<SetAuthoring>::new(move |request: SetAuthoring| {
            sink.borrow_mut()
                .push(GuestCall::SetAuthoring(request.is_authoring));
        }));

        Self {
            registry,
            calls,
            host,
            reaction,
        }
    }

    /// Wires the guest and the host scope to each other.
    pub fn connect(&self, scope: &GuestScope) {
        scope.connect_guest(self.registry.clone());
        *self.host.borrow_mut() = Some(scope.entry_point());
    }

    /// Runs `reaction` after every `SET_STATE`, with the host's entry point.
    pub fn on_set_state(&self, reaction: impl Fn(&SetState, &dyn EntryPoint) + 'static) {
        *self.reaction.borrow_mut() = Some(Rc::new(reaction));
    }

    /// Sends a request to the host.
    pub fn send(&self, envelope: RequestEnvelope) {
        let host = self.host.borrow().clone();
        if let Some(host) = host {
            host.receive(envelope);
        }
    }

    pub fn calls(&self) -> Vec<GuestCall> {
        self.calls.borrow().clone()
    }

    pub fn set_states(&self) -> Vec<SetState> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GuestCall::SetState(request) => Some(request),
                GuestCall::SetAuthoring(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

/// A scope wired to a simulated guest and recording collaborators.
pub struct TestScope {
    pub scope: GuestScope,
    pub guest: SimulatedGuest,
    pub alerts: Rc<RecordingAlertPresenter>,
    pub activity: Rc<RecordingActivityObserver>,
    pub container: Rc<RecordingContainer>,
}

pub fn stored(id: &str) -> StoredState {
    StoredState {
        id: id.to_owned(),
        name: format!("Question {id}"),
        data: json!({ "question": id }),
        asset_refs: Vec::new(),
        owner_app_id: "quiz".to_owned(),
    }
}

/// Builds a scope holding `ids` (the first one active) with a connected
/// guest that has not received anything yet.
pub async fn build_scope_with(config: &HostConfig, ids: &[&str]) -> TestScope {
    let alerts = Rc::new(RecordingAlertPresenter::new());
    let activity = Rc::new(RecordingActivityObserver::new());
    let container = Rc::new(RecordingContainer::new());
    let collaborators = Collaborators::new(alerts.clone(), activity.clone(), container.clone())
        .with_clock(Rc::new(FixedClock::default()))
        .with_id_generator(SequenceIds::new(["new-1", "new-2"]));
    let scope = GuestScope::new("scope-1", "quiz", config, collaborators);

    let repo = RecordingStateRepository::new(ids.iter().map(|id| stored(id)).collect());
    scope.load_states(&repo).await.unwrap();

    let guest = SimulatedGuest::new();
    guest.connect(&scope);

    TestScope {
        scope,
        guest,
        alerts,
        activity,
        container,
    }
}

pub async fn build_scope(ids: &[&str]) -> TestScope {
    build_scope_with(&HostConfig::default(), ids).await
}

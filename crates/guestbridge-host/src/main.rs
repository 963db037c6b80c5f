//! Guestbridge demo host: wires one guest scope to an in-process guest and
//! walks it through loading, navigation and an authoring round trip.

use std::error::Error;
use std::rc::Rc;
use std::sync::Mutex;

use async_trait::async_trait;
use guestbridge_core::collaborator::{
    ActivityObserver, AlertPresenter, ContainerLifecycle, EntryPoint,
};
use guestbridge_core::envelope::RequestEnvelope;
use guestbridge_core::error::DomainError;
use guestbridge_core::repository::{StateRepository, StoredState};
use guestbridge_host::config::HostConfig;
use guestbridge_host::scope::{Collaborators, GuestScope};
use guestbridge_host::telemetry;
use guestbridge_protocol::handler::TypedHandler;
use guestbridge_protocol::messages::outbound::{SetAuthoring, SetState};
use guestbridge_protocol::registry::HandlerRegistry;
use serde_json::{Value, json};
use tracing::info;

struct LogCollaborators;

impl AlertPresenter for LogCollaborators {
    fn present_validation_alert(&self, message: &str) {
        info!(alert = message, "validation alert");
    }
}

impl ActivityObserver for LogCollaborators {
    fn end_of_activity(&self, scope_id: &str) {
        info!(scope_id, "end of activity");
    }

    fn results_submitted(
        &self,
        scope_id: &str,
        result_type: &str,
        result: &Value,
        description: Option<&str>,
    ) {
        info!(scope_id, result_type, %result, description, "results submitted");
    }
}

impl ContainerLifecycle for LogCollaborators {
    fn mounted(&self, scope_id: &str) {
        info!(scope_id, "container mounted");
    }

    fn unmounted(&self, scope_id: &str) {
        info!(scope_id, "container unmounted");
    }
}

struct InMemoryStates(Mutex<Vec<StoredState>>);

#[async_trait]
impl StateRepository for InMemoryStates {
    async fn load_states(&self, _scope_id: &str) -> Result<Vec<StoredState>, DomainError> {
        let states = self
            .0
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("state store poisoned: {e}")))?;
        Ok(states.clone())
    }

    async fn save_states(&self, _scope_id: &str, states: &[StoredState]) -> Result<(), DomainError> {
        let mut stored = self
            .0
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("state store poisoned: {e}")))?;
        *stored = states.to_vec();
        Ok(())
    }
}

fn quiz_state(id: &str, question: &str) -> StoredState {
    StoredState {
        id: id.to_owned(),
        name: question.to_owned(),
        data: json!({ "question": question }),
        asset_refs: Vec::new(),
        owner_app_id: "quiz".to_owned(),
    }
}

/// A guest that renders by logging what the host sends it.
fn demo_guest() -> Rc<HandlerRegistry> {
    let guest = Rc::new(HandlerRegistry::new());
    guest.register(TypedHandler::<SetState>::new(|request: SetState| {
        info!(state_id = %request.state.id, navigation = ?request.navigation, "guest rendering state");
    }));
    guest.register(TypedHandler::<SetAuthoring>::new(|request: SetAuthoring| {
        info!(is_authoring = request.is_authoring, "guest authoring mode");
    }));
    guest
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = HostConfig::from_env()?;
    telemetry::init_tracing(config.log_format)?;

    info!("Starting Guestbridge demo host");

    let collaborators = Rc::new(LogCollaborators);
    let scope = GuestScope::new(
        "demo-scope",
        "quiz",
        &config,
        Collaborators::new(collaborators.clone(), collaborators.clone(), collaborators),
    );
    scope.connect_guest(demo_guest());

    let repo = InMemoryStates(Mutex::new(vec![
        quiz_state("q1", "What is 2 + 2?"),
        quiz_state("q2", "Name a prime number"),
    ]));
    scope.load_states(&repo).await?;
    scope.mount();

    // Guest-originated traffic goes through the host's entry point.
    let host = scope.entry_point();
    host.receive(RequestEnvelope::new("GO_TO_NEXT_STATE", 1));
    host.receive(RequestEnvelope::new("SUBMIT_RESULTS", 2).with_payload(json!({
        "resultType": "HIT_V1",
        "result": { "success": true },
        "description": "Q2",
    })));

    scope.start_new_state()?;
    host.receive(
        RequestEnvelope::new("SET_STATE_DATA", 1)
            .with_payload(json!({ "data": { "question": "Pick a colour" } })),
    );
    scope.finish_editing()?;

    let export = scope.save_states(&repo).await?;
    info!(
        count = export.states.len(),
        content_hash = %export.content_hash,
        "Demo session complete"
    );

    Ok(())
}

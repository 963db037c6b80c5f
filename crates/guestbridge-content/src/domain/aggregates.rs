//! Aggregate roots for the content context.

use std::collections::{HashMap, HashSet};

use guestbridge_core::aggregate::AggregateRoot;
use guestbridge_core::clock::Clock;
use guestbridge_core::event::EventMetadata;
use guestbridge_core::ids::IdGenerator;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::events::{
    ActiveStateChanged, ContentEvent, ContentEventKind, StateDataUpdated, StateDeleted,
    StateDuplicated, StateInserted, StateRenamed, StatesReplaced,
};
use super::state::State;

/// The ordered sequence of states for one guest scope, plus the
/// active-state pointer.
///
/// Order is meaningful: it defines "next" and "previous". If set,
/// `active_state_id` always names a state in the sequence. Operations on
/// unknown ids are logged no-ops.
#[derive(Debug)]
pub struct StateMachine {
    /// Aggregate identifier (the guest scope id).
    pub id: String,
    /// Current version (event count).
    pub(crate) version: i64,
    /// State ids in sequence order.
    order: Vec<String>,
    /// States by id.
    states: HashMap<String, State>,
    /// The state currently presented.
    active_state_id: Option<String>,
    /// Events recorded since the last drain.
    uncommitted_events: Vec<ContentEvent>,
}

impl StateMachine {
    /// Creates an empty state machine.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: 0,
            order: Vec::new(),
            states: HashMap::new(),
            active_state_id: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Number of states in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// State ids in sequence order.
    #[must_use]
    pub fn state_ids(&self) -> &[String] {
        &self.order
    }

    /// States in sequence order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.order.iter().filter_map(|id| self.states.get(id))
    }

    /// Looks up a state by id.
    #[must_use]
    pub fn get_state_by_id(&self, id: &str) -> Option<&State> {
        self.states.get(id)
    }

    /// Whether a state with this id is in the sequence.
    #[must_use]
    pub fn has_state(&self, id: &str) -> bool {
        self.states.contains_key(id)
    }

    /// Index of a state in the sequence.
    #[must_use]
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|candidate| candidate == id)
    }

    /// The active state id, if any.
    #[must_use]
    pub fn active_state_id(&self) -> Option<&str> {
        self.active_state_id.as_deref()
    }

    /// The active state, if any.
    #[must_use]
    pub fn active_state(&self) -> Option<&State> {
        self.active_state_id
            .as_deref()
            .and_then(|id| self.states.get(id))
    }

    /// The state after the active one. `None` at the end of the sequence
    /// or when nothing is active.
    #[must_use]
    pub fn next_state_id(&self) -> Option<&str> {
        let position = self.position_of(self.active_state_id.as_deref()?)?;
        self.order.get(position + 1).map(String::as_str)
    }

    /// The state before the active one. `None` at the start of the
    /// sequence or when nothing is active.
    #[must_use]
    pub fn previous_state_id(&self) -> Option<&str> {
        let position = self.position_of(self.active_state_id.as_deref()?)?;
        let previous = position.checked_sub(1)?;
        self.order.get(previous).map(String::as_str)
    }

    /// The state after the active one.
    #[must_use]
    pub fn next_state(&self) -> Option<&State> {
        self.next_state_id().and_then(|id| self.states.get(id))
    }

    /// The state before the active one.
    #[must_use]
    pub fn previous_state(&self) -> Option<&State> {
        self.previous_state_id().and_then(|id| self.states.get(id))
    }

    /// Where a newly authored state goes: right after the active state, or
    /// at the end when nothing is active.
    #[must_use]
    pub fn insertion_index(&self) -> usize {
        self.active_state_id
            .as_deref()
            .and_then(|id| self.position_of(id))
            .map_or(self.order.len(), |position| position + 1)
    }

    /// Replaces the whole sequence. Later duplicates of an id are dropped
    /// with a warning. The active state is kept if it is still present.
    pub fn set_states(&mut self, states: Vec<State>, clock: &dyn Clock) {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(states.len());
        for state in states {
            if seen.insert(state.id.clone()) {
                unique.push(state);
            } else {
                warn!(scope_id = %self.id, state_id = %state.id, "dropping duplicate state id");
            }
        }
        self.record(
            ContentEventKind::StatesReplaced(StatesReplaced { states: unique }),
            clock,
        );
    }

    /// Moves the active pointer. Returns `false` (with a warning) when the
    /// id is not in the sequence.
    pub fn set_active_state_by_id(&mut self, id: &str, clock: &dyn Clock) -> bool {
        if !self.has_state(id) {
            warn!(scope_id = %self.id, state_id = id, "cannot activate unknown state");
            return false;
        }
        if self.active_state_id.as_deref() == Some(id) {
            return true;
        }
        self.record_active_change(Some(id.to_owned()), clock);
        true
    }

    /// Removes a state. When it was active, the following state becomes
    /// active, else the preceding one, else nothing. Returns `false` (with
    /// a warning) when the id is not in the sequence.
    pub fn delete_state(&mut self, id: &str, clock: &dyn Clock) -> bool {
        let Some(position) = self.position_of(id) else {
            warn!(scope_id = %self.id, state_id = id, "cannot delete unknown state");
            return false;
        };

        if self.active_state_id.as_deref() == Some(id) {
            let replacement = self
                .order
                .get(position + 1)
                .or_else(|| position.checked_sub(1).and_then(|p| self.order.get(p)))
                .cloned();
            self.record_active_change(replacement, clock);
        }

        self.record(
            ContentEventKind::StateDeleted(StateDeleted {
                state_id: id.to_owned(),
                position,
            }),
            clock,
        );
        true
    }

    /// Copies a state under a fresh id and inserts the copy right after the
    /// source. Returns the new id, or `None` (with a warning) when the
    /// source is not in the sequence.
    pub fn duplicate_state(
        &mut self,
        id: &str,
        ids: &mut dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Option<String> {
        let Some(position) = self.position_of(id) else {
            warn!(scope_id = %self.id, state_id = id, "cannot duplicate unknown state");
            return None;
        };
        let source = self.states.get(id)?;

        let mut new_id = ids.next_id();
        while self.has_state(&new_id) {
            debug!(state_id = %new_id, "generated id already in use, drawing another");
            new_id = ids.next_id();
        }
        let copy = source.duplicate_as(new_id.clone());

        self.record(
            ContentEventKind::StateDuplicated(StateDuplicated {
                source_id: id.to_owned(),
                state: copy,
                position: position + 1,
            }),
            clock,
        );
        Some(new_id)
    }

    /// Inserts a new state at [`insertion_index`](Self::insertion_index)
    /// and makes it active. Returns `false` (with a warning) when the id is
    /// already taken.
    pub fn insert_after_active(&mut self, state: State, clock: &dyn Clock) -> bool {
        if self.has_state(&state.id) {
            warn!(scope_id = %self.id, state_id = %state.id, "cannot insert state with existing id");
            return false;
        }
        let state_id = state.id.clone();
        let position = self.insertion_index();
        self.record(
            ContentEventKind::StateInserted(StateInserted { state, position }),
            clock,
        );
        self.record_active_change(Some(state_id), clock);
        true
    }

    /// Replaces a state's content in place. `None` asset references keep
    /// the current ones.
    pub fn update_state_data(
        &mut self,
        id: &str,
        data: Value,
        asset_refs: Option<Vec<String>>,
        clock: &dyn Clock,
    ) -> bool {
        let Some(state) = self.states.get(id) else {
            warn!(scope_id = %self.id, state_id = id, "cannot update unknown state");
            return false;
        };
        let asset_refs = asset_refs.unwrap_or_else(|| state.asset_refs.clone());
        self.record(
            ContentEventKind::StateDataUpdated(StateDataUpdated {
                state_id: id.to_owned(),
                data,
                asset_refs,
            }),
            clock,
        );
        true
    }

    /// Renames a state.
    pub fn rename_state(&mut self, id: &str, name: impl Into<String>, clock: &dyn Clock) -> bool {
        if !self.has_state(id) {
            warn!(scope_id = %self.id, state_id = id, "cannot rename unknown state");
            return false;
        }
        self.record(
            ContentEventKind::StateRenamed(StateRenamed {
                state_id: id.to_owned(),
                name: name.into(),
            }),
            clock,
        );
        true
    }

    fn record_active_change(&mut self, state_id: Option<String>, clock: &dyn Clock) {
        let previous_id = self.active_state_id.clone();
        self.record(
            ContentEventKind::ActiveStateChanged(ActiveStateChanged {
                previous_id,
                state_id,
            }),
            clock,
        );
    }

    /// Applies `kind` immediately and keeps it as an uncommitted event.
    fn record(&mut self, kind: ContentEventKind, clock: &dyn Clock) {
        let event = ContentEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id.clone(),
                sequence_number: self.version + 1,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }

    fn insert_at(&mut self, state: &State, position: usize) {
        let position = position.min(self.order.len());
        self.order.insert(position, state.id.clone());
        self.states.insert(state.id.clone(), state.clone());
    }
}

impl AggregateRoot for StateMachine {
    type Event = ContentEvent;

    fn aggregate_id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            ContentEventKind::StatesReplaced(payload) => {
                self.order = payload.states.iter().map(|s| s.id.clone()).collect();
                self.states = payload
                    .states
                    .iter()
                    .map(|s| (s.id.clone(), s.clone()))
                    .collect();
                if self
                    .active_state_id
                    .as_ref()
                    .is_some_and(|active| !self.states.contains_key(active))
                {
                    self.active_state_id = None;
                }
            }
            ContentEventKind::StateInserted(payload) => {
                self.insert_at(&payload.state, payload.position);
            }
            ContentEventKind::StateDuplicated(payload) => {
                self.insert_at(&payload.state, payload.position);
            }
            ContentEventKind::StateDeleted(payload) => {
                self.order.retain(|id| id != &payload.state_id);
                self.states.remove(&payload.state_id);
                if self.active_state_id.as_deref() == Some(payload.state_id.as_str()) {
                    self.active_state_id = None;
                }
            }
            ContentEventKind::ActiveStateChanged(payload) => {
                self.active_state_id.clone_from(&payload.state_id);
            }
            ContentEventKind::StateDataUpdated(payload) => {
                if let Some(state) = self.states.get_mut(&payload.state_id) {
                    state.data = payload.data.clone();
                    state.asset_refs.clone_from(&payload.asset_refs);
                }
            }
            ContentEventKind::StateRenamed(payload) => {
                if let Some(state) = self.states.get_mut(&payload.state_id) {
                    state.name.clone_from(&payload.name);
                }
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }
}

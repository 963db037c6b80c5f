//! Change events for the content context.

use guestbridge_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::State;

/// Event type for [`StatesReplaced`].
pub const STATES_REPLACED_EVENT_TYPE: &str = "content.states_replaced";
/// Event type for [`StateInserted`].
pub const STATE_INSERTED_EVENT_TYPE: &str = "content.state_inserted";
/// Event type for [`StateDuplicated`].
pub const STATE_DUPLICATED_EVENT_TYPE: &str = "content.state_duplicated";
/// Event type for [`StateDeleted`].
pub const STATE_DELETED_EVENT_TYPE: &str = "content.state_deleted";
/// Event type for [`ActiveStateChanged`].
pub const ACTIVE_STATE_CHANGED_EVENT_TYPE: &str = "content.active_state_changed";
/// Event type for [`StateDataUpdated`].
pub const STATE_DATA_UPDATED_EVENT_TYPE: &str = "content.state_data_updated";
/// Event type for [`StateRenamed`].
pub const STATE_RENAMED_EVENT_TYPE: &str = "content.state_renamed";

/// Emitted when the whole sequence is replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatesReplaced {
    /// The new sequence, in order, without duplicate ids.
    pub states: Vec<State>,
}

/// Emitted when a new state is inserted into the sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateInserted {
    /// The inserted state.
    pub state: State,
    /// Index of the state after insertion.
    pub position: usize,
}

/// Emitted when a state is copied under a new id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDuplicated {
    /// The state that was copied.
    pub source_id: String,
    /// The copy.
    pub state: State,
    /// Index of the copy after insertion.
    pub position: usize,
}

/// Emitted when a state is removed from the sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDeleted {
    /// The removed state id.
    pub state_id: String,
    /// Index the state occupied before removal.
    pub position: usize,
}

/// Emitted when the active-state pointer moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveStateChanged {
    /// The previously active state.
    pub previous_id: Option<String>,
    /// The newly active state.
    pub state_id: Option<String>,
}

/// Emitted when a state's content is replaced in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDataUpdated {
    /// The updated state id.
    pub state_id: String,
    /// New content blob.
    pub data: Value,
    /// New asset references.
    pub asset_refs: Vec<String>,
}

/// Emitted when a state's display name changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRenamed {
    /// The renamed state id.
    pub state_id: String,
    /// New display name.
    pub name: String,
}

/// Event payload variants for the content context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContentEventKind {
    /// The sequence was replaced.
    StatesReplaced(StatesReplaced),
    /// A state was inserted.
    StateInserted(StateInserted),
    /// A state was duplicated.
    StateDuplicated(StateDuplicated),
    /// A state was deleted.
    StateDeleted(StateDeleted),
    /// The active state changed.
    ActiveStateChanged(ActiveStateChanged),
    /// A state's content changed.
    StateDataUpdated(StateDataUpdated),
    /// A state was renamed.
    StateRenamed(StateRenamed),
}

impl ContentEventKind {
    /// Returns the event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StatesReplaced(_) => STATES_REPLACED_EVENT_TYPE,
            Self::StateInserted(_) => STATE_INSERTED_EVENT_TYPE,
            Self::StateDuplicated(_) => STATE_DUPLICATED_EVENT_TYPE,
            Self::StateDeleted(_) => STATE_DELETED_EVENT_TYPE,
            Self::ActiveStateChanged(_) => ACTIVE_STATE_CHANGED_EVENT_TYPE,
            Self::StateDataUpdated(_) => STATE_DATA_UPDATED_EVENT_TYPE,
            Self::StateRenamed(_) => STATE_RENAMED_EVENT_TYPE,
        }
    }
}

/// Change event envelope for the content context.
#[derive(Debug, Clone)]
pub struct ContentEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ContentEventKind,
}

impl DomainEvent for ContentEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Derived `Serialize` into `Value` cannot fail.
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guestbridge_test_support::fixed_now;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_payload_is_tagged_by_variant() {
        let event = ContentEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: STATE_DELETED_EVENT_TYPE.to_owned(),
                aggregate_id: "scope-1".to_owned(),
                sequence_number: 3,
                occurred_at: fixed_now(),
            },
            kind: ContentEventKind::StateDeleted(StateDeleted {
                state_id: "s2".to_owned(),
                position: 1,
            }),
        };

        assert_eq!(event.event_type(), "content.state_deleted");
        assert_eq!(
            event.to_payload(),
            json!({ "StateDeleted": { "state_id": "s2", "position": 1 } })
        );
    }
}

//! The `State` entity: one authored unit of content.

use guestbridge_core::repository::StoredState;
use guestbridge_protocol::messages::outbound::StatePayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One authored unit of content ("slide"). Identity is by `id`; `data` is
/// opaque to the host and only interpreted by the owning guest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Unique state identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Opaque content blob.
    pub data: Value,
    /// Ordered opaque asset references.
    pub asset_refs: Vec<String>,
    /// The guest application that owns this state.
    pub owner_app_id: String,
}

impl State {
    /// Creates an empty, unnamed state.
    #[must_use]
    pub fn new(id: impl Into<String>, owner_app_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            data: Value::Null,
            asset_refs: Vec::new(),
            owner_app_id: owner_app_id.into(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the content blob.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Sets the asset references.
    #[must_use]
    pub fn with_asset_refs(mut self, asset_refs: Vec<String>) -> Self {
        self.asset_refs = asset_refs;
        self
    }

    /// Copies name, data and asset references under a new id.
    #[must_use]
    pub fn duplicate_as(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }

    /// The guest-facing view of this state.
    #[must_use]
    pub fn to_payload(&self) -> StatePayload {
        StatePayload {
            id: self.id.clone(),
            name: self.name.clone(),
            data: self.data.clone(),
            asset_refs: self.asset_refs.clone(),
        }
    }
}

impl From<StoredState> for State {
    fn from(stored: StoredState) -> Self {
        Self {
            id: stored.id,
            name: stored.name,
            data: stored.data,
            asset_refs: stored.asset_refs,
            owner_app_id: stored.owner_app_id,
        }
    }
}

impl From<&State> for StoredState {
    fn from(state: &State) -> Self {
        Self {
            id: state.id.clone(),
            name: state.name.clone(),
            data: state.data.clone(),
            asset_refs: state.asset_refs.clone(),
            owner_app_id: state.owner_app_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicate_copies_content_under_new_id() {
        let original = State::new("s1", "quiz")
            .with_name("Intro")
            .with_data(json!({ "title": "Hello" }))
            .with_asset_refs(vec!["img-1".to_owned()]);

        let copy = original.duplicate_as("s2");

        assert_eq!(copy.id, "s2");
        assert_eq!(copy.name, original.name);
        assert_eq!(copy.data, original.data);
        assert_eq!(copy.asset_refs, original.asset_refs);
        assert_eq!(copy.owner_app_id, "quiz");
    }

    #[test]
    fn test_stored_state_conversion_keeps_every_field() {
        let state = State::new("s1", "quiz")
            .with_name("Intro")
            .with_asset_refs(vec!["a".to_owned(), "b".to_owned()]);

        let restored = State::from(StoredState::from(&state));

        assert_eq!(restored, state);
    }
}

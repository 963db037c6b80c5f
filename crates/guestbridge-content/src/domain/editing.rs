//! The editing session: tracks which state, if any, is being authored and
//! whether the guest has flagged the current draft as invalid.

use guestbridge_core::error::DomainError;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::state::State;

/// Authoring mode of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Nothing is being edited.
    Idle,
    /// A new, not-yet-inserted state is being drafted.
    EditingNew,
    /// An existing state is being edited in place.
    EditingExisting,
}

/// What an open session is editing.
#[derive(Debug, Clone, PartialEq)]
pub enum EditTarget {
    /// A draft that joins the sequence only when the edit finishes.
    New(State),
    /// The id of a state already in the sequence.
    Existing(String),
}

/// Per-scope authoring state.
#[derive(Debug, Default)]
pub struct EditingSession {
    target: Option<EditTarget>,
    validation_message: Option<String>,
}

impl EditingSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current mode, derived from the edit target.
    #[must_use]
    pub fn mode(&self) -> EditMode {
        match self.target {
            None => EditMode::Idle,
            Some(EditTarget::New(_)) => EditMode::EditingNew,
            Some(EditTarget::Existing(_)) => EditMode::EditingExisting,
        }
    }

    /// Whether a session is open.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.target.is_some()
    }

    /// Id of the state under edit, draft or existing.
    #[must_use]
    pub fn editing_state_id(&self) -> Option<&str> {
        match &self.target {
            None => None,
            Some(EditTarget::New(draft)) => Some(draft.id.as_str()),
            Some(EditTarget::Existing(id)) => Some(id.as_str()),
        }
    }

    /// The draft, when editing a new state.
    #[must_use]
    pub fn draft(&self) -> Option<&State> {
        match &self.target {
            Some(EditTarget::New(draft)) => Some(draft),
            _ => None,
        }
    }

    /// Mutable access to the draft, when editing a new state.
    pub fn draft_mut(&mut self) -> Option<&mut State> {
        match &mut self.target {
            Some(EditTarget::New(draft)) => Some(draft),
            _ => None,
        }
    }

    /// The validation message currently blocking [`finish`](Self::finish).
    #[must_use]
    pub fn validation_message(&self) -> Option<&str> {
        self.validation_message.as_deref()
    }

    /// Opens a session on a new draft.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EditInProgress` if a session is already open.
    pub fn start_new(&mut self, draft: State) -> Result<(), DomainError> {
        self.ensure_idle()?;
        debug!(state_id = %draft.id, "editing new state");
        self.target = Some(EditTarget::New(draft));
        self.validation_message = None;
        Ok(())
    }

    /// Opens a session on an existing state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EditInProgress` if a session is already open.
    pub fn start_existing(&mut self, state_id: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_idle()?;
        let state_id = state_id.into();
        debug!(state_id = %state_id, "editing existing state");
        self.target = Some(EditTarget::Existing(state_id));
        self.validation_message = None;
        Ok(())
    }

    /// Closes the session and hands back what was edited.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotEditing` when idle, or
    /// `DomainError::Validation` carrying the pending message. A rejected
    /// finish leaves the session open.
    pub fn finish(&mut self) -> Result<EditTarget, DomainError> {
        if !self.is_editing() {
            return Err(DomainError::NotEditing);
        }
        if let Some(message) = &self.validation_message {
            return Err(DomainError::Validation(message.clone()));
        }
        self.target.take().ok_or(DomainError::NotEditing)
    }

    /// Abandons the session. A draft is discarded; in-place edits to an
    /// existing state are kept. Returns what was being edited.
    pub fn cancel(&mut self) -> Option<EditTarget> {
        self.validation_message = None;
        self.target.take()
    }

    /// Records the guest's validation verdict. An empty message clears it.
    /// Ignored with a warning when no session is open.
    pub fn set_validation_message(&mut self, message: Option<String>) {
        if self.target.is_none() {
            warn!("validation message received while not editing, ignoring");
            return;
        }
        self.validation_message = message.filter(|m| !m.is_empty());
    }

    /// Replaces the draft's content. Returns `false` when there is no draft.
    pub fn update_draft(&mut self, data: Value, asset_refs: Option<Vec<String>>) -> bool {
        let Some(EditTarget::New(draft)) = &mut self.target else {
            return false;
        };
        draft.data = data;
        if let Some(asset_refs) = asset_refs {
            draft.asset_refs = asset_refs;
        }
        true
    }

    fn ensure_idle(&self) -> Result<(), DomainError> {
        if self.is_editing() {
            return Err(DomainError::EditInProgress);
        }
        Ok(())
    }
}

//! Commands for the content context.

use guestbridge_core::command::Command;

/// Command to open an edit session on an existing state. Without a
/// `state_id` the active state is edited.
#[derive(Debug, Clone, Default)]
pub struct StartEditing {
    /// The state to edit.
    pub state_id: Option<String>,
}

impl Command for StartEditing {
    fn command_type(&self) -> &'static str {
        "content.start_editing"
    }
}

/// Command to open an edit session on a fresh draft.
#[derive(Debug, Clone, Default)]
pub struct StartNewState;

impl Command for StartNewState {
    fn command_type(&self) -> &'static str {
        "content.start_new_state"
    }
}

/// Command to finalize the open edit session.
#[derive(Debug, Clone, Default)]
pub struct FinishEditing;

impl Command for FinishEditing {
    fn command_type(&self) -> &'static str {
        "content.finish_editing"
    }
}

/// Command to abandon the open edit session.
#[derive(Debug, Clone, Default)]
pub struct CancelEdit;

impl Command for CancelEdit {
    fn command_type(&self) -> &'static str {
        "content.cancel_edit"
    }
}

/// Command to remove a state from the sequence.
#[derive(Debug, Clone)]
pub struct DeleteState {
    /// The state to remove.
    pub state_id: String,
}

impl Command for DeleteState {
    fn command_type(&self) -> &'static str {
        "content.delete_state"
    }
}

/// Command to copy a state in place.
#[derive(Debug, Clone)]
pub struct DuplicateState {
    /// The state to copy.
    pub state_id: String,
}

impl Command for DuplicateState {
    fn command_type(&self) -> &'static str {
        "content.duplicate_state"
    }
}

/// Command to give a state, or the open draft, a new name.
#[derive(Debug, Clone)]
pub struct RenameState {
    /// The state or draft to rename.
    pub state_id: String,
    /// The new name.
    pub name: String,
}

impl Command for RenameState {
    fn command_type(&self) -> &'static str {
        "content.rename_state"
    }
}

/// Command to move presentation to the following state.
#[derive(Debug, Clone, Default)]
pub struct AdvanceState;

impl Command for AdvanceState {
    fn command_type(&self) -> &'static str {
        "content.advance_state"
    }
}

/// Command to move presentation to the preceding state.
#[derive(Debug, Clone, Default)]
pub struct RetreatState;

impl Command for RetreatState {
    fn command_type(&self) -> &'static str {
        "content.retreat_state"
    }
}

/// Command to present a specific state.
#[derive(Debug, Clone)]
pub struct SelectState {
    /// The state to present.
    pub state_id: String,
}

impl Command for SelectState {
    fn command_type(&self) -> &'static str {
        "content.select_state"
    }
}

/// Command to push the active state to the guest again.
#[derive(Debug, Clone, Default)]
pub struct PresentActiveState;

impl Command for PresentActiveState {
    fn command_type(&self) -> &'static str {
        "content.present_active_state"
    }
}

//! Authoring lifecycle use-cases.
//!
//! Entering edit mode always sends two commands in a fixed order: the
//! content (`SET_STATE`) first, then `SET_AUTHORING` true. Leaving edit
//! mode only sends `SET_AUTHORING` false.

use guestbridge_core::error::DomainError;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::application::context::ContentContext;
use crate::domain::commands::{
    CancelEdit, DeleteState, DuplicateState, FinishEditing, RenameState, StartEditing,
    StartNewState,
};
use crate::domain::editing::EditTarget;
use crate::domain::state::State;

/// What a successful [`handle_finish_editing`] committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditResult {
    /// A new state was inserted under this id.
    Created(String),
    /// An existing state was edited in place.
    Updated(String),
}

/// Handles the `StartEditing` command: activates the target state and opens
/// an edit session on it.
///
/// # Errors
///
/// Returns `DomainError::EditInProgress` if a session is open,
/// `DomainError::NoActiveState` if no target was given and nothing is
/// active, or `DomainError::StateNotFound` for an unknown target.
#[instrument(skip(ctx), fields(scope_id = %ctx.scope_id()))]
pub fn handle_start_editing(
    command: &StartEditing,
    ctx: &ContentContext,
) -> Result<String, DomainError> {
    if ctx.session().is_editing() {
        return Err(DomainError::EditInProgress);
    }

    let state_id = match &command.state_id {
        Some(id) => id.clone(),
        None => ctx
            .machine()
            .active_state_id()
            .map(str::to_owned)
            .ok_or(DomainError::NoActiveState)?,
    };

    {
        let mut machine = ctx.machine_mut();
        if !machine.has_state(&state_id) {
            return Err(DomainError::StateNotFound(state_id));
        }
        machine.set_active_state_by_id(&state_id, ctx.clock());
    }
    ctx.session_mut().start_existing(state_id.clone())?;

    ctx.push_active_state();
    ctx.set_authoring(true);

    info!(state_id = %state_id, "editing existing state");
    Ok(state_id)
}

/// Handles the `StartNewState` command: opens an edit session on a fresh
/// draft that is not part of the sequence yet.
///
/// # Errors
///
/// Returns `DomainError::EditInProgress` if a session is open.
#[instrument(skip(ctx), fields(scope_id = %ctx.scope_id()))]
pub fn handle_start_new_state(
    _command: &StartNewState,
    ctx: &ContentContext,
) -> Result<String, DomainError> {
    if ctx.session().is_editing() {
        return Err(DomainError::EditInProgress);
    }

    let draft = State::new(ctx.fresh_state_id(), ctx.owner_app_id());
    let payload = draft.to_payload();
    let state_id = draft.id.clone();
    ctx.session_mut().start_new(draft)?;

    let hints = ctx.draft_hints();
    ctx.push_state(payload, hints);
    ctx.set_authoring(true);

    info!(state_id = %state_id, "drafting new state");
    Ok(state_id)
}

/// Handles the `FinishEditing` command.
///
/// A pending validation message blocks the finish: the alert collaborator
/// is shown the message once and the session stays open. A finished draft
/// gets a default name if it has none and is inserted after the active
/// state, becoming active. A draft whose id was taken while it was being
/// edited is given a fresh id first.
///
/// # Errors
///
/// Returns `DomainError::Validation` when blocked, or
/// `DomainError::NotEditing` when no session is open.
#[instrument(skip(ctx), fields(scope_id = %ctx.scope_id()))]
pub fn handle_finish_editing(
    _command: &FinishEditing,
    ctx: &ContentContext,
) -> Result<EditResult, DomainError> {
    let draft_id = ctx.session().draft().map(|draft| draft.id.clone());
    if let Some(taken) = draft_id.filter(|id| ctx.machine().has_state(id)) {
        let fresh = ctx.fresh_state_id();
        warn!(taken = %taken, state_id = %fresh, "draft id was taken while editing, reassigning");
        if let Some(draft) = ctx.session_mut().draft_mut() {
            draft.id = fresh;
        }
    }

    let finished = ctx.session_mut().finish();
    let target = match finished {
        Ok(target) => target,
        Err(DomainError::Validation(message)) => {
            warn!(message = %message, "finish editing blocked by validation message");
            ctx.alerts().present_validation_alert(&message);
            return Err(DomainError::Validation(message));
        }
        Err(other) => return Err(other),
    };

    let result = match target {
        EditTarget::New(mut draft) => {
            let mut machine = ctx.machine_mut();
            if draft.name.trim().is_empty() {
                draft.name = format!(
                    "{} {}",
                    ctx.default_state_name(),
                    machine.insertion_index() + 1
                );
            }
            let state_id = draft.id.clone();
            machine.insert_after_active(draft, ctx.clock());
            EditResult::Created(state_id)
        }
        EditTarget::Existing(state_id) => EditResult::Updated(state_id),
    };

    ctx.set_authoring(false);

    info!(result = ?result, "finished editing");
    Ok(result)
}

/// Handles the `CancelEdit` command. A draft is discarded; in-place edits to
/// an existing state are kept.
///
/// # Errors
///
/// Returns `DomainError::NotEditing` when no session is open.
#[instrument(skip(ctx), fields(scope_id = %ctx.scope_id()))]
pub fn handle_cancel_edit(_command: &CancelEdit, ctx: &ContentContext) -> Result<(), DomainError> {
    let cancelled = ctx.session_mut().cancel();
    let Some(target) = cancelled else {
        return Err(DomainError::NotEditing);
    };

    ctx.set_authoring(false);

    match target {
        EditTarget::New(draft) => info!(state_id = %draft.id, "discarded draft"),
        EditTarget::Existing(state_id) => info!(state_id = %state_id, "stopped editing"),
    }
    Ok(())
}

/// Handles the `DeleteState` command. Unknown ids are a logged no-op and
/// yield `Ok(false)`. When idle, the guest is sent the (possibly new)
/// active state.
///
/// # Errors
///
/// Returns `DomainError::EditInProgress` when the state is being edited.
#[instrument(skip(ctx), fields(scope_id = %ctx.scope_id()))]
pub fn handle_delete_state(
    command: &DeleteState,
    ctx: &ContentContext,
) -> Result<bool, DomainError> {
    if ctx.session().editing_state_id() == Some(command.state_id.as_str()) {
        return Err(DomainError::EditInProgress);
    }

    let deleted = ctx
        .machine_mut()
        .delete_state(&command.state_id, ctx.clock());

    if deleted && !ctx.session().is_editing() {
        ctx.push_active_state();
    }
    Ok(deleted)
}

/// Handles the `DuplicateState` command. Unknown ids are a logged no-op and
/// yield `None`.
#[instrument(skip(ctx), fields(scope_id = %ctx.scope_id()))]
pub fn handle_duplicate_state(command: &DuplicateState, ctx: &ContentContext) -> Option<String> {
    let new_id = ctx.with_ids(|machine, ids, clock| {
        machine.duplicate_state(&command.state_id, ids, clock)
    });

    if new_id.is_some() && !ctx.session().is_editing() {
        ctx.push_active_state();
    }
    new_id
}

/// Handles the `RenameState` command. Renames the draft when its id is
/// given, otherwise the state in the sequence. When idle and the renamed
/// state is active, the guest is sent the new name.
///
/// # Errors
///
/// Returns `DomainError::StateNotFound` for an unknown id.
#[instrument(skip(ctx), fields(scope_id = %ctx.scope_id()))]
pub fn handle_rename_state(command: &RenameState, ctx: &ContentContext) -> Result<(), DomainError> {
    {
        let mut session = ctx.session_mut();
        if let Some(draft) = session
            .draft_mut()
            .filter(|draft| draft.id == command.state_id)
        {
            draft.name.clone_from(&command.name);
            return Ok(());
        }
    }

    let renamed = ctx
        .machine_mut()
        .rename_state(&command.state_id, command.name.clone(), ctx.clock());
    if !renamed {
        return Err(DomainError::StateNotFound(command.state_id.clone()));
    }

    let is_active = ctx.machine().active_state_id() == Some(command.state_id.as_str());
    if is_active && !ctx.session().is_editing() {
        ctx.push_active_state();
    }
    Ok(())
}

/// Applies a guest `SET_STATE_DATA`: replaces the draft's content or the
/// state under edit in place.
///
/// # Errors
///
/// Returns `DomainError::NotEditing` (after a warning) when no session is
/// open.
pub fn handle_update_state_data(
    data: Value,
    asset_refs: Option<Vec<String>>,
    ctx: &ContentContext,
) -> Result<(), DomainError> {
    let editing = ctx.session().editing_state_id().map(str::to_owned);
    let Some(state_id) = editing else {
        warn!(scope_id = %ctx.scope_id(), "state data received while not editing, ignoring");
        return Err(DomainError::NotEditing);
    };

    if ctx.session_mut().update_draft(data.clone(), asset_refs.clone()) {
        return Ok(());
    }
    ctx.machine_mut()
        .update_state_data(&state_id, data, asset_refs, ctx.clock());
    Ok(())
}

/// Applies a guest `SET_VALIDATION_MESSAGE`.
pub fn handle_set_validation_message(message: Option<String>, ctx: &ContentContext) {
    ctx.session_mut().set_validation_message(message);
}

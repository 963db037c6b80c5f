//! Navigation use-cases: moving the active-state pointer and presenting the
//! result to the guest.

use guestbridge_core::error::DomainError;
use tracing::{debug, info, instrument};

use crate::application::context::ContentContext;
use crate::domain::commands::{AdvanceState, PresentActiveState, RetreatState, SelectState};

/// Where a navigation command left the scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The given state is now active and was sent to the guest.
    Moved(String),
    /// There was no following state; the activity observer was notified.
    EndOfActivity,
    /// Nothing changed.
    Unchanged,
}

fn ensure_idle(ctx: &ContentContext) -> Result<(), DomainError> {
    if ctx.session().is_editing() {
        return Err(DomainError::EditInProgress);
    }
    Ok(())
}

fn move_to(ctx: &ContentContext, state_id: String) -> NavigationOutcome {
    let moved = ctx
        .machine_mut()
        .set_active_state_by_id(&state_id, ctx.clock());
    if !moved {
        return NavigationOutcome::Unchanged;
    }
    ctx.push_active_state();
    NavigationOutcome::Moved(state_id)
}

/// Handles the `AdvanceState` command. Past the last state the activity
/// observer receives an end-of-activity signal instead.
///
/// # Errors
///
/// Returns `DomainError::EditInProgress` while a session is open.
#[instrument(skip(ctx), fields(scope_id = %ctx.scope_id()))]
pub fn handle_advance_state(
    _command: &AdvanceState,
    ctx: &ContentContext,
) -> Result<NavigationOutcome, DomainError> {
    ensure_idle(ctx)?;

    let next = ctx.machine().next_state_id().map(str::to_owned);
    match next {
        Some(state_id) => Ok(move_to(ctx, state_id)),
        None => {
            info!("reached end of activity");
            ctx.activity().end_of_activity(ctx.scope_id());
            Ok(NavigationOutcome::EndOfActivity)
        }
    }
}

/// Handles the `RetreatState` command. At the first state this is a no-op.
///
/// # Errors
///
/// Returns `DomainError::EditInProgress` while a session is open.
#[instrument(skip(ctx), fields(scope_id = %ctx.scope_id()))]
pub fn handle_retreat_state(
    _command: &RetreatState,
    ctx: &ContentContext,
) -> Result<NavigationOutcome, DomainError> {
    ensure_idle(ctx)?;

    let previous = ctx.machine().previous_state_id().map(str::to_owned);
    match previous {
        Some(state_id) => Ok(move_to(ctx, state_id)),
        None => {
            debug!("already at first state");
            Ok(NavigationOutcome::Unchanged)
        }
    }
}

/// Handles the `SelectState` command. Unknown ids are a logged no-op.
///
/// # Errors
///
/// Returns `DomainError::EditInProgress` while a session is open.
#[instrument(skip(ctx), fields(scope_id = %ctx.scope_id()))]
pub fn handle_select_state(
    command: &SelectState,
    ctx: &ContentContext,
) -> Result<NavigationOutcome, DomainError> {
    ensure_idle(ctx)?;
    Ok(move_to(ctx, command.state_id.clone()))
}

/// Handles the `PresentActiveState` command: sends the guest whatever it
/// should currently show, which is the draft while one is open. Returns
/// `false` when there is nothing to show.
#[instrument(skip(ctx), fields(scope_id = %ctx.scope_id()))]
pub fn handle_present_active_state(_command: &PresentActiveState, ctx: &ContentContext) -> bool {
    let draft = ctx.session().draft().map(|draft| draft.to_payload());
    if let Some(payload) = draft {
        let hints = ctx.draft_hints();
        ctx.push_state(payload, hints);
        return true;
    }
    ctx.push_active_state()
}

//! Bulk import and export of a scope's state sequence.

use guestbridge_core::error::DomainError;
use guestbridge_core::repository::{StateRepository, StoredState};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::application::context::ContentContext;
use crate::domain::state::State;

/// A serialisable snapshot of the sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateExport {
    /// States in sequence order.
    pub states: Vec<StoredState>,
    /// Hex SHA-256 of the JSON-encoded `states`.
    pub content_hash: String,
}

/// Loads the scope's states from `repo`, replacing the sequence. The first
/// state becomes active when nothing is, and the active state is pushed
/// to the guest.
///
/// # Errors
///
/// Returns `DomainError::EditInProgress` while a session is open, or the
/// repository's error if loading fails.
pub async fn handle_load_states(
    ctx: &ContentContext,
    repo: &dyn StateRepository,
) -> Result<usize, DomainError> {
    if ctx.session().is_editing() {
        return Err(DomainError::EditInProgress);
    }

    let stored = repo.load_states(ctx.scope_id()).await?;
    let states: Vec<State> = stored.into_iter().map(State::from).collect();

    let count = {
        let mut machine = ctx.machine_mut();
        machine.set_states(states, ctx.clock());
        if machine.active_state_id().is_none() {
            let first = machine.state_ids().first().cloned();
            if let Some(first) = first {
                machine.set_active_state_by_id(&first, ctx.clock());
            }
        }
        machine.len()
    };

    ctx.push_active_state();

    info!(scope_id = %ctx.scope_id(), count, "loaded states");
    Ok(count)
}

/// Exports the sequence in order together with its content hash.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the states cannot be encoded.
pub fn export_states(ctx: &ContentContext) -> Result<StateExport, DomainError> {
    let states: Vec<StoredState> = ctx.machine().states().map(StoredState::from).collect();
    let encoded = serde_json::to_vec(&states)
        .map_err(|e| DomainError::Infrastructure(format!("state serialization failed: {e}")))?;
    let content_hash = format!("{:x}", Sha256::digest(&encoded));
    Ok(StateExport {
        states,
        content_hash,
    })
}

/// Persists the current sequence and returns what was saved. A successful
/// save commits the change events recorded so far; a failed one keeps them.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if encoding or saving fails.
pub async fn handle_save_states(
    ctx: &ContentContext,
    repo: &dyn StateRepository,
) -> Result<StateExport, DomainError> {
    let export = export_states(ctx)?;
    repo.save_states(ctx.scope_id(), &export.states).await?;
    let committed = ctx.take_uncommitted_events();
    info!(
        scope_id = %ctx.scope_id(),
        count = export.states.len(),
        committed_events = committed.len(),
        content_hash = %export.content_hash,
        "saved states"
    );
    Ok(export)
}

#[cfg(test)]
mod tests {
    use guestbridge_core::aggregate::AggregateRoot;
    use guestbridge_core::error::DomainError;
    use guestbridge_core::repository::StoredState;
    use guestbridge_test_support::{
        EmptyStateRepository, FailingStateRepository, RecordingStateRepository,
    };
    use serde_json::json;

    use crate::application::authoring::{
        handle_start_editing, handle_start_new_state, handle_update_state_data,
    };
    use crate::application::context::tests::harness;
    use crate::application::persistence::{export_states, handle_load_states, handle_save_states};
    use crate::domain::commands::{StartEditing, StartNewState};

    fn stored(id: &str) -> StoredState {
        StoredState {
            id: id.to_owned(),
            name: format!("Stored {id}"),
            data: json!({ "question": id }),
            asset_refs: vec![],
            owner_app_id: "quiz-app".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_load_states_replaces_sequence_and_activates_first() {
        // Arrange
        let h = harness(&[]);
        let repo = RecordingStateRepository::new(vec![stored("a"), stored("b")]);

        // Act
        let count = handle_load_states(&h.ctx, &repo).await.unwrap();

        // Assert
        assert_eq!(count, 2);
        assert_eq!(h.ctx.machine().active_state_id(), Some("a"));
        assert_eq!(h.guest.received_types(), vec!["SET_STATE"]);
    }

    #[tokio::test]
    async fn test_load_states_keeps_surviving_active_state() {
        let h = harness(&["a", "b"]);
        h.ctx
            .machine_mut()
            .set_active_state_by_id("b", &guestbridge_test_support::FixedClock::default());
        let repo = RecordingStateRepository::new(vec![stored("a"), stored("b")]);

        handle_load_states(&h.ctx, &repo).await.unwrap();

        assert_eq!(h.ctx.machine().active_state_id(), Some("b"));
        assert_eq!(h.ctx.machine().get_state_by_id("b").unwrap().name, "Stored b");
    }

    #[tokio::test]
    async fn test_load_states_while_editing_is_rejected() {
        let h = harness(&["a"]);
        handle_start_new_state(&StartNewState, &h.ctx).unwrap();

        let result = handle_load_states(&h.ctx, &EmptyStateRepository).await;

        assert_eq!(result, Err(DomainError::EditInProgress));
    }

    #[tokio::test]
    async fn test_load_states_propagates_repository_failure() {
        let h = harness(&["a"]);

        let result = handle_load_states(&h.ctx, &FailingStateRepository).await;

        match result {
            Err(DomainError::Infrastructure(_)) => {}
            other => panic!("expected Infrastructure, got {other:?}"),
        }
        assert_eq!(h.ctx.machine().len(), 1);
    }

    #[test]
    fn test_export_hash_tracks_content_and_order() {
        let first = harness(&["a", "b"]);
        let same = harness(&["a", "b"]);
        let reordered = harness(&["b", "a"]);

        let first = export_states(&first.ctx).unwrap();
        let same = export_states(&same.ctx).unwrap();
        let reordered = export_states(&reordered.ctx).unwrap();

        assert_eq!(first.content_hash.len(), 64);
        assert_eq!(first.content_hash, same.content_hash);
        assert_ne!(first.content_hash, reordered.content_hash);
        assert_eq!(first.states[0].id, "a");
    }

    #[tokio::test]
    async fn test_save_states_persists_export() {
        // Arrange
        let h = harness(&["a", "b"]);
        let repo = RecordingStateRepository::new(Vec::new());

        // Act
        let export = handle_save_states(&h.ctx, &repo).await.unwrap();

        // Assert
        let saved = repo.saved_states();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "scope-1");
        assert_eq!(saved[0].1, export.states);
    }

    #[tokio::test]
    async fn test_save_states_commits_recorded_events() {
        // Arrange
        let h = harness(&["a", "b"]);
        handle_start_editing(&StartEditing::default(), &h.ctx).unwrap();
        for n in 0..100 {
            handle_update_state_data(json!({ "revision": n }), None, &h.ctx).unwrap();
        }
        assert!(h.ctx.machine().uncommitted_events().len() >= 100);
        let repo = RecordingStateRepository::new(Vec::new());

        // Act
        handle_save_states(&h.ctx, &repo).await.unwrap();

        // Assert
        assert!(h.ctx.machine().uncommitted_events().is_empty());
        assert_eq!(repo.saved_states()[0].1[0].data, json!({ "revision": 99 }));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_recorded_events() {
        let h = harness(&["a", "b"]);
        let recorded = h.ctx.machine().uncommitted_events().len();

        let result = handle_save_states(&h.ctx, &FailingStateRepository).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert_eq!(h.ctx.machine().uncommitted_events().len(), recorded);
        assert!(recorded > 0);
    }
}

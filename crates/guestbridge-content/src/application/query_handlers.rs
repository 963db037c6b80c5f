//! Query handlers for the content context.
//!
//! Read-only view DTOs over the state machine and editing session, for the
//! host's view layer.

use serde::Serialize;

use crate::application::context::ContentContext;
use crate::domain::editing::EditMode;

/// One entry in the ordered state list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSummary {
    /// The state identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Number of asset references.
    pub asset_count: usize,
}

/// Read-only view of one scope's content.
#[derive(Debug, Serialize)]
pub struct StateMachineView {
    /// The guest scope.
    pub scope_id: String,
    /// States in sequence order.
    pub states: Vec<StateSummary>,
    /// The active state.
    pub active_state_id: Option<String>,
    /// The state after the active one.
    pub next_state_id: Option<String>,
    /// The state before the active one.
    pub previous_state_id: Option<String>,
    /// Authoring mode.
    pub edit_mode: EditMode,
    /// The message currently blocking finishing an edit.
    pub validation_message: Option<String>,
    /// Current version (event count).
    pub version: i64,
}

/// Builds the current view of `ctx`.
#[must_use]
pub fn get_state_machine_view(ctx: &ContentContext) -> StateMachineView {
    let machine = ctx.machine();
    let session = ctx.session();
    StateMachineView {
        scope_id: ctx.scope_id().to_owned(),
        states: machine
            .states()
            .map(|state| StateSummary {
                id: state.id.clone(),
                name: state.name.clone(),
                asset_count: state.asset_refs.len(),
            })
            .collect(),
        active_state_id: machine.active_state_id().map(str::to_owned),
        next_state_id: machine.next_state_id().map(str::to_owned),
        previous_state_id: machine.previous_state_id().map(str::to_owned),
        edit_mode: session.mode(),
        validation_message: session.validation_message().map(str::to_owned),
        version: machine.version,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::application::authoring::handle_start_editing;
    use crate::application::context::tests::harness;
    use crate::application::query_handlers::get_state_machine_view;
    use crate::domain::commands::StartEditing;
    use crate::domain::editing::EditMode;

    #[test]
    fn test_view_reports_order_pointer_and_mode() {
        // Arrange
        let h = harness(&["s1", "s2", "s3"]);
        handle_start_editing(
            &StartEditing {
                state_id: Some("s2".to_owned()),
            },
            &h.ctx,
        )
        .unwrap();

        // Act
        let view = get_state_machine_view(&h.ctx);

        // Assert
        let ids: Vec<_> = view.states.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
        assert_eq!(view.active_state_id.as_deref(), Some("s2"));
        assert_eq!(view.next_state_id.as_deref(), Some("s3"));
        assert_eq!(view.previous_state_id.as_deref(), Some("s1"));
        assert_eq!(view.edit_mode, EditMode::EditingExisting);
    }

    #[test]
    fn test_view_serializes_edit_mode_in_snake_case() {
        let h = harness(&["s1"]);

        let value = serde_json::to_value(get_state_machine_view(&h.ctx)).unwrap();

        assert_eq!(value["edit_mode"], json!("idle"));
        assert_eq!(value["states"][0]["asset_count"], json!(0));
    }
}

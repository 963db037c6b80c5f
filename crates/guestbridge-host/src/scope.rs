//! The guest scope: everything one host/guest pairing owns.
//!
//! A scope is built explicitly and passed to whoever needs it. Dropping it
//! tears the pairing down: the guest entry point is uninstalled, the host's
//! handlers are cleared and the container is told to unmount.

use std::cell::Cell;
use std::rc::Rc;

use guestbridge_content::application::authoring::{
    EditResult, handle_cancel_edit, handle_delete_state, handle_duplicate_state,
    handle_finish_editing, handle_rename_state, handle_start_editing, handle_start_new_state,
};
use guestbridge_content::application::context::ContentContext;
use guestbridge_content::application::inbound::register_host_handlers;
use guestbridge_content::application::navigation::{
    NavigationOutcome, handle_advance_state, handle_present_active_state, handle_retreat_state,
    handle_select_state,
};
use guestbridge_content::application::persistence::{
    StateExport, export_states, handle_load_states, handle_save_states,
};
use guestbridge_content::application::query_handlers::{StateMachineView, get_state_machine_view};
use guestbridge_content::domain::commands::{
    AdvanceState, CancelEdit, DeleteState, DuplicateState, FinishEditing, PresentActiveState,
    RenameState, RetreatState, SelectState, StartEditing, StartNewState,
};
use guestbridge_content::domain::events::ContentEvent;
use guestbridge_core::clock::{Clock, SystemClock};
use guestbridge_core::collaborator::{
    ActivityObserver, AlertPresenter, ContainerLifecycle, EntryPoint,
};
use guestbridge_core::ids::{IdGenerator, UuidIdGenerator};
use guestbridge_core::repository::StateRepository;
use guestbridge_protocol::dispatcher::Dispatcher;
use guestbridge_protocol::registry::HandlerRegistry;
use tracing::{debug, info};

use crate::config::HostConfig;
use crate::error::HostError;

/// The external collaborators a scope talks to.
pub struct Collaborators {
    /// Shows blocking validation messages.
    pub alerts: Rc<dyn AlertPresenter>,
    /// Receives end-of-activity and result signals.
    pub activity: Rc<dyn ActivityObserver>,
    /// Mount and unmount signals.
    pub container: Rc<dyn ContainerLifecycle>,
    /// Timestamps change events.
    pub clock: Rc<dyn Clock>,
    /// Mints ids for new and duplicated states.
    pub ids: Box<dyn IdGenerator>,
}

impl Collaborators {
    /// Wires the given collaborators with the system clock and UUID ids.
    #[must_use]
    pub fn new(
        alerts: Rc<dyn AlertPresenter>,
        activity: Rc<dyn ActivityObserver>,
        container: Rc<dyn ContainerLifecycle>,
    ) -> Self {
        Self {
            alerts,
            activity,
            container,
            clock: Rc::new(SystemClock),
            ids: Box::new(UuidIdGenerator),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the id generator.
    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }
}

/// One host/guest pairing.
pub struct GuestScope {
    scope_id: String,
    registry: Rc<HandlerRegistry>,
    dispatcher: Rc<Dispatcher>,
    content: Rc<ContentContext>,
    container: Rc<dyn ContainerLifecycle>,
    mounted: Cell<bool>,
}

impl GuestScope {
    /// Builds a scope for the guest application `owner_app_id` and registers
    /// the host's request handlers.
    #[must_use]
    pub fn new(
        scope_id: impl Into<String>,
        owner_app_id: impl Into<String>,
        config: &HostConfig,
        collaborators: Collaborators,
    ) -> Self {
        let scope_id = scope_id.into();

        let dispatcher = Rc::new(Dispatcher::with_catalog());
        for (request_type, version) in &config.version_overrides {
            dispatcher.negotiate(request_type.clone(), *version);
        }

        let content = Rc::new(
            ContentContext::new(
                scope_id.clone(),
                owner_app_id,
                Rc::clone(&dispatcher),
                collaborators.alerts,
                collaborators.activity,
            )
            .with_clock(collaborators.clock)
            .with_id_generator(collaborators.ids)
            .with_default_state_name(config.default_state_name.clone()),
        );

        let registry = Rc::new(HandlerRegistry::with_options(config.registry_options()));
        register_host_handlers(&registry, &content);

        info!(scope_id = %scope_id, handlers = registry.len(), "guest scope created");
        Self {
            scope_id,
            registry,
            dispatcher,
            content,
            container: collaborators.container,
            mounted: Cell::new(false),
        }
    }

    /// The scope identifier.
    #[must_use]
    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    /// The host's registry for guest requests.
    #[must_use]
    pub fn registry(&self) -> &Rc<HandlerRegistry> {
        &self.registry
    }

    /// The dispatcher for host commands.
    #[must_use]
    pub fn dispatcher(&self) -> &Rc<Dispatcher> {
        &self.dispatcher
    }

    /// The content context behind the facade methods.
    #[must_use]
    pub fn content(&self) -> &Rc<ContentContext> {
        &self.content
    }

    /// The entry point the guest calls to reach the host.
    #[must_use]
    pub fn entry_point(&self) -> Rc<dyn EntryPoint> {
        self.registry.clone()
    }

    /// Installs the guest's entry point. Host commands sent before this are
    /// dropped.
    pub fn connect_guest(&self, guest: Rc<dyn EntryPoint>) {
        debug!(scope_id = %self.scope_id, "guest connected");
        self.dispatcher.install_entry_point(guest);
    }

    /// Removes the guest's entry point.
    pub fn disconnect_guest(&self) {
        debug!(scope_id = %self.scope_id, "guest disconnected");
        self.dispatcher.uninstall_entry_point();
    }

    /// Whether [`mount`](Self::mount) has been called.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Signals the container and presents the active state to the guest.
    pub fn mount(&self) {
        if self.mounted.replace(true) {
            debug!(scope_id = %self.scope_id, "already mounted");
            return;
        }
        self.container.mounted(&self.scope_id);
        handle_present_active_state(&PresentActiveState, &self.content);
    }

    /// Opens an edit session on `state_id`, or on the active state.
    ///
    /// # Errors
    ///
    /// Propagates the use-case error.
    pub fn start_editing(&self, state_id: Option<&str>) -> Result<String, HostError> {
        let command = StartEditing {
            state_id: state_id.map(str::to_owned),
        };
        Ok(handle_start_editing(&command, &self.content)?)
    }

    /// Opens an edit session on a new draft.
    ///
    /// # Errors
    ///
    /// Propagates the use-case error.
    pub fn start_new_state(&self) -> Result<String, HostError> {
        Ok(handle_start_new_state(&StartNewState, &self.content)?)
    }

    /// Finalizes the open edit session.
    ///
    /// # Errors
    ///
    /// Propagates the use-case error, including a blocking validation
    /// message.
    pub fn finish_editing(&self) -> Result<EditResult, HostError> {
        Ok(handle_finish_editing(&FinishEditing, &self.content)?)
    }

    /// Abandons the open edit session.
    ///
    /// # Errors
    ///
    /// Propagates the use-case error.
    pub fn cancel_edit(&self) -> Result<(), HostError> {
        Ok(handle_cancel_edit(&CancelEdit, &self.content)?)
    }

    /// Deletes a state.
    ///
    /// # Errors
    ///
    /// Propagates the use-case error.
    pub fn delete_state(&self, state_id: &str) -> Result<bool, HostError> {
        let command = DeleteState {
            state_id: state_id.to_owned(),
        };
        Ok(handle_delete_state(&command, &self.content)?)
    }

    /// Duplicates a state, returning the copy's id.
    pub fn duplicate_state(&self, state_id: &str) -> Option<String> {
        let command = DuplicateState {
            state_id: state_id.to_owned(),
        };
        handle_duplicate_state(&command, &self.content)
    }

    /// Renames a state or the open draft.
    ///
    /// # Errors
    ///
    /// Propagates the use-case error.
    pub fn rename_state(&self, state_id: &str, name: &str) -> Result<(), HostError> {
        let command = RenameState {
            state_id: state_id.to_owned(),
            name: name.to_owned(),
        };
        Ok(handle_rename_state(&command, &self.content)?)
    }

    /// Moves to the following state.
    ///
    /// # Errors
    ///
    /// Propagates the use-case error.
    pub fn advance(&self) -> Result<NavigationOutcome, HostError> {
        Ok(handle_advance_state(&AdvanceState, &self.content)?)
    }

    /// Moves to the preceding state.
    ///
    /// # Errors
    ///
    /// Propagates the use-case error.
    pub fn retreat(&self) -> Result<NavigationOutcome, HostError> {
        Ok(handle_retreat_state(&RetreatState, &self.content)?)
    }

    /// Presents a specific state.
    ///
    /// # Errors
    ///
    /// Propagates the use-case error.
    pub fn select_state(&self, state_id: &str) -> Result<NavigationOutcome, HostError> {
        let command = SelectState {
            state_id: state_id.to_owned(),
        };
        Ok(handle_select_state(&command, &self.content)?)
    }

    /// Sends the guest what it should currently show.
    pub fn present_active_state(&self) -> bool {
        handle_present_active_state(&PresentActiveState, &self.content)
    }

    /// Read-only view of the scope's content.
    #[must_use]
    pub fn view(&self) -> StateMachineView {
        get_state_machine_view(&self.content)
    }

    /// Drains change events recorded since the last call or the last
    /// successful save.
    pub fn take_events(&self) -> Vec<ContentEvent> {
        self.content.take_uncommitted_events()
    }

    /// Loads the sequence from `repo`.
    ///
    /// # Errors
    ///
    /// Propagates the use-case error.
    pub async fn load_states(&self, repo: &dyn StateRepository) -> Result<usize, HostError> {
        Ok(handle_load_states(&self.content, repo).await?)
    }

    /// Saves the sequence to `repo`, committing the recorded change events.
    ///
    /// # Errors
    ///
    /// Propagates the use-case error.
    pub async fn save_states(&self, repo: &dyn StateRepository) -> Result<StateExport, HostError> {
        Ok(handle_save_states(&self.content, repo).await?)
    }

    /// Exports the sequence without persisting it.
    ///
    /// # Errors
    ///
    /// Propagates the use-case error.
    pub fn export_states(&self) -> Result<StateExport, HostError> {
        Ok(export_states(&self.content)?)
    }
}

impl Drop for GuestScope {
    fn drop(&mut self) {
        self.dispatcher.uninstall_entry_point();
        self.registry.clear();
        if self.mounted.get() {
            self.container.unmounted(&self.scope_id);
        }
        info!(scope_id = %self.scope_id, "guest scope torn down");
    }
}

impl std::fmt::Debug for GuestScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestScope")
            .field("scope_id", &self.scope_id)
            .field("registry", &self.registry)
            .field("content", &self.content)
            .field("mounted", &self.mounted.get())
            .finish_non_exhaustive()
    }
}

//! The per-scope content context shared by every authoring use-case.
//!
//! One `ContentContext` exists per host/guest pairing. It owns the state
//! machine and editing session behind `RefCell`s; use-cases never hold a
//! borrow across a dispatch, because delivery is synchronous and the guest
//! may call straight back into the host's registry.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use guestbridge_core::aggregate::AggregateRoot;
use guestbridge_core::clock::{Clock, SystemClock};
use guestbridge_core::collaborator::{ActivityObserver, AlertPresenter};
use guestbridge_core::ids::{IdGenerator, UuidIdGenerator};
use guestbridge_protocol::dispatcher::Dispatcher;
use guestbridge_protocol::messages::outbound::{
    NavigationHints, SetAuthoring, SetState, StatePayload,
};
use tracing::debug;

use crate::domain::aggregates::StateMachine;
use crate::domain::editing::EditingSession;
use crate::domain::events::ContentEvent;

/// Prefix of the name given to new states finished without one.
pub const DEFAULT_STATE_NAME: &str = "Untitled";

/// Everything the content use-cases need for one guest scope.
pub struct ContentContext {
    scope_id: String,
    owner_app_id: String,
    machine: RefCell<StateMachine>,
    session: RefCell<EditingSession>,
    dispatcher: Rc<Dispatcher>,
    ids: RefCell<Box<dyn IdGenerator>>,
    clock: Rc<dyn Clock>,
    alerts: Rc<dyn AlertPresenter>,
    activity: Rc<dyn ActivityObserver>,
    default_state_name: String,
}

impl ContentContext {
    /// Creates a context with an empty state machine, the system clock and
    /// UUID state ids.
    #[must_use]
    pub fn new(
        scope_id: impl Into<String>,
        owner_app_id: impl Into<String>,
        dispatcher: Rc<Dispatcher>,
        alerts: Rc<dyn AlertPresenter>,
        activity: Rc<dyn ActivityObserver>,
    ) -> Self {
        let scope_id = scope_id.into();
        Self {
            machine: RefCell::new(StateMachine::new(scope_id.clone())),
            session: RefCell::new(EditingSession::new()),
            scope_id,
            owner_app_id: owner_app_id.into(),
            dispatcher,
            ids: RefCell::new(Box::new(UuidIdGenerator)),
            clock: Rc::new(SystemClock),
            alerts,
            activity,
            default_state_name: DEFAULT_STATE_NAME.to_owned(),
        }
    }

    /// Replaces the clock used to timestamp change events.
    #[must_use]
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the generator used for new and duplicated state ids.
    #[must_use]
    pub fn with_id_generator(self, ids: impl IdGenerator + 'static) -> Self {
        *self.ids.borrow_mut() = Box::new(ids);
        self
    }

    /// Replaces the prefix of default state names.
    #[must_use]
    pub fn with_default_state_name(mut self, name: impl Into<String>) -> Self {
        self.default_state_name = name.into();
        self
    }

    /// The guest scope this context belongs to.
    #[must_use]
    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    /// The guest application that owns states created here.
    #[must_use]
    pub fn owner_app_id(&self) -> &str {
        &self.owner_app_id
    }

    /// Prefix of default state names.
    #[must_use]
    pub fn default_state_name(&self) -> &str {
        &self.default_state_name
    }

    /// The dispatcher that talks to the guest.
    #[must_use]
    pub fn dispatcher(&self) -> &Rc<Dispatcher> {
        &self.dispatcher
    }

    /// Read access to the state machine.
    ///
    /// # Panics
    ///
    /// Panics if the state machine is mutably borrowed, which only happens
    /// inside a use-case.
    #[must_use]
    pub fn machine(&self) -> Ref<'_, StateMachine> {
        self.machine.borrow()
    }

    /// Read access to the editing session.
    ///
    /// # Panics
    ///
    /// Panics if the session is mutably borrowed, which only happens inside
    /// a use-case.
    #[must_use]
    pub fn session(&self) -> Ref<'_, EditingSession> {
        self.session.borrow()
    }

    /// Drains the change events recorded since the last call.
    pub fn take_uncommitted_events(&self) -> Vec<ContentEvent> {
        self.machine.borrow_mut().take_uncommitted_events()
    }

    pub(crate) fn machine_mut(&self) -> RefMut<'_, StateMachine> {
        self.machine.borrow_mut()
    }

    pub(crate) fn session_mut(&self) -> RefMut<'_, EditingSession> {
        self.session.borrow_mut()
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn alerts(&self) -> &dyn AlertPresenter {
        self.alerts.as_ref()
    }

    pub(crate) fn activity(&self) -> &dyn ActivityObserver {
        self.activity.as_ref()
    }

    /// Draws a state id that is not yet in the sequence.
    pub(crate) fn fresh_state_id(&self) -> String {
        let machine = self.machine.borrow();
        let mut ids = self.ids.borrow_mut();
        let mut id = ids.next_id();
        while machine.has_state(&id) {
            id = ids.next_id();
        }
        id
    }

    /// Runs `f` with the state machine, the id generator and the clock.
    pub(crate) fn with_ids<R>(
        &self,
        f: impl FnOnce(&mut StateMachine, &mut dyn IdGenerator, &dyn Clock) -> R,
    ) -> R {
        let mut machine = self.machine.borrow_mut();
        let mut ids = self.ids.borrow_mut();
        f(&mut machine, ids.as_mut(), self.clock.as_ref())
    }

    /// Navigation hints for the active state. Navigation is hidden while a
    /// session is open or when there is nowhere to go.
    pub(crate) fn active_hints(&self) -> NavigationHints {
        let machine = self.machine.borrow();
        NavigationHints {
            has_next_slide: machine.next_state_id().is_some(),
            has_previous_slide: machine.previous_state_id().is_some(),
            hide_navigation: self.session.borrow().is_editing() || machine.len() <= 1,
        }
    }

    /// Navigation hints for a draft that will be inserted at the active slot.
    pub(crate) fn draft_hints(&self) -> NavigationHints {
        let machine = self.machine.borrow();
        let index = machine.insertion_index();
        NavigationHints {
            has_next_slide: index < machine.len(),
            has_previous_slide: index > 0,
            hide_navigation: true,
        }
    }

    /// Pushes the active state to the guest. Returns `false` when nothing is
    /// active.
    pub(crate) fn push_active_state(&self) -> bool {
        let payload = self.machine.borrow().active_state().map(|s| s.to_payload());
        let Some(payload) = payload else {
            debug!(scope_id = %self.scope_id, "no active state to present");
            return false;
        };
        let hints = self.active_hints();
        self.push_state(payload, hints);
        true
    }

    /// Sends `SET_STATE` for `state`.
    pub(crate) fn push_state(&self, state: StatePayload, hints: NavigationHints) {
        self.dispatcher.send(&SetState {
            state,
            navigation: Some(hints),
        });
    }

    /// Sends `SET_AUTHORING`.
    pub(crate) fn set_authoring(&self, is_authoring: bool) {
        self.dispatcher.send(&SetAuthoring { is_authoring });
    }
}

impl fmt::Debug for ContentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentContext")
            .field("scope_id", &self.scope_id)
            .field("owner_app_id", &self.owner_app_id)
            .field("machine", &self.machine)
            .field("session", &self.session)
            .field("default_state_name", &self.default_state_name)
            .finish_non_exhaustive()
    }
}

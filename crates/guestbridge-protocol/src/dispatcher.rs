//! The dispatcher: builds request envelopes and delivers them to the other
//! side's installed entry point.
//!
//! Delivery is a synchronous in-process call. When no entry point is
//! installed the guest is simply not ready yet and the request is dropped
//! without a warning. The dispatcher never fails; problems are observable
//! only through logs.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use guestbridge_core::collaborator::EntryPoint;
use guestbridge_core::envelope::RequestEnvelope;
use serde_json::Value;
use tracing::{debug, warn};

use crate::messages;

/// Version used for request types without a policy and without a
/// negotiated version.
pub const FALLBACK_VERSION: u32 = 1;

/// Which payload versions the dispatcher may send for one request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionPolicy {
    /// The highest version this side knows; used when nothing was negotiated.
    pub default: u32,
    /// Older shapes that may be sent when the other side negotiated them.
    pub alternates: &'static [u32],
}

impl VersionPolicy {
    /// A policy that only ever sends `version`.
    #[must_use]
    pub const fn fixed(version: u32) -> Self {
        Self {
            default: version,
            alternates: &[],
        }
    }

    /// A policy that sends `default` unless one of `alternates` was negotiated.
    #[must_use]
    pub const fn with_alternates(default: u32, alternates: &'static [u32]) -> Self {
        Self {
            default,
            alternates,
        }
    }

    /// Whether `version` can be sent under this policy.
    #[must_use]
    pub fn supports(&self, version: u32) -> bool {
        version == self.default || self.alternates.contains(&version)
    }

    /// Picks the version to send given the negotiated one. Anything the
    /// policy cannot send falls back to the default with a warning.
    #[must_use]
    pub fn resolve(&self, request_type: &str, negotiated: Option<u32>) -> u32 {
        match negotiated {
            None => self.default,
            Some(version) if self.supports(version) => version,
            Some(version) => {
                warn!(
                    request_type,
                    negotiated = version,
                    fallback = self.default,
                    "negotiated version is not supported, using default"
                );
                self.default
            }
        }
    }
}

/// A typed request that can be encoded for any version its policy allows.
pub trait OutboundRequest {
    /// Stable wire identifier of the request type.
    const REQUEST_TYPE: &'static str;

    /// Versions this side can send.
    const VERSION_POLICY: VersionPolicy;

    /// Encodes the payload in the shape of `version`.
    fn encode(&self, version: u32) -> Option<Value>;
}

/// Sends requests to the other side of one host/guest pairing.
pub struct Dispatcher {
    entry_point: RefCell<Option<Rc<dyn EntryPoint>>>,
    negotiated: RefCell<HashMap<String, u32>>,
    policies: HashMap<String, VersionPolicy>,
}

impl Dispatcher {
    /// Creates a dispatcher with no entry point and no version policies.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entry_point: RefCell::new(None),
            negotiated: RefCell::new(HashMap::new()),
            policies: HashMap::new(),
        }
    }

    /// Creates a dispatcher that knows the policy of every catalog message.
    #[must_use]
    pub fn with_catalog() -> Self {
        messages::catalog_policies()
            .into_iter()
            .fold(Self::new(), |dispatcher, (request_type, policy)| {
                dispatcher.with_policy(request_type, policy)
            })
    }

    /// Adds or replaces the version policy for `request_type`.
    #[must_use]
    pub fn with_policy(mut self, request_type: impl Into<String>, policy: VersionPolicy) -> Self {
        self.policies.insert(request_type.into(), policy);
        self
    }

    /// Returns the policy registered for `request_type`.
    #[must_use]
    pub fn policy(&self, request_type: &str) -> Option<VersionPolicy> {
        self.policies.get(request_type).copied()
    }

    /// Installs the other side's entry point, replacing any previous one.
    pub fn install_entry_point(&self, entry_point: Rc<dyn EntryPoint>) {
        *self.entry_point.borrow_mut() = Some(entry_point);
    }

    /// Removes the installed entry point. Later dispatches become no-ops.
    pub fn uninstall_entry_point(&self) {
        self.entry_point.borrow_mut().take();
    }

    /// Whether an entry point is installed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.entry_point.borrow().is_some()
    }

    /// Records the version the other side asked for.
    pub fn negotiate(&self, request_type: impl Into<String>, version: u32) {
        let request_type = request_type.into();
        debug!(request_type = %request_type, version, "negotiated request version");
        self.negotiated.borrow_mut().insert(request_type, version);
    }

    /// Returns the negotiated version for `request_type`, if any.
    #[must_use]
    pub fn negotiated_version(&self, request_type: &str) -> Option<u32> {
        self.negotiated.borrow().get(request_type).copied()
    }

    /// Picks the version to send for `request_type` when the caller did
    /// not specify one.
    #[must_use]
    pub fn resolve_version(&self, request_type: &str) -> u32 {
        let negotiated = self.negotiated_version(request_type);
        match self.policies.get(request_type) {
            Some(policy) => policy.resolve(request_type, negotiated),
            None => negotiated.unwrap_or(FALLBACK_VERSION),
        }
    }

    /// Builds an envelope and delivers it to the installed entry point.
    ///
    /// Without an explicit `version` the negotiated one is used, filtered
    /// through the request type's policy.
    pub fn form_request_and_dispatch(
        &self,
        request_type: &str,
        version: Option<u32>,
        payload: Option<Value>,
    ) {
        // Clone out so the entry point may reinstall itself while handling.
        let entry_point = self.entry_point.borrow().clone();
        let Some(entry_point) = entry_point else {
            debug!(request_type, "no entry point installed, skipping dispatch");
            return;
        };

        let version = version.unwrap_or_else(|| self.resolve_version(request_type));
        let envelope = RequestEnvelope {
            request_type: request_type.to_owned(),
            version,
            payload,
        };
        debug!(request_type, version, "dispatching request");
        entry_point.receive(envelope);
    }

    /// Encodes a typed request for its resolved version and dispatches it.
    pub fn send<R: OutboundRequest>(&self, request: &R) {
        if !self.is_ready() {
            debug!(
                request_type = R::REQUEST_TYPE,
                "no entry point installed, skipping dispatch"
            );
            return;
        }
        let version = R::VERSION_POLICY.resolve(
            R::REQUEST_TYPE,
            self.negotiated_version(R::REQUEST_TYPE),
        );
        self.form_request_and_dispatch(R::REQUEST_TYPE, Some(version), request.encode(version));
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("ready", &self.is_ready())
            .field("negotiated", &self.negotiated.borrow())
            .field("policies", &self.policies)
            .finish()
    }
}

//! The catalog of request types exchanged between host and guest.
//!
//! [`inbound`] holds requests a guest sends to its host; [`outbound`]
//! holds commands a host sends to its guest. Every message can be both
//! decoded ([`VersionedPayload`](crate::codec::VersionedPayload)) and
//! encoded ([`OutboundRequest`]), so either side of a channel can be built
//! from this catalog.

pub mod inbound;
pub mod outbound;

use crate::dispatcher::{OutboundRequest, VersionPolicy};

/// Version policy of every catalog message, keyed by request type.
#[must_use]
pub fn catalog_policies() -> Vec<(&'static str, VersionPolicy)> {
    vec![
        policy_of::<inbound::SubmitResults>(),
        policy_of::<inbound::GoToNextState>(),
        policy_of::<inbound::GoToPreviousState>(),
        policy_of::<inbound::SetStateData>(),
        policy_of::<inbound::SetValidationMessage>(),
        policy_of::<inbound::AnnounceVersions>(),
        policy_of::<outbound::SetState>(),
        policy_of::<outbound::SetAuthoring>(),
    ]
}

fn policy_of<R: OutboundRequest>() -> (&'static str, VersionPolicy) {
    (R::REQUEST_TYPE, R::VERSION_POLICY)
}

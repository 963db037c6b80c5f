//! Aggregate root abstraction.

use crate::event::DomainEvent;

/// Trait for aggregate roots whose mutations are recorded as change events.
///
/// Every successful mutation builds an event, applies it, and keeps it as
/// uncommitted until a subscriber drains it.
pub trait AggregateRoot {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> &str;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events recorded since the last drain.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Removes and returns the uncommitted events.
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event>;
}

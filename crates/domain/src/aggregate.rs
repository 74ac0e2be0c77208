//! Core aggregate and domain event traits.

use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    ///
    /// Used for logging and metric labels.
    fn event_type(&self) -> &'static str;
}

/// Trait for state that domain events are applied to.
///
/// `apply` must be pure and deterministic, and must not fail: events are
/// facts that have already been decided.
pub trait Aggregate: Send + Sync + Sized {
    /// The type of events this aggregate consumes.
    type Event: DomainEvent;

    /// The identifier type of the aggregate.
    type Id: Copy + std::fmt::Display;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's unique identifier.
    fn id(&self) -> Self::Id;

    /// Applies an event to the aggregate, updating its state.
    fn apply(&mut self, event: &Self::Event);

    /// Applies multiple events in sequence.
    fn apply_events<'a>(&mut self, events: impl IntoIterator<Item = &'a Self::Event>)
    where
        Self::Event: 'a,
    {
        for event in events {
            self.apply(event);
        }
    }
}

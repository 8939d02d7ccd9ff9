//! Core aggregate and domain event traits.

use std::fmt::Debug;

/// Trait for domain events.
///
/// Domain events represent facts that have been decided by an aggregate.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Debug + Clone + Send + Sync {
    /// Returns the event type name.
    ///
    /// Used for logging and metric labels.
    fn event_type(&self) -> &'static str;
}

/// Trait for aggregates that decide changes as events.
///
/// An aggregate is the consistency boundary for a group of domain objects.
/// Command methods validate a request against the current state and record
/// the resulting events; [`Aggregate::apply`] folds a decided event into state.
///
/// Events recorded by an aggregate are a transient instruction log: a
/// repository reads them once and replays them against storage.
pub trait Aggregate: Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors this aggregate can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Applies an event to the aggregate, updating its state.
    ///
    /// This method must be pure and deterministic:
    /// - Given the same state and event, it must always produce the same new state
    /// - It must not record the event
    /// - It must not fail (events represent decisions that have already been made)
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

    /// Returns the events recorded since this value was constructed.
    fn pending_events(&self) -> &[Self::Event];
}

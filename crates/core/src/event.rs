//! Domain events emitted by aggregates.

use chrono::{DateTime, Utc};

/// A fact produced by `Aggregate::handle`.
pub trait DomainEvent: Clone + core::fmt::Debug {
    /// Stable dotted name, e.g. `"products.product.supply_received"`.
    fn event_type(&self) -> &'static str;

    fn occurred_at(&self) -> DateTime<Utc>;
}

//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Human-readable entity name used in error messages ("product", "role").
    const NAME: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Two entities are "the same" when their identifiers are equal, even if every
/// other attribute differs (e.g. a drug record before and after an update).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Identity comparison, independent of attribute values.
    fn same_identity_as(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their
//! attribute values. Two value objects with the same values are equal.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by value. To "modify" one, build a
/// new one. `PageRequest` is the canonical example in this workspace: two
/// requests for page 2 of size 50 are interchangeable.
///
/// The trait requires:
/// - **Clone**: value objects are cheap to copy
/// - **PartialEq**: compared by attribute values
/// - **Debug**: shows up in logs and test failures
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two quantities of
/// `2 l` are the same quantity. To "modify" one, build a new one. Snapshots
/// handed to a reconciliation run are made of value objects, so a run can never
/// observe a mutation made elsewhere.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

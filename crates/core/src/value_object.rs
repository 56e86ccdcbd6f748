//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. In the
/// inventory domain `Quantity` is one: two quantities of `16.0` are the same
/// quantity regardless of which move they came from.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

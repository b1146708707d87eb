//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values: a
/// `Rate` of 19% equals any other `Rate` of 19%, while two parties with the
/// same name remain distinct entities. To "modify" a value object, build a
/// new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

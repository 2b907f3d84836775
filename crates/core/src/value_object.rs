//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity** and are **immutable**: an attribute slot,
/// a quantity range or an image reference is fully described by its fields.
/// To "modify" one, build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct QuantityBounds {
///     min: u32,
///     max: Option<u32>,
/// }
///
/// impl ValueObject for QuantityBounds {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

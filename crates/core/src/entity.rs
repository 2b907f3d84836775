//! Entity trait: identity that survives changes to everything else.

/// Entity marker + minimal interface.
///
/// A variation is an entity: two variations with identical attributes and
/// price are still different purchasable things if their ids differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

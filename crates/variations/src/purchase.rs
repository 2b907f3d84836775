//! What the "add to cart" affordance should do for the matched variation.

use serde::Serialize;

use storefront_core::ValueObject;

use crate::catalog::Variation;

/// Allowed quantity range for adding a variation to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuantityBounds {
    pub min: u32,
    /// `None` means unbounded.
    pub max: Option<u32>,
}

impl QuantityBounds {
    pub fn for_variation(variation: &Variation) -> Self {
        let min = variation.min_quantity.unwrap_or(1).max(1);
        let max = if variation.sold_individually {
            Some(1)
        } else {
            variation.max_quantity
        };
        // A max below min would make the quantity input unusable.
        let max = max.map(|m| m.max(min));
        Self { min, max }
    }

    pub fn contains(&self, quantity: u32) -> bool {
        quantity >= self.min && self.max.is_none_or(|max| quantity <= max)
    }

    pub fn clamp(&self, quantity: u32) -> u32 {
        let q = quantity.max(self.min);
        match self.max {
            Some(max) => q.min(max),
            None => q,
        }
    }
}

impl Default for QuantityBounds {
    fn default() -> Self {
        Self { min: 1, max: None }
    }
}

impl ValueObject for QuantityBounds {}

/// Purchase readiness derived from the current match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PurchaseState {
    /// No variation matches: the selection is incomplete or the
    /// combination does not exist.
    Incomplete,
    NotPurchasable,
    OutOfStock,
    Ready(QuantityBounds),
}

impl PurchaseState {
    pub fn from_match(matched: Option<&Variation>) -> Self {
        match matched {
            None => Self::Incomplete,
            Some(v) if !v.purchasable => Self::NotPurchasable,
            Some(v) if !v.in_stock => Self::OutOfStock,
            Some(v) => Self::Ready(QuantityBounds::for_variation(v)),
        }
    }

    pub fn can_add_to_cart(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

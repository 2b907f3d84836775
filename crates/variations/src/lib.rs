//! Product variation matching (pure domain logic).
//!
//! Given the catalog of variations embedded in a variable product page and
//! the customer's in-progress attribute selection, this crate decides which
//! variation (if any) is selected and which attribute values remain
//! reachable. Rendering is left to whoever subscribes to the outcomes.

mod de;

pub mod catalog;
pub mod matcher;
pub mod options;
pub mod purchase;
pub mod selection;
pub mod selector;

pub use catalog::{AttributeSlot, Catalog, RejectedEntry, Variation, VariationImage};
pub use matcher::{
    Availability, compatible_variations, compute_availability, compute_availability_with,
    find_match, is_compatible, matches,
};
pub use options::AttributeOptions;
pub use purchase::{PurchaseState, QuantityBounds};
pub use selection::Selection;
pub use selector::{
    SelectionCommand, SelectionEvent, SelectionObserver, SelectionOutcome, VariationSelector,
};

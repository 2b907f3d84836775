//! Variation matching and option availability.
//!
//! Matching is deliberately asymmetric: a *selected* attribute matches a
//! wildcard slot or the identical concrete value, while an *unselected*
//! attribute only matches a wildcard slot. A product without a wildcard
//! "base" variation therefore matches nothing until every concrete
//! attribute has been chosen.
//!
//! All functions here are pure; none of them can fail. An empty catalog
//! simply matches nothing.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::{AttributeSlot, Catalog, Variation};
use crate::options::AttributeOptions;
use crate::selection::Selection;

/// Whether `variation` is the one described by `selection`.
///
/// Selection entries for attributes the variation does not carry are ignored.
pub fn matches(variation: &Variation, selection: &Selection) -> bool {
    variation
        .attributes
        .iter()
        .all(|(name, slot)| match slot {
            AttributeSlot::Any => true,
            AttributeSlot::Exact(value) => selection.get(name) == Some(value.as_str()),
        })
}

/// Whether `variation` is still reachable: every *selected* attribute agrees
/// with the variation's concrete slot. Unselected attributes do not constrain.
pub fn is_compatible(variation: &Variation, selection: &Selection) -> bool {
    variation
        .attributes
        .iter()
        .all(|(name, slot)| match (slot, selection.get(name)) {
            (AttributeSlot::Exact(value), Some(selected)) => value == selected,
            _ => true,
        })
}

/// First variation (catalog order) matching `selection`.
pub fn find_match<'c>(catalog: &'c Catalog, selection: &Selection) -> Option<&'c Variation> {
    catalog.iter().find(|v| matches(v, selection))
}

/// Variations still reachable from `selection`, in catalog order.
pub fn compatible_variations<'c>(catalog: &'c Catalog, selection: &Selection) -> Vec<&'c Variation> {
    catalog
        .iter()
        .filter(|v| is_compatible(v, selection))
        .collect()
}

/// Availability of every concrete attribute value found in the catalog.
pub fn compute_availability(catalog: &Catalog, selection: &Selection) -> Availability {
    compute_availability_with(catalog, selection, &AttributeOptions::new())
}

/// Like [`compute_availability`], with extra candidate values (for example
/// options rendered in the page that no variation mentions).
///
/// A candidate is available when forcing it into the current selection
/// yields a match.
pub fn compute_availability_with(
    catalog: &Catalog,
    selection: &Selection,
    declared: &AttributeOptions,
) -> Availability {
    let mut candidates = catalog.attribute_values();
    candidates.merge(declared);

    let mut availability = Availability::default();
    for (attribute, value) in candidates.iter() {
        let forced = selection.with(attribute, value);
        let available = catalog.iter().any(|v| matches(v, &forced));
        availability.set(attribute, value, available);
    }
    availability
}

/// `(attribute, value) -> available` for every candidate value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Availability(BTreeMap<String, BTreeMap<String, bool>>);

impl Availability {
    fn set(&mut self, attribute: &str, value: &str, available: bool) {
        self.0
            .entry(attribute.to_string())
            .or_default()
            .insert(value.to_string(), available);
    }

    /// `None` when the pair was never a candidate.
    pub fn get(&self, attribute: &str, value: &str) -> Option<bool> {
        self.0.get(attribute)?.get(value).copied()
    }

    /// Unknown pairs are unavailable.
    pub fn is_available(&self, attribute: &str, value: &str) -> bool {
        self.get(attribute, value).unwrap_or(false)
    }

    pub fn available_values<'a>(&'a self, attribute: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .get(attribute)
            .into_iter()
            .flat_map(|values| values.iter())
            .filter(|(_, available)| **available)
            .map(|(value, _)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        self.0.iter().flat_map(|(name, values)| {
            values
                .iter()
                .map(move |(value, available)| (name.as_str(), value.as_str(), *available))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

//! Candidate attribute values, per attribute name.

use std::collections::BTreeMap;

use serde::Serialize;

/// Attribute values a customer can pick from, grouped by attribute name.
///
/// Values keep their first-seen order within an attribute and are
/// de-duplicated. Attribute names iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeOptions(BTreeMap<String, Vec<String>>);

impl AttributeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` as a candidate for `attribute`. Blank values are ignored.
    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        let values = self.0.entry(attribute.into()).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(attribute, value);
        self
    }

    /// Merge another set of options into this one (existing order wins).
    pub fn merge(&mut self, other: &AttributeOptions) {
        for (attribute, value) in other.iter() {
            self.insert(attribute, value);
        }
    }

    pub fn values(&self, attribute: &str) -> &[String] {
        self.0.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every `(attribute, value)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<A, V> FromIterator<(A, V)> for AttributeOptions
where
    A: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (A, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (attribute, value) in iter {
            options.insert(attribute, value);
        }
        options
    }
}

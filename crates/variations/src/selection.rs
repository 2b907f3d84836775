//! The customer's in-progress attribute choice.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute name -> selected value. Absent attributes are unselected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<String, String>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.0.get(attribute).map(String::as_str)
    }

    pub fn is_selected(&self, attribute: &str) -> bool {
        self.0.contains_key(attribute)
    }

    /// Set `attribute` to `value`; an empty value unselects the attribute.
    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<String>) {
        let attribute = attribute.into();
        let value = value.into();
        if value.is_empty() {
            self.0.remove(&attribute);
        } else {
            self.0.insert(attribute, value);
        }
    }

    pub fn remove(&mut self, attribute: &str) -> Option<String> {
        self.0.remove(attribute)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Copy of this selection with one attribute forced to `value`.
    pub fn with(&self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.insert(attribute, value);
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<A, V> FromIterator<(A, V)> for Selection
where
    A: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (A, V)>>(iter: I) -> Self {
        let mut selection = Self::new();
        for (attribute, value) in iter {
            selection.insert(attribute, value);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_unselects() {
        let mut selection: Selection = [("color", "red"), ("size", "M")].into_iter().collect();
        selection.insert("size", "");
        assert_eq!(selection.get("color"), Some("red"));
        assert!(!selection.is_selected("size"));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn with_leaves_the_original_untouched() {
        let selection = Selection::new().with("color", "red");
        let forced = selection.with("color", "blue");
        assert_eq!(selection.get("color"), Some("red"));
        assert_eq!(forced.get("color"), Some("blue"));
    }
}

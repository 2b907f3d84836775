//! Variation catalog: the typed form of the blob embedded in a product page.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use storefront_core::{DomainError, DomainResult, Entity, ValueObject, VariationId};

use crate::de;
use crate::options::AttributeOptions;

/// One attribute slot of a variation.
///
/// `Any` is the wildcard: the variation accepts every value of that attribute.
/// On the wire it is an empty string or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum AttributeSlot {
    Any,
    Exact(String),
}

impl AttributeSlot {
    pub fn exact(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Any
        } else {
            Self::Exact(value)
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Exact(v) => Some(v),
        }
    }
}

impl From<Option<String>> for AttributeSlot {
    fn from(value: Option<String>) -> Self {
        match value {
            None => Self::Any,
            Some(v) => Self::exact(v),
        }
    }
}

impl From<AttributeSlot> for Option<String> {
    fn from(value: AttributeSlot) -> Self {
        match value {
            AttributeSlot::Any => None,
            AttributeSlot::Exact(v) => Some(v),
        }
    }
}

impl ValueObject for AttributeSlot {}

/// Image shown for a variation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariationImage {
    pub url: String,
    pub srcset: Option<String>,
    pub alt: Option<String>,
}

impl ValueObject for VariationImage {}

/// A purchasable configuration of a variable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variation {
    pub id: VariationId,
    pub attributes: BTreeMap<String, AttributeSlot>,
    /// Pre-rendered price markup.
    pub price_display: String,
    pub purchasable: bool,
    pub in_stock: bool,
    pub min_quantity: Option<u32>,
    pub max_quantity: Option<u32>,
    pub sold_individually: bool,
    pub image: Option<VariationImage>,
}

impl Variation {
    /// A purchasable, in-stock variation with no price text, bounds or image.
    pub fn new<I, K>(id: impl Into<VariationId>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, AttributeSlot)>,
        K: Into<String>,
    {
        Self {
            id: id.into(),
            attributes: attributes.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            price_display: String::new(),
            purchasable: true,
            in_stock: true,
            min_quantity: None,
            max_quantity: None,
            sold_individually: false,
            image: None,
        }
    }

    pub fn with_price_display(mut self, price: impl Into<String>) -> Self {
        self.price_display = price.into();
        self
    }

    pub fn with_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = in_stock;
        self
    }

    pub fn with_purchasable(mut self, purchasable: bool) -> Self {
        self.purchasable = purchasable;
        self
    }

    pub fn with_quantity_range(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_quantity = min;
        self.max_quantity = max;
        self
    }

    pub fn sold_individually(mut self) -> Self {
        self.sold_individually = true;
        self
    }

    pub fn with_image(mut self, image: VariationImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn slot(&self, attribute: &str) -> Option<&AttributeSlot> {
        self.attributes.get(attribute)
    }

    /// True when every attribute slot is a wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.attributes.values().all(AttributeSlot::is_any)
    }
}

impl Entity for Variation {
    type Id = VariationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// An entry of the embedded blob that was left out of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedEntry {
    pub index: usize,
    pub reason: String,
}

impl RejectedEntry {
    pub fn to_error(&self) -> DomainError {
        DomainError::malformed_entry(self.index, self.reason.clone())
    }
}

fn yes() -> bool {
    true
}

/// Wire shape of one blob entry, before validation.
#[derive(Deserialize)]
struct RawVariation {
    #[serde(default, alias = "id", deserialize_with = "de::id")]
    variation_id: Option<u64>,
    #[serde(default)]
    attributes: Option<BTreeMap<String, AttributeSlot>>,
    #[serde(default, alias = "price_display", alias = "priceDisplay", deserialize_with = "de::text")]
    price_html: Option<String>,
    #[serde(default = "yes", alias = "purchasable", deserialize_with = "de::flag")]
    is_purchasable: bool,
    #[serde(default = "yes", alias = "in_stock", alias = "inStock", deserialize_with = "de::flag")]
    is_in_stock: bool,
    #[serde(default, alias = "min_quantity", alias = "minQuantity", deserialize_with = "de::quantity")]
    min_qty: Option<u32>,
    #[serde(default, alias = "max_quantity", alias = "maxQuantity", deserialize_with = "de::quantity")]
    max_qty: Option<u32>,
    #[serde(
        default,
        alias = "sold_individually",
        alias = "soldIndividually",
        deserialize_with = "de::flag"
    )]
    is_sold_individually: bool,
    #[serde(default)]
    image: Option<RawImage>,
}

#[derive(Deserialize)]
struct RawImage {
    #[serde(default, deserialize_with = "de::text")]
    src: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    url: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    srcset: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    alt: Option<String>,
}

impl RawImage {
    fn into_image(self) -> Option<VariationImage> {
        let url = self.src.or(self.url)?;
        Some(VariationImage {
            url,
            srcset: self.srcset,
            alt: self.alt,
        })
    }
}

impl RawVariation {
    fn validate(self) -> Result<Variation, String> {
        let id = self
            .variation_id
            .ok_or_else(|| "missing `variation_id`".to_string())?;
        let attributes = self
            .attributes
            .ok_or_else(|| "missing `attributes`".to_string())?;
        if attributes.keys().any(|name| name.trim().is_empty()) {
            return Err("empty attribute name".to_string());
        }

        Ok(Variation {
            id: VariationId::new(id),
            attributes,
            price_display: self.price_html.unwrap_or_default(),
            purchasable: self.is_purchasable,
            in_stock: self.is_in_stock,
            min_quantity: self.min_qty,
            max_quantity: self.max_qty,
            sold_individually: self.is_sold_individually,
            image: self.image.and_then(RawImage::into_image),
        })
    }
}

/// Ordered, read-only list of a product's variations.
///
/// Catalog order matters: matching is first-match-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    variations: Vec<Variation>,
    rejected: Vec<RejectedEntry>,
    deferred: bool,
}

impl Catalog {
    pub fn new(variations: Vec<Variation>) -> Self {
        Self {
            variations,
            rejected: Vec::new(),
            deferred: false,
        }
    }

    /// Catalog of a product whose variations were too many to embed in the
    /// page. It holds nothing; matching against it never succeeds.
    pub fn deferred() -> Self {
        Self {
            deferred: true,
            ..Self::default()
        }
    }

    /// Parse the embedded variations blob.
    ///
    /// Only a blob that is not JSON, or not an array (or the literal `false`),
    /// is an error. Individual malformed entries are left out and recorded in
    /// [`Catalog::rejected`].
    pub fn from_json(blob: &str) -> DomainResult<Self> {
        let value: JsonValue = serde_json::from_str(blob.trim())
            .map_err(|e| DomainError::validation(format!("variations blob is not JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: JsonValue) -> DomainResult<Self> {
        let entries = match value {
            JsonValue::Bool(false) => {
                tracing::debug!("variations blob deferred; catalog left empty");
                return Ok(Self::deferred());
            }
            JsonValue::Array(entries) => entries,
            other => {
                return Err(DomainError::validation(format!(
                    "variations blob must be an array, found {}",
                    json_kind(&other)
                )));
            }
        };

        let mut variations = Vec::with_capacity(entries.len());
        let mut rejected = Vec::new();
        let mut seen = BTreeSet::new();

        for (index, entry) in entries.into_iter().enumerate() {
            let parsed = if entry.is_object() {
                serde_json::from_value::<RawVariation>(entry)
                    .map_err(|e| e.to_string())
                    .and_then(RawVariation::validate)
            } else {
                Err(format!("expected an object, found {}", json_kind(&entry)))
            };

            let parsed = parsed.and_then(|variation| {
                if seen.insert(variation.id) {
                    Ok(variation)
                } else {
                    Err(format!("duplicate variation_id {}", variation.id))
                }
            });

            match parsed {
                Ok(variation) => variations.push(variation),
                Err(reason) => {
                    tracing::warn!(index, %reason, "skipping malformed catalog entry");
                    rejected.push(RejectedEntry { index, reason });
                }
            }
        }

        tracing::debug!(
            variations = variations.len(),
            rejected = rejected.len(),
            "variations catalog loaded"
        );

        Ok(Self {
            variations,
            rejected,
            deferred: false,
        })
    }

    pub fn variations(&self) -> &[Variation] {
        &self.variations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variation> {
        self.variations.iter()
    }

    pub fn get(&self, id: VariationId) -> Option<&Variation> {
        self.variations.iter().find(|v| v.id == id)
    }

    pub fn len(&self) -> usize {
        self.variations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variations.is_empty()
    }

    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    pub fn rejected(&self) -> &[RejectedEntry] {
        &self.rejected
    }

    /// Every concrete value each attribute takes somewhere in the catalog.
    pub fn attribute_values(&self) -> AttributeOptions {
        let mut options = AttributeOptions::new();
        for variation in &self.variations {
            for (name, slot) in &variation.attributes {
                if let Some(value) = slot.value() {
                    options.insert(name.as_str(), value);
                }
            }
        }
        options
    }
}

impl FromIterator<Variation> for Catalog {
    fn from_iter<I: IntoIterator<Item = Variation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

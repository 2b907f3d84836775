//! Replay attribute selections against an embedded variations blob.
//!
//! Useful for checking a product page's data without a browser: every step
//! prints the matched variation, the purchase state and option availability.

use anyhow::{Context, bail};
use serde::Serialize;

use storefront_core::ProductId;
use storefront_variations::{
    Availability, PurchaseState, Selection, SelectionOutcome, VariationSelector,
};

/// One replay step, parsed from `attr=value` or `reset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Select { attribute: String, value: String },
    Reset,
}

impl Step {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        if raw.trim() == "reset" {
            return Ok(Self::Reset);
        }
        let Some((attribute, value)) = raw.split_once('=') else {
            bail!("expected `attribute=value` or `reset`, got {raw:?}");
        };
        let attribute = attribute.trim();
        if attribute.is_empty() {
            bail!("missing attribute name in {raw:?}");
        }
        Ok(Self::Select {
            attribute: attribute.to_string(),
            value: value.trim().to_string(),
        })
    }

    fn label(&self) -> String {
        match self {
            Self::Select { attribute, value } => format!("{attribute}={value}"),
            Self::Reset => "reset".to_string(),
        }
    }
}

/// JSON line written for each step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub step: String,
    pub selection: Selection,
    pub matched: Option<u64>,
    pub price: Option<String>,
    pub purchase: PurchaseState,
    pub availability: Availability,
}

impl Report {
    fn new(step: String, selection: &Selection, outcome: &SelectionOutcome) -> Self {
        Self {
            step,
            selection: selection.clone(),
            matched: outcome.matched.as_ref().map(|v| v.id.get()),
            price: outcome.matched.as_ref().map(|v| v.price_display.clone()),
            purchase: outcome.purchase,
            availability: outcome.availability.clone(),
        }
    }
}

/// Load `blob` and run `steps`, returning the initial report plus one per step.
pub fn replay(product_id: ProductId, blob: &str, steps: &[Step]) -> anyhow::Result<Vec<Report>> {
    let mut selector = VariationSelector::from_json(product_id, blob)
        .context("failed to load variations blob")?;

    let rejected = selector.catalog().rejected().len();
    if rejected > 0 {
        tracing::warn!(rejected, "some catalog entries were skipped");
    }
    if selector.catalog().is_deferred() {
        tracing::warn!("catalog is deferred; nothing will match");
    }

    let mut reports = vec![Report::new(
        "initial".to_string(),
        selector.selection(),
        selector.outcome(),
    )];

    for step in steps {
        match step {
            Step::Select { attribute, value } => {
                selector
                    .select(attribute.as_str(), value.as_str())
                    .with_context(|| format!("step {}", step.label()))?;
            }
            Step::Reset => {
                selector.reset();
            }
        }
        reports.push(Report::new(step.label(), selector.selection(), selector.outcome()));
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_steps() {
        assert_eq!(Step::parse("reset").unwrap(), Step::Reset);
        assert_eq!(
            Step::parse(" color = red ").unwrap(),
            Step::Select {
                attribute: "color".to_string(),
                value: "red".to_string()
            }
        );
        assert!(Step::parse("color").is_err());
        assert!(Step::parse("=red").is_err());
    }

    #[test]
    fn replays_steps_in_order() {
        let blob = r#"[{"variation_id": 4, "attributes": {"color": "red"}, "price_html": "$4"}]"#;
        let steps = vec![
            Step::parse("color=red").unwrap(),
            Step::parse("color=red").unwrap(),
        ];
        let reports = replay(ProductId::new(1), blob, &steps).unwrap();

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].matched, None);
        assert_eq!(reports[1].matched, Some(4));
        assert_eq!(reports[1].price.as_deref(), Some("$4"));
        assert_eq!(reports[2].matched, None);
        assert!(reports[2].selection.is_empty());
    }

    #[test]
    fn invalid_blob_is_an_error() {
        let err = replay(ProductId::new(1), "{}", &[]).unwrap_err();
        assert!(err.to_string().contains("failed to load variations blob"));
    }
}

//! Selection lifecycle for one product page.
//!
//! `VariationSelector` is the only writer of its [`Selection`]. Every
//! transition goes through a [`SelectionCommand`], is decided into
//! [`SelectionEvent`]s, applied, and then followed by a recomputation of the
//! [`SelectionOutcome`] that registered observers receive.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use storefront_core::aggregate::execute;
use storefront_core::{Aggregate, AggregateRoot, DomainError, DomainResult, ProductId};

use crate::catalog::{Catalog, Variation};
use crate::matcher::{Availability, compute_availability_with, find_match};
use crate::options::AttributeOptions;
use crate::purchase::PurchaseState;
use crate::selection::Selection;

/// Command: pick (or toggle off) a value, or start over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionCommand {
    Select { attribute: String, value: String },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionEvent {
    AttributeSelected { attribute: String, value: String },
    AttributeCleared { attribute: String },
    SelectionReset,
}

/// Everything the rendering layer needs after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionOutcome {
    pub matched: Option<Variation>,
    pub availability: Availability,
    pub purchase: PurchaseState,
}

impl SelectionOutcome {
    pub fn compute(catalog: &Catalog, declared: &AttributeOptions, selection: &Selection) -> Self {
        let matched = find_match(catalog, selection);
        Self {
            purchase: PurchaseState::from_match(matched),
            matched: matched.cloned(),
            availability: compute_availability_with(catalog, selection, declared),
        }
    }
}

/// Receives every recomputed outcome (enable/disable options, swap price,
/// image and quantity bounds).
pub trait SelectionObserver {
    fn on_outcome(&self, selection: &Selection, outcome: &SelectionOutcome);
}

impl<F> SelectionObserver for F
where
    F: Fn(&Selection, &SelectionOutcome),
{
    fn on_outcome(&self, selection: &Selection, outcome: &SelectionOutcome) {
        self(selection, outcome)
    }
}

/// Variation selector for a single product (one instance per product form).
pub struct VariationSelector {
    product_id: ProductId,
    catalog: Arc<Catalog>,
    declared: AttributeOptions,
    selection: Selection,
    outcome: SelectionOutcome,
    observers: Vec<Box<dyn SelectionObserver>>,
    version: u64,
}

impl VariationSelector {
    pub fn new(product_id: ProductId, catalog: Arc<Catalog>) -> Self {
        Self::with_options(product_id, catalog, AttributeOptions::new())
    }

    /// `declared` adds options rendered by the page that the catalog may not
    /// mention; they take part in availability.
    pub fn with_options(
        product_id: ProductId,
        catalog: Arc<Catalog>,
        declared: AttributeOptions,
    ) -> Self {
        let selection = Selection::new();
        let outcome = SelectionOutcome::compute(&catalog, &declared, &selection);
        Self {
            product_id,
            catalog,
            declared,
            selection,
            outcome,
            observers: Vec::new(),
            version: 0,
        }
    }

    /// Build from the page's embedded variations blob.
    pub fn from_json(product_id: ProductId, blob: &str) -> DomainResult<Self> {
        let catalog = Catalog::from_json(blob)?;
        Ok(Self::new(product_id, Arc::new(catalog)))
    }

    pub fn subscribe(&mut self, observer: impl SelectionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Select `value` for `attribute`. Selecting the current value again, or
    /// an empty value, clears the attribute.
    pub fn select(
        &mut self,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> DomainResult<&SelectionOutcome> {
        self.dispatch(&SelectionCommand::Select {
            attribute: attribute.into(),
            value: value.into(),
        })?;
        Ok(&self.outcome)
    }

    /// Clear the whole selection.
    pub fn reset(&mut self) -> &SelectionOutcome {
        for ev in self.decide_reset() {
            self.apply(&ev);
        }
        self.refresh();
        &self.outcome
    }

    /// Run a command, then recompute and notify (even when nothing changed).
    pub fn dispatch(&mut self, command: &SelectionCommand) -> DomainResult<Vec<SelectionEvent>> {
        let events = execute(self, command)?;
        self.refresh();
        Ok(events)
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn outcome(&self) -> &SelectionOutcome {
        &self.outcome
    }

    pub fn matched(&self) -> Option<&Variation> {
        self.outcome.matched.as_ref()
    }

    fn decide_reset(&self) -> Vec<SelectionEvent> {
        if self.selection.is_empty() {
            Vec::new()
        } else {
            vec![SelectionEvent::SelectionReset]
        }
    }

    fn refresh(&mut self) {
        self.outcome = SelectionOutcome::compute(&self.catalog, &self.declared, &self.selection);
        tracing::debug!(
            product_id = %self.product_id,
            version = self.version,
            matched = ?self.outcome.matched.as_ref().map(|v| v.id.get()),
            "variation selection recomputed"
        );
        for observer in &self.observers {
            observer.on_outcome(&self.selection, &self.outcome);
        }
    }
}

impl core::fmt::Debug for VariationSelector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VariationSelector")
            .field("product_id", &self.product_id)
            .field("variations", &self.catalog.len())
            .field("selection", &self.selection)
            .field("outcome", &self.outcome)
            .field("observers", &self.observers.len())
            .field("version", &self.version)
            .finish()
    }
}

impl AggregateRoot for VariationSelector {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product_id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for VariationSelector {
    type Command = SelectionCommand;
    type Event = SelectionEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SelectionEvent::AttributeSelected { attribute, value } => {
                self.selection.insert(attribute.as_str(), value.as_str());
            }
            SelectionEvent::AttributeCleared { attribute } => {
                self.selection.remove(attribute);
            }
            SelectionEvent::SelectionReset => self.selection.clear(),
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SelectionCommand::Select { attribute, value } => {
                if attribute.trim().is_empty() {
                    return Err(DomainError::validation("attribute name cannot be empty"));
                }

                let current = self.selection.get(attribute);
                if value.is_empty() || current == Some(value.as_str()) {
                    return Ok(match current {
                        Some(_) => vec![SelectionEvent::AttributeCleared {
                            attribute: attribute.clone(),
                        }],
                        None => Vec::new(),
                    });
                }

                Ok(vec![SelectionEvent::AttributeSelected {
                    attribute: attribute.clone(),
                    value: value.clone(),
                }])
            }
            SelectionCommand::Reset => Ok(self.decide_reset()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AttributeSlot;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use storefront_core::VariationId;

    fn variation(id: u64, attributes: &[(&str, &str)]) -> Variation {
        Variation::new(
            VariationId::new(id),
            attributes
                .iter()
                .map(|(k, v)| (k.to_string(), AttributeSlot::exact(*v))),
        )
    }

    fn shirt_selector() -> VariationSelector {
        let catalog = Catalog::new(vec![
            variation(1, &[("color", "red"), ("size", "")]),
            variation(2, &[("color", "blue"), ("size", "L")]).with_stock(false),
        ]);
        VariationSelector::new(ProductId::new(100), Arc::new(catalog))
    }

    #[test]
    fn select_matches_and_reports_purchase_state() {
        let mut selector = shirt_selector();

        let outcome = selector.select("color", "red").unwrap();
        assert_eq!(outcome.matched.as_ref().map(|v| v.id.get()), Some(1));
        assert!(outcome.purchase.can_add_to_cart());

        selector.select("color", "blue").unwrap();
        assert!(selector.matched().is_none());
        assert_eq!(selector.outcome().purchase, PurchaseState::Incomplete);

        selector.select("size", "L").unwrap();
        assert_eq!(selector.matched().map(|v| v.id.get()), Some(2));
        assert_eq!(selector.outcome().purchase, PurchaseState::OutOfStock);
    }

    #[test]
    fn selecting_the_same_value_twice_clears_it() {
        let mut selector = shirt_selector();
        selector.select("color", "red").unwrap();
        let events = selector
            .dispatch(&SelectionCommand::Select {
                attribute: "color".to_string(),
                value: "red".to_string(),
            })
            .unwrap();

        assert_eq!(
            events,
            vec![SelectionEvent::AttributeCleared {
                attribute: "color".to_string()
            }]
        );
        assert!(!selector.selection().is_selected("color"));
        assert_eq!(selector.version(), 2);
    }

    #[test]
    fn empty_value_clears_without_event_when_unselected() {
        let mut selector = shirt_selector();
        let events = selector
            .dispatch(&SelectionCommand::Select {
                attribute: "size".to_string(),
                value: String::new(),
            })
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(selector.version(), 0);
    }

    #[test]
    fn empty_attribute_name_is_rejected() {
        let mut selector = shirt_selector();
        let err = selector.select("  ", "red").unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty attribute"),
        }
    }

    #[test]
    fn observers_see_every_recomputation() {
        let seen: Rc<RefCell<Vec<Option<u64>>>> = Rc::new(RefCell::new(Vec::new()));
        let mut selector = shirt_selector();
        let sink = Rc::clone(&seen);
        selector.subscribe(move |_: &Selection, outcome: &SelectionOutcome| {
            sink.borrow_mut()
                .push(outcome.matched.as_ref().map(|v| v.id.get()));
        });

        selector.select("color", "red").unwrap();
        selector.select("color", "blue").unwrap();
        selector.reset();
        // Reset of an empty selection still notifies.
        selector.reset();

        assert_eq!(*seen.borrow(), vec![Some(1), None, None, None]);
    }

    #[test]
    fn from_json_builds_a_working_selector() {
        let mut selector = VariationSelector::from_json(
            ProductId::new(5),
            r#"[{"variation_id": 9, "attributes": {"attribute_size": "S"}, "max_qty": 3}]"#,
        )
        .unwrap();
        let outcome = selector.select("attribute_size", "S").unwrap();
        match outcome.purchase {
            PurchaseState::Ready(bounds) => assert_eq!(bounds.max, Some(3)),
            other => panic!("Expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn declared_options_without_variations_are_unavailable() {
        let catalog = Arc::new(Catalog::deferred());
        let declared = AttributeOptions::new().with("size", "S").with("size", "M");
        let selector = VariationSelector::with_options(ProductId::new(1), catalog, declared);

        assert!(!selector.outcome().availability.is_available("size", "S"));
        assert!(!selector.outcome().availability.is_available("size", "M"));
        assert!(selector.outcome().availability.available_values("size").next().is_none());
    }

    #[derive(Debug, Clone)]
    enum Step {
        Select(&'static str, &'static str),
        Reset,
    }

    fn arb_step() -> impl Strategy<Value = Step> {
        prop_oneof![
            4 => (
                prop::sample::select(vec!["color", "size"]),
                prop::sample::select(vec!["red", "blue", "L", "S"]),
            )
                .prop_map(|(a, v)| Step::Select(a, v)),
            1 => Just(Step::Reset),
        ]
    }

    fn run(selector: &mut VariationSelector, steps: &[Step]) {
        for step in steps {
            match step {
                Step::Select(a, v) => {
                    selector.select(*a, *v).unwrap();
                }
                Step::Reset => {
                    selector.reset();
                }
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: selecting the same value twice leaves the attribute unset.
        #[test]
        fn double_toggle_unsets(
            steps in prop::collection::vec(arb_step(), 0..12),
            attribute in prop::sample::select(vec!["color", "size"]),
            value in prop::sample::select(vec!["red", "blue", "L", "S"]),
        ) {
            let mut selector = shirt_selector();
            run(&mut selector, &steps);
            prop_assume!(selector.selection().get(attribute) != Some(value));
            selector.select(attribute, value).unwrap();
            selector.select(attribute, value).unwrap();
            prop_assert!(!selector.selection().is_selected(attribute));
        }

        /// Property: reset restores the initial outcome.
        #[test]
        fn reset_restores_initial_state(steps in prop::collection::vec(arb_step(), 0..12)) {
            let mut selector = shirt_selector();
            let initial = selector.outcome().clone();
            run(&mut selector, &steps);
            let after = selector.reset().clone();
            prop_assert!(selector.selection().is_empty());
            prop_assert_eq!(after, initial);
        }

        /// Property: version counts applied events only.
        #[test]
        fn version_is_monotonic(steps in prop::collection::vec(arb_step(), 0..12)) {
            let mut selector = shirt_selector();
            let mut last = selector.version();
            for step in &steps {
                run(&mut selector, std::slice::from_ref(step));
                prop_assert!(selector.version() >= last);
                last = selector.version();
            }
        }
    }
}

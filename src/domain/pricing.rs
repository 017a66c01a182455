//! Pricing engine and per-item selection drafts.
//!
//! `unit_price = resolved item price + variation delta + Σ(add-on price × quantity)`.
//! Pricing is pure and never fails: a missing variation contributes nothing
//! and every selected add-on carries a positive quantity by construction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::aggregates::cart::CartItem;
use crate::domain::aggregates::menu_item::{AddOn, MenuItem, Variation};
use crate::domain::value_objects::{LineId, Money, Quantity};

/// One add-on snapshot with its repeat count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddOnSelection {
    #[serde(flatten)]
    pub add_on: AddOn,
    #[serde(default)]
    pub quantity: Quantity,
}

impl AddOnSelection {
    pub fn new(add_on: AddOn, quantity: Quantity) -> Self { Self { add_on, quantity } }
    pub fn subtotal(&self) -> Decimal { self.add_on.price * Decimal::from(self.quantity.value()) }

    /// `Cheese x2`, or just `Cheese` for a single unit.
    pub fn label(&self) -> String {
        if self.quantity.value() > 1 { format!("{} x{}", self.add_on.name, self.quantity) } else { self.add_on.name.clone() }
    }
}

/// Unit price of `item` with the given customization. Variation and add-ons
/// are expected to belong to `item`.
pub fn unit_price(item: &MenuItem, variation: Option<&Variation>, add_ons: &[AddOnSelection]) -> Money {
    let delta = variation.map(|v| v.price).unwrap_or(Decimal::ZERO);
    let extras: Decimal = add_ons.iter().map(AddOnSelection::subtotal).sum();
    Money::new(item.resolved_price() + delta + extras, &item.currency)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("item {item} has no variation {variation}")]
    UnknownVariation { item: String, variation: String },
    #[error("item {item} has no add-on {add_on}")]
    UnknownAddOn { item: String, add_on: String },
}

/// Customization state for one displayed item before it goes into the cart.
#[derive(Clone, Debug)]
pub struct SelectionDraft<'a> {
    item: &'a MenuItem,
    variation: Option<&'a Variation>,
    add_ons: Vec<AddOnSelection>,
}

impl<'a> SelectionDraft<'a> {
    /// Starts on the first variation, with no add-ons.
    pub fn new(item: &'a MenuItem) -> Self {
        Self { item, variation: item.variations.first(), add_ons: vec![] }
    }

    pub fn item(&self) -> &MenuItem { self.item }
    pub fn variation(&self) -> Option<&Variation> { self.variation }
    pub fn add_ons(&self) -> &[AddOnSelection] { &self.add_ons }

    pub fn select_variation(&mut self, variation_id: &str) -> Result<(), SelectionError> {
        let variation = self.item.variation(variation_id).ok_or_else(|| SelectionError::UnknownVariation {
            item: self.item.id.clone(), variation: variation_id.to_string(),
        })?;
        self.variation = Some(variation);
        Ok(())
    }

    /// Sets the repeat count of an add-on; zero or below drops it from the
    /// selection.
    pub fn set_add_on_quantity(&mut self, add_on_id: &str, quantity: i64) -> Result<(), SelectionError> {
        let add_on = self.item.add_on(add_on_id).ok_or_else(|| SelectionError::UnknownAddOn {
            item: self.item.id.clone(), add_on: add_on_id.to_string(),
        })?;
        match Quantity::from_signed(quantity) {
            None => self.add_ons.retain(|s| s.add_on.id != add_on_id),
            Some(quantity) => match self.add_ons.iter_mut().find(|s| s.add_on.id == add_on_id) {
                Some(existing) => existing.quantity = quantity,
                None => self.add_ons.push(AddOnSelection::new(add_on.clone(), quantity)),
            },
        }
        Ok(())
    }

    /// Current count for the add-on stepper; 0 when not selected.
    pub fn add_on_quantity(&self, add_on_id: &str) -> u32 {
        self.add_ons.iter().find(|s| s.add_on.id == add_on_id).map(|s| s.quantity.value()).unwrap_or(0)
    }

    pub fn unit_price(&self) -> Money { unit_price(self.item, self.variation, &self.add_ons) }

    /// Freezes the draft into a one-unit cart line and clears the add-on
    /// selection. The chosen variation is kept for the next add.
    pub fn take_cart_item(&mut self) -> CartItem {
        let total_price = self.unit_price();
        CartItem {
            id: LineId::new(),
            item_id: self.item.id.clone(),
            name: self.item.name.clone(),
            quantity: 1,
            selected_variation: self.variation.cloned(),
            selected_add_ons: std::mem::take(&mut self.add_ons),
            total_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fries() -> MenuItem {
        MenuItem::new("fries", "Fries", Decimal::new(50, 0))
            .with_variation("regular", "Regular", Decimal::ZERO)
            .with_variation("large", "Large", Decimal::new(20, 0))
            .with_add_on("cheese", "Cheese", Decimal::new(10, 0))
            .with_add_on("gravy", "Gravy", Decimal::new(15, 0))
    }

    #[test]
    fn test_unit_price_formula() {
        let item = fries();
        let cheese = AddOnSelection::new(item.add_ons[0].clone(), Quantity::new(2).unwrap());
        let price = unit_price(&item, item.variation("large"), &[cheese]);
        assert_eq!(price.amount(), Decimal::new(90, 0));
    }

    #[test]
    fn test_unit_price_without_customization_is_resolved_price() {
        let item = fries().with_discount(Decimal::new(45, 0));
        assert_eq!(unit_price(&item, None, &[]).amount(), Decimal::new(45, 0));
    }

    #[test]
    fn test_unit_price_never_below_resolved_price_for_non_negative_deltas() {
        let item = fries();
        for variation in item.variations.iter().map(Some).chain([None]) {
            for qty in 1..4u32 {
                let sel = AddOnSelection::new(item.add_ons[1].clone(), Quantity::new(qty).unwrap());
                let price = unit_price(&item, variation, &[sel]);
                assert!(price.amount() >= item.resolved_price());
            }
        }
    }

    #[test]
    fn test_draft_defaults_to_first_variation() {
        let item = fries();
        let draft = SelectionDraft::new(&item);
        assert_eq!(draft.variation().map(|v| v.id.as_str()), Some("regular"));
        assert_eq!(draft.unit_price().amount(), Decimal::new(50, 0));
    }

    #[test]
    fn test_draft_add_on_membership_is_quantity_gated() {
        let item = fries();
        let mut draft = SelectionDraft::new(&item);
        draft.set_add_on_quantity("cheese", 1).unwrap();
        draft.set_add_on_quantity("cheese", 3).unwrap();
        assert_eq!(draft.add_ons().len(), 1);
        assert_eq!(draft.add_on_quantity("cheese"), 3);
        draft.set_add_on_quantity("cheese", 0).unwrap();
        assert!(draft.add_ons().is_empty());
        draft.set_add_on_quantity("gravy", 2).unwrap();
        draft.set_add_on_quantity("gravy", -5).unwrap();
        assert_eq!(draft.add_on_quantity("gravy"), 0);
    }

    #[test]
    fn test_draft_oversized_add_on_quantity_is_kept() {
        let item = fries();
        let mut draft = SelectionDraft::new(&item);
        draft.set_add_on_quantity("cheese", 5_000_000_000).unwrap();
        assert_eq!(draft.add_on_quantity("cheese"), u32::MAX);
    }

    #[test]
    fn test_draft_rejects_foreign_ids() {
        let item = fries();
        let mut draft = SelectionDraft::new(&item);
        assert!(matches!(draft.select_variation("jumbo"), Err(SelectionError::UnknownVariation { .. })));
        assert!(matches!(draft.set_add_on_quantity("bacon", 1), Err(SelectionError::UnknownAddOn { .. })));
    }

    #[test]
    fn test_take_cart_item_freezes_price_and_resets_add_ons() {
        let item = fries();
        let mut draft = SelectionDraft::new(&item);
        draft.select_variation("large").unwrap();
        draft.set_add_on_quantity("cheese", 2).unwrap();
        let line = draft.take_cart_item();
        assert_eq!(line.total_price.amount(), Decimal::new(90, 0));
        assert_eq!(line.quantity, 1);
        assert_eq!(line.selected_add_ons.len(), 1);
        assert!(draft.add_ons().is_empty());
        assert_eq!(draft.variation().map(|v| v.id.as_str()), Some("large"));
    }

    #[test]
    fn test_add_on_label() {
        let item = fries();
        assert_eq!(AddOnSelection::new(item.add_ons[0].clone(), Quantity::ONE).label(), "Cheese");
        assert_eq!(AddOnSelection::new(item.add_ons[0].clone(), Quantity::new(2).unwrap()).label(), "Cheese x2");
    }
}

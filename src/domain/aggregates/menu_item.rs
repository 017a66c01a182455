//! Menu Item Aggregate
//!
//! Catalog data is immutable once loaded: menu items, their variations and
//! their add-ons are only read by pricing and the cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{Money, DEFAULT_CURRENCY};

/// Label used for add-ons that carry no category of their own.
pub const DEFAULT_ADD_ON_GROUP: &str = "Extras";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: Decimal,
    #[serde(default)]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub is_on_discount: bool,
    /// Overrides both base and discount price when present.
    #[serde(default)]
    pub effective_price: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub variations: Vec<Variation>,
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
}

/// Mutually exclusive size/type choice with a price delta over the base.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variation { pub id: String, pub name: String, #[serde(default)] pub price: Decimal }

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_currency() -> String { DEFAULT_CURRENCY.to_string() }
fn default_true() -> bool { true }

impl MenuItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, base_price: Decimal) -> Self {
        Self {
            id: id.into(), name: name.into(), description: String::new(), base_price,
            discount_price: None, is_on_discount: false, effective_price: None,
            currency: default_currency(), category: None, image: None, available: true,
            popular: false, variations: vec![], add_ons: vec![],
        }
    }

    pub fn with_variation(mut self, id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        self.variations.push(Variation { id: id.into(), name: name.into(), price });
        self
    }

    pub fn with_add_on(mut self, id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        self.add_ons.push(AddOn { id: id.into(), name: name.into(), price, category: None });
        self
    }

    pub fn with_discount(mut self, discount_price: Decimal) -> Self {
        self.discount_price = Some(discount_price);
        self.is_on_discount = true;
        self
    }

    /// Price before any customization: the override, else the discount price
    /// while the item is on discount, else the base price.
    pub fn resolved_price(&self) -> Decimal {
        if let Some(price) = self.effective_price { return price; }
        match (self.is_on_discount, self.discount_price) {
            (true, Some(discount)) => discount,
            _ => self.base_price,
        }
    }

    pub fn price(&self) -> Money { Money::new(self.resolved_price(), &self.currency) }

    /// "Limited offer" badge.
    pub fn is_discounted(&self) -> bool { self.is_on_discount && self.discount_price.is_some() }

    /// Items with variations or add-ons go through a selection draft; plain
    /// items are added straight to the cart.
    pub fn needs_customization(&self) -> bool { !self.variations.is_empty() || !self.add_ons.is_empty() }

    pub fn variation(&self, id: &str) -> Option<&Variation> { self.variations.iter().find(|v| v.id == id) }
    pub fn add_on(&self, id: &str) -> Option<&AddOn> { self.add_ons.iter().find(|a| a.id == id) }

    /// Add-ons grouped by category label, groups and members in catalog order.
    pub fn add_on_groups(&self) -> Vec<(&str, Vec<&AddOn>)> {
        let mut groups: Vec<(&str, Vec<&AddOn>)> = Vec::new();
        for add_on in &self.add_ons {
            let label = add_on.group();
            match groups.iter_mut().find(|(l, _)| *l == label) {
                Some((_, members)) => members.push(add_on),
                None => groups.push((label, vec![add_on])),
            }
        }
        groups
    }
}

impl AddOn {
    pub fn group(&self) -> &str {
        self.category.as_deref().filter(|c| !c.is_empty()).unwrap_or(DEFAULT_ADD_ON_GROUP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_price_prefers_discount_when_active() {
        let item = MenuItem::new("fries", "Fries", Decimal::new(50, 0)).with_discount(Decimal::new(40, 0));
        assert_eq!(item.resolved_price(), Decimal::new(40, 0));
        assert!(item.is_discounted());
    }

    #[test]
    fn test_resolved_price_ignores_inactive_discount() {
        let mut item = MenuItem::new("fries", "Fries", Decimal::new(50, 0));
        item.discount_price = Some(Decimal::new(40, 0));
        assert_eq!(item.resolved_price(), Decimal::new(50, 0));
        item.is_on_discount = true;
        item.discount_price = None;
        assert_eq!(item.resolved_price(), Decimal::new(50, 0));
        assert!(!item.is_discounted());
    }

    #[test]
    fn test_effective_price_overrides() {
        let mut item = MenuItem::new("fries", "Fries", Decimal::new(50, 0)).with_discount(Decimal::new(40, 0));
        item.effective_price = Some(Decimal::new(35, 0));
        assert_eq!(item.price().to_string(), "₱35.00");
    }

    #[test]
    fn test_needs_customization() {
        let plain = MenuItem::new("water", "Water", Decimal::new(20, 0));
        assert!(!plain.needs_customization());
        assert!(plain.clone().with_variation("l", "Large", Decimal::new(5, 0)).needs_customization());
        assert!(plain.with_add_on("ice", "Ice", Decimal::ZERO).needs_customization());
    }

    #[test]
    fn test_add_on_groups_keep_catalog_order() {
        let mut item = MenuItem::new("burger", "Burger", Decimal::new(99, 0))
            .with_add_on("cheese", "Cheese", Decimal::new(10, 0))
            .with_add_on("bacon", "Bacon", Decimal::new(25, 0))
            .with_add_on("mayo", "Mayo", Decimal::ZERO);
        item.add_ons[1].category = Some("meat".into());
        let groups = item.add_on_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Extras");
        assert_eq!(groups[0].1.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), vec!["cheese", "mayo"]);
        assert_eq!(groups[1].0, "meat");
    }

    #[test]
    fn test_deserialize_defaults() {
        let item: MenuItem = serde_json::from_str(r#"{"id":"a","name":"A","base_price":50}"#).unwrap();
        assert!(item.available);
        assert_eq!(item.currency, "PHP");
        assert!(item.variations.is_empty());
    }
}

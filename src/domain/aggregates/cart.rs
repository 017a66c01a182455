//! Cart Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use crate::domain::aggregates::menu_item::{MenuItem, Variation};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::pricing::AddOnSelection;
use crate::domain::value_objects::{LineId, Money, Quantity};

#[derive(Clone, Debug)]
pub struct Cart {
    id: String,
    items: Vec<CartItem>,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

/// One line of the cart: a menu item snapshot with a fixed unit price.
///
/// `total_price` is the unit price resolved when the line was created; it is
/// never re-read from the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: LineId,
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
    pub selected_variation: Option<Variation>,
    #[serde(default)]
    pub selected_add_ons: Vec<AddOnSelection>,
    pub total_price: Money,
}

impl CartItem {
    /// Uncustomized line at the item's resolved price.
    pub fn plain(item: &MenuItem) -> Self {
        Self {
            id: LineId::new(), item_id: item.id.clone(), name: item.name.clone(), quantity: 1,
            selected_variation: None, selected_add_ons: vec![], total_price: item.price(),
        }
    }

    pub fn line_total(&self) -> Money { self.total_price.multiply(self.quantity) }
    pub fn is_customized(&self) -> bool { self.selected_variation.is_some() || !self.selected_add_ons.is_empty() }
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(), items: vec![], currency: currency.to_string(),
            created_at: Utc::now(), updated_at: Utc::now(), events: vec![],
        }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn line_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Units across all lines, as shown on the cart badge.
    pub fn item_count(&self) -> u64 { self.items.iter().map(|i| u64::from(i.quantity)).sum() }

    pub fn line(&self, id: &LineId) -> Option<&CartItem> { self.items.iter().find(|i| &i.id == id) }

    /// The uncustomized line for `item_id`, if any. Callers re-adding a plain
    /// item bump this line instead of adding another.
    pub fn plain_line(&self, item_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.item_id == item_id && !i.is_customized())
    }

    /// Units of `item_id` across every configuration.
    pub fn quantity_of(&self, item_id: &str) -> u64 {
        self.items.iter().filter(|i| i.item_id == item_id).map(|i| u64::from(i.quantity)).sum()
    }

    /// Appends a line. Lines are never merged here, even for identical
    /// configurations.
    pub fn add(&mut self, item: CartItem) -> Result<LineId, CartError> {
        if item.total_price.currency() != self.currency {
            return Err(CartError::CurrencyMismatch { expected: self.currency.clone(), found: item.total_price.currency().to_string() });
        }
        let id = item.id;
        self.raise_event(DomainEvent::Cart(CartEvent::LineAdded { line_id: id, item_id: item.item_id.clone(), quantity: item.quantity }));
        self.items.push(item);
        self.touch();
        Ok(id)
    }

    /// Sets a line's quantity. Zero or below removes the line; anything past
    /// `u32::MAX` is capped there.
    pub fn update_quantity(&mut self, id: &LineId, quantity: i64) -> Result<(), CartError> {
        let item = self.items.iter_mut().find(|i| &i.id == id).ok_or(CartError::LineNotFound(*id))?;
        match Quantity::from_signed(quantity) {
            Some(quantity) => {
                let quantity = quantity.value();
                item.quantity = quantity;
                self.raise_event(DomainEvent::Cart(CartEvent::QuantityUpdated { line_id: *id, quantity }));
                self.touch();
                Ok(())
            }
            None => self.remove(id),
        }
    }

    pub fn remove(&mut self, id: &LineId) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| &i.id != id);
        if self.items.len() == before { return Err(CartError::LineNotFound(*id)); }
        self.raise_event(DomainEvent::Cart(CartEvent::LineRemoved { line_id: *id }));
        self.touch();
        Ok(())
    }

    pub fn clear(&mut self) {
        let lines = self.items.len();
        self.items.clear();
        self.raise_event(DomainEvent::Cart(CartEvent::Cleared { lines }));
        self.touch();
    }

    /// Σ unit price × quantity; zero for an empty cart.
    pub fn total(&self) -> Money {
        let amount: Decimal = self.items.iter().map(|i| i.line_total().amount()).sum();
        Money::new(amount, &self.currency)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("cart line {0} not found")]
    LineNotFound(LineId),
    #[error("cart is priced in {expected}, line is priced in {found}")]
    CurrencyMismatch { expected: String, found: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::SelectionDraft;

    fn fries() -> MenuItem {
        MenuItem::new("fries", "Fries", Decimal::new(50, 0))
            .with_variation("large", "Large", Decimal::new(20, 0))
            .with_add_on("cheese", "Cheese", Decimal::new(10, 0))
    }

    fn recomputed_total(cart: &Cart) -> Decimal {
        cart.items().iter().map(|i| i.total_price.amount() * Decimal::from(i.quantity)).sum()
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        let cart = Cart::new("PHP");
        assert!(cart.total().is_zero());
        assert_eq!(cart.total().to_string(), "₱0.00");
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_fries_scenario() {
        let item = fries();
        let mut draft = SelectionDraft::new(&item);
        draft.select_variation("large").unwrap();
        draft.set_add_on_quantity("cheese", 2).unwrap();
        let mut cart = Cart::new("PHP");
        let line = cart.add(draft.take_cart_item()).unwrap();
        assert_eq!(cart.line(&line).unwrap().total_price.amount(), Decimal::new(90, 0));
        cart.update_quantity(&line, 2).unwrap();
        assert_eq!(cart.total().amount(), Decimal::new(180, 0));
    }

    #[test]
    fn test_customized_adds_are_separate_lines() {
        let item = fries();
        let mut draft = SelectionDraft::new(&item);
        let mut cart = Cart::new("PHP");
        cart.add(draft.take_cart_item()).unwrap();
        cart.add(draft.take_cart_item()).unwrap();
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.quantity_of("fries"), 2);
        assert!(cart.plain_line("fries").is_none());
    }

    #[test]
    fn test_update_to_zero_or_negative_removes() {
        let item = MenuItem::new("water", "Water", Decimal::new(20, 0));
        let mut cart = Cart::new("PHP");
        let a = cart.add(CartItem::plain(&item)).unwrap();
        let b = cart.add(CartItem::plain(&item)).unwrap();
        cart.update_quantity(&a, 0).unwrap();
        cart.update_quantity(&b, -1).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.update_quantity(&a, 3), Err(CartError::LineNotFound(a)));
    }

    #[test]
    fn test_oversized_quantity_is_capped_not_removed() {
        let item = MenuItem::new("water", "Water", Decimal::new(20, 0));
        let mut cart = Cart::new("PHP");
        let a = cart.add(CartItem::plain(&item)).unwrap();
        cart.update_quantity(&a, 5_000_000_000).unwrap();
        assert_eq!(cart.line(&a).unwrap().quantity, u32::MAX);
        assert_eq!(cart.total().amount(), Decimal::from(u32::MAX) * Decimal::new(20, 0));
    }

    #[test]
    fn test_unit_counts_do_not_overflow() {
        let item = MenuItem::new("water", "Water", Decimal::new(20, 0));
        let mut cart = Cart::new("PHP");
        let a = cart.add(CartItem::plain(&item)).unwrap();
        cart.add(CartItem::plain(&item)).unwrap();
        cart.update_quantity(&a, i64::from(u32::MAX)).unwrap();
        assert_eq!(cart.item_count(), u64::from(u32::MAX) + 1);
        assert_eq!(cart.quantity_of("water"), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_total_matches_independent_recomputation() {
        let item = fries();
        let water = MenuItem::new("water", "Water", Decimal::new(1999, 2));
        let mut cart = Cart::new("PHP");
        let mut draft = SelectionDraft::new(&item);
        draft.set_add_on_quantity("cheese", 3).unwrap();
        let a = cart.add(draft.take_cart_item()).unwrap();
        let b = cart.add(CartItem::plain(&water)).unwrap();
        let c = cart.add(CartItem::plain(&item)).unwrap();
        assert_eq!(cart.total().amount(), recomputed_total(&cart));
        cart.update_quantity(&a, 4).unwrap();
        assert_eq!(cart.total().amount(), recomputed_total(&cart));
        cart.remove(&b).unwrap();
        assert_eq!(cart.total().amount(), recomputed_total(&cart));
        cart.update_quantity(&c, -3).unwrap();
        assert_eq!(cart.total().amount(), recomputed_total(&cart));
        assert_eq!(cart.total().amount(), Decimal::new(400, 0));
        cart.clear();
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_price_is_fixed_at_add_time() {
        let mut item = MenuItem::new("water", "Water", Decimal::new(20, 0));
        let mut cart = Cart::new("PHP");
        cart.add(CartItem::plain(&item)).unwrap();
        item.base_price = Decimal::new(99, 0);
        assert_eq!(cart.total().amount(), Decimal::new(20, 0));
    }

    #[test]
    fn test_remove_unknown_line() {
        let mut cart = Cart::new("PHP");
        let id = LineId::new();
        assert_eq!(cart.remove(&id), Err(CartError::LineNotFound(id)));
    }

    #[test]
    fn test_rejects_foreign_currency() {
        let mut item = MenuItem::new("water", "Water", Decimal::new(2, 0));
        item.currency = "USD".into();
        let mut cart = Cart::new("PHP");
        assert!(matches!(cart.add(CartItem::plain(&item)), Err(CartError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_operations_raise_events() {
        let item = MenuItem::new("water", "Water", Decimal::new(20, 0));
        let mut cart = Cart::new("PHP");
        let id = cart.add(CartItem::plain(&item)).unwrap();
        cart.update_quantity(&id, 2).unwrap();
        cart.clear();
        let events = cart.take_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[2], DomainEvent::Cart(CartEvent::Cleared { lines: 1 })));
        assert!(cart.take_events().is_empty());
    }
}

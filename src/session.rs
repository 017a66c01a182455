//! One shopper's cart and checkout, driven by the storefront service.

use serde::Deserialize;
use crate::catalog::Catalog;
use crate::domain::aggregates::{Cart, CartItem, Checkout, CheckoutDetails, Order};
use crate::domain::events::DomainEvent;
use crate::domain::pricing::SelectionDraft;
use crate::domain::value_objects::LineId;
use crate::{Result, StorefrontError};

/// Add-to-cart input: the item plus the customization picked on its card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Selection {
    pub item_id: String,
    #[serde(default)]
    pub variation_id: Option<String>,
    #[serde(default)]
    pub add_ons: Vec<AddOnChoice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AddOnChoice {
    pub id: String,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 { 1 }

impl Selection {
    pub fn plain(item_id: impl Into<String>) -> Self { Self { item_id: item_id.into(), ..Self::default() } }
}

#[derive(Clone, Debug)]
pub struct ShopperSession {
    cart: Cart,
    checkout: Option<Checkout>,
}

impl ShopperSession {
    pub fn new(currency: &str) -> Self { Self { cart: Cart::new(currency), checkout: None } }

    pub fn cart(&self) -> &Cart { &self.cart }
    pub fn checkout(&self) -> Option<&Checkout> { self.checkout.as_ref() }

    /// Plain items bump their existing plain line; anything customizable goes
    /// through a selection draft and always lands on a new line.
    pub fn add_to_cart(&mut self, catalog: &Catalog, selection: &Selection) -> Result<LineId> {
        let item = catalog.item(&selection.item_id).ok_or_else(|| StorefrontError::ItemNotFound(selection.item_id.clone()))?;
        if !item.available { return Err(StorefrontError::ItemUnavailable(item.id.clone())); }
        if !item.needs_customization() {
            if let Some(line) = self.cart.plain_line(&item.id) {
                let (id, quantity) = (line.id, line.quantity);
                self.cart.update_quantity(&id, i64::from(quantity) + 1)?;
                return Ok(id);
            }
            return Ok(self.cart.add(CartItem::plain(item))?);
        }
        let mut draft = SelectionDraft::new(item);
        if let Some(variation_id) = &selection.variation_id {
            draft.select_variation(variation_id)?;
        }
        for choice in &selection.add_ons {
            draft.set_add_on_quantity(&choice.id, choice.quantity)?;
        }
        Ok(self.cart.add(draft.take_cart_item())?)
    }

    pub fn update_quantity(&mut self, line: &LineId, quantity: i64) -> Result<()> {
        Ok(self.cart.update_quantity(line, quantity)?)
    }

    pub fn remove(&mut self, line: &LineId) -> Result<()> { Ok(self.cart.remove(line)?) }

    pub fn clear_cart(&mut self) { self.cart.clear(); }

    /// Starts a fresh checkout; any previous one is discarded.
    pub fn begin_checkout(&mut self) -> Result<&Checkout> {
        let checkout = self.checkout.insert(Checkout::begin(&self.cart)?);
        Ok(&*checkout)
    }

    pub fn update_details(&mut self, details: CheckoutDetails) -> Result<()> {
        Ok(self.checkout_mut()?.update_details(details)?)
    }

    pub fn advance(&mut self, catalog: &Catalog) -> Result<()> {
        Ok(self.checkout_mut()?.advance(catalog.payment_methods())?)
    }

    pub fn back(&mut self) -> Result<()> {
        self.checkout_mut()?.back();
        Ok(())
    }

    pub fn select_payment_method(&mut self, catalog: &Catalog, method_id: &str) -> Result<()> {
        Ok(self.checkout_mut()?.select_payment_method(catalog.payment_methods(), method_id)?)
    }

    pub fn confirm(&mut self, catalog: &Catalog) -> Result<Order> {
        let checkout = self.checkout.as_mut().ok_or(StorefrontError::CheckoutNotStarted)?;
        Ok(checkout.confirm(&self.cart, catalog.payment_methods())?)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        let mut events = self.cart.take_events();
        if let Some(checkout) = self.checkout.as_mut() { events.extend(checkout.take_events()); }
        events
    }

    fn checkout_mut(&mut self) -> Result<&mut Checkout> {
        self.checkout.as_mut().ok_or(StorefrontError::CheckoutNotStarted)
    }
}

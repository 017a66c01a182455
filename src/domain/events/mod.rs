//! Domain events
use crate::domain::value_objects::LineId;
use rust_decimal::Decimal;

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Cart(CartEvent),
    Checkout(CheckoutEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    LineAdded { line_id: LineId, item_id: String, quantity: u32 },
    QuantityUpdated { line_id: LineId, quantity: u32 },
    LineRemoved { line_id: LineId },
    Cleared { lines: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutEvent {
    Started { checkout_id: String },
    AdvancedToPayment { checkout_id: String, service: &'static str },
    ReturnedToDetails { checkout_id: String },
    PaymentMethodSelected { checkout_id: String, method_id: String },
    HandedOff { checkout_id: String, lines: usize, total: Decimal },
}

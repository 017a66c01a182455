//! Checkout Aggregate
//!
//! Two steps, `Details` then `Payment`. Confirming from `Payment` yields an
//! [`Order`] value for the transcript; nothing is kept after the handoff.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationError};
use crate::domain::aggregates::cart::{Cart, CartItem};
use crate::domain::events::{CheckoutEvent, DomainEvent};
use crate::domain::value_objects::Money;

/// Upper bound of the party size stepper.
pub const MAX_PARTY_SIZE: u32 = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep { #[default] Details, Payment }

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Details => write!(f, "details"), Self::Payment => write!(f, "payment") }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CustomerInfo {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(custom = "not_blank")]
    pub contact_number: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { return Err(ValidationError::new("blank")); }
    Ok(())
}

/// Pickup window: one of the preset ranges or free text from the shopper.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupTime {
    #[default]
    #[serde(rename = "5-10")]
    FiveToTen,
    #[serde(rename = "15-20")]
    FifteenToTwenty,
    #[serde(rename = "25-30")]
    TwentyFiveToThirty,
    #[serde(rename = "custom")]
    Custom(String),
}

impl PickupTime {
    pub fn label(&self) -> String {
        match self {
            Self::FiveToTen => "5-10 minutes".to_string(),
            Self::FifteenToTwenty => "15-20 minutes".to_string(),
            Self::TwentyFiveToThirty => "25-30 minutes".to_string(),
            Self::Custom(text) => text.trim().to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServiceType {
    DineIn {
        party_size: u32,
        #[serde(default, with = "local_datetime")]
        arrival: Option<NaiveDateTime>,
    },
    Pickup {
        #[serde(default)]
        time: PickupTime,
    },
    Delivery {
        address: String,
        #[serde(default)]
        landmark: Option<String>,
    },
}

impl Default for ServiceType {
    fn default() -> Self { Self::DineIn { party_size: 1, arrival: None } }
}

impl ServiceType {
    pub fn kind(&self) -> &'static str {
        match self { Self::DineIn { .. } => "dine-in", Self::Pickup { .. } => "pickup", Self::Delivery { .. } => "delivery" }
    }

    pub fn label(&self) -> &'static str {
        match self { Self::DineIn { .. } => "Dine-in", Self::Pickup { .. } => "Pickup", Self::Delivery { .. } => "Delivery" }
    }
}

/// Accepts browser `datetime-local` values with or without seconds. An empty
/// string means "not chosen".
mod local_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => s.serialize_str(&dt.format("%Y-%m-%dT%H:%M").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else { return Ok(None) };
        FORMATS.iter()
            .find_map(|f| NaiveDateTime::parse_from_str(raw.trim(), f).ok())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date/time: {raw}")))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDetails {
    #[serde(flatten)]
    pub customer: CustomerInfo,
    pub service: ServiceType,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CheckoutDetails {
    /// Fields still blocking the move to payment, in a stable order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if let Err(errors) = self.customer.validate() {
            let mut fields: Vec<&'static str> = errors.field_errors().into_keys().collect();
            fields.sort_unstable();
            missing.extend(fields);
        }
        match &self.service {
            ServiceType::DineIn { party_size, arrival } => {
                if *party_size == 0 || *party_size > MAX_PARTY_SIZE { missing.push("party_size"); }
                if arrival.is_none() { missing.push("arrival"); }
            }
            ServiceType::Pickup { time: PickupTime::Custom(text) } if text.trim().is_empty() => missing.push("custom_time"),
            ServiceType::Pickup { .. } => {}
            ServiceType::Delivery { address, .. } => {
                if address.trim().is_empty() { missing.push("address"); }
            }
        }
        missing
    }

    pub fn is_complete(&self) -> bool { self.missing_fields().is_empty() }
}

/// A way to pay, shown with its account details and QR code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub qr_code_url: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_true() -> bool { true }

/// Everything the transcript needs, captured at confirmation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Order {
    pub customer: CustomerInfo,
    pub service: ServiceType,
    pub lines: Vec<CartItem>,
    pub total: Money,
    pub payment_method: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Checkout {
    id: String,
    step: CheckoutStep,
    details: CheckoutDetails,
    payment_method: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl Checkout {
    /// Entry point from the cart; an empty cart cannot check out.
    pub fn begin(cart: &Cart) -> Result<Self, CheckoutError> {
        if cart.is_empty() { return Err(CheckoutError::EmptyCart); }
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut checkout = Self {
            id: id.clone(), step: CheckoutStep::Details, details: CheckoutDetails::default(),
            payment_method: None, created_at: now, updated_at: now, events: vec![],
        };
        checkout.raise_event(DomainEvent::Checkout(CheckoutEvent::Started { checkout_id: id }));
        Ok(checkout)
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn step(&self) -> CheckoutStep { self.step }
    pub fn details(&self) -> &CheckoutDetails { &self.details }
    pub fn payment_method_id(&self) -> Option<&str> { self.payment_method.as_deref() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn can_advance(&self) -> bool { self.step == CheckoutStep::Details && self.details.is_complete() }

    pub fn update_details(&mut self, details: CheckoutDetails) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Details)?;
        self.details = details;
        self.touch();
        Ok(())
    }

    /// Details → Payment. Refused, with no state change, while any required
    /// field is missing.
    pub fn advance(&mut self, methods: &[PaymentMethod]) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Details)?;
        let missing = self.details.missing_fields();
        if !missing.is_empty() { return Err(CheckoutError::IncompleteDetails(missing)); }
        self.step = CheckoutStep::Payment;
        self.payment_methods_loaded(methods);
        self.touch();
        self.raise_event(DomainEvent::Checkout(CheckoutEvent::AdvancedToPayment { checkout_id: self.id.clone(), service: self.details.service.kind() }));
        Ok(())
    }

    /// Payment → Details; a no-op on the details step.
    pub fn back(&mut self) {
        if self.step == CheckoutStep::Details { return; }
        self.step = CheckoutStep::Details;
        self.touch();
        self.raise_event(DomainEvent::Checkout(CheckoutEvent::ReturnedToDetails { checkout_id: self.id.clone() }));
    }

    /// Picks the first listed method when none is chosen yet.
    pub fn payment_methods_loaded(&mut self, methods: &[PaymentMethod]) {
        if self.payment_method.is_none() {
            self.payment_method = methods.first().map(|m| m.id.clone());
        }
    }

    pub fn select_payment_method(&mut self, methods: &[PaymentMethod], method_id: &str) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Payment)?;
        let method = methods.iter().find(|m| m.id == method_id).ok_or_else(|| CheckoutError::UnknownPaymentMethod(method_id.to_string()))?;
        self.payment_method = Some(method.id.clone());
        self.touch();
        self.raise_event(DomainEvent::Checkout(CheckoutEvent::PaymentMethodSelected { checkout_id: self.id.clone(), method_id: method.id.clone() }));
        Ok(())
    }

    pub fn selected_payment_method<'a>(&self, methods: &'a [PaymentMethod]) -> Option<&'a PaymentMethod> {
        let id = self.payment_method.as_deref()?;
        methods.iter().find(|m| m.id == id)
    }

    /// Captures the order for handoff. The checkout stays on the payment step
    /// so the shopper can hand off again if the messaging app did not open.
    pub fn confirm(&mut self, cart: &Cart, methods: &[PaymentMethod]) -> Result<Order, CheckoutError> {
        self.expect_step(CheckoutStep::Payment)?;
        if cart.is_empty() { return Err(CheckoutError::EmptyCart); }
        let missing = self.details.missing_fields();
        if !missing.is_empty() { return Err(CheckoutError::IncompleteDetails(missing)); }
        let method = self.selected_payment_method(methods).ok_or(CheckoutError::NoPaymentMethod)?;
        let order = Order {
            customer: self.details.customer.clone(),
            service: self.details.service.clone(),
            lines: cart.items().to_vec(),
            total: cart.total(),
            payment_method: method.name.clone(),
            notes: self.details.notes.clone().filter(|n| !n.trim().is_empty()),
        };
        self.raise_event(DomainEvent::Checkout(CheckoutEvent::HandedOff { checkout_id: self.id.clone(), lines: order.lines.len(), total: order.total.amount() }));
        Ok(order)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn expect_step(&self, expected: CheckoutStep) -> Result<(), CheckoutError> {
        if self.step != expected { return Err(CheckoutError::WrongStep { expected, actual: self.step }); }
        Ok(())
    }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("missing checkout details: {}", .0.join(", "))]
    IncompleteDetails(Vec<&'static str>),
    #[error("checkout is on the {actual} step, expected {expected}")]
    WrongStep { expected: CheckoutStep, actual: CheckoutStep },
    #[error("unknown payment method {0}")]
    UnknownPaymentMethod(String),
    #[error("no payment method selected")]
    NoPaymentMethod,
}

//! Order transcript: the human-readable message handed to the messaging app.

use chrono::NaiveDateTime;
use std::fmt;
use crate::domain::aggregates::cart::CartItem;
use crate::domain::aggregates::checkout::{Order, ServiceType};

/// `Saturday, October 17, 2026 at 02:30 PM`
const ARRIVAL_FORMAT: &str = "%A, %B %-d, %Y at %I:%M %p";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderTranscript(String);

impl OrderTranscript {
    pub fn render(order: &Order, shop_name: &str) -> Self {
        Self(OrderMessage { order, shop_name }.to_string().trim().to_string())
    }

    pub fn as_str(&self) -> &str { &self.0 }
    pub fn into_string(self) -> String { self.0 }
}

impl fmt::Display for OrderTranscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

pub fn format_arrival(arrival: &NaiveDateTime) -> String { arrival.format(ARRIVAL_FORMAT).to_string() }

/// `• Fries (Large) + Cheese x2, Gravy x2 - ₱210.00` for two units with one gravy each.
pub fn line_summary(line: &CartItem) -> String {
    let mut text = format!("• {}", line.name);
    if let Some(variation) = &line.selected_variation {
        text.push_str(&format!(" ({})", variation.name));
    }
    if !line.selected_add_ons.is_empty() {
        let add_ons: Vec<String> = line.selected_add_ons.iter().map(|a| a.label()).collect();
        text.push_str(&format!(" + {}", add_ons.join(", ")));
    }
    text.push_str(&format!(" x{} - {}", line.quantity, line.line_total()));
    text
}

struct OrderMessage<'a> {
    order: &'a Order,
    shop_name: &'a str,
}

impl fmt::Display for OrderMessage<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { order, shop_name } = *self;
        writeln!(out, "📦 {} ORDER", shop_name.to_uppercase())?;
        writeln!(out)?;
        writeln!(out, "👤 Customer: {}", order.customer.name.trim())?;
        writeln!(out, "📞 Contact: {}", order.customer.contact_number.trim())?;
        writeln!(out, "📍 Service: {}", order.service.label())?;
        match &order.service {
            ServiceType::Delivery { address, landmark } => {
                writeln!(out, "🏠 Address: {}", address.trim())?;
                if let Some(landmark) = landmark.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
                    writeln!(out, "🗺️ Landmark: {landmark}")?;
                }
            }
            ServiceType::Pickup { time } => writeln!(out, "⏰ Pickup Time: {}", time.label())?,
            ServiceType::DineIn { party_size, arrival } => {
                let plural = if *party_size == 1 { "" } else { "s" };
                writeln!(out, "👥 Party Size: {party_size} person{plural}")?;
                let when = arrival.as_ref().map(format_arrival).unwrap_or_else(|| "Not specified".to_string());
                writeln!(out, "🕐 Preferred Time: {when}")?;
            }
        }
        writeln!(out)?;
        writeln!(out, "📋 ORDER DETAILS:")?;
        for line in &order.lines {
            writeln!(out, "{}", line_summary(line))?;
        }
        writeln!(out)?;
        writeln!(out, "💰 TOTAL: {}", order.total)?;
        if matches!(order.service, ServiceType::Delivery { .. }) {
            writeln!(out, "🛵 DELIVERY FEE: To be confirmed")?;
        }
        writeln!(out)?;
        writeln!(out, "💳 Payment: {}", order.payment_method)?;
        writeln!(out, "📸 Payment Screenshot: Please attach your payment receipt screenshot")?;
        if let Some(notes) = &order.notes {
            writeln!(out)?;
            writeln!(out, "📝 Notes: {}", notes.trim())?;
        }
        writeln!(out)?;
        write!(out, "Please confirm this order to proceed. Thank you for choosing {shop_name}! 🍟")
    }
}

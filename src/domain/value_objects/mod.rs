//! Value Objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_CURRENCY: &str = "PHP";

/// Identity of one cart line. Every add produces a fresh id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(Uuid);

impl LineId {
    pub fn new() -> Self { Self(Uuid::now_v7()) }
    pub fn as_uuid(&self) -> &Uuid { &self.0 }
}

impl Default for LineId { fn default() -> Self { Self::new() } }

impl From<Uuid> for LineId {
    fn from(value: Uuid) -> Self { Self(value) }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn php(amount: Decimal) -> Self { Self::new(amount, DEFAULT_CURRENCY) }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn is_zero(&self) -> bool { self.amount.is_zero() }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch { left: self.currency.clone(), right: other.currency.clone() });
        }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }

    pub fn symbol(&self) -> &str {
        match self.currency.as_str() {
            "PHP" => "₱",
            "USD" => "$",
            "EUR" => "€",
            other => other,
        }
    }
}

impl Default for Money { fn default() -> Self { Self::zero(DEFAULT_CURRENCY) } }

/// Renders as symbol plus two decimals, e.g. `₱180.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.symbol(), self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },
}

/// Strictly positive unit count.
///
/// Built from signed shopper input: anything at or below zero yields `None`,
/// which callers treat as "remove". Counts past `u32::MAX` saturate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn new(value: u32) -> Option<Self> { (value > 0).then_some(Self(value)) }
    pub fn from_signed(value: i64) -> Option<Self> {
        if value <= 0 { return None; }
        Some(Self(u32::try_from(value).unwrap_or(u32::MAX)))
    }
    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: u32) -> Self { Self(self.0.saturating_add(other)) }
}

impl Default for Quantity { fn default() -> Self { Self::ONE } }

impl TryFrom<u32> for Quantity {
    type Error = String;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "quantity must be positive".to_string())
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self { value.0 }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_add() {
        let a = Money::php(Decimal::new(100, 0));
        let b = Money::php(Decimal::new(50, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
    }

    #[test]
    fn test_money_add_rejects_mixed_currency() {
        let a = Money::php(Decimal::new(100, 0));
        let b = Money::new(Decimal::new(1, 0), "USD");
        assert!(matches!(a.add(&b), Err(MoneyError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::php(Decimal::new(180, 0)).to_string(), "₱180.00");
        assert_eq!(Money::new(Decimal::new(1999, 2), "USD").to_string(), "$19.99");
        assert_eq!(Money::new(Decimal::new(5, 1), "JPY").to_string(), "JPY0.50");
    }

    #[test]
    fn test_quantity_is_gated_on_sign() {
        assert_eq!(Quantity::from_signed(3).map(|q| q.value()), Some(3));
        assert!(Quantity::from_signed(0).is_none());
        assert!(Quantity::from_signed(-1).is_none());
        assert!(Quantity::new(0).is_none());
    }

    #[test]
    fn test_oversized_quantity_saturates() {
        assert_eq!(Quantity::from_signed(5_000_000_000).map(|q| q.value()), Some(u32::MAX));
        assert_eq!(Quantity::from_signed(i64::MAX).map(|q| q.value()), Some(u32::MAX));
    }

    #[test]
    fn test_quantity_rejects_zero_when_deserialized() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("2").unwrap().value(), 2);
    }
}

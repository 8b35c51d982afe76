//! Value objects: equality by value, not identity.

use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; two
/// prices of `129.99` are the same price.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Non-negative product price.
///
/// Stored documents carry prices as plain JSON numbers (`129.99`), so the
/// serde representation is a float; arithmetic and comparison use the exact
/// decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl ValueObject for Price {}

impl Price {
    /// Wrap an exact decimal. Negative values are rejected.
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Ok(Self(amount.normalize()))
    }

    /// Parse form input. Non-numeric, zero and negative input are rejected.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let amount = Decimal::from_str(input.trim())
            .map_err(|_| DomainError::validation("Please enter a valid price"))?;
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("Please enter a valid price"));
        }
        Ok(Self(amount.normalize()))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount as a float, for stores that keep prices as JSON numbers.
    pub fn to_f64(&self) -> Option<f64> {
        self.0.to_f64().filter(|value| value.is_finite())
    }

    /// Two-decimal rendering, e.g. `$129.99`.
    pub fn display(&self) -> String {
        format!("${:.2}", self.0)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let amount = match RawPrice::deserialize(deserializer)? {
            RawPrice::Number(n) => Decimal::from_f64(n)
                .ok_or_else(|| D::Error::custom(format!("price out of range: {n}")))?,
            RawPrice::Text(s) => Decimal::from_str(s.trim()).map_err(D::Error::custom)?,
        };
        Price::new(amount).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_positive_decimals() {
        let price = Price::parse(" 129.99 ").unwrap();
        assert_eq!(price.display(), "$129.99");
    }

    #[test]
    fn parse_rejects_non_numeric_and_non_positive() {
        for input in ["abc", "", "0", "-5", "12abc"] {
            let err = Price::parse(input).unwrap_err();
            assert_eq!(err, DomainError::validation("Please enter a valid price"), "{input}");
        }
    }

    #[test]
    fn serializes_as_json_number() {
        let price = Price::parse("49.99").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "49.99");
    }

    #[test]
    fn converts_to_a_finite_float() {
        assert_eq!(Price::parse("129.99").unwrap().to_f64(), Some(129.99));
        assert_eq!(Price::new(Decimal::MAX).unwrap().to_f64().map(f64::is_finite), Some(true));
    }

    #[test]
    fn deserializes_numbers_and_numeric_strings() {
        let a: Price = serde_json::from_str("999.99").unwrap();
        let b: Price = serde_json::from_str("\"999.99\"").unwrap();
        let c: Price = serde_json::from_str("15").unwrap();
        assert_eq!(a, b);
        assert_eq!(c.display(), "$15.00");
    }

    #[test]
    fn deserialize_rejects_negative_prices() {
        assert!(serde_json::from_str::<Price>("-1.5").is_err());
    }
}

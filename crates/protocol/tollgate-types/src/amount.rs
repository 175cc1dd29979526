//! Exact decimal amounts and currencies.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{TypesError, TypesResult};

/// Settlement currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    /// USD Coin, 6 decimals.
    #[default]
    #[serde(rename = "USDC", alias = "usdc")]
    Usdc,
}

impl Currency {
    /// Currency code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usdc => "USDC",
        }
    }

    /// Number of decimal places of one base unit.
    pub fn decimals(&self) -> u32 {
        match self {
            Self::Usdc => 6,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USDC" => Ok(Self::Usdc),
            _ => Err(TypesError::UnknownCurrency(s.to_string())),
        }
    }
}

/// A non-negative exact decimal amount.
///
/// Serialized as a decimal string (`"0.01"`). Deserialization also accepts
/// JSON numbers but rejects negatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Zero.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Wrap a decimal, rejecting negatives.
    pub fn new(value: Decimal) -> TypesResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(TypesError::NegativeAmount(value.to_string()));
        }
        Ok(Self(value.normalize()))
    }

    /// Parse a human-readable amount such as `"0.01"` or `"1,000.50"`.
    pub fn parse(input: &str) -> TypesResult<Self> {
        let cleaned: String = input
            .trim()
            .chars()
            .filter(|c| !matches!(c, ',' | '_' | '$' | ' '))
            .collect();
        let value = Decimal::from_str(&cleaned)
            .map_err(|_| TypesError::InvalidAmount(input.to_string()))?;
        Self::new(value)
    }

    /// Build from integer base units of `currency`.
    pub fn from_base_units(units: u64, currency: Currency) -> Self {
        Self(Decimal::from_i128_with_scale(units as i128, currency.decimals()).normalize())
    }

    /// Convert to integer base units of `currency`.
    ///
    /// Fails if the amount carries more decimals than the currency supports.
    pub fn to_base_units(&self, currency: Currency) -> TypesResult<u64> {
        let supported = currency.decimals();
        if self.0.scale() > supported {
            return Err(TypesError::PrecisionTooHigh {
                given: self.0.scale(),
                supported,
                currency: currency.to_string(),
            });
        }
        let mut scaled = self.0;
        scaled.rescale(supported);
        u64::try_from(scaled.mantissa())
            .map_err(|_| TypesError::AmountOutOfRange(self.0.to_string()))
    }

    /// The underlying decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition.
    pub fn checked_add(&self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(|v| Amount(v.normalize()))
    }

    /// Subtraction that returns `None` instead of going negative.
    pub fn checked_sub(&self, other: Amount) -> Option<Amount> {
        if other.0 > self.0 {
            return None;
        }
        self.0.checked_sub(other.0).map(|v| Amount(v.normalize()))
    }

    /// Subtraction clamped at zero.
    pub fn saturating_sub(&self, other: Amount) -> Amount {
        self.checked_sub(other).unwrap_or(Amount::ZERO)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = TypesError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl FromStr for Amount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_plain_and_formatted() {
        assert_eq!(Amount::parse("0.01").unwrap().as_decimal(), dec!(0.01));
        assert_eq!(Amount::parse("1,000.50").unwrap().as_decimal(), dec!(1000.5));
        assert_eq!(Amount::parse(" $2 ").unwrap().as_decimal(), dec!(2));
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage() {
        assert!(matches!(
            Amount::parse("-1"),
            Err(TypesError::NegativeAmount(_))
        ));
        assert!(matches!(
            Amount::parse("ten"),
            Err(TypesError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_base_units() {
        let cent = Amount::parse("0.01").unwrap();
        assert_eq!(cent.to_base_units(Currency::Usdc).unwrap(), 10_000);
        assert_eq!(Amount::from_base_units(10_000, Currency::Usdc), cent);
    }

    #[test]
    fn test_base_units_precision() {
        let tiny = Amount::parse("0.0000001").unwrap();
        assert!(matches!(
            tiny.to_base_units(Currency::Usdc),
            Err(TypesError::PrecisionTooHigh { given: 7, supported: 6, .. })
        ));
    }

    #[test]
    fn test_ordering_and_arithmetic() {
        let one = Amount::parse("1").unwrap();
        let cent = Amount::parse("0.01").unwrap();
        assert!(cent < one);
        assert_eq!(one.checked_sub(cent).unwrap(), Amount::parse("0.99").unwrap());
        assert!(cent.checked_sub(one).is_none());
        assert_eq!(cent.saturating_sub(one), Amount::ZERO);
        assert_eq!(cent.checked_add(cent).unwrap(), Amount::parse("0.02").unwrap());
    }

    #[test]
    fn test_normalized_equality() {
        assert_eq!(Amount::parse("1.00").unwrap(), Amount::parse("1").unwrap());
    }

    #[test]
    fn test_serde() {
        let cent = Amount::parse("0.01").unwrap();
        assert_eq!(serde_json::to_string(&cent).unwrap(), "\"0.01\"");
        let back: Amount = serde_json::from_str("\"0.01\"").unwrap();
        assert_eq!(back, cent);
        assert!(serde_json::from_str::<Amount>("\"-0.01\"").is_err());
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("usdc".parse::<Currency>().unwrap(), Currency::Usdc);
        assert!("DOGE".parse::<Currency>().is_err());
        let json = serde_json::to_string(&Currency::Usdc).unwrap();
        assert_eq!(json, "\"USDC\"");
    }
}

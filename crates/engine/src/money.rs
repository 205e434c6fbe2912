use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine};

/// Monetary value: an exact decimal amount plus its currency.
///
/// Use this type for **all** monetary values in the engine (transaction
/// amounts, balances, cached values) to avoid floating-point drift. The
/// amount is an arbitrary-precision decimal and survives string
/// round-trips bit-exact.
///
/// Arithmetic requires both operands to share a currency; a mismatch is a
/// hard error, never a silent conversion. `subtract` may legitimately go
/// negative while folding a ledger (debits can temporarily exceed
/// credits); producers of persisted values enforce their own sign rules,
/// e.g. transaction amounts must be strictly positive.
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let a = Money::parse("10.50", Currency::Brl).unwrap();
/// let b = Money::parse("0.50", Currency::Brl).unwrap();
/// assert_eq!(a.add(&b).unwrap().to_string(), "BRL 11.00");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a value from an already-exact decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Zero in the given currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Parses a decimal string into a monetary value.
    ///
    /// Fails with `InvalidAmount` when the string is not an exact decimal
    /// (scientific notation and binary-float artifacts are rejected).
    pub fn parse(raw: &str, currency: Currency) -> ResultEngine<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }
        let amount = Decimal::from_str(trimmed)
            .map_err(|_| EngineError::InvalidAmount(format!("invalid amount: {trimmed}")))?;
        Ok(Self::new(amount, currency))
    }

    /// The raw decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The currency this amount is denominated in.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns `true` if the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Adds two values of the same currency.
    pub fn add(&self, other: &Money) -> ResultEngine<Money> {
        self.ensure_same_currency(other)?;
        Ok(Money::new(self.amount + other.amount, self.currency))
    }

    /// Subtracts `other` from `self`; both must share a currency.
    ///
    /// The result may be negative.
    pub fn subtract(&self, other: &Money) -> ResultEngine<Money> {
        self.ensure_same_currency(other)?;
        Ok(Money::new(self.amount - other.amount, self.currency))
    }

    fn ensure_same_currency(&self, other: &Money) -> ResultEngine<()> {
        if self.currency != other.currency {
            return Err(EngineError::CurrencyMismatch(format!(
                "{} vs {}",
                self.currency.code(),
                other.currency.code()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency.code(), self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_decimal_precision() {
        let money = Money::parse("749.50", Currency::Brl).unwrap();
        assert_eq!(money.amount().to_string(), "749.50");
        assert_eq!(money.to_string(), "BRL 749.50");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            Money::parse("abc", Currency::Brl),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            Money::parse("", Currency::Brl),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            Money::parse("  ", Currency::Brl),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn add_requires_same_currency() {
        let brl = Money::parse("10", Currency::Brl).unwrap();
        let usd = Money::parse("5", Currency::Usd).unwrap();
        assert!(matches!(
            brl.add(&usd),
            Err(EngineError::CurrencyMismatch(_))
        ));
        assert!(matches!(
            brl.subtract(&usd),
            Err(EngineError::CurrencyMismatch(_))
        ));
    }

    #[test]
    fn subtract_may_go_negative() {
        let small = Money::parse("1.00", Currency::Brl).unwrap();
        let big = Money::parse("2.50", Currency::Brl).unwrap();
        let result = small.subtract(&big).unwrap();
        assert!(result.is_negative());
        assert_eq!(result.amount().to_string(), "-1.50");
    }

    #[test]
    fn serde_round_trips_amount_as_string() {
        let money = Money::parse("1000.00", Currency::Brl).unwrap();
        let json = serde_json::to_string(&money).unwrap();
        assert_eq!(json, r#"{"amount":"1000.00","currency":"BRL"}"#);
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, money);
    }
}

//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent
//! invariants.

use unicode_normalization::UnicodeNormalization;

use crate::{Currency, EngineError, ResultEngine};

/// Trim and NFC-normalize a required text field.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidTransaction(format!(
            "{label} must not be empty"
        )));
    }
    Ok(normalized)
}

/// Ensure a stored currency matches the ledger currency.
pub(crate) fn ensure_ledger_currency(expected: Currency, actual: Currency) -> ResultEngine<()> {
    if expected != actual {
        return Err(EngineError::CurrencyMismatch(format!(
            "ledger currency is {}, got {}",
            expected.code(),
            actual.code()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_rejects_empty() {
        assert_eq!(
            normalize_required_text("  Checking  ", "account name").unwrap(),
            "Checking"
        );
        assert!(normalize_required_text("   ", "account name").is_err());
    }

    #[test]
    fn mismatched_ledger_currency_is_rejected() {
        assert!(ensure_ledger_currency(Currency::Brl, Currency::Brl).is_ok());
        assert!(matches!(
            ensure_ledger_currency(Currency::Brl, Currency::Usd),
            Err(EngineError::CurrencyMismatch(_))
        ));
    }
}

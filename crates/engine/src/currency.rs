use serde::{Deserialize, Serialize};

use crate::{EngineError, Money};

/// Currency used to display amounts in reports.
///
/// Amounts are stored as cents regardless of currency; the currency only
/// decides the locale display form (symbol placement, grouping and decimal
/// separators).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Brl,
    Eur,
    Usd,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Brl => "BRL",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    const fn separators(self) -> (char, char) {
        match self {
            Currency::Brl | Currency::Eur => ('.', ','),
            Currency::Usd => (',', '.'),
        }
    }

    /// Formats an amount in the locale display form of the currency.
    ///
    /// ```rust
    /// use engine::{Currency, Money};
    ///
    /// assert_eq!(Currency::Brl.format(Money::new(123_456)), "R$ 1.234,56");
    /// assert_eq!(Currency::Eur.format(Money::new(-500)), "-5,00 €");
    /// assert_eq!(Currency::Usd.format(Money::new(100_000_00)), "$100,000.00");
    /// ```
    #[must_use]
    pub fn format(self, amount: Money) -> String {
        let (group, decimal) = self.separators();
        let (units, cents) = amount.units_and_cents();
        let sign = if amount.is_negative() { "-" } else { "" };

        let digits = units.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push(group);
            }
            grouped.push(ch);
        }

        match self {
            Currency::Brl => format!("{sign}R$ {grouped}{decimal}{cents:02}"),
            Currency::Eur => format!("{sign}{grouped}{decimal}{cents:02} €"),
            Currency::Usd => format!("{sign}${grouped}{decimal}{cents:02}"),
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Currency::Brl),
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            other => Err(EngineError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(Currency::Brl.format(Money::ZERO), "R$ 0,00");
        assert_eq!(Currency::Brl.format(Money::new(99_999)), "R$ 999,99");
        assert_eq!(Currency::Brl.format(Money::new(100_000)), "R$ 1.000,00");
        assert_eq!(
            Currency::Brl.format(Money::new(123_456_789_00)),
            "R$ 123.456.789,00"
        );
        assert_eq!(Currency::Usd.format(Money::new(1_234_567)), "$12,345.67");
    }

    #[test]
    fn negative_sign_leads() {
        assert_eq!(Currency::Brl.format(Money::new(-4_000)), "-R$ 40,00");
        assert_eq!(Currency::Usd.format(Money::new(-1)), "-$0.01");
    }

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!(Currency::try_from(" brl "), Ok(Currency::Brl));
        assert_eq!(Currency::try_from("Eur"), Ok(Currency::Eur));
        assert!(Currency::try_from("GBP").is_err());
    }
}
